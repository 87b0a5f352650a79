//! Target extractor service.
//!
//! Visits one profile, opens the contact panel when offered, and runs the
//! text extractors over what the page shows.

use std::sync::Arc;
use std::time::Duration;

use scraper::Html;

use crate::error::Result;
use crate::models::{Config, ExtractionRecord, TargetUrl};
use crate::services::extractors::{TextExtractor, normalize_digits};
use crate::services::jsonld::JsonLdContacts;
use crate::services::selectors::SelectorRules;
use crate::utils::browser::BrowserPage;
use crate::utils::dedup_preserve_order;
use crate::utils::pause;
use crate::utils::url::{resolve, strip_fragment};

/// Service producing one [`ExtractionRecord`] per profile.
pub struct TargetExtractor {
    config: Arc<Config>,
    rules: SelectorRules,
    text: TextExtractor,
}

/// Everything read from the page after the reveal step.
struct PageContent {
    hrefs: Vec<String>,
    jsonld: JsonLdContacts,
    fallback_text: String,
}

impl TargetExtractor {
    pub fn new(config: Arc<Config>, rules: SelectorRules) -> Result<Self> {
        let text = TextExtractor::new(&config.rules)?;
        Ok(Self {
            config,
            rules,
            text,
        })
    }

    /// Extract one target. Never fails: any error lands in `record.error`
    /// and fields read before it are kept.
    pub async fn extract<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        target: &TargetUrl,
    ) -> ExtractionRecord {
        let mut record = ExtractionRecord::new(target.as_str());
        if let Err(e) = self.fill(page, target, &mut record).await {
            log::warn!("{} failed: {}", target, e);
            record.error = Some(e.to_string());
        }
        record.normalize();
        record
    }

    async fn fill<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        target: &TargetUrl,
        record: &mut ExtractionRecord,
    ) -> Result<()> {
        let pacing = &self.config.pacing;

        page.navigate(target.as_str(), pacing.navigation_timeout())
            .await?;
        pause(Duration::from_millis(pacing.settle_ms)).await;

        let html = page.html().await?;
        {
            let document = Html::parse_document(&html);
            record.name = self.rules.name(&document).unwrap_or_default();
            record.headline = self.rules.headline(&document).unwrap_or_default();
        }

        self.reveal(page, target).await;

        let html = page.html().await?;
        let content = self.read_content(&html)?;
        let text = match page.inner_text().await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => content.fallback_text.clone(),
            Err(e) => {
                log::debug!("innerText unavailable on {}: {}", target, e);
                content.fallback_text.clone()
            }
        };

        if record.name.is_empty() {
            if let Some(name) = &content.jsonld.name {
                record.name = name.clone();
            }
        }

        let base = page
            .current_url()
            .await
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| target.as_str().to_string());
        self.collect_contacts(record, &base, &text, &content);

        Ok(())
    }

    /// Click the reveal control if one is visible. Absence or a failed
    /// click is not an error.
    async fn reveal<P: BrowserPage + ?Sized>(&self, page: &P, target: &TargetUrl) {
        match page.click_first_visible(self.rules.reveal_controls()).await {
            Ok(true) => {
                log::debug!("Opened contact panel on {}", target);
                pause(Duration::from_millis(self.config.pacing.reveal_settle_ms)).await;
            }
            Ok(false) => log::debug!("No contact panel on {}", target),
            Err(e) => log::debug!("Contact panel click ignored on {}: {}", target, e),
        }
    }

    fn read_content(&self, html: &str) -> Result<PageContent> {
        let document = Html::parse_document(html);
        Ok(PageContent {
            hrefs: self.rules.hrefs(&document),
            jsonld: JsonLdContacts::from_document(&document)?,
            fallback_text: document.root_element().text().collect::<Vec<_>>().join(" "),
        })
    }

    fn collect_contacts(
        &self,
        record: &mut ExtractionRecord,
        base: &str,
        text: &str,
        content: &PageContent,
    ) {
        let links: Vec<String> = content
            .hrefs
            .iter()
            .filter_map(|href| resolve(base, href))
            .map(|url| strip_fragment(&url))
            .filter(|url| self.text.is_contact_link(url))
            .collect();

        // mailto/tel targets and structured data join the visible text as
        // extraction sources; other hrefs stay out so URL digits never read
        // as phone numbers.
        let mut source = String::from(text);
        for link in links.iter().filter(|l| l.starts_with("mailto:") || l.starts_with("tel:")) {
            source.push('\n');
            source.push_str(link);
        }
        for value in content.jsonld.emails.iter().chain(&content.jsonld.phones) {
            source.push('\n');
            source.push_str(&normalize_digits(value));
        }

        record.emails = self.text.emails(&source);
        record.phones = self.text.phones(&source);

        let same_as = content
            .jsonld
            .links
            .iter()
            .filter(|url| self.text.is_contact_link(url))
            .cloned();
        record.links = dedup_preserve_order(
            links
                .into_iter()
                .chain(same_as)
                .chain(self.text.whatsapp_links(text)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classified, ExtractionRules, PacingConfig};
    use crate::services::classifier::UrlClassifier;
    use crate::utils::testing::FakePage;

    const ALICE: &str = "https://www.linkedin.com/in/alice";

    const PROFILE: &str = r#"
        <main>
          <h1 class="text-heading-xlarge"> Alice Example </h1>
          <div class="text-body-medium break-words">Staff Engineer at Acme</div>
          <a id="top-card-text-details-contact-info" href="/in/alice/overlay/contact-info/">Contact info</a>
          <a href="/in/bob/">Bob</a>
          <a href="/company/acme/">Acme</a>
          <p>Joined 2019-04-01</p>
        </main>"#;

    const PANEL: &str = r#"
        <section class="pv-contact-info">
          <a href="mailto:Alice@Example.com">Alice@Example.com</a>
          <span>Mobile: ۰٥٥١٢٣٤٥٦٧</span>
          <a href="https://github.com/alice#repos">GitHub</a>
          <a href="https://www.example.org/track">Tracking</a>
          <p>WhatsApp: wa.me/966551234567</p>
        </section>"#;

    fn target(url: &str) -> TargetUrl {
        match UrlClassifier::new("https://www.linkedin.com").unwrap().classify(url) {
            Classified::DirectTarget(t) => t,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn extractor(timeout_secs: u64) -> TargetExtractor {
        let mut config = Config::default();
        config.pacing = PacingConfig {
            navigation_timeout_secs: timeout_secs,
            ..PacingConfig::immediate()
        };
        let rules = SelectorRules::compile(&ExtractionRules::default()).unwrap();
        TargetExtractor::new(Arc::new(config), rules).unwrap()
    }

    #[tokio::test]
    async fn test_extracts_revealed_contact_panel() {
        let page = FakePage::new()
            .with_page(ALICE, PROFILE)
            .with_panel(ALICE, PANEL);

        let record = extractor(5).extract(&page, &target(ALICE)).await;

        assert_eq!(record.error, None);
        assert_eq!(record.name, "Alice Example");
        assert_eq!(record.headline, "Staff Engineer at Acme");
        assert_eq!(record.emails, vec!["alice@example.com"]);
        assert_eq!(record.phones, vec!["0551234567"]);
        assert!(record.links.contains(&"https://github.com/alice".to_string()));
        assert!(record.links.contains(&"mailto:Alice@Example.com".to_string()));
        assert!(record.links.contains(&"https://www.linkedin.com/in/bob/".to_string()));
        assert!(record.links.contains(&"https://wa.me/966551234567".to_string()));
        assert!(!record.links.iter().any(|l| l.contains("example.org")));
        assert!(!record.links.iter().any(|l| l.contains("/company/")));
    }

    #[tokio::test]
    async fn test_missing_optional_fields_are_not_errors() {
        let page = FakePage::new().with_page(ALICE, "<main><h1>Alice</h1></main>");
        let record = extractor(5).extract(&page, &target(ALICE)).await;
        assert_eq!(record.error, None);
        assert_eq!(record.name, "Alice");
        assert_eq!(record.headline, "");
        assert!(record.emails.is_empty());
        assert!(record.phones.is_empty());
    }

    #[tokio::test]
    async fn test_name_falls_back_to_structured_data() {
        let page = FakePage::new().with_page(
            ALICE,
            r#"<script type="application/ld+json">
               {"@type":"Person","name":"Alice LD","email":"alice@ld.io",
                "sameAs":["https://x.com/alice","https://example.org/about"]}
               </script>"#,
        );
        let record = extractor(5).extract(&page, &target(ALICE)).await;
        assert_eq!(record.name, "Alice LD");
        assert_eq!(record.emails, vec!["alice@ld.io"]);
        assert_eq!(record.links, vec!["https://x.com/alice"]);
    }

    #[tokio::test]
    async fn test_every_structured_telephone_is_kept() {
        let page = FakePage::new().with_page(
            ALICE,
            r#"<h1>Alice</h1>
               <script type="application/ld+json">
               {"@type":"Person","telephone":["+966 55 123 4567","0559876543"]}
               </script>"#,
        );
        let record = extractor(5).extract(&page, &target(ALICE)).await;
        assert_eq!(record.phones, vec!["+966 55 123 4567", "0559876543"]);
    }

    #[tokio::test]
    async fn test_tel_link_and_structured_telephone_both_kept() {
        let page = FakePage::new().with_page(
            ALICE,
            r#"<h1>Alice</h1>
               <a href="tel:+15551234567">Call</a>
               <script type="application/ld+json">
               {"@type":"Person","telephone":"0551234567"}
               </script>"#,
        );
        let record = extractor(5).extract(&page, &target(ALICE)).await;
        assert_eq!(record.phones, vec!["+15551234567", "0551234567"]);
        assert_eq!(record.links, vec!["tel:+15551234567"]);
    }

    #[tokio::test]
    async fn test_navigation_timeout_becomes_record_error() {
        let page = FakePage::new().hanging(ALICE);
        let record = extractor(1).extract(&page, &target(ALICE)).await;
        assert_eq!(record.url, ALICE);
        assert_eq!(
            record.error.as_deref(),
            Some("Navigation to https://www.linkedin.com/in/alice timed out after 1s")
        );
        assert!(record.name.is_empty());
    }
}
