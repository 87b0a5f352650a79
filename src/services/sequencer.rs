//! Fetch sequencer.
//!
//! Runs the target extractor over every target, one at a time, with a
//! randomized pause in between.

use std::sync::Arc;

use crate::models::{Config, ResultSet, TargetUrl};
use crate::services::profiles::TargetExtractor;
use crate::utils::browser::BrowserPage;
use crate::utils::{jittered, pause, report};

pub struct FetchSequencer {
    config: Arc<Config>,
    extractor: TargetExtractor,
}

impl FetchSequencer {
    pub fn new(config: Arc<Config>, extractor: TargetExtractor) -> Self {
        Self { config, extractor }
    }

    /// Extract all targets in order. The result set has exactly one record
    /// per target, in target order.
    pub async fn run<P: BrowserPage + ?Sized>(&self, page: &P, targets: &[TargetUrl]) -> ResultSet {
        let pacing = &self.config.pacing;
        let total = targets.len();
        let mut results = ResultSet::new();

        for (i, target) in targets.iter().enumerate() {
            if i > 0 {
                pause(jittered(pacing.request_delay_ms, pacing.request_jitter_ms)).await;
            }

            let record = self.extractor.extract(page, target).await;
            let status = match &record.error {
                Some(e) => format!("error: {e}"),
                None => format!(
                    "{} email(s), {} phone(s), {} link(s)",
                    record.emails.len(),
                    record.phones.len(),
                    record.links.len()
                ),
            };
            report::sub_item(&format!("[{}/{}] {} ({})", i + 1, total, target, status));
            results.push(record);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classified, PacingConfig};
    use crate::services::classifier::UrlClassifier;
    use crate::services::selectors::SelectorRules;
    use crate::utils::testing::FakePage;

    fn sequencer() -> FetchSequencer {
        let mut config = Config::default();
        config.pacing = PacingConfig::immediate();
        let config = Arc::new(config);
        let rules = SelectorRules::compile(&config.rules).unwrap();
        let extractor = TargetExtractor::new(config.clone(), rules).unwrap();
        FetchSequencer::new(config, extractor)
    }

    fn targets(urls: &[&str]) -> Vec<TargetUrl> {
        let classifier = UrlClassifier::new("https://www.linkedin.com").unwrap();
        urls.iter()
            .map(|u| match classifier.classify(u) {
                Classified::DirectTarget(t) => t,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let page = FakePage::new()
            .with_page("https://www.linkedin.com/in/a", "<h1>A</h1>")
            .failing("https://www.linkedin.com/in/b")
            .with_page("https://www.linkedin.com/in/c", "<h1>C</h1> c@c.io");

        let results = sequencer()
            .run(&page, &targets(&["/in/a", "/in/b", "/in/c"]))
            .await;

        let urls: Vec<_> = results.records().iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.linkedin.com/in/a",
                "https://www.linkedin.com/in/b",
                "https://www.linkedin.com/in/c",
            ]
        );
        assert_eq!(results.error_count(), 1);
        assert!(results.records()[1].is_error());
        assert_eq!(results.records()[2].emails, vec!["c@c.io"]);
        assert_eq!(page.visited().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_target_list() {
        let page = FakePage::new();
        let results = sequencer().run(&page, &[]).await;
        assert!(results.is_empty());
        assert!(page.visited().is_empty());
    }
}
