//! Ordered selector rules.
//!
//! Each field is read by trying its selectors in order; the first one that
//! yields non-empty text wins. Rules are data so they can be tested against
//! static HTML.

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::ExtractionRules;

/// Compiled form of [`ExtractionRules`].
#[derive(Debug, Clone)]
pub struct SelectorRules {
    name: Vec<Selector>,
    headline: Vec<Selector>,
    login: Vec<Selector>,
    anchors: Selector,
    auth_wall_markers: Vec<String>,
    reveal_controls: Vec<String>,
}

impl SelectorRules {
    /// Compile every selector, failing on the first invalid one.
    pub fn compile(rules: &ExtractionRules) -> Result<Self> {
        // Reveal controls run inside the browser, but compiling them here
        // catches typos before a session is opened.
        compile_all(&rules.reveal_controls)?;

        Ok(Self {
            name: compile_all(&rules.name)?,
            headline: compile_all(&rules.headline)?,
            login: compile_all(&rules.login_indicators)?,
            anchors: parse_selector("a[href]")?,
            auth_wall_markers: rules.auth_wall_markers.clone(),
            reveal_controls: rules.reveal_controls.clone(),
        })
    }

    /// Person's display name.
    pub fn name(&self, document: &Html) -> Option<String> {
        first_text(document, &self.name)
    }

    /// Headline / current title.
    pub fn headline(&self, document: &Html) -> Option<String> {
        first_text(document, &self.headline)
    }

    /// Raw `href` values of every anchor, in document order.
    pub fn hrefs(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.anchors)
            .filter_map(|a| a.value().attr("href"))
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect()
    }

    /// Selectors for the reveal-contact control, in priority order.
    pub fn reveal_controls(&self) -> &[String] {
        &self.reveal_controls
    }

    /// True if the page is a sign-in form or an auth-wall redirect.
    pub fn is_login_wall(&self, current_url: &str, html: &str) -> bool {
        let url = current_url.to_lowercase();
        if self
            .auth_wall_markers
            .iter()
            .any(|marker| url.contains(&marker.to_lowercase()))
        {
            return true;
        }
        let document = Html::parse_document(html);
        self.login
            .iter()
            .any(|sel| document.select(sel).next().is_some())
    }
}

fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        document
            .select(sel)
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .find(|text| !text.is_empty())
    })
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn compile_all(selectors: &[String]) -> Result<Vec<Selector>> {
    selectors.iter().map(|s| parse_selector(s)).collect()
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
