//! Scripted in-memory page for exercising services without a browser.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::CookieSpec;
use crate::utils::browser::BrowserPage;

#[derive(Default)]
struct State {
    current: String,
    stage: usize,
    scrolls: usize,
    revealed: bool,
    visited: Vec<String>,
    cookies: Vec<CookieSpec>,
}

/// A fake tab. Each URL maps to a list of HTML stages; scrolling advances to
/// the next stage, mimicking infinite-scroll loading.
#[derive(Default)]
pub struct FakePage {
    pages: HashMap<String, Vec<String>>,
    panels: HashMap<String, String>,
    redirects: HashMap<String, String>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    fail_after_scrolls: Option<usize>,
    state: Mutex<State>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`.
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_stages(url, &[html])
    }

    /// Serve successive HTML snapshots at `url`, one per scroll.
    pub fn with_stages(mut self, url: &str, stages: &[&str]) -> Self {
        self.pages
            .insert(url.to_string(), stages.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Append `panel` to the page at `url` once a reveal control is clicked.
    pub fn with_panel(mut self, url: &str, panel: &str) -> Self {
        self.panels.insert(url.to_string(), panel.to_string());
        self
    }

    /// Report `to` as the current URL after navigating to `from`.
    pub fn with_redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.to_string(), to.to_string());
        self
    }

    /// Navigation to `url` fails immediately.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Navigation to `url` never completes on its own.
    pub fn hanging(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    /// Reading the DOM fails once this many scrolls have happened.
    pub fn fail_after_scrolls(mut self, scrolls: usize) -> Self {
        self.fail_after_scrolls = Some(scrolls);
        self
    }

    pub fn visited(&self) -> Vec<String> {
        self.lock().visited.clone()
    }

    pub fn scrolls(&self) -> usize {
        self.lock().scrolls
    }

    pub fn cookies(&self) -> Vec<CookieSpec> {
        self.lock().cookies.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn current_html(&self) -> Result<String> {
        let state = self.lock();
        if let Some(limit) = self.fail_after_scrolls {
            if state.scrolls >= limit {
                return Err(AppError::browser("page crashed"));
            }
        }
        let stages = self
            .pages
            .get(&state.current)
            .ok_or_else(|| AppError::navigation(state.current.clone(), "no such page"))?;
        let mut html = stages[state.stage.min(stages.len() - 1)].clone();
        if state.revealed {
            if let Some(panel) = self.panels.get(&state.current) {
                html.push_str(panel);
            }
        }
        Ok(html)
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        self.lock().visited.push(url.to_string());
        if self.hanging.contains(url) {
            return match tokio::time::timeout(timeout, std::future::pending::<()>()).await {
                Ok(()) => Ok(()),
                Err(_) => Err(AppError::Timeout {
                    url: url.to_string(),
                    secs: timeout.as_secs(),
                }),
            };
        }
        if self.failing.contains(url) || !self.pages.contains_key(url) {
            return Err(AppError::navigation(url, "net::ERR_CONNECTION_RESET"));
        }
        let mut state = self.lock();
        state.current = url.to_string();
        state.stage = 0;
        state.revealed = false;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.lock();
        Ok(self
            .redirects
            .get(&state.current)
            .cloned()
            .unwrap_or_else(|| state.current.clone()))
    }

    async fn html(&self) -> Result<String> {
        self.current_html()
    }

    async fn inner_text(&self) -> Result<String> {
        let html = self.current_html()?;
        let document = Html::parse_document(&html);
        Ok(document.root_element().text().collect::<Vec<_>>().join(" "))
    }

    async fn click_first_visible(&self, selectors: &[String]) -> Result<bool> {
        let html = self.current_html()?;
        let matched = {
            let document = Html::parse_document(&html);
            selectors.iter().any(|s| {
                Selector::parse(s)
                    .map(|sel| document.select(&sel).next().is_some())
                    .unwrap_or(false)
            })
        };
        if matched {
            self.lock().revealed = true;
        }
        Ok(matched)
    }

    async fn scroll_to_bottom(&self) -> Result<u64> {
        let mut state = self.lock();
        state.scrolls += 1;
        let stages = self.pages.get(&state.current).map_or(1, Vec::len);
        state.stage = (state.stage + 1).min(stages - 1);
        Ok(1000 * (state.stage as u64 + 1))
    }

    async fn set_cookies(&self, cookies: &[CookieSpec]) -> Result<()> {
        self.lock().cookies.extend(cookies.iter().cloned());
        Ok(())
    }
}
