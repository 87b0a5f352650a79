// src/utils/browser.rs

//! Browser driver utilities.
//!
//! Everything above this module talks to a [`BrowserPage`]; only this file
//! knows about the Chrome DevTools Protocol.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, CookieSameSite};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::models::{BrowserConfig, CookieSpec, SameSite};

/// The page operations the harvesting services need.
///
/// Every method is a suspension point; none of them blocks indefinitely.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait for the load to finish, bounded by `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// URL the page currently shows (after redirects).
    async fn current_url(&self) -> Result<String>;

    /// Serialized DOM of the current page.
    async fn html(&self) -> Result<String>;

    /// Rendered text of the current page body.
    async fn inner_text(&self) -> Result<String>;

    /// Click the first visible element matching any selector, tried in order.
    /// Returns whether something was clicked.
    async fn click_first_visible(&self, selectors: &[String]) -> Result<bool>;

    /// Scroll to the bottom and return the resulting scroll height.
    async fn scroll_to_bottom(&self) -> Result<u64>;

    /// Install cookies into the browsing context.
    async fn set_cookies(&self, cookies: &[CookieSpec]) -> Result<()>;
}

/// Launch Chromium and open the single working tab.
///
/// Returns the browser, its page, and the CDP event-loop task.
pub async fn launch(config: &BrowserConfig) -> Result<(Browser, ChromePage, JoinHandle<()>)> {
    let mut builder = LaunchConfig::builder()
        .window_size(config.window_width, config.window_height)
        .arg(format!("--lang={}", config.locale))
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-blink-features=AutomationControlled");

    if !config.headless {
        builder = builder.with_head();
    }
    if let Some(executable) = &config.executable {
        builder = builder.chrome_executable(executable);
    }

    let launch_config = builder.build().map_err(AppError::browser)?;
    let (browser, mut handler) = Browser::launch(launch_config)
        .await
        .map_err(|e| AppError::browser(format!("launch failed: {e}")))?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                log::debug!("CDP handler event error: {}", e);
            }
        }
    });

    let page = match open_page(&browser, config).await {
        Ok(page) => page,
        Err(e) => {
            handler_task.abort();
            return Err(e);
        }
    };

    Ok((browser, page, handler_task))
}

async fn open_page(browser: &Browser, config: &BrowserConfig) -> Result<ChromePage> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| AppError::browser(format!("new page failed: {e}")))?;

    let user_agent = SetUserAgentOverrideParams::builder()
        .user_agent(config.user_agent.clone())
        .accept_language(config.locale.clone())
        .build()
        .map_err(AppError::browser)?;
    page.execute(user_agent)
        .await
        .map_err(|e| AppError::browser(format!("user agent override failed: {e}")))?;

    Ok(ChromePage { page })
}

/// A Chromium tab driven over CDP.
pub struct ChromePage {
    page: Page,
}

impl ChromePage {
    async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(AppError::browser)?
            .into_value::<T>()
            .map_err(AppError::browser)
    }
}

fn to_cookie_param(cookie: &CookieSpec) -> Result<CookieParam> {
    let same_site = cookie.same_site.map(|s| match s {
        SameSite::Strict => CookieSameSite::Strict,
        SameSite::Lax => CookieSameSite::Lax,
        SameSite::None => CookieSameSite::None,
    });

    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone())
        .domain(cookie.domain.clone())
        .path(cookie.path.clone())
        .secure(cookie.secure)
        .http_only(cookie.http_only);
    if let Some(same_site) = same_site {
        builder = builder.same_site(same_site);
    }
    builder
        .build()
        .map_err(|e| AppError::credential(format!("cookie '{}': {e}", cookie.name)))
}

const INNER_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

const SCROLL_JS: &str = "(() => { \
    const el = document.scrollingElement || document.body; \
    window.scrollTo(0, el.scrollHeight); \
    return el.scrollHeight; })()";

fn click_visible_js(selectors: &[String]) -> Result<String> {
    let list = serde_json::to_string(selectors)?;
    Ok(format!(
        "(() => {{ \
            for (const sel of {list}) {{ \
                let nodes; \
                try {{ nodes = document.querySelectorAll(sel); }} catch (e) {{ continue; }} \
                for (const el of nodes) {{ \
                    if (el.offsetParent !== null) {{ el.click(); return true; }} \
                }} \
            }} \
            return false; }})()"
    ))
}

#[async_trait]
impl BrowserPage for ChromePage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(AppError::navigation(url, e)),
            Err(_) => Err(AppError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }),
        }
    }

    async fn current_url(&self) -> Result<String> {
        let url = self.page.url().await.map_err(AppError::browser)?;
        Ok(url.unwrap_or_default())
    }

    async fn html(&self) -> Result<String> {
        self.page.content().await.map_err(AppError::browser)
    }

    async fn inner_text(&self) -> Result<String> {
        self.eval(INNER_TEXT_JS).await
    }

    async fn click_first_visible(&self, selectors: &[String]) -> Result<bool> {
        if selectors.is_empty() {
            return Ok(false);
        }
        let script = click_visible_js(selectors)?;
        self.eval(&script).await
    }

    async fn scroll_to_bottom(&self) -> Result<u64> {
        let height: f64 = self.eval(SCROLL_JS).await?;
        Ok(height.max(0.0) as u64)
    }

    async fn set_cookies(&self, cookies: &[CookieSpec]) -> Result<()> {
        if cookies.is_empty() {
            return Ok(());
        }
        let params = cookies
            .iter()
            .map(to_cookie_param)
            .collect::<Result<Vec<_>>>()?;
        self.page
            .set_cookies(params)
            .await
            .map_err(AppError::browser)?;
        Ok(())
    }
}
