//! Authenticated session manager.
//!
//! Owns the one browser and tab used for a run. Cookies are applied, the
//! landing page is checked for a login wall, and a bounded window is given
//! for manual sign-in before handing the page to the extractors.

use std::fmt;
use std::time::Duration;

use chromiumoxide::Browser;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::Result;
use crate::models::{BrowserConfig, Credential};
use crate::services::selectors::SelectorRules;
use crate::utils::browser::{self, BrowserPage, ChromePage};
use crate::utils::pause;

/// How often the page is re-checked while waiting for a manual sign-in.
const LOGIN_POLL: Duration = Duration::from_secs(2);

/// What the landing-page check concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Landing page loaded without a login wall
    Authenticated,
    /// A login wall was shown and cleared during the wait window
    ManualLogin,
    /// A login wall was still present when the wait window closed
    Unauthenticated,
    /// The landing page could not be loaded
    Unknown,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Authenticated => "authenticated",
            Self::ManualLogin => "authenticated (manual sign-in)",
            Self::Unauthenticated => "unauthenticated",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A live browsing context. Call [`Session::close`] when done; dropping
/// without closing only stops the event loop.
pub struct Session {
    browser: Browser,
    page: ChromePage,
    handler: JoinHandle<()>,
    auth: AuthState,
}

impl Session {
    /// Launch the browser and authenticate.
    ///
    /// Launch failures are returned as is. If authentication itself fails
    /// the browser is closed before the error is returned.
    pub async fn open(
        config: &BrowserConfig,
        credential: &Credential,
        rules: &SelectorRules,
        timeout: Duration,
    ) -> Result<Self> {
        let (browser, page, handler) = browser::launch(config).await?;
        let mut session = Self {
            browser,
            page,
            handler,
            auth: AuthState::Unknown,
        };

        match authenticate(&session.page, credential, config, rules, timeout).await {
            Ok(state) => {
                session.auth = state;
                Ok(session)
            }
            Err(e) => {
                session.close().await;
                Err(e)
            }
        }
    }

    pub fn page(&self) -> &ChromePage {
        &self.page
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth
    }

    /// Close the browser and wait for the process to exit.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            log::debug!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            log::debug!("Browser wait failed: {}", e);
        }
        log::debug!("Browser session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Apply cookies, visit the landing page, and wait out a login wall.
///
/// Never fails because of the wall itself: an unauthenticated session still
/// proceeds and later extractions simply come back sparse.
pub async fn authenticate<P: BrowserPage + ?Sized>(
    page: &P,
    credential: &Credential,
    config: &BrowserConfig,
    rules: &SelectorRules,
    timeout: Duration,
) -> Result<AuthState> {
    if credential.is_empty() {
        log::warn!("No credential configured; continuing without cookies");
    } else {
        page.set_cookies(credential.cookies()).await?;
        log::info!("Applied {} cookie(s)", credential.cookies().len());
    }

    if let Err(e) = page.navigate(&config.landing_url, timeout).await {
        log::warn!("Landing page check skipped: {}", e);
        return Ok(AuthState::Unknown);
    }

    if !login_wall_present(page, rules).await {
        return Ok(AuthState::Authenticated);
    }

    let wait = config.login_wait();
    log::warn!(
        "Login wall detected; waiting up to {}s for manual sign-in",
        wait.as_secs()
    );

    let deadline = Instant::now() + wait;
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        pause(LOGIN_POLL.min(deadline - now)).await;
        if !login_wall_present(page, rules).await {
            log::info!("Login wall cleared");
            return Ok(AuthState::ManualLogin);
        }
    }

    log::warn!("Still unauthenticated; continuing anyway");
    Ok(AuthState::Unauthenticated)
}

async fn login_wall_present<P: BrowserPage + ?Sized>(page: &P, rules: &SelectorRules) -> bool {
    let url = page.current_url().await.unwrap_or_default();
    match page.html().await {
        Ok(html) => rules.is_login_wall(&url, &html),
        Err(e) => {
            log::debug!("Could not read page while checking for login wall: {}", e);
            rules.is_login_wall(&url, "")
        }
    }
}
