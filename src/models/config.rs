//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::OutputLocale;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Browser launch and session settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Collection expansion settings
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Timeouts and politeness delays
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Export settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Ordered selector rules and link keywords
    #[serde(default)]
    pub rules: ExtractionRules,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.browser.user_agent.trim().is_empty() {
            return Err(AppError::validation("browser.user_agent is empty"));
        }
        if self.browser.window_width == 0 || self.browser.window_height == 0 {
            return Err(AppError::validation("browser window size must be > 0"));
        }
        url::Url::parse(&self.browser.landing_url)
            .map_err(|e| AppError::validation(format!("browser.landing_url: {e}")))?;
        url::Url::parse(&self.harvest.site_origin)
            .map_err(|e| AppError::validation(format!("harvest.site_origin: {e}")))?;
        if self.harvest.max_scroll_rounds == 0 {
            return Err(AppError::validation("harvest.max_scroll_rounds must be > 0"));
        }
        if self.pacing.navigation_timeout_secs == 0 {
            return Err(AppError::validation(
                "pacing.navigation_timeout_secs must be > 0",
            ));
        }
        if self.rules.name.is_empty() {
            return Err(AppError::validation("rules.name has no selectors"));
        }
        if self.rules.login_indicators.is_empty() && self.rules.auth_wall_markers.is_empty() {
            return Err(AppError::validation(
                "rules need at least one login indicator or auth-wall marker",
            ));
        }
        Ok(())
    }
}

/// Browser launch and authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run without a visible window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// User-Agent presented by the browsing context
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Browser UI / Accept-Language locale
    #[serde(default = "defaults::browser_locale")]
    pub locale: String,

    #[serde(default = "defaults::window_width")]
    pub window_width: u32,

    #[serde(default = "defaults::window_height")]
    pub window_height: u32,

    /// Page visited right after cookies are applied to verify the session
    #[serde(default = "defaults::landing_url")]
    pub landing_url: String,

    /// How long to wait for manual sign-in when a login wall is detected
    #[serde(default = "defaults::login_wait")]
    pub login_wait_secs: u64,

    /// Explicit Chromium executable; autodetected when absent
    #[serde(default)]
    pub executable: Option<String>,
}

impl BrowserConfig {
    pub fn login_wait(&self) -> Duration {
        Duration::from_secs(self.login_wait_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: defaults::headless(),
            user_agent: defaults::user_agent(),
            locale: defaults::browser_locale(),
            window_width: defaults::window_width(),
            window_height: defaults::window_height(),
            landing_url: defaults::landing_url(),
            login_wait_secs: defaults::login_wait(),
            executable: None,
        }
    }
}

/// Collection expansion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Origin used to absolutize relative URLs
    #[serde(default = "defaults::site_origin")]
    pub site_origin: String,

    /// Maximum profiles taken from one collection (0 = until rounds run out)
    #[serde(default = "defaults::collection_cap")]
    pub collection_cap: usize,

    /// Upper bound on scan/scroll rounds per collection
    #[serde(default = "defaults::max_scroll_rounds")]
    pub max_scroll_rounds: usize,

    /// Consecutive rounds without growth before giving up (0 = never)
    #[serde(default = "defaults::stall_rounds")]
    pub stall_rounds: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            site_origin: defaults::site_origin(),
            collection_cap: defaults::collection_cap(),
            max_scroll_rounds: defaults::max_scroll_rounds(),
            stall_rounds: defaults::stall_rounds(),
        }
    }
}

/// Navigation timeout and randomized politeness delays, all in milliseconds
/// unless stated otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Per-navigation timeout in seconds
    #[serde(default = "defaults::navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Wait after navigation for dynamic content
    #[serde(default = "defaults::settle")]
    pub settle_ms: u64,

    /// Wait after activating the reveal-contact control
    #[serde(default = "defaults::reveal_settle")]
    pub reveal_settle_ms: u64,

    #[serde(default = "defaults::scroll_delay")]
    pub scroll_delay_ms: u64,

    #[serde(default = "defaults::scroll_jitter")]
    pub scroll_jitter_ms: u64,

    /// Base delay between two targets
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    #[serde(default = "defaults::request_jitter")]
    pub request_jitter_ms: u64,
}

impl PacingConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// No waiting at all; used by tests.
    pub fn immediate() -> Self {
        Self {
            navigation_timeout_secs: defaults::navigation_timeout(),
            settle_ms: 0,
            reveal_settle_ms: 0,
            scroll_delay_ms: 0,
            scroll_jitter_ms: 0,
            request_delay_ms: 0,
            request_jitter_ms: 0,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: defaults::navigation_timeout(),
            settle_ms: defaults::settle(),
            reveal_settle_ms: defaults::reveal_settle(),
            scroll_delay_ms: defaults::scroll_delay(),
            scroll_jitter_ms: defaults::scroll_jitter(),
            request_delay_ms: defaults::request_delay(),
            request_jitter_ms: defaults::request_jitter(),
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Header language for tabular exports
    #[serde(default)]
    pub locale: OutputLocale,
}

/// Ordered selector rules. Within each list the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRules {
    /// Primary heading holding the person's name
    #[serde(default = "defaults::name_rules")]
    pub name: Vec<String>,

    /// Headline / current title
    #[serde(default = "defaults::headline_rules")]
    pub headline: Vec<String>,

    /// Controls that open the contact-info panel
    #[serde(default = "defaults::reveal_rules")]
    pub reveal_controls: Vec<String>,

    /// Elements that only exist on a sign-in form
    #[serde(default = "defaults::login_rules")]
    pub login_indicators: Vec<String>,

    /// URL fragments of auth-wall redirects
    #[serde(default = "defaults::auth_wall_markers")]
    pub auth_wall_markers: Vec<String>,

    /// Recognized social/portfolio domains for link classification
    #[serde(default = "defaults::link_keywords")]
    pub link_keywords: Vec<String>,

    /// Match keywords against the host on label boundaries instead of as
    /// substrings of the whole URL
    #[serde(default)]
    pub strict_link_hosts: bool,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            name: defaults::name_rules(),
            headline: defaults::headline_rules(),
            reveal_controls: defaults::reveal_rules(),
            login_indicators: defaults::login_rules(),
            auth_wall_markers: defaults::auth_wall_markers(),
            link_keywords: defaults::link_keywords(),
            strict_link_hosts: false,
        }
    }
}

mod defaults {
    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    // Browser defaults
    pub fn headless() -> bool {
        true
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn browser_locale() -> String {
        "en-US".into()
    }
    pub fn window_width() -> u32 {
        1366
    }
    pub fn window_height() -> u32 {
        900
    }
    pub fn landing_url() -> String {
        "https://www.linkedin.com/feed/".into()
    }
    pub fn login_wait() -> u64 {
        90
    }

    // Harvest defaults
    pub fn site_origin() -> String {
        "https://www.linkedin.com".into()
    }
    pub fn collection_cap() -> usize {
        30
    }
    pub fn max_scroll_rounds() -> usize {
        15
    }
    pub fn stall_rounds() -> usize {
        3
    }

    // Pacing defaults
    pub fn navigation_timeout() -> u64 {
        30
    }
    pub fn settle() -> u64 {
        1500
    }
    pub fn reveal_settle() -> u64 {
        1200
    }
    pub fn scroll_delay() -> u64 {
        1000
    }
    pub fn scroll_jitter() -> u64 {
        500
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn request_jitter() -> u64 {
        1500
    }

    // Rule defaults
    pub fn name_rules() -> Vec<String> {
        strings(&["h1.text-heading-xlarge", "main h1", "h1"])
    }
    pub fn headline_rules() -> Vec<String> {
        strings(&[
            "div.text-body-medium.break-words",
            ".pv-text-details__left-panel .text-body-medium",
            ".top-card-layout__headline",
            "h2.top-card-layout__headline",
        ])
    }
    pub fn reveal_rules() -> Vec<String> {
        strings(&[
            "a#top-card-text-details-contact-info",
            "a[href*='/overlay/contact-info/']",
            "button[aria-label*='Contact info']",
        ])
    }
    pub fn login_rules() -> Vec<String> {
        strings(&[
            "form.login__form",
            "input[name='session_key']",
            "input#username",
            "form#join-form",
        ])
    }
    pub fn auth_wall_markers() -> Vec<String> {
        strings(&["/authwall", "/login", "/checkpoint/", "/uas/login"])
    }
    pub fn link_keywords() -> Vec<String> {
        strings(&[
            "facebook.com",
            "fb.com",
            "instagram.com",
            "twitter.com",
            "x.com",
            "tiktok.com",
            "snapchat.com",
            "youtube.com",
            "youtu.be",
            "github.com",
            "gitlab.com",
            "behance.net",
            "dribbble.com",
            "medium.com",
            "wa.me",
            "whatsapp.com",
            "t.me",
            "calendly.com",
        ])
    }
}
