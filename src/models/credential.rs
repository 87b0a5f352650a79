//! Session credentials applied to every browsing context.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Name of the cookie that carries the authenticated session.
pub const SESSION_COOKIE: &str = "li_at";

/// Environment variable holding a lone session-cookie value.
pub const SESSION_TOKEN_ENV: &str = "LI_AT";

/// Environment variable holding a JSON list of cookie descriptors.
pub const COOKIE_LIST_ENV: &str = "LI_COOKIES";

/// Cookie `SameSite` policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// One cookie to inject into the browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieSpec {
    pub name: String,
    pub value: String,

    #[serde(default = "defaults::domain")]
    pub domain: String,

    #[serde(default = "defaults::path")]
    pub path: String,

    #[serde(default = "defaults::flag")]
    pub secure: bool,

    #[serde(default = "defaults::flag", alias = "httpOnly")]
    pub http_only: bool,

    #[serde(default, alias = "sameSite")]
    pub same_site: Option<SameSite>,
}

impl CookieSpec {
    /// Promote a bare session value to a full cookie descriptor.
    pub fn session(value: impl Into<String>) -> Self {
        Self {
            name: SESSION_COOKIE.to_string(),
            value: value.into(),
            domain: defaults::domain(),
            path: defaults::path(),
            secure: true,
            http_only: true,
            same_site: Some(SameSite::Lax),
        }
    }
}

/// Accepts either a bare array or a browser storage-state object.
#[derive(Deserialize)]
#[serde(untagged)]
enum CookieList {
    Bare(Vec<CookieSpec>),
    StorageState { cookies: Vec<CookieSpec> },
}

/// Immutable cookie set loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    cookies: Vec<CookieSpec>,
}

impl Credential {
    /// Build a credential from an optional session token and an optional JSON
    /// cookie list. The explicit list wins: at most one session cookie is
    /// kept, and the token is only added when the list has none.
    pub fn resolve(session_token: Option<&str>, cookie_json: Option<&str>) -> Result<Self> {
        let listed = match cookie_json.map(str::trim).filter(|s| !s.is_empty()) {
            Some(json) => match serde_json::from_str::<CookieList>(json) {
                Ok(CookieList::Bare(cookies)) | Ok(CookieList::StorageState { cookies }) => {
                    cookies
                }
                Err(e) => {
                    return Err(AppError::credential(format!(
                        "{COOKIE_LIST_ENV} is not a valid cookie list: {e}"
                    )));
                }
            },
            None => Vec::new(),
        };

        let mut cookies = Vec::with_capacity(listed.len() + 1);
        let mut has_session = false;
        for cookie in listed {
            if cookie.name.trim().is_empty() {
                continue;
            }
            if cookie.name == SESSION_COOKIE {
                if has_session {
                    continue;
                }
                has_session = true;
            }
            cookies.push(cookie);
        }

        if let Some(token) = session_token.map(str::trim).filter(|t| !t.is_empty()) {
            if !has_session {
                cookies.push(CookieSpec::session(token));
            }
        }

        Ok(Self { cookies })
    }

    /// Load credentials from `LI_AT` / `LI_COOKIES`.
    pub fn from_env() -> Result<Self> {
        let token = env::var(SESSION_TOKEN_ENV).ok();
        let list = env::var(COOKIE_LIST_ENV).ok();
        Self::resolve(token.as_deref(), list.as_deref())
    }

    pub fn cookies(&self) -> &[CookieSpec] {
        &self.cookies
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Whether a session cookie is present.
    pub fn has_session(&self) -> bool {
        self.cookies.iter().any(|c| c.name == SESSION_COOKIE)
    }
}

mod defaults {
    pub fn domain() -> String {
        ".linkedin.com".into()
    }
    pub fn path() -> String {
        "/".into()
    }
    pub fn flag() -> bool {
        true
    }
}
