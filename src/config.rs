// src/config.rs

//! Configuration loading utilities.
//!
//! Merges the TOML file, command-line overrides and environment credentials
//! into the immutable values a run is started with.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Config, Credential, OutputLocale};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "harvester.toml";

/// Load configuration from a TOML file.
///
/// An explicit path must exist and parse. Without one, `harvester.toml` in
/// the working directory is used when present, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).map_err(|e| {
            AppError::config(format!("Failed to load config from {}: {e}", path.display()))
        }),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.exists() {
                Ok(Config::load_or_default(fallback))
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub navigation_timeout_secs: Option<u64>,
    pub headed: bool,
    pub collection_cap: Option<usize>,
    pub locale: Option<OutputLocale>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(secs) = self.navigation_timeout_secs {
            config.pacing.navigation_timeout_secs = secs;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(cap) = self.collection_cap {
            config.harvest.collection_cap = cap;
        }
        if let Some(locale) = self.locale {
            config.output.locale = locale;
        }
    }
}

/// Load, override and validate the config, then read credentials.
pub fn load_all(path: Option<&Path>, overrides: &Overrides) -> Result<(Config, Credential)> {
    let mut config = load_config(path)?;
    overrides.apply(&mut config);
    config.validate()?;

    let credential = Credential::from_env()?;
    if credential.is_empty() {
        log::warn!("No session cookie found in the environment");
    } else {
        log::debug!(
            "Loaded {} cookie(s), session cookie {}",
            credential.cookies().len(),
            if credential.has_session() { "present" } else { "absent" }
        );
    }

    Ok((config, credential))
}
