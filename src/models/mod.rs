// src/models/mod.rs

//! Domain models for the harvester.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod credential;
mod locale;
mod record;
mod target;

// Re-export all public types
pub use config::{BrowserConfig, Config, ExtractionRules, HarvestConfig, OutputConfig, PacingConfig};
pub use credential::{
    COOKIE_LIST_ENV, CookieSpec, Credential, SESSION_COOKIE, SESSION_TOKEN_ENV, SameSite,
};
pub use locale::{Column, OutputLocale};
pub use record::{ExtractionRecord, ResultSet};
pub use target::{Classified, CollectionKind, CollectionUrl, TargetPlan, TargetUrl};

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct HarvestStats {
    pub direct_inputs: usize,
    pub collection_inputs: usize,
    pub rejected_inputs: usize,
    pub expanded_targets: usize,
    pub targets: usize,
    pub failures: usize,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl HarvestStats {
    /// Elapsed wall time in whole seconds, if the run has finished.
    pub fn elapsed_secs(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }
}
