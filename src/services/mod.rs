//! Service layer for the harvester.
//!
//! This module contains the business logic for:
//! - URL classification (`UrlClassifier`)
//! - Session setup and login-wall handling (`Session`)
//! - Collection expansion (`CollectionExpander`)
//! - Per-profile extraction (`TargetExtractor`)
//! - Sequential fetching (`FetchSequencer`)
//! - Text, selector and JSON-LD extractors

mod classifier;
mod collections;
pub mod extractors;
mod jsonld;
mod profiles;
mod selectors;
mod sequencer;
mod session;

pub use classifier::UrlClassifier;
pub use collections::{CollectionExpander, Expansion, ExpansionOutcome};
pub use extractors::TextExtractor;
pub use jsonld::JsonLdContacts;
pub use profiles::TargetExtractor;
pub use selectors::SelectorRules;
pub use sequencer::FetchSequencer;
pub use session::{AuthState, Session, authenticate};
