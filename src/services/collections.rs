//! Collection expander service.
//!
//! Turns a people listing into profile targets by scanning the DOM and
//! scrolling until the cap, the round limit, or a stall is reached.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use scraper::Html;

use crate::error::Result;
use crate::models::{Classified, CollectionUrl, Config, TargetUrl};
use crate::services::classifier::UrlClassifier;
use crate::services::selectors::SelectorRules;
use crate::utils::browser::BrowserPage;
use crate::utils::url::resolve;
use crate::utils::{jittered, pause};

/// Why expansion of one collection stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionOutcome {
    /// All scroll rounds were used
    Exhausted,
    /// The per-collection cap was reached
    CapReached,
    /// Neither targets nor page height changed for several rounds
    Stalled,
    /// Navigation or a DOM read failed; targets hold what was found before
    Failed(String),
}

impl fmt::Display for ExpansionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("rounds exhausted"),
            Self::CapReached => f.write_str("cap reached"),
            Self::Stalled => f.write_str("stalled"),
            Self::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

/// Targets discovered in one collection, in discovery order.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub collection: CollectionUrl,
    pub targets: Vec<TargetUrl>,
    pub rounds: usize,
    pub outcome: ExpansionOutcome,
}

impl Expansion {
    pub fn is_partial(&self) -> bool {
        matches!(self.outcome, ExpansionOutcome::Failed(_))
    }
}

/// Service for expanding collection pages into profile targets.
pub struct CollectionExpander {
    config: Arc<Config>,
    classifier: UrlClassifier,
    rules: SelectorRules,
}

impl CollectionExpander {
    pub fn new(config: Arc<Config>, classifier: UrlClassifier, rules: SelectorRules) -> Self {
        Self {
            config,
            classifier,
            rules,
        }
    }

    /// Expand one collection. Never fails: errors end the expansion early
    /// and are reported through [`ExpansionOutcome::Failed`].
    pub async fn expand<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        collection: &CollectionUrl,
    ) -> Expansion {
        let mut targets = Vec::new();
        let mut seen = HashSet::new();
        let mut rounds = 0;

        let outcome = match self
            .harvest(page, collection, &mut targets, &mut seen, &mut rounds)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!(
                    "Collection {} stopped after {} round(s): {}",
                    collection,
                    rounds,
                    e
                );
                ExpansionOutcome::Failed(e.to_string())
            }
        };

        log::info!(
            "Collection {}: {} target(s), {}",
            collection,
            targets.len(),
            outcome
        );

        Expansion {
            collection: collection.clone(),
            targets,
            rounds,
            outcome,
        }
    }

    /// Expand every collection in order, one after another on the same page.
    pub async fn expand_all<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        collections: &[CollectionUrl],
    ) -> Vec<Expansion> {
        let mut expansions = Vec::with_capacity(collections.len());
        for collection in collections {
            expansions.push(self.expand(page, collection).await);
        }
        expansions
    }

    async fn harvest<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        collection: &CollectionUrl,
        targets: &mut Vec<TargetUrl>,
        seen: &mut HashSet<TargetUrl>,
        rounds: &mut usize,
    ) -> Result<ExpansionOutcome> {
        let harvest = &self.config.harvest;
        let pacing = &self.config.pacing;
        let cap = harvest.collection_cap;

        page.navigate(collection.as_str(), pacing.navigation_timeout())
            .await?;
        pause(Duration::from_millis(pacing.settle_ms)).await;

        let mut last_height = None;
        let mut idle_rounds = 0;

        while *rounds < harvest.max_scroll_rounds {
            *rounds += 1;

            let html = page.html().await?;
            let mut added = 0;
            for target in self.scan(&html, collection.as_str()) {
                if cap > 0 && targets.len() >= cap {
                    break;
                }
                if seen.insert(target.clone()) {
                    targets.push(target);
                    added += 1;
                }
            }
            log::debug!(
                "Round {}/{}: +{} ({} total)",
                rounds,
                harvest.max_scroll_rounds,
                added,
                targets.len()
            );

            if cap > 0 && targets.len() >= cap {
                return Ok(ExpansionOutcome::CapReached);
            }
            if *rounds == harvest.max_scroll_rounds {
                break;
            }

            let height = page.scroll_to_bottom().await?;
            if added == 0 && last_height == Some(height) {
                idle_rounds += 1;
                if harvest.stall_rounds > 0 && idle_rounds >= harvest.stall_rounds {
                    return Ok(ExpansionOutcome::Stalled);
                }
            } else {
                idle_rounds = 0;
            }
            last_height = Some(height);

            pause(jittered(pacing.scroll_delay_ms, pacing.scroll_jitter_ms)).await;
        }

        Ok(ExpansionOutcome::Exhausted)
    }

    /// Profile targets linked from `html`, in document order.
    fn scan(&self, html: &str, base: &str) -> Vec<TargetUrl> {
        let document = Html::parse_document(html);
        self.rules
            .hrefs(&document)
            .iter()
            .filter_map(|href| resolve(base, href))
            .filter_map(|url| match self.classifier.classify(&url) {
                Classified::DirectTarget(target) => Some(target),
                _ => None,
            })
            .collect()
    }
}
