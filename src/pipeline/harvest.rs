// src/pipeline/harvest.rs

//! Contact harvesting pipeline.
//!
//! classify -> open session -> expand collections -> extract targets -> export

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{Config, Credential, HarvestStats, ResultSet, TargetPlan, TargetUrl};
use crate::services::{
    CollectionExpander, Expansion, FetchSequencer, SelectorRules, Session, TargetExtractor,
    UrlClassifier,
};
use crate::storage::{LocalStorage, ResultStorage};
use crate::utils::browser::BrowserPage;
use crate::utils::report;

const TOTAL_STEPS: usize = 5;

/// What to harvest and where to write it.
#[derive(Debug, Clone)]
pub struct HarvestRequest {
    pub inputs: Vec<String>,
    pub output: PathBuf,
}

/// Collection expansion and target extraction bound to one configuration.
pub struct Harvester {
    expander: CollectionExpander,
    sequencer: FetchSequencer,
}

impl Harvester {
    pub fn new(config: Arc<Config>, classifier: UrlClassifier, rules: SelectorRules) -> Result<Self> {
        let extractor = TargetExtractor::new(config.clone(), rules.clone())?;
        Ok(Self {
            expander: CollectionExpander::new(config.clone(), classifier, rules),
            sequencer: FetchSequencer::new(config, extractor),
        })
    }

    /// Expand collections and extract every resolved target on `page`.
    ///
    /// Fails only with [`AppError::NoTargets`], when nothing is left to visit.
    pub async fn harvest<P: BrowserPage + ?Sized>(
        &self,
        page: &P,
        plan: &TargetPlan,
        stats: &mut HarvestStats,
    ) -> Result<ResultSet> {
        report::step(3, TOTAL_STEPS, "Expanding collections");
        let expansions = self.expander.expand_all(page, &plan.collections).await;
        for expansion in expansions.iter().filter(|e| e.is_partial()) {
            report::sub_item(&format!(
                "{}: partial ({} target(s))",
                expansion.collection,
                expansion.targets.len()
            ));
        }

        let targets = merge_targets(&plan.direct, &expansions);
        stats.expanded_targets = targets.len().saturating_sub(plan.direct.len());
        stats.targets = targets.len();
        if targets.is_empty() {
            return Err(AppError::NoTargets);
        }

        report::step(
            4,
            TOTAL_STEPS,
            &format!("Extracting {} target(s)", targets.len()),
        );
        let results = self.sequencer.run(page, &targets).await;
        stats.failures = results.error_count();

        Ok(results)
    }
}

/// Direct targets first, then collection discoveries in discovery order,
/// without duplicates.
pub fn merge_targets(direct: &[TargetUrl], expansions: &[Expansion]) -> Vec<TargetUrl> {
    let mut seen = HashSet::new();
    direct
        .iter()
        .chain(expansions.iter().flat_map(|e| e.targets.iter()))
        .filter(|t| seen.insert(t.as_str().to_string()))
        .cloned()
        .collect()
}

/// Run the contact harvester end to end.
///
/// The browser session is closed on every path once it has been opened.
/// When collections expand to nothing and there are no direct targets the
/// run ends with [`AppError::NoTargets`] and no output file is written; an
/// empty export only happens for a result set built outside this flow.
pub async fn run_harvest(
    config: &Config,
    credential: &Credential,
    request: &HarvestRequest,
) -> Result<HarvestStats> {
    let mut stats = HarvestStats {
        started_at: Some(Utc::now()),
        ..HarvestStats::default()
    };
    report::header("Contact Harvester");

    report::step(1, TOTAL_STEPS, "Classifying inputs");
    let classifier = UrlClassifier::new(&config.harvest.site_origin)?;
    let plan = classifier.plan(&request.inputs);
    for rejected in &plan.rejected {
        log::warn!("Ignoring unrecognized input: {}", rejected);
    }
    stats.direct_inputs = plan.direct.len();
    stats.collection_inputs = plan.collections.len();
    stats.rejected_inputs = plan.rejected.len();
    report::sub_item(&format!(
        "{} profile(s), {} collection(s), {} rejected",
        stats.direct_inputs, stats.collection_inputs, stats.rejected_inputs
    ));
    if plan.is_empty() {
        return Err(AppError::NoTargets);
    }

    let config = Arc::new(config.clone());
    let rules = SelectorRules::compile(&config.rules)?;
    let harvester = Harvester::new(config.clone(), classifier, rules.clone())?;

    report::step(2, TOTAL_STEPS, "Opening browser session");
    let session = Session::open(
        &config.browser,
        credential,
        &rules,
        config.pacing.navigation_timeout(),
    )
    .await?;
    report::sub_item(&format!("Session: {}", session.auth_state()));

    let harvested = harvester.harvest(session.page(), &plan, &mut stats).await;
    session.close().await;
    let results = harvested?;

    report::step(5, TOTAL_STEPS, "Exporting results");
    let storage = LocalStorage::new(&request.output, config.output.locale);
    let meta = storage.write_results(results).await?;

    stats.finished_at = Some(Utc::now());
    report::separator();
    report::summary(
        "Harvest complete",
        &[
            ("Direct inputs", stats.direct_inputs.to_string()),
            ("Collection inputs", stats.collection_inputs.to_string()),
            ("Rejected inputs", stats.rejected_inputs.to_string()),
            ("Discovered targets", stats.expanded_targets.to_string()),
            (
                "Records",
                format!("{} ok, {} errored", meta.records - meta.errors, meta.errors),
            ),
            ("Output", format!("{} ({})", meta.path.display(), meta.format)),
            (
                "Elapsed",
                format!("{}s", stats.elapsed_secs().unwrap_or_default()),
            ),
        ],
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PacingConfig;
    use crate::utils::testing::FakePage;

    const PEOPLE: &str = "https://www.linkedin.com/company/acme/people/";

    fn harvester() -> (Harvester, UrlClassifier) {
        let mut config = Config::default();
        config.pacing = PacingConfig::immediate();
        let config = Arc::new(config);
        let classifier = UrlClassifier::new(&config.harvest.site_origin).unwrap();
        let rules = SelectorRules::compile(&config.rules).unwrap();
        (
            Harvester::new(config, classifier.clone(), rules).unwrap(),
            classifier,
        )
    }

    #[tokio::test]
    async fn test_direct_targets_precede_discoveries() {
        let page = FakePage::new()
            .with_page(
                PEOPLE,
                r#"<a href="/in/bob/">Bob</a><a href="/in/alice">Alice</a><a href="/in/carol">Carol</a>"#,
            )
            .with_page("https://www.linkedin.com/in/alice", "<h1>Alice</h1>")
            .with_page("https://www.linkedin.com/in/bob", "<h1>Bob</h1>")
            .with_page("https://www.linkedin.com/in/carol", "<h1>Carol</h1>");
        let (harvester, classifier) = harvester();
        let plan = classifier.plan(["/in/alice", PEOPLE]);
        let mut stats = HarvestStats::default();

        let results = harvester.harvest(&page, &plan, &mut stats).await.unwrap();

        let names: Vec<_> = results.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(stats.targets, 3);
        assert_eq!(stats.expanded_targets, 2);
        assert_eq!(stats.failures, 0);
    }

    #[tokio::test]
    async fn test_empty_expansion_is_no_targets() {
        let page = FakePage::new().failing(PEOPLE);
        let (harvester, classifier) = harvester();
        let plan = classifier.plan([PEOPLE]);

        let err = harvester
            .harvest(&page, &plan, &mut HarvestStats::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoTargets));
    }

    #[tokio::test]
    async fn test_run_without_valid_inputs_fails_before_launch() {
        let request = HarvestRequest {
            inputs: vec!["#".into(), "https://example.com/about".into()],
            output: PathBuf::from("unused.json"),
        };
        let err = run_harvest(&Config::default(), &Credential::default(), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoTargets));
    }

    #[test]
    fn test_merge_targets_dedupes() {
        let (_, classifier) = harvester();
        let plan = classifier.plan(["/in/a", "/in/b"]);
        let expansion = Expansion {
            collection: classifier.plan([PEOPLE]).collections.remove(0),
            targets: classifier.plan(["/in/b", "/in/c"]).direct,
            rounds: 1,
            outcome: crate::services::ExpansionOutcome::Exhausted,
        };
        let merged = merge_targets(&plan.direct, &[expansion]);
        let urls: Vec<_> = merged.iter().map(TargetUrl::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.linkedin.com/in/a",
                "https://www.linkedin.com/in/b",
                "https://www.linkedin.com/in/c",
            ]
        );
    }
}
