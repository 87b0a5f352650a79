//! URL classification service.
//!
//! Sorts raw input strings into profile targets, people collections, or
//! rejects, and canonicalizes them so duplicates collapse.

use std::collections::HashSet;

use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Classified, CollectionKind, CollectionUrl, TargetPlan, TargetUrl};

/// Path segment that introduces a profile slug.
const PROFILE_SEGMENT: &str = "in";

/// Classifies URLs relative to a canonical site origin.
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    origin: Url,
}

impl UrlClassifier {
    /// Create a classifier whose relative inputs resolve against `origin`.
    pub fn new(origin: &str) -> Result<Self> {
        let origin = Url::parse(origin)?;
        if origin.host_str().is_none() {
            return Err(AppError::config(format!("site origin '{origin}' has no host")));
        }
        Ok(Self { origin })
    }

    /// Classify one raw string. Total: never fails, never panics.
    pub fn classify(&self, raw: &str) -> Classified {
        let Some(url) = self.absolutize(raw) else {
            return Classified::Rejected;
        };

        if let Some(slug) = profile_slug(&url) {
            return Classified::DirectTarget(TargetUrl::new(format!(
                "{}/{}/{}",
                url.origin().ascii_serialization(),
                PROFILE_SEGMENT,
                slug
            )));
        }

        if let Some(kind) = collection_kind(&url) {
            return Classified::Collection(CollectionUrl::new(canonical_collection(&url, kind), kind));
        }

        Classified::Rejected
    }

    /// Classify a batch and collapse duplicates, keeping first-seen order.
    pub fn plan<I, S>(&self, inputs: I) -> TargetPlan
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut plan = TargetPlan::default();
        let mut seen: HashSet<String> = HashSet::new();

        for raw in inputs {
            let raw = raw.as_ref();
            match self.classify(raw) {
                Classified::DirectTarget(target) => {
                    if seen.insert(target.as_str().to_string()) {
                        plan.direct.push(target);
                    }
                }
                Classified::Collection(collection) => {
                    if seen.insert(collection.as_str().to_string()) {
                        plan.collections.push(collection);
                    }
                }
                Classified::Rejected => {
                    let trimmed = raw.trim();
                    if !trimmed.is_empty() {
                        plan.rejected.push(trimmed.to_string());
                    }
                }
            }
        }

        plan
    }

    /// Resolve a raw string to an absolute http(s) URL.
    fn absolutize(&self, raw: &str) -> Option<Url> {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            return None;
        }

        let parsed = if raw.starts_with("//") {
            Url::parse(&format!("{}:{}", self.origin.scheme(), raw)).ok()?
        } else if raw.starts_with('/') {
            self.origin.join(raw).ok()?
        } else if raw.contains("://") {
            Url::parse(raw).ok()?
        } else {
            let first = raw.split(['/', '?', '#']).next().unwrap_or_default();
            if first.contains('.') {
                Url::parse(&format!("https://{raw}")).ok()?
            } else {
                self.origin.join(&format!("/{raw}")).ok()?
            }
        };

        match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => Some(parsed),
            _ => None,
        }
    }
}

fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default()
}

/// Slug following the first `/in/` segment, if any.
pub(crate) fn profile_slug(url: &Url) -> Option<String> {
    let segs = segments(url);
    let idx = segs.iter().position(|s| *s == PROFILE_SEGMENT)?;
    segs.get(idx + 1).map(|slug| slug.to_string())
}

fn collection_kind(url: &Url) -> Option<CollectionKind> {
    match segments(url).as_slice() {
        ["company", _, "people", ..] => Some(CollectionKind::CompanyPeople),
        ["school", _, "people", ..] => Some(CollectionKind::SchoolPeople),
        ["search", "results", "people", ..] => Some(CollectionKind::PeopleSearch),
        _ => None,
    }
}

fn canonical_collection(url: &Url, kind: CollectionKind) -> String {
    let origin = url.origin().ascii_serialization();
    let segs = segments(url);
    match kind {
        CollectionKind::CompanyPeople | CollectionKind::SchoolPeople => {
            format!("{}/{}/{}/people/", origin, segs[0], segs[1])
        }
        CollectionKind::PeopleSearch => match url.query() {
            Some(query) if !query.is_empty() => {
                format!("{origin}/search/results/people/?{query}")
            }
            _ => format!("{origin}/search/results/people/"),
        },
    }
}
