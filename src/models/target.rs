//! Classified input URLs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An absolute profile URL, canonicalized to `{origin}/in/{slug}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetUrl(String);

impl TargetUrl {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which kind of listing a collection URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// `/company/{slug}/people`
    CompanyPeople,
    /// `/school/{slug}/people`
    SchoolPeople,
    /// `/search/results/people`
    PeopleSearch,
}

/// An absolute URL of a page listing many profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionUrl {
    url: String,
    kind: CollectionKind,
}

impl CollectionUrl {
    pub(crate) fn new(url: impl Into<String>, kind: CollectionKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }
}

impl fmt::Display for CollectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Result of classifying one raw input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    DirectTarget(TargetUrl),
    Collection(CollectionUrl),
    Rejected,
}

impl Classified {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Classified::Rejected)
    }
}

/// Inputs split by classification, each list deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetPlan {
    pub direct: Vec<TargetUrl>,
    pub collections: Vec<CollectionUrl>,
    pub rejected: Vec<String>,
}

impl TargetPlan {
    /// True when neither direct targets nor collections survived classification.
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.collections.is_empty()
    }
}
