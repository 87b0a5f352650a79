//! Extraction records and the ordered result set.

use serde::{Deserialize, Serialize};

use crate::utils::sort_dedup;

/// Contact details harvested from one profile page.
///
/// Field order here is the serialization order of the structured export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub url: String,
    pub name: String,
    pub headline: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub links: Vec<String>,
    /// Set instead of aborting the batch when this one target fails.
    #[serde(default)]
    pub error: Option<String>,
}

impl ExtractionRecord {
    /// Create an empty record for a target URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Dedupe and sort every list-valued field.
    pub fn normalize(&mut self) {
        sort_dedup(&mut self.emails);
        sort_dedup(&mut self.phones);
        sort_dedup(&mut self.links);
    }
}

/// Records in processing order, one per unique target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<ExtractionRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; records are never modified after this point except by
    /// [`ResultSet::normalized`].
    pub fn push(&mut self, record: ExtractionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ExtractionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records carrying an error.
    pub fn error_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_error()).count()
    }

    /// Consume the set and return it with every record's lists normalized.
    pub fn normalized(mut self) -> Self {
        for record in &mut self.records {
            record.normalize();
        }
        self
    }
}

impl FromIterator<ExtractionRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = ExtractionRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
