//! Storage abstractions for the export artifact.
//!
//! A run writes exactly one file. Its extension picks the format:
//!
//! ```text
//! contacts.csv   -> Tabular: BOM + header row + one row per record
//! contacts.json  -> Structured: pretty JSON array of records
//! ```

pub mod local;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{OutputLocale, ResultSet};

// Re-export for convenience
pub use local::LocalStorage;

/// Byte-order mark that makes spreadsheet tools read the file as UTF-8.
const UTF8_BOM: &str = "\u{FEFF}";

/// Separator used when a list field is flattened into one cell.
pub const LIST_DELIMITER: &str = "; ";

/// Serialization mode of the export artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Structured,
    Tabular,
}

impl ExportFormat {
    /// `.csv` (any case) selects tabular output, anything else structured.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Tabular,
            _ => Self::Structured,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => f.write_str("json"),
            Self::Tabular => f.write_str("csv"),
        }
    }
}

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    pub path: PathBuf,
    pub format: ExportFormat,
    /// Number of records written
    pub records: usize,
    /// Records carrying an error
    pub errors: usize,
    pub bytes: usize,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for export backends.
#[async_trait]
pub trait ResultStorage: Send + Sync {
    /// Normalize and write the whole result set.
    async fn write_results(&self, results: ResultSet) -> Result<WriteMetadata>;
}

/// Pretty JSON array, record fields in declaration order.
pub fn encode_json(results: &ResultSet) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(results)?)
}

/// UTF-8 CSV with a BOM, headers labelled per `locale`, list fields joined
/// with [`LIST_DELIMITER`].
pub fn encode_csv(results: &ResultSet, locale: OutputLocale) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.as_bytes().to_vec());
    writer.write_record(locale.headers())?;

    for record in results.records() {
        let emails = record.emails.join(LIST_DELIMITER);
        let phones = record.phones.join(LIST_DELIMITER);
        let links = record.links.join(LIST_DELIMITER);
        writer.write_record([
            record.url.as_str(),
            record.name.as_str(),
            record.headline.as_str(),
            emails.as_str(),
            phones.as_str(),
            links.as_str(),
            record.error.as_deref().unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Io(e.into_error()))
}
