//! Local filesystem storage implementation.
//!
//! Writes the export next to its final path first and renames it into place,
//! so a crashed run never leaves a half-written artifact behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{OutputLocale, ResultSet};
use crate::storage::{ExportFormat, ResultStorage, WriteMetadata, encode_csv, encode_json};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
    locale: OutputLocale,
}

impl LocalStorage {
    /// Create a LocalStorage writing to `path`; `locale` only affects CSV headers.
    pub fn new(path: impl Into<PathBuf>, locale: OutputLocale) -> Self {
        Self {
            path: path.into(),
            locale,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ExportFormat {
        ExportFormat::from_path(&self.path)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ResultStorage for LocalStorage {
    async fn write_results(&self, results: ResultSet) -> Result<WriteMetadata> {
        let results = results.normalized();
        let format = self.format();

        let bytes = match format {
            ExportFormat::Structured => encode_json(&results)?,
            ExportFormat::Tabular => encode_csv(&results, self.locale)?,
        };
        self.write_bytes(&bytes).await?;

        log::info!(
            "Wrote {} record(s) to {} ({})",
            results.len(),
            self.path.display(),
            format
        );

        Ok(WriteMetadata {
            path: self.path.clone(),
            format,
            records: results.len(),
            errors: results.error_count(),
            bytes: bytes.len(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractionRecord;
    use tempfile::TempDir;

    fn sample() -> ResultSet {
        let mut ok = ExtractionRecord::new("https://www.linkedin.com/in/alice");
        ok.name = "Alice".into();
        ok.emails = vec!["b@x.io".into(), "a@x.io".into(), "b@x.io".into()];
        let mut failed = ExtractionRecord::new("https://www.linkedin.com/in/bob");
        failed.error = Some("timed out".into());
        [ok, failed].into_iter().collect()
    }

    #[tokio::test]
    async fn test_json_export_is_normalized() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("contacts.json");
        let storage = LocalStorage::new(&path, OutputLocale::Both);

        let meta = storage.write_results(sample()).await.unwrap();
        assert_eq!(meta.format, ExportFormat::Structured);
        assert_eq!(meta.records, 2);
        assert_eq!(meta.errors, 1);

        let loaded: ResultSet =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        assert_eq!(loaded.records()[0].emails, vec!["a@x.io", "b@x.io"]);
        assert_eq!(loaded.records()[1].error.as_deref(), Some("timed out"));
        assert!(!tmp.path().join("out").join("contacts.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_csv_export_has_bom_and_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("contacts.CSV");
        let storage = LocalStorage::new(&path, OutputLocale::Primary);

        let meta = storage.write_results(sample()).await.unwrap();
        assert_eq!(meta.format, ExportFormat::Tabular);

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(text.starts_with('\u{FEFF}'));
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("a@x.io; b@x.io"));
    }

    #[tokio::test]
    async fn test_empty_results_still_write_a_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.json");
        let storage = LocalStorage::new(&path, OutputLocale::Both);

        let meta = storage.write_results(ResultSet::new()).await.unwrap();
        assert_eq!(meta.records, 0);
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "[]");
    }
}
