// src/pipeline/inputs.rs

//! Raw input gathering.

use std::path::Path;

use crate::error::Result;

/// Non-blank lines of a URL list, skipping `#` comments.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Read a newline-delimited URL file.
pub async fn load_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok(parse_lines(&content))
}

/// Positional URLs first, then the lines of `file` if given.
pub async fn collect_inputs(urls: &[String], file: Option<&Path>) -> Result<Vec<String>> {
    let mut inputs: Vec<String> = urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(String::from)
        .collect();

    if let Some(path) = file {
        let lines = load_file(path).await?;
        log::info!("Read {} URL(s) from {}", lines.len(), path.display());
        inputs.extend(lines);
    }

    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_lines_skips_blanks_and_comments() {
        let lines = parse_lines(
            "https://site/in/alice\n\n  # a comment\n#\nhttps://site/in/alice?x=1\r\n   \n",
        );
        assert_eq!(lines, vec!["https://site/in/alice", "https://site/in/alice?x=1"]);
    }

    #[tokio::test]
    async fn test_collect_inputs_merges_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("urls.txt");
        tokio::fs::write(&path, "# people\n/in/bob\n").await.unwrap();

        let inputs = collect_inputs(&["/in/alice".to_string(), " ".to_string()], Some(&path))
            .await
            .unwrap();
        assert_eq!(inputs, vec!["/in/alice", "/in/bob"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = collect_inputs(&[], Some(&tmp.path().join("nope.txt"))).await;
        assert!(result.is_err());
    }
}
