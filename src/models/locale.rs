//! Export header labeling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Language used for tabular export headers. Never affects extracted data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputLocale {
    /// English headers
    Primary,
    /// Arabic headers
    Secondary,
    /// "English / Arabic" combined headers
    #[default]
    Both,
}

/// Tabular column, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Url,
    Name,
    Headline,
    Emails,
    Phones,
    Links,
    Error,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Url,
        Column::Name,
        Column::Headline,
        Column::Emails,
        Column::Phones,
        Column::Links,
        Column::Error,
    ];

    fn primary(self) -> &'static str {
        match self {
            Column::Url => "Profile URL",
            Column::Name => "Name",
            Column::Headline => "Headline",
            Column::Emails => "Emails",
            Column::Phones => "Phones",
            Column::Links => "Links",
            Column::Error => "Error",
        }
    }

    fn secondary(self) -> &'static str {
        match self {
            Column::Url => "رابط الملف الشخصي",
            Column::Name => "الاسم",
            Column::Headline => "المسمى الوظيفي",
            Column::Emails => "البريد الإلكتروني",
            Column::Phones => "أرقام الهاتف",
            Column::Links => "الروابط",
            Column::Error => "الخطأ",
        }
    }

    /// Header label for this column under a locale.
    pub fn label(self, locale: OutputLocale) -> String {
        match locale {
            OutputLocale::Primary => self.primary().to_string(),
            OutputLocale::Secondary => self.secondary().to_string(),
            OutputLocale::Both => format!("{} / {}", self.primary(), self.secondary()),
        }
    }
}

impl OutputLocale {
    /// Header row for a tabular export.
    pub fn headers(self) -> Vec<String> {
        Column::ALL.iter().map(|c| c.label(self)).collect()
    }
}

impl fmt::Display for OutputLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputLocale::Primary => "primary",
            OutputLocale::Secondary => "secondary",
            OutputLocale::Both => "both",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputLocale {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primary" | "en" => Ok(OutputLocale::Primary),
            "secondary" | "ar" => Ok(OutputLocale::Secondary),
            "both" => Ok(OutputLocale::Both),
            other => Err(AppError::config(format!("Unknown output locale '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_label() {
        assert_eq!(Column::Name.label(OutputLocale::Both), "Name / الاسم");
    }

    #[test]
    fn test_headers_cover_every_column() {
        for locale in [OutputLocale::Primary, OutputLocale::Secondary, OutputLocale::Both] {
            assert_eq!(locale.headers().len(), Column::ALL.len());
        }
        assert_eq!(OutputLocale::Primary.headers()[0], "Profile URL");
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!("BOTH".parse::<OutputLocale>().unwrap(), OutputLocale::Both);
        assert_eq!("ar".parse::<OutputLocale>().unwrap(), OutputLocale::Secondary);
        assert!("fr".parse::<OutputLocale>().is_err());
    }
}
