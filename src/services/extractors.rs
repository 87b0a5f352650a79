//! Text extractors.
//!
//! Pure functions over page text: emails, phone numbers, and contact links.

use regex::Regex;
use url::Url;

use crate::error::Result;
use crate::models::ExtractionRules;
use crate::services::classifier::profile_slug;
use crate::utils::sort_dedup;
use crate::utils::url::host_matches;

const EMAIL_PATTERN: &str = r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}";

// Groups are joined by one space, dot or hyphen. Line breaks always end a
// candidate.
const PHONE_PATTERN: &str = r"\+?(?:\([0-9]{1,4}\)[ .-]?)?[0-9]+(?:[ .-][0-9]+)*";

const WHATSAPP_PATTERN: &str =
    r#"(?i)(?:https?://)?(?:wa\.me/[^\s"'<>]+|api\.whatsapp\.com/send\?[^\s"'<>]+)"#;

const MIN_PHONE_DIGITS: usize = 9;
const MAX_PHONE_DIGITS: usize = 15;

/// Map Arabic-Indic (U+0660..U+0669) and Eastern Arabic-Indic
/// (U+06F0..U+06F9) digits to ASCII. Every other character is kept as is.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => shift_digit(c, '\u{0660}'),
            '\u{06F0}'..='\u{06F9}' => shift_digit(c, '\u{06F0}'),
            _ => c,
        })
        .collect()
}

fn shift_digit(c: char, zero: char) -> char {
    char::from_digit(c as u32 - zero as u32, 10).unwrap_or(c)
}

/// Regex-backed extractors plus the social/portfolio keyword list.
#[derive(Debug, Clone)]
pub struct TextExtractor {
    email: Regex,
    phone: Regex,
    whatsapp: Regex,
    link_keywords: Vec<String>,
    strict_hosts: bool,
}

impl TextExtractor {
    pub fn new(rules: &ExtractionRules) -> Result<Self> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
            whatsapp: Regex::new(WHATSAPP_PATTERN)?,
            strict_hosts: rules.strict_link_hosts,
            link_keywords: rules
                .link_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        })
    }

    /// Email addresses, lowercased, deduped and sorted.
    pub fn emails(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = self
            .email
            .find_iter(text)
            .map(|m| m.as_str().trim_matches('.').to_lowercase())
            .collect();
        sort_dedup(&mut found);
        found
    }

    /// Phone numbers after digit normalization, deduped and sorted.
    pub fn phones(&self, text: &str) -> Vec<String> {
        let text = normalize_digits(text);
        let mut found: Vec<String> = self
            .phone
            .find_iter(&text)
            .filter(|m| standalone(&text, m.start(), m.end()))
            .flat_map(|m| split_numbers(m.as_str()))
            .collect();
        sort_dedup(&mut found);
        found
    }

    /// WhatsApp chat links found anywhere in `text`, as absolute URLs.
    pub fn whatsapp_links(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = self
            .whatsapp
            .find_iter(text)
            .map(|m| {
                let link = m.as_str().trim_end_matches(['.', ',', ')', ';']);
                if link.to_lowercase().starts_with("http") {
                    link.to_string()
                } else {
                    format!("https://{link}")
                }
            })
            .collect();
        sort_dedup(&mut found);
        found
    }

    /// True for mail/telephone links, profile links, and links to a
    /// recognized social or portfolio site.
    pub fn is_contact_link(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        match parsed.scheme() {
            "mailto" | "tel" => return true,
            "http" | "https" => {}
            _ => return false,
        }
        if profile_slug(&parsed).is_some() {
            return true;
        }

        let lowered = url.to_lowercase();
        if !self.strict_hosts {
            return self
                .link_keywords
                .iter()
                .any(|keyword| lowered.contains(keyword.as_str()));
        }

        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        self.link_keywords.iter().any(|keyword| {
            if keyword.contains('/') {
                lowered.contains(keyword.as_str())
            } else {
                host_matches(&host, keyword)
            }
        })
    }
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

/// Split one space-joined digit run into phone numbers.
///
/// A group that is already long enough stands alone. Shorter groups are
/// joined until the next one would overflow, or a `+`/`(` group starts a
/// new number. Only results with 9 to 15 digits are kept.
fn split_numbers(candidate: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_digits = 0;

    let mut flush = |current: &mut Vec<&str>, digits: &mut usize| {
        if (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&*digits) {
            numbers.push(current.join(" "));
        }
        current.clear();
        *digits = 0;
    };

    for group in candidate.split(' ').filter(|g| !g.is_empty()) {
        let digits = digit_count(group);
        if digits >= MIN_PHONE_DIGITS {
            flush(&mut current, &mut current_digits);
            current.push(group);
            current_digits = digits;
            flush(&mut current, &mut current_digits);
            continue;
        }
        let starts_number = group.starts_with(['+', '(']);
        if !current.is_empty() && (starts_number || current_digits + digits > MAX_PHONE_DIGITS) {
            flush(&mut current, &mut current_digits);
        }
        current.push(group);
        current_digits += digits;
    }
    flush(&mut current, &mut current_digits);

    numbers
}

/// A phone match must stand alone: not glued to a word, a longer digit run,
/// or the path of a URL.
fn standalone(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start].chars().next_back().is_none_or(|c| {
        c.is_whitespace() || matches!(c, '(' | '[' | ':' | ',' | ';' | '"' | '\'' | '>' | '|')
    });
    let after_ok = text[end..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_alphanumeric() && c != '/');
    before_ok && after_ok
}
