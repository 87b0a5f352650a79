//! JSON-LD contact data.
//!
//! Reads `<script type="application/ld+json">` blocks. Objects, top-level
//! arrays and `@graph` arrays are all walked; blocks that fail to parse are
//! skipped.

use scraper::Html;
use serde_json::Value;

use crate::error::Result;
use crate::services::selectors::parse_selector;

const JSONLD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// Contact fields found in structured data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonLdContacts {
    /// Name of the first `Person` node
    pub name: Option<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    /// `sameAs` URLs, unfiltered
    pub links: Vec<String>,
}

impl JsonLdContacts {
    pub fn from_document(document: &Html) -> Result<Self> {
        let selector = parse_selector(JSONLD_SELECTOR)?;
        let mut contacts = Self::default();

        for script in document.select(&selector) {
            let content = script.text().collect::<String>();
            let trimmed = content.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(json) => contacts.visit(&json),
                Err(e) => log::debug!("Skipping invalid JSON-LD block: {}", e),
            }
        }

        Ok(contacts)
    }

    fn visit(&mut self, value: &Value) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| self.visit(item)),
            Value::Object(obj) => {
                if let Some(Value::Array(graph)) = obj.get("@graph") {
                    graph.iter().for_each(|item| self.visit(item));
                }
                self.collect_node(value);
            }
            _ => {}
        }
    }

    fn collect_node(&mut self, node: &Value) {
        if self.name.is_none() && is_person(node) {
            self.name = node
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from);
        }

        push_strings(&mut self.emails, node.get("email"), Some("mailto:"));
        push_strings(&mut self.phones, node.get("telephone"), Some("tel:"));
        push_strings(&mut self.links, node.get("sameAs"), None);

        match node.get("contactPoint") {
            Some(Value::Array(points)) => points.iter().for_each(|p| self.collect_point(p)),
            Some(point @ Value::Object(_)) => self.collect_point(point),
            _ => {}
        }
    }

    fn collect_point(&mut self, point: &Value) {
        push_strings(&mut self.emails, point.get("email"), Some("mailto:"));
        push_strings(&mut self.phones, point.get("telephone"), Some("tel:"));
    }
}

fn is_person(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == "Person",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Person")),
        _ => false,
    }
}

/// Append a string or array-of-strings field, stripping a URI scheme prefix.
fn push_strings(out: &mut Vec<String>, value: Option<&Value>, strip: Option<&str>) {
    let mut push = |s: &str| {
        let s = s.trim();
        let s = strip.and_then(|p| s.strip_prefix(p)).unwrap_or(s).trim();
        if !s.is_empty() {
            out.push(s.to_string());
        }
    };
    match value {
        Some(Value::String(s)) => push(s.as_str()),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).for_each(push),
        _ => {}
    }
}
