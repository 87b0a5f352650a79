// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve a potentially relative href against a base URL.
///
/// Returns `None` when the result is not a valid absolute URL.
///
/// # Examples
/// ```
/// use harvester::utils::url::resolve;
///
/// assert_eq!(
///     resolve("https://www.linkedin.com/company/acme/people/", "/in/alice").as_deref(),
///     Some("https://www.linkedin.com/in/alice")
/// );
/// ```
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Extract the lowercase host of a URL.
///
/// # Examples
/// ```
/// use harvester::utils::url::get_domain;
///
/// assert_eq!(
///     get_domain("https://GitHub.com/alice"),
///     Some("github.com".to_string())
/// );
/// ```
pub fn get_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
}

/// True when `host` equals `domain` or is a subdomain of it.
pub fn host_matches(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.');
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

/// Drop the fragment of a URL string, leaving everything else intact.
pub fn strip_fragment(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.split('#').next().unwrap_or(url).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url() {
        assert_eq!(
            resolve("https://example.com/path/", "https://other.com/page").as_deref(),
            Some("https://other.com/page")
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(
            resolve("https://example.com/path/", "/root.html").as_deref(),
            Some("https://example.com/root.html")
        );
    }

    #[test]
    fn test_resolve_relative_path() {
        assert_eq!(
            resolve("https://example.com/path/index.html", "other.html").as_deref(),
            Some("https://example.com/path/other.html")
        );
    }

    #[test]
    fn test_resolve_keeps_mailto() {
        assert_eq!(
            resolve("https://example.com/", "mailto:a@b.io").as_deref(),
            Some("mailto:a@b.io")
        );
        assert_eq!(resolve("https://example.com/", "   "), None);
        assert_eq!(resolve("not a base", "/x"), None);
    }

    #[test]
    fn test_get_domain() {
        assert_eq!(
            get_domain("https://Example.COM/path"),
            Some("example.com".to_string())
        );
        assert_eq!(get_domain("invalid-url"), None);
    }

    #[test]
    fn test_host_matches_respects_label_boundary() {
        assert!(host_matches("x.com", "x.com"));
        assert!(host_matches("mobile.x.com", "x.com"));
        assert!(!host_matches("fedex.com", "x.com"));
        assert!(!host_matches("com", "x.com"));
    }

    #[test]
    fn test_strip_fragment() {
        assert_eq!(
            strip_fragment("https://example.com/a?b=1#top"),
            "https://example.com/a?b=1"
        );
    }
}
