//! Utility functions and helpers.

pub mod http;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::{AppError, Result};

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Scheme + host (+ port) of a URL, as a base for root-relative paths.
pub fn origin(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    origin
}

/// Whether a string is an absolute http(s) URL.
pub fn is_absolute_http(value: &str) -> bool {
    let bytes = value.as_bytes();
    let starts_with = |prefix: &str| {
        bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
    };
    starts_with("http://") || starts_with("https://")
}

/// Parse a CSS selector, mapping failures into `AppError::Selector`.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Trimmed text content of an element.
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match of `selector` under `element`.
pub fn select_text(element: &ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve_url(&base, "page.html"),
            "https://example.com/path/page.html"
        );
        assert_eq!(
            resolve_url(&base, "/root.html"),
            "https://example.com/root.html"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_origin() {
        let url = Url::parse("https://www.shop.example:8443/listing/1?ref=a#reviews").unwrap();
        assert_eq!(origin(&url).as_str(), "https://www.shop.example:8443/");
    }

    #[test]
    fn test_is_absolute_http() {
        assert!(is_absolute_http("https://x/y?page=2"));
        assert!(is_absolute_http("HTTP://X"));
        assert!(!is_absolute_http("/listing/1"));
        assert!(!is_absolute_http("ftp://x"));
    }

    #[test]
    fn test_parse_selector() {
        assert!(parse_selector("div.class").is_ok());
        assert!(parse_selector("[[invalid").is_err());
    }
}
