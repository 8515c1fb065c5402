//! Classification of anti-automation challenge pages.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use unicode_segmentation::UnicodeSegmentation;

use crate::models::{BlockDetails, BlockReason};

/// Phrase sets, checked in order; the first set with a hit decides.
const PHRASES: [(BlockReason, &[&str]); 3] = [
    (BlockReason::Captcha, &["captcha", "verify"]),
    (
        BlockReason::Blocked,
        &["access blocked", "access denied", "forbidden"],
    ),
    (
        BlockReason::Bot,
        &["unusual activity", "unusual traffic", "robot"],
    ),
];

static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

static REQUEST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bID:\s*([a-z0-9-]{8,})\b").unwrap());

static IP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bIP\s*([0-9]{1,3}(?:\.[0-9]{1,3}){3})\b").unwrap()
});

/// Detects challenge pages and pulls diagnostics out of them.
#[derive(Debug, Clone)]
pub struct BlockDetector {
    snippet_length: usize,
}

impl BlockDetector {
    pub fn new(snippet_length: usize) -> Self {
        Self { snippet_length }
    }

    /// Case-insensitive phrase match over the raw markup.
    pub fn classify(&self, markup: &str) -> Option<BlockReason> {
        let text = markup.to_lowercase();
        PHRASES
            .iter()
            .find(|(_, phrases)| phrases.iter().any(|p| text.contains(p)))
            .map(|(reason, _)| *reason)
    }

    /// Request id, IPv4 address and a leading snippet of the visible body
    /// text. Fields that cannot be found stay `None`.
    pub fn extract_details(&self, markup: &str) -> BlockDetails {
        let document = Html::parse_document(markup);
        let text = document
            .select(&BODY)
            .next()
            .map(|body| collapse_whitespace(body.text()))
            .unwrap_or_default();

        if text.is_empty() {
            return BlockDetails::default();
        }

        let capture = |re: &Regex| {
            re.captures(&text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        };

        BlockDetails {
            request_id: capture(&REQUEST_ID_RE),
            ip: capture(&IP_RE),
            snippet: Some(text.graphemes(true).take(self.snippet_length).collect()),
        }
    }
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> BlockDetector {
        BlockDetector::new(800)
    }

    #[test]
    fn classification_order() {
        let d = detector();
        assert_eq!(
            d.classify("<p>Please verify you are human</p>"),
            Some(BlockReason::Captcha)
        );
        assert_eq!(
            d.classify("<h1>Access Denied</h1><p>robot</p>"),
            Some(BlockReason::Blocked)
        );
        assert_eq!(
            d.classify("<p>We noticed UNUSUAL TRAFFIC</p>"),
            Some(BlockReason::Bot)
        );
        assert_eq!(
            d.classify("<p>CAPTCHA</p><p>forbidden</p>"),
            Some(BlockReason::Captcha)
        );
        assert_eq!(d.classify("<p>Great mug, five stars</p>"), None);
    }

    #[test]
    fn extracts_identifiers() {
        let markup = r#"<html><body>
            <h1>Access blocked</h1>
            <p>ID:  9f3a-12bc-77de</p>
            <p>IP 203.0.113.42</p>
        </body></html>"#;
        let details = detector().extract_details(markup);

        assert_eq!(details.request_id.as_deref(), Some("9f3a-12bc-77de"));
        assert_eq!(details.ip.as_deref(), Some("203.0.113.42"));
        assert_eq!(
            details.snippet.as_deref(),
            Some("Access blocked ID: 9f3a-12bc-77de IP 203.0.113.42")
        );
    }

    #[test]
    fn short_ids_are_ignored() {
        let details = detector().extract_details("<body><p>ID: abc</p></body>");
        assert_eq!(details.request_id, None);
        assert_eq!(details.ip, None);
    }

    #[test]
    fn snippet_is_truncated() {
        let body = "é".repeat(2000);
        let details = BlockDetector::new(10).extract_details(&format!("<body>{body}</body>"));
        assert_eq!(details.snippet.map(|s| s.chars().count()), Some(10));
    }

    #[test]
    fn empty_body_gives_empty_details() {
        assert_eq!(detector().extract_details(""), BlockDetails::default());
    }
}
