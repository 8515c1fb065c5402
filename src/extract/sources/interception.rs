//! Reviews carried by background API responses observed during a visit.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::extract::normalize::ReviewNormalizer;
use crate::extract::pagination::discover_from_json;
use crate::extract::scan::scan;
use crate::models::Review;

static REVIEW_HINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)review|reviews|feedback|rating|testimonial").unwrap());

/// A network response captured by the navigation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedResponse {
    pub url: String,
    pub content_type: String,
    pub body: String,
}

/// Whether a response plausibly carries reviews, judged by URL or content type.
pub fn is_likely_review_response(url: &str, content_type: &str) -> bool {
    REVIEW_HINT_RE.is_match(url) || REVIEW_HINT_RE.is_match(content_type)
}

/// Whether the content type's media type is `application/json`.
pub fn is_json_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Visit-scoped collector for intercepted responses.
pub struct ApiCollector<'n> {
    normalizer: &'n ReviewNormalizer,
    seen_urls: HashSet<String>,
    next_seen: HashSet<String>,
    reviews: Vec<Review>,
    next_urls: Vec<String>,
}

impl<'n> ApiCollector<'n> {
    pub fn new(normalizer: &'n ReviewNormalizer) -> Self {
        Self {
            normalizer,
            seen_urls: HashSet::new(),
            next_seen: HashSet::new(),
            reviews: Vec::new(),
            next_urls: Vec::new(),
        }
    }

    /// Feed one response. Each URL is processed at most once per visit.
    pub fn on_response(&mut self, response: &InterceptedResponse) {
        if self.seen_urls.contains(&response.url) {
            return;
        }
        if !is_likely_review_response(&response.url, &response.content_type) {
            return;
        }
        if !is_json_media_type(&response.content_type) {
            return;
        }
        self.seen_urls.insert(response.url.clone());

        let payload: Value = match serde_json::from_str(&response.body) {
            Ok(payload) => payload,
            Err(e) => {
                log::debug!("API response parse failed for {}: {}", response.url, e);
                return;
            }
        };

        let found = scan(&payload);
        self.next_urls
            .extend(discover_from_json(&found, &mut self.next_seen));
        self.reviews
            .extend(self.normalizer.normalize_all(found.candidates, &response.url));
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn next_urls(&self) -> &[String] {
        &self.next_urls
    }

    /// Collected reviews and pagination seeds.
    pub fn into_parts(self) -> (Vec<Review>, Vec<String>) {
        (self.reviews, self.next_urls)
    }
}
