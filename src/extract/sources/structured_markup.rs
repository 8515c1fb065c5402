//! Reviews inside JSON-LD structured data blocks.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{STRUCTURED_MARKUP_SOURCE, reviews_from_json_text};
use crate::extract::normalize::ReviewNormalizer;
use crate::models::Review;

static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Scan every JSON-LD block independently; a broken block is skipped.
pub fn extract_structured_markup(document: &Html, normalizer: &ReviewNormalizer) -> Vec<Review> {
    document
        .select(&JSON_LD)
        .filter_map(|element| {
            let raw: String = element.text().collect();
            reviews_from_json_text(&raw, STRUCTURED_MARKUP_SOURCE, normalizer)
        })
        .flatten()
        .collect()
}
