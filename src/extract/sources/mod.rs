//! The five independent review sources a page can expose.
//!
//! Listed in merge priority order:
//! - API interception (`ApiCollector`)
//! - API pagination crawl (`crawl_api_pages`)
//! - Embedded script payload (`extract_script_payload`)
//! - Structured markup (`extract_structured_markup`)
//! - DOM scan (`DomScanner`)

mod api_crawl;
mod dom;
mod interception;
mod script_payload;
mod structured_markup;

pub use api_crawl::crawl_api_pages;
pub use dom::DomScanner;
pub use interception::{
    ApiCollector, InterceptedResponse, is_json_media_type, is_likely_review_response,
};
pub use script_payload::extract_script_payload;
pub use structured_markup::extract_structured_markup;

use crate::extract::normalize::ReviewNormalizer;
use crate::extract::scan::scan;
use crate::models::Review;

/// Tag of the embedded script payload source.
pub const SCRIPT_PAYLOAD_SOURCE: &str = "next_data";
/// Tag of the structured markup source.
pub const STRUCTURED_MARKUP_SOURCE: &str = "jsonld";
/// Tag of the DOM scan source.
pub const DOM_SOURCE: &str = "dom";

/// Parse a JSON text block and pull every review out of it.
///
/// Malformed JSON yields `None`; the caller decides how to log it.
fn reviews_from_json_text(
    raw: &str,
    source: &str,
    normalizer: &ReviewNormalizer,
) -> Option<Vec<Review>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Vec::new());
    }
    match serde_json::from_str(raw) {
        Ok(payload) => Some(normalizer.normalize_all(scan(&payload).candidates, source)),
        Err(e) => {
            log::debug!("{source} payload parse failed: {e}");
            None
        }
    }
}
