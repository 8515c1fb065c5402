//! Reviews inside the page's embedded hydration payload.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::{SCRIPT_PAYLOAD_SOURCE, reviews_from_json_text};
use crate::extract::normalize::ReviewNormalizer;
use crate::models::Review;

static NEXT_DATA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#__NEXT_DATA__").unwrap());

/// Scan the `#__NEXT_DATA__` block. Absent or malformed yields nothing.
pub fn extract_script_payload(document: &Html, normalizer: &ReviewNormalizer) -> Vec<Review> {
    let Some(element) = document.select(&NEXT_DATA).next() else {
        return Vec::new();
    };
    let raw: String = element.text().collect();
    reviews_from_json_text(&raw, SCRIPT_PAYLOAD_SOURCE, normalizer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    fn normalizer() -> ReviewNormalizer {
        ReviewNormalizer::new(&Url::parse("https://shop.example/").unwrap())
    }

    #[test]
    fn reads_next_data_block() {
        let html = Html::parse_document(
            r#"<html><body><script id="__NEXT_DATA__" type="application/json">
            {"props": {"pageProps": {"reviews": [
                {"reviewId": "a1", "rating": 4, "text": "Solid"},
                {"reviewId": "a2", "rating": 0, "text": ""}
            ]}}}
            </script></body></html>"#,
        );
        let reviews = extract_script_payload(&html, &normalizer());

        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].comment, "Solid");
        assert_eq!(reviews[0].source, "next_data");
    }

    #[test]
    fn absent_or_malformed_block_is_empty() {
        let n = normalizer();
        let none = Html::parse_document("<html><body><p>hi</p></body></html>");
        assert!(extract_script_payload(&none, &n).is_empty());

        let broken = Html::parse_document(
            r#"<html><body><script id="__NEXT_DATA__">{"props": </script></body></html>"#,
        );
        assert!(extract_script_payload(&broken, &n).is_empty());
    }
}
