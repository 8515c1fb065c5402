//! Conversion of raw review candidates into canonical [`Review`] records.

use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::extract::fields::{Field, field_text, resolve, resolve_field, value_text};
use crate::models::{ANONYMOUS, Review};
use crate::utils::{origin, resolve_url};

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").unwrap());

/// Numbers above this are epoch milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;
/// Numbers above this (and not milliseconds) are epoch seconds.
const EPOCH_SECONDS_THRESHOLD: f64 = 1e9;

/// Builds canonical reviews from schema-less candidates found on one site.
#[derive(Debug, Clone)]
pub struct ReviewNormalizer {
    origin: Url,
}

impl ReviewNormalizer {
    /// Create a normalizer for pages under `page_url`'s origin.
    pub fn new(page_url: &Url) -> Self {
        Self {
            origin: origin(page_url),
        }
    }

    /// Normalize one candidate. Returns `None` for non-objects and for
    /// candidates with neither comment nor rating.
    pub fn normalize(&self, raw: &Value, source: &str) -> Option<Review> {
        if !raw.is_object() {
            return None;
        }

        let user = resolve_field(raw, Field::User);
        let listing = resolve_field(raw, Field::Listing);

        let rating = resolve_field(raw, Field::Rating).and_then(parse_rating);
        let comment = resolve_field(raw, Field::Comment)
            .map(value_text)
            .unwrap_or_default();

        if !Review::has_content(&comment, rating) {
            return None;
        }

        let username = field_text(raw, user, Field::Username);
        let date = resolve_field(raw, Field::Date)
            .map(parse_date)
            .unwrap_or_default();

        let mut item_url = field_text(raw, listing, Field::ItemUrl);
        if item_url.starts_with('/') {
            item_url = resolve_url(&self.origin, &item_url);
        }

        let review_id = resolve_field(raw, Field::ReviewId)
            .map(value_text)
            .filter(|id| !id.is_empty());

        Some(Review {
            username: if username.is_empty() {
                ANONYMOUS.to_string()
            } else {
                username
            },
            rating,
            comment,
            date,
            item_title: field_text(raw, listing, Field::ItemTitle),
            item_url,
            item_image: field_text(raw, listing, Field::ItemImage),
            review_id,
            source: if source.is_empty() {
                "unknown".to_string()
            } else {
                source.to_string()
            },
            scraped_at: Utc::now(),
        })
    }

    /// Normalize every candidate, dropping rejects.
    pub fn normalize_all<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a Value>,
        source: &str,
    ) -> Vec<Review> {
        candidates
            .into_iter()
            .filter_map(|candidate| self.normalize(candidate, source))
            .collect()
    }
}

/// Parse a rating into `1..=5`.
///
/// Accepts numbers, strings with an embedded number (`"4.9 stars"`), and
/// rating objects (`{"ratingValue": "5"}`). Out-of-range values are
/// discarded, never clamped.
pub fn parse_rating(value: &Value) -> Option<u8> {
    match value {
        Value::Object(_) => resolve(value, Field::Rating.nested_candidates())
            .filter(|inner| !inner.is_object())
            .and_then(parse_rating),
        _ => rating_number(value).and_then(bounded_rating),
    }
}

fn rating_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => NUMBER_RE
            .captures(s)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok()),
        _ => None,
    }
}

fn bounded_rating(value: f64) -> Option<u8> {
    (value.is_finite() && (1.0..=5.0).contains(&value)).then(|| value.round() as u8)
}

/// Normalize a date value.
///
/// Epoch numbers become ISO-8601 (milliseconds above 1e12, seconds above
/// 1e9); date objects are unwrapped once; everything else is trimmed text.
pub fn parse_date(value: &Value) -> String {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(epoch_to_iso)
            .unwrap_or_else(|| n.to_string()),
        Value::Object(_) => resolve(value, Field::Date.nested_candidates())
            .filter(|inner| !inner.is_object())
            .map(parse_date)
            .unwrap_or_default(),
        _ => value_text(value),
    }
}

fn epoch_to_iso(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value > EPOCH_MILLIS_THRESHOLD {
        value
    } else if value > EPOCH_SECONDS_THRESHOLD {
        value * 1000.0
    } else {
        return None;
    };
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn normalizer() -> ReviewNormalizer {
        ReviewNormalizer::new(&Url::parse("https://www.shop.example/listing/1#reviews").unwrap())
    }

    #[test]
    fn rating_examples() {
        assert_eq!(parse_rating(&json!(0)), None);
        assert_eq!(parse_rating(&json!(6)), None);
        assert_eq!(parse_rating(&json!("bad")), None);
        assert_eq!(parse_rating(&json!("4.9")), Some(5));
    }

    #[test]
    fn rating_forms() {
        assert_eq!(parse_rating(&json!(4)), Some(4));
        assert_eq!(parse_rating(&json!(2.4)), Some(2));
        assert_eq!(parse_rating(&json!("3 out of 5 stars")), Some(3));
        assert_eq!(parse_rating(&json!({"ratingValue": "5"})), Some(5));
        assert_eq!(parse_rating(&json!(true)), None);
        assert_eq!(parse_rating(&Value::Null), None);
    }

    #[test]
    fn rating_never_leaves_range() {
        for raw in [
            json!(-1),
            json!(0.4),
            json!(5.01),
            json!(1e9),
            json!("10"),
            json!("0.5"),
            json!({"ratingValue": 9}),
        ] {
            assert_eq!(parse_rating(&raw), None, "{raw}");
        }
        for raw in [json!(1), json!(4.5), json!("5"), json!(1.0)] {
            let rating = parse_rating(&raw).unwrap();
            assert!((1..=5).contains(&rating));
        }
    }

    #[test]
    fn date_epochs() {
        assert_eq!(parse_date(&json!(1_700_000_000)), "2023-11-14T22:13:20.000Z");
        assert_eq!(
            parse_date(&json!(1_700_000_000_123_i64)),
            "2023-11-14T22:13:20.123Z"
        );
        assert_eq!(parse_date(&json!(20240101)), "20240101");
    }

    #[test]
    fn date_objects_and_text() {
        assert_eq!(
            parse_date(&json!({"seconds": 1_700_000_000})),
            "2023-11-14T22:13:20.000Z"
        );
        assert_eq!(parse_date(&json!("  Mar 2, 2024 ")), "Mar 2, 2024");
        assert_eq!(parse_date(&json!({"other": 1})), "");
    }

    #[test]
    fn rejects_candidates_without_content() {
        let n = normalizer();
        assert!(n.normalize(&json!({"username": "x", "date": "today"}), "t").is_none());
        assert!(n.normalize(&json!({"comment": "  ", "rating": 9}), "t").is_none());
        assert!(n.normalize(&json!([1, 2]), "t").is_none());
    }

    #[test]
    fn normalizes_api_shaped_review() {
        let raw = json!({
            "review_id": 12345,
            "user": {"display_name": "Kim"},
            "rating": 5,
            "review_text": "Arrived fast",
            "created_at": 1_700_000_000,
            "listing": {
                "title": "Blue Mug",
                "url": "/listing/99/blue-mug",
                "image_url": "https://img.example/1.jpg"
            }
        });
        let review = normalizer().normalize(&raw, "https://api.example/reviews").unwrap();

        assert_eq!(review.username, "Kim");
        assert_eq!(review.rating, Some(5));
        assert_eq!(review.comment, "Arrived fast");
        assert_eq!(review.date, "2023-11-14T22:13:20.000Z");
        assert_eq!(review.item_title, "Blue Mug");
        assert_eq!(review.item_url, "https://www.shop.example/listing/99/blue-mug");
        assert_eq!(review.item_image, "https://img.example/1.jpg");
        assert_eq!(review.review_id.as_deref(), Some("12345"));
        assert_eq!(review.source, "https://api.example/reviews");
    }

    #[test]
    fn normalizes_structured_markup_review() {
        let raw = json!({
            "@type": "Review",
            "author": {"@type": "Person", "name": "Lee"},
            "datePublished": "2024-02-01",
            "reviewBody": "Nice",
            "reviewRating": {"@type": "Rating", "ratingValue": "4"}
        });
        let review = normalizer().normalize(&raw, "jsonld").unwrap();

        assert_eq!(review.username, "Lee");
        assert_eq!(review.rating, Some(4));
        assert_eq!(review.comment, "Nice");
        assert_eq!(review.date, "2024-02-01");
        assert_eq!(review.review_id, None);
    }

    #[test]
    fn defaults_username_and_keeps_rating_only_reviews() {
        let review = normalizer().normalize(&json!({"stars": "3"}), "").unwrap();
        assert_eq!(review.username, ANONYMOUS);
        assert_eq!(review.comment, "");
        assert_eq!(review.rating, Some(3));
        assert_eq!(review.source, "unknown");
    }

    #[test]
    fn absolute_item_urls_are_untouched() {
        let raw = json!({"comment": "ok", "item_url": "https://cdn.example/x"});
        let review = normalizer().normalize(&raw, "t").unwrap();
        assert_eq!(review.item_url, "https://cdn.example/x");
    }
}
