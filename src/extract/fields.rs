//! Field resolution over schema-less JSON objects.
//!
//! Upstream payloads rename fields between API versions and page templates,
//! so every canonical review field is looked up through an ordered list of
//! candidate keys. The lists are ordered by how often each name shows up in
//! real payloads, most common first.

use std::collections::HashMap;

use serde_json::Value;

/// Canonical fields resolved from raw candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Username,
    Rating,
    Comment,
    Date,
    ItemTitle,
    ItemUrl,
    ItemImage,
    ReviewId,
    /// Nested reviewer object (`user`, `author`, ...)
    User,
    /// Nested reviewed-item object (`listing`, `product`, ...)
    Listing,
}

impl Field {
    /// Candidate keys on the review object itself.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Field::Username => &[
                "user_name",
                "username",
                "reviewer",
                "reviewer_name",
                "buyer_name",
                "author",
                "name",
            ],
            Field::Rating => &[
                "rating",
                "stars",
                "star_rating",
                "review_rating",
                "reviewRating",
                "rating_value",
                "score",
            ],
            Field::Comment => &[
                "review",
                "review_text",
                "reviewText",
                "comment",
                "feedback",
                "message",
                "text",
                "body",
                "content",
                "reviewBody",
            ],
            Field::Date => &[
                "date",
                "created_at",
                "createdAt",
                "created",
                "review_date",
                "timestamp",
                "time",
                "datePublished",
            ],
            Field::ItemTitle => &["listing_title", "item_title", "title", "product_title"],
            Field::ItemUrl => &["listing_url", "item_url", "url", "link"],
            Field::ItemImage => &[
                "listing_image",
                "item_image",
                "image_url",
                "image",
                "img",
                "imageUrl",
            ],
            Field::ReviewId => &["review_id", "reviewId", "id", "transaction_id", "transactionId"],
            Field::User => &["user", "buyer", "reviewer", "author", "member", "profile"],
            Field::Listing => &["listing", "item", "product"],
        }
    }

    /// Candidate keys on the nested object the field falls back to:
    /// the reviewer object for names, the listing object for item fields,
    /// and the value object for structured ratings and dates.
    pub fn nested_candidates(self) -> &'static [&'static str] {
        match self {
            Field::Username => &["name", "username", "login", "user_name", "display_name"],
            Field::Rating => &["ratingValue", "value", "rating"],
            Field::Date => &["$date", "date", "timestamp", "seconds", "iso"],
            Field::ItemTitle => &["title", "name", "listing_title"],
            Field::ItemUrl => &["url", "link", "listing_url"],
            Field::ItemImage => &["image", "image_url", "imageUrl"],
            Field::Comment | Field::ReviewId | Field::User | Field::Listing => &[],
        }
    }
}

/// Return the first candidate key present on `object`.
///
/// Exact keys are tried in order first, then the same list again ignoring
/// ASCII case. Non-objects resolve to `None`.
pub fn resolve<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let map = object.as_object()?;

    if let Some(value) = keys.iter().find_map(|key| map.get(*key)) {
        return Some(value);
    }

    let lower: HashMap<String, &str> = map
        .keys()
        .map(|k| (k.to_ascii_lowercase(), k.as_str()))
        .collect();

    keys.iter()
        .filter_map(|key| lower.get(&key.to_ascii_lowercase()))
        .find_map(|actual| map.get(*actual))
}

/// Resolve a canonical field on `object`.
pub fn resolve_field(object: &Value, field: Field) -> Option<&Value> {
    resolve(object, field.candidates())
}

/// Scalar value as trimmed text. Composites and null become empty.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Text of the first of `field` on `object`, falling back to the nested
/// candidates on `nested` when the direct value is empty.
pub fn field_text(object: &Value, nested: Option<&Value>, field: Field) -> String {
    let direct = resolve_field(object, field).map(value_text).unwrap_or_default();
    if !direct.is_empty() {
        return direct;
    }
    nested
        .and_then(|obj| resolve(obj, field.nested_candidates()))
        .map(value_text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ALL: [Field; 10] = [
        Field::Username,
        Field::Rating,
        Field::Comment,
        Field::Date,
        Field::ItemTitle,
        Field::ItemUrl,
        Field::ItemImage,
        Field::ReviewId,
        Field::User,
        Field::Listing,
    ];

    #[test]
    fn tables_have_no_duplicate_keys() {
        for field in ALL {
            let mut seen = std::collections::HashSet::new();
            for key in field.candidates() {
                assert!(
                    seen.insert(key.to_ascii_lowercase()),
                    "{field:?} repeats {key}"
                );
            }
            assert!(!field.candidates().is_empty());
        }
    }

    #[test]
    fn rating_table_order() {
        assert_eq!(
            Field::Rating.candidates(),
            &[
                "rating",
                "stars",
                "star_rating",
                "review_rating",
                "reviewRating",
                "rating_value",
                "score"
            ]
        );
    }

    #[test]
    fn comment_prefers_review_over_comment() {
        let obj = json!({"comment": "second", "review": "first"});
        assert_eq!(resolve_field(&obj, Field::Comment), Some(&json!("first")));
    }

    #[test]
    fn exact_match_wins_over_case_insensitive() {
        let obj = json!({"Rating": 2, "stars": 4});
        assert_eq!(resolve_field(&obj, Field::Rating), Some(&json!(4)));
    }

    #[test]
    fn falls_back_to_case_insensitive() {
        let obj = json!({"USER_NAME": "Ann"});
        assert_eq!(resolve_field(&obj, Field::Username), Some(&json!("Ann")));
    }

    #[test]
    fn null_counts_as_present() {
        let obj = json!({"rating": null, "stars": 3});
        assert_eq!(resolve_field(&obj, Field::Rating), Some(&Value::Null));
    }

    #[test]
    fn non_objects_resolve_to_none() {
        assert!(resolve(&json!([1, 2]), &["rating"]).is_none());
        assert!(resolve(&json!("rating"), &["rating"]).is_none());
        assert!(resolve(&json!({"other": 1}), &["rating"]).is_none());
    }

    #[test]
    fn field_text_uses_nested_object() {
        let raw = json!({"author": {"name": "Bo"}, "rating": 5});
        let user = resolve_field(&raw, Field::User);
        assert_eq!(field_text(&raw, user, Field::Username), "Bo");
    }

    #[test]
    fn value_text_renders_scalars() {
        assert_eq!(value_text(&json!("  hi ")), "hi");
        assert_eq!(value_text(&json!(42)), "42");
        assert_eq!(value_text(&json!({"a": 1})), "");
        assert_eq!(value_text(&Value::Null), "");
    }
}
