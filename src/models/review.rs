//! Review data structures.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Username used when a source carries no reviewer name.
pub const ANONYMOUS: &str = "Anonymous";

/// A canonical review, as produced by any extractor.
///
/// Valid iff `comment` is non-empty or `rating` is present; extractors never
/// construct one otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    /// Reviewer display name
    pub username: String,

    /// Star rating in `1..=5`
    pub rating: Option<u8>,

    /// Review text
    pub comment: String,

    /// ISO-8601 timestamp when the source was an epoch, else trimmed source text
    pub date: String,

    /// Title of the reviewed item
    pub item_title: String,

    /// Absolute URL of the reviewed item
    pub item_url: String,

    /// Image of the reviewed item
    pub item_image: String,

    /// Source-side identifier, preferred as dedup identity
    pub review_id: Option<String>,

    /// Channel that produced this record (response URL or extractor tag)
    pub source: String,

    /// Capture time
    pub scraped_at: DateTime<Utc>,
}

impl Review {
    /// Identity used for deduplication within a visit and across the run.
    pub fn dedup_key(&self) -> String {
        match &self.review_id {
            Some(id) => format!("id:{id}"),
            None => format!(
                "sig:{}-{}-{}-{}",
                self.username, self.comment, self.date, self.item_title
            ),
        }
    }

    /// Whether the record carries usable content.
    pub fn has_content(comment: &str, rating: Option<u8>) -> bool {
        !comment.is_empty() || rating.is_some()
    }
}

/// A review as pushed to the dataset.
///
/// Internal fields (`review_id`, `source`) are stripped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewOutput {
    pub username: String,
    pub rating: Option<u8>,
    pub comment: String,
    pub date: String,
    pub item_title: String,
    pub item_url: String,
    pub item_image: String,
    #[serde(rename = "scrapedAt")]
    pub scraped_at: String,
}

impl From<&Review> for ReviewOutput {
    fn from(review: &Review) -> Self {
        Self {
            username: review.username.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            date: review.date.clone(),
            item_title: review.item_title.clone(),
            item_url: review.item_url.clone(),
            item_image: review.item_image.clone(),
            scraped_at: review
                .scraped_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
