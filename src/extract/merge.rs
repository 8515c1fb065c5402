//! Priority merge of per-source results and run-wide deduplication.

use std::collections::HashSet;

use crate::models::Review;

/// Reviews produced by each source during one visit.
#[derive(Debug, Default)]
pub struct SourceBatches {
    pub api: Vec<Review>,
    pub api_extra: Vec<Review>,
    pub script_payload: Vec<Review>,
    pub structured_markup: Vec<Review>,
    pub dom: Vec<Review>,
}

impl SourceBatches {
    /// Batches in merge priority order.
    pub fn in_priority_order(&self) -> [&[Review]; 5] {
        [
            self.api.as_slice(),
            self.api_extra.as_slice(),
            self.script_payload.as_slice(),
            self.structured_markup.as_slice(),
            self.dom.as_slice(),
        ]
    }

    /// Deduplicated union of all batches.
    pub fn merge(&self) -> Vec<Review> {
        merge(self.in_priority_order())
    }

    /// One-line per-source summary for logging.
    pub fn summary(&self, total: usize) -> String {
        format!(
            "api={} apiExtra={} nextData={} jsonLd={} html={} total={}",
            self.api.len(),
            self.api_extra.len(),
            self.script_payload.len(),
            self.structured_markup.len(),
            self.dom.len(),
            total
        )
    }
}

/// Concatenate `batches` in the given order, keeping the first review per
/// dedup key.
pub fn merge<'a>(batches: impl IntoIterator<Item = &'a [Review]>) -> Vec<Review> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|review| seen.insert(review.dedup_key()))
        .cloned()
        .collect()
}

/// Dedup keys already pushed during the run.
#[derive(Debug, Default)]
pub struct SeenReviews {
    keys: HashSet<String>,
}

impl SeenReviews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep reviews not seen before, at most `limit` of them (`None` =
    /// unlimited). Only admitted reviews are recorded as seen.
    pub fn admit(&mut self, reviews: Vec<Review>, limit: Option<usize>) -> Vec<Review> {
        let limit = limit.unwrap_or(usize::MAX);
        let mut admitted = Vec::new();
        for review in reviews {
            if admitted.len() >= limit {
                break;
            }
            if self.keys.insert(review.dedup_key()) {
                admitted.push(review);
            }
        }
        admitted
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use scraper::Html;
    use url::Url;

    use super::*;
    use crate::extract::normalize::ReviewNormalizer;
    use crate::extract::sources::{DomScanner, extract_structured_markup};
    use crate::models::ReviewSelectors;

    fn review(id: Option<&str>, comment: &str, source: &str) -> Review {
        Review {
            username: "sam".to_string(),
            rating: Some(4),
            comment: comment.to_string(),
            date: "2024-01-01".to_string(),
            item_title: String::new(),
            item_url: String::new(),
            item_image: String::new(),
            review_id: id.map(str::to_string),
            source: source.to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn first_source_wins_on_shared_id() {
        let api = vec![review(Some("1"), "from api", "https://api.example")];
        let dom = vec![review(Some("1"), "from dom", "dom")];
        let merged = merge([api.as_slice(), dom.as_slice()]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].comment, "from api");
    }

    #[test]
    fn merge_is_idempotent() {
        let batch = vec![
            review(Some("1"), "a", "x"),
            review(None, "b", "x"),
            review(None, "b", "y"),
            review(Some("2"), "c", "x"),
        ];
        let once = merge([batch.as_slice()]);
        let twice = merge([once.as_slice()]);

        assert_eq!(once.len(), 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn same_review_in_markup_and_cards_is_kept_once() {
        let html = Html::parse_document(
            r#"<html><head><script type="application/ld+json">
            {"@type": "Product", "review": [{"@type": "Review",
                "author": {"name": "Ivy"}, "reviewBody": "Great",
                "datePublished": "Mar 2, 2024", "reviewRating": {"ratingValue": 5}}]}
            </script></head><body>
            <div data-review-region>
                <p class="wt-text-title-01">Ivy</p>
                <span class="wt-screen-reader-only">5 out of 5 stars</span>
                <p class="wt-text-body-01">Great</p>
                <p class="wt-text-caption wt-text-gray">Mar 2, 2024</p>
            </div></body></html>"#,
        );
        let page_url = Url::parse("https://www.shop.example/listing/1").unwrap();
        let normalizer = ReviewNormalizer::new(&page_url);

        let batches = SourceBatches {
            structured_markup: extract_structured_markup(&html, &normalizer),
            dom: DomScanner::new(&ReviewSelectors::default())
                .unwrap()
                .scan(&html, &page_url),
            ..SourceBatches::default()
        };
        assert_eq!(batches.structured_markup.len(), 1);
        assert_eq!(batches.dom.len(), 1);

        let merged = batches.merge();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, "jsonld");
    }

    #[test]
    fn seen_set_filters_and_caps() {
        let mut seen = SeenReviews::new();
        let first = seen.admit(vec![review(Some("1"), "a", "x"), review(Some("2"), "b", "x")], None);
        assert_eq!(first.len(), 2);

        let batch = vec![
            review(Some("2"), "b", "x"),
            review(Some("3"), "c", "x"),
            review(Some("4"), "d", "x"),
        ];
        let second = seen.admit(batch, Some(1));
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].review_id.as_deref(), Some("3"));

        // "4" was cut by the cap, so it is still admissible later.
        let third = seen.admit(vec![review(Some("3"), "c", "x"), review(Some("4"), "d", "x")], None);
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].review_id.as_deref(), Some("4"));
    }
}
