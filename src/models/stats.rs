//! Run statistics.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Summary persisted under the `statistics` key at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub total_reviews_scraped: usize,
    pub pages_processed: usize,
    /// Wall time, e.g. `"42 seconds"`
    pub duration: String,
}

impl RunStatistics {
    pub fn new(total_reviews_scraped: usize, pages_processed: usize, elapsed: Duration) -> Self {
        Self {
            total_reviews_scraped,
            pages_processed,
            duration: format!("{} seconds", elapsed.as_secs_f64().round() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_rounded_seconds() {
        let stats = RunStatistics::new(12, 2, Duration::from_millis(41_600));
        assert_eq!(stats.duration, "42 seconds");

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalReviewsScraped"], 12);
        assert_eq!(json["pagesProcessed"], 2);
    }
}
