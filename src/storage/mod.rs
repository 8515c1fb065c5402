//! Storage abstractions for run output.
//!
//! A run writes two kinds of data:
//! - the dataset, one review per record, appended as reviews are saved
//! - named artifacts in a key-value store (block reports, debug snapshots,
//!   run statistics)
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── dataset.jsonl             # One ReviewOutput per line
//! └── key_value_store/
//!     ├── BLOCKED_3.json        # BlockReport
//!     ├── DEBUG_3_early.png     # Debug screenshot
//!     ├── DEBUG_3_early.html    # Debug markup snapshot
//!     └── statistics.json       # RunStatistics
//! ```

pub mod local;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::ReviewOutput;

pub use local::LocalStorage;

/// Content type of JSON artifacts.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Content type of markup snapshots.
pub const HTML_CONTENT_TYPE: &str = "text/html";
/// Content type of screenshots.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Trait for run output backends.
#[async_trait]
pub trait DatasetStorage: Send + Sync {
    /// Append reviews to the dataset.
    async fn push_reviews(&self, reviews: &[ReviewOutput]) -> Result<()>;

    /// Store a named artifact.
    async fn set_value(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    /// Load every review pushed so far.
    async fn load_reviews(&self) -> Result<Vec<ReviewOutput>>;

    /// Store a named JSON artifact.
    async fn set_json(&self, key: &str, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.set_value(key, &bytes, JSON_CONTENT_TYPE).await
    }
}
