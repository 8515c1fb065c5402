// src/extract/mod.rs

//! Review extraction core.
//!
//! Everything here works on one page snapshot plus the responses observed
//! while it loaded: schema-less JSON is scanned for review-shaped objects,
//! normalized into [`Review`](crate::models::Review) records, merged across
//! sources and deduplicated.

pub mod block;
pub mod fields;
pub mod merge;
pub mod normalize;
pub mod pagination;
pub mod scan;
pub mod sources;

pub use block::BlockDetector;
pub use merge::{SeenReviews, SourceBatches, merge};
pub use normalize::ReviewNormalizer;
pub use pagination::{discover_from_json, discover_next_page};
pub use scan::{ScanResult, scan};
