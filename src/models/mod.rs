// src/models/mod.rs

//! Domain models for the review crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod block;
mod config;
mod review;
mod selectors;
mod stats;

// Re-export all public types
pub use block::{BlockDetails, BlockReason, BlockReport, BlockStage};
pub use config::{Config, CrawlerConfig, ExtractionConfig, Input};
pub use review::{ANONYMOUS, Review, ReviewOutput};
pub use selectors::ReviewSelectors;
pub use stats::RunStatistics;
