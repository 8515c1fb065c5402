// src/lib.rs

//! Review Crawler Library
//!
//! Extracts product reviews from every channel a listing page exposes
//! (background API traffic, embedded payloads, structured data and rendered
//! markup) and reconciles them into one deduplicated dataset.

pub mod browser;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod utils;
