//! Follow-up crawl over pagination links discovered in API payloads.

use std::collections::{HashSet, VecDeque};

use serde_json::Value;

use crate::browser::ApiFetcher;
use crate::extract::normalize::ReviewNormalizer;
use crate::extract::pagination::discover_from_json;
use crate::extract::scan::scan;
use crate::models::Review;

/// Breadth-first fetch of pagination URLs, starting from `seeds`.
///
/// Stops when the queue empties, when `limit` reviews are collected
/// (`0` = unlimited) or after `max_pages` distinct URLs were fetched. A URL
/// that fails or answers a non-success status is skipped.
pub async fn crawl_api_pages(
    fetcher: &dyn ApiFetcher,
    normalizer: &ReviewNormalizer,
    seeds: &[String],
    limit: usize,
    max_pages: usize,
) -> Vec<Review> {
    let mut results = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    for seed in seeds {
        if visited.insert(seed.clone()) {
            queue.push_back(seed.clone());
        }
    }

    let mut fetched = 0;
    while fetched < max_pages && (limit == 0 || results.len() < limit) {
        let Some(url) = queue.pop_front() else {
            break;
        };
        fetched += 1;

        let response = match fetcher.get(&url).await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("API pagination fetch failed for {url}: {e}");
                continue;
            }
        };
        if !response.is_success() {
            log::debug!("API pagination fetch for {url} answered {}", response.status);
            continue;
        }

        let payload: Value = match serde_json::from_str(&response.body) {
            Ok(payload) => payload,
            Err(e) => {
                log::debug!("API pagination payload parse failed for {url}: {e}");
                continue;
            }
        };

        let found = scan(&payload);
        queue.extend(discover_from_json(&found, &mut visited));
        results.extend(normalizer.normalize_all(found.candidates, &url));
    }

    if limit > 0 {
        results.truncate(limit);
    }
    log::debug!("API pagination crawl fetched {fetched} page(s), {} review(s)", results.len());
    results
}
