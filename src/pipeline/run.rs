// src/pipeline/run.rs

//! Review crawling pipeline.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::browser::PageDriver;
use crate::error::Result;
use crate::models::{Config, Input, RunStatistics};
use crate::pipeline::visit::{RunState, Visitor};
use crate::storage::DatasetStorage;

/// Key of the run summary in the key-value store.
pub const STATISTICS_KEY: &str = "statistics";

/// A queued page visit.
#[derive(Debug, Clone)]
struct QueuedPage {
    url: String,
    retries: u32,
}

/// Run the review crawler from the input's start URL.
///
/// Pages are visited one at a time in FIFO order. A retryable failure puts
/// the page back on the queue until `maxRequestRetries` is exhausted; other
/// failures abort the run.
pub async fn run_crawler(
    config: &Config,
    input: &Input,
    driver: &mut dyn PageDriver,
    storage: &dyn DatasetStorage,
) -> Result<RunStatistics> {
    let start_url = input.normalized_start_url()?;
    let started = Instant::now();

    log::info!(
        "Starting review crawl: startUrl={} results_wanted={} debug={} maxRequestRetries={}",
        start_url,
        input.results_wanted,
        input.debug,
        input.max_request_retries
    );

    let visitor = Visitor::new(config, input, storage)?;
    let mut state = RunState::default();
    let mut enqueued: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<QueuedPage> = VecDeque::new();

    enqueued.insert(start_url.clone());
    queue.push_back(QueuedPage {
        url: start_url,
        retries: 0,
    });

    let delay = Duration::from_millis(config.crawler.request_delay_ms);
    let mut first = true;

    while let Some(page) = queue.pop_front() {
        if input.goal_reached(state.saved) {
            break;
        }
        if !first && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        first = false;

        match visitor.visit(driver, &page.url, &mut state).await {
            Ok(outcome) => {
                if let Some(next) = outcome.next_page {
                    if enqueued.insert(next.clone()) {
                        queue.push_back(QueuedPage {
                            url: next,
                            retries: 0,
                        });
                    }
                }
            }
            Err(e) if e.is_retryable() && page.retries < input.max_request_retries => {
                log::warn!(
                    "Error processing {} ({}), retrying ({}/{})",
                    page.url,
                    e,
                    page.retries + 1,
                    input.max_request_retries
                );
                queue.push_back(QueuedPage {
                    url: page.url,
                    retries: page.retries + 1,
                });
            }
            Err(e) if e.is_retryable() => {
                log::error!("Request {} failed: {}", page.url, e);
                driver.retire_session();
            }
            Err(e) => {
                log::error!("Error processing {}: {}", page.url, e);
                return Err(e);
            }
        }
    }

    let stats = RunStatistics::new(state.saved, state.pages_processed, started.elapsed());
    storage
        .set_json(STATISTICS_KEY, &serde_json::to_value(&stats)?)
        .await?;

    log::info!(
        "Scraping completed! totalReviewsScraped={} pagesProcessed={} duration={}",
        stats.total_reviews_scraped,
        stats.pages_processed,
        stats.duration
    );

    Ok(stats)
}
