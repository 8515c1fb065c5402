// src/pipeline/visit.rs

//! One page visit: load, check for a challenge, run every source, merge and
//! persist.

use scraper::Html;
use url::Url;

use crate::browser::{PageDriver, response_channel};
use crate::error::{AppError, Result};
use crate::extract::sources::{
    ApiCollector, DomScanner, crawl_api_pages, extract_script_payload, extract_structured_markup,
};
use crate::extract::{
    BlockDetector, ReviewNormalizer, SeenReviews, SourceBatches, discover_next_page,
};
use crate::models::{BlockReason, BlockReport, BlockStage, Config, Input, Review, ReviewOutput};
use crate::storage::{DatasetStorage, HTML_CONTENT_TYPE, PNG_CONTENT_TYPE};

/// State carried across visits for the whole run.
#[derive(Debug, Default)]
pub struct RunState {
    /// Dedup keys of every review pushed so far
    pub seen: SeenReviews,
    /// Reviews pushed to the dataset
    pub saved: usize,
    /// Visits started, retries included
    pub pages_processed: usize,
}

/// Result of a completed visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitOutcome {
    /// Reviews pushed by this visit
    pub saved: usize,
    /// Next review page to enqueue, if the goal is not yet met
    pub next_page: Option<String>,
}

/// Markup-derived results of one snapshot.
struct MarkupHarvest {
    script_payload: Vec<Review>,
    structured_markup: Vec<Review>,
    dom: Vec<Review>,
    next_page: Option<String>,
}

/// Runs page visits against a driver and a storage backend.
pub struct Visitor<'a> {
    config: &'a Config,
    input: &'a Input,
    storage: &'a dyn DatasetStorage,
    detector: BlockDetector,
    dom: DomScanner,
}

impl<'a> Visitor<'a> {
    pub fn new(
        config: &'a Config,
        input: &'a Input,
        storage: &'a dyn DatasetStorage,
    ) -> Result<Self> {
        Ok(Self {
            config,
            input,
            storage,
            detector: BlockDetector::new(config.extraction.snippet_length),
            dom: DomScanner::new(&config.extraction.selectors)?,
        })
    }

    /// Visit `url`.
    ///
    /// A challenge page is recorded, the session retired, and the visit
    /// fails with [`AppError::Blocked`] so the caller may retry it.
    pub async fn visit(
        &self,
        driver: &mut dyn PageDriver,
        url: &str,
        state: &mut RunState,
    ) -> Result<VisitOutcome> {
        state.pages_processed += 1;
        let n = state.pages_processed;
        log::info!("Processing page {n}: {url}");

        let page_url = Url::parse(url)?;
        let (sink, responses) = response_channel(self.config.crawler.interception_capacity);
        driver.navigate(url, sink).await?;

        let early_html = driver.content().await?;
        if let Some(reason) = self.detector.classify(&early_html) {
            driver.detach_interception();
            if self.input.debug {
                self.save_snapshots(driver, &format!("DEBUG_{n}_early"), &early_html)
                    .await?;
            }
            return Err(self
                .record_block(driver, BlockStage::Early, n, url, reason, &early_html)
                .await);
        }

        if let Err(e) = driver.reveal_reviews().await {
            log::warn!("Could not reveal reviews section, proceeding with current state: {e}");
        }

        driver.detach_interception();
        let intercepted = responses.drain();
        let html = driver.content().await?;

        let normalizer = ReviewNormalizer::new(&page_url);

        let mut collector = ApiCollector::new(&normalizer);
        for response in &intercepted {
            collector.on_response(response);
        }
        let (api, next_urls) = collector.into_parts();

        let markup = self.harvest_markup(&html, &page_url, &normalizer);

        let remaining = self
            .input
            .remaining(state.saved)
            .map(|left| left.saturating_sub(api.len()));
        let api_extra = if !next_urls.is_empty() && remaining != Some(0) {
            crawl_api_pages(
                driver.api(),
                &normalizer,
                &next_urls,
                remaining.unwrap_or(0),
                self.config.crawler.max_api_pages,
            )
            .await
        } else {
            Vec::new()
        };

        let batches = SourceBatches {
            api,
            api_extra,
            script_payload: markup.script_payload,
            structured_markup: markup.structured_markup,
            dom: markup.dom,
        };
        let merged = batches.merge();
        log::info!("Review extraction summary: {}", batches.summary(merged.len()));

        if merged.is_empty() {
            let reason = self.detector.classify(&html);
            match reason {
                Some(reason) => log::warn!("No reviews extracted from this page. Reason: {reason}"),
                None => log::warn!("No reviews extracted from this page."),
            }
            if self.input.debug {
                self.save_snapshots(driver, &format!("DEBUG_{n}"), &html).await?;
            }
            if let Some(reason) = reason {
                return Err(self
                    .record_block(driver, BlockStage::PostExtract, n, url, reason, &html)
                    .await);
            }
        }

        let fresh = state.seen.admit(merged, self.input.remaining(state.saved));
        if !fresh.is_empty() {
            let outputs: Vec<ReviewOutput> = fresh.iter().map(ReviewOutput::from).collect();
            self.storage.push_reviews(&outputs).await?;
            state.saved += outputs.len();
            log::info!("Saved {} new reviews. Total: {}", outputs.len(), state.saved);
        }

        if self.input.goal_reached(state.saved) {
            log::info!("Reached goal: {} reviews.", self.input.results_wanted);
            return Ok(VisitOutcome {
                saved: fresh.len(),
                next_page: None,
            });
        }

        match &markup.next_page {
            Some(next) => log::info!("Enqueuing next page: {next}"),
            None => log::info!("No more pages to process."),
        }

        Ok(VisitOutcome {
            saved: fresh.len(),
            next_page: markup.next_page,
        })
    }

    /// Every markup-based source plus next-page discovery over one snapshot.
    fn harvest_markup(
        &self,
        html: &str,
        page_url: &Url,
        normalizer: &ReviewNormalizer,
    ) -> MarkupHarvest {
        let document = Html::parse_document(html);
        MarkupHarvest {
            script_payload: extract_script_payload(&document, normalizer),
            structured_markup: extract_structured_markup(&document, normalizer),
            dom: self.dom.scan(&document, page_url),
            next_page: discover_next_page(&document, page_url),
        }
    }

    /// Persist a block report, retire the session and build the visit error.
    async fn record_block(
        &self,
        driver: &mut dyn PageDriver,
        stage: BlockStage,
        n: usize,
        url: &str,
        reason: BlockReason,
        markup: &str,
    ) -> AppError {
        let report = BlockReport::new(stage, url, reason, self.detector.extract_details(markup));
        let key = format!("BLOCKED_{n}.json");
        let stored = match serde_json::to_value(&report) {
            Ok(value) => self.storage.set_json(&key, &value).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = stored {
            log::error!("Failed to store {key}: {e}");
        }

        driver.retire_session();
        log::warn!("Blocked ({reason}) at {url}");
        AppError::blocked(reason, url)
    }

    /// Store a screenshot (when the driver renders one) and the markup.
    async fn save_snapshots(&self, driver: &dyn PageDriver, base: &str, html: &str) -> Result<()> {
        if let Some(png) = driver.screenshot().await? {
            self.storage
                .set_value(&format!("{base}.png"), &png, PNG_CONTENT_TYPE)
                .await?;
        }
        self.storage
            .set_value(&format!("{base}.html"), html.as_bytes(), HTML_CONTENT_TYPE)
            .await
    }
}
