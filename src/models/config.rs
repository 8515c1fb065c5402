//! Application configuration and run input structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ReviewSelectors;
use crate::utils::parse_selector;

/// Root crawler configuration, loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.api_timeout_secs == 0 {
            return Err(AppError::validation("crawler.api_timeout_secs must be > 0"));
        }
        if self.crawler.max_api_pages == 0 {
            return Err(AppError::validation("crawler.max_api_pages must be > 0"));
        }
        if self.crawler.interception_capacity == 0 {
            return Err(AppError::validation(
                "crawler.interception_capacity must be > 0",
            ));
        }
        if self.extraction.selectors.container_tiers.is_empty() {
            return Err(AppError::validation(
                "extraction.selectors.container_tiers is empty",
            ));
        }
        for selector in self.extraction.selectors.all() {
            parse_selector(selector)?;
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Page navigation timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Timeout for follow-up API requests in seconds
    #[serde(default = "defaults::api_timeout")]
    pub api_timeout_secs: u64,

    /// Delay between page visits in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Ceiling on distinct URLs visited by the API pagination crawl
    #[serde(default = "defaults::max_api_pages")]
    pub max_api_pages: usize,

    /// Bound of the visit-scoped intercepted response log
    #[serde(default = "defaults::interception_capacity")]
    pub interception_capacity: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            api_timeout_secs: defaults::api_timeout(),
            request_delay_ms: defaults::request_delay(),
            max_api_pages: defaults::max_api_pages(),
            interception_capacity: defaults::interception_capacity(),
        }
    }
}

/// Review extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Characters of challenge-page text kept in block reports
    #[serde(default = "defaults::snippet_length")]
    pub snippet_length: usize,

    /// DOM scan selectors
    #[serde(default)]
    pub selectors: ReviewSelectors,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            snippet_length: defaults::snippet_length(),
            selectors: ReviewSelectors::default(),
        }
    }
}

/// Options for one run, loaded from `INPUT.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    /// Listing page to start from
    #[serde(rename = "startUrl", default)]
    pub start_url: Option<String>,

    /// Number of reviews to collect, 0 = unlimited
    #[serde(default = "defaults::results_wanted")]
    pub results_wanted: usize,

    /// Persist screenshots and markup snapshots
    #[serde(default)]
    pub debug: bool,

    /// Retries per page visit
    #[serde(rename = "maxRequestRetries", default = "defaults::max_request_retries")]
    pub max_request_retries: u32,

    /// Passed through untouched to the navigation layer
    #[serde(
        rename = "proxyConfiguration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub proxy_configuration: Option<serde_json::Value>,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            start_url: None,
            results_wanted: defaults::results_wanted(),
            debug: false,
            max_request_retries: defaults::max_request_retries(),
            proxy_configuration: None,
        }
    }
}

impl Input {
    /// Load run input from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check that the run can start. A missing start URL is fatal.
    pub fn validate(&self) -> Result<Url> {
        let raw = self
            .start_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::config("Missing \"startUrl\" in input."))?;

        let url = Url::parse(raw)
            .map_err(|e| AppError::config(format!("startUrl is not a valid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "startUrl must be an http(s) URL, got {raw}"
            )));
        }
        Ok(url)
    }

    /// Start URL pointed at the reviews section.
    pub fn normalized_start_url(&self) -> Result<String> {
        let url = self.validate()?;
        let raw = url.as_str();
        if raw.contains("#reviews") {
            return Ok(raw.to_string());
        }
        let mut url = url;
        url.set_fragment(Some("reviews"));
        Ok(url.to_string())
    }

    /// Remaining goal given how many reviews are already saved.
    /// `None` means unlimited.
    pub fn remaining(&self, saved: usize) -> Option<usize> {
        (self.results_wanted > 0).then(|| self.results_wanted.saturating_sub(saved))
    }

    /// Whether the goal has been reached.
    pub fn goal_reached(&self, saved: usize) -> bool {
        self.remaining(saved) == Some(0)
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0".into()
    }
    pub fn timeout() -> u64 {
        120
    }
    pub fn api_timeout() -> u64 {
        60
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn max_api_pages() -> usize {
        20
    }
    pub fn interception_capacity() -> usize {
        256
    }

    // Extraction defaults
    pub fn snippet_length() -> usize {
        800
    }

    // Input defaults
    pub fn results_wanted() -> usize {
        20
    }
    pub fn max_request_retries() -> u32 {
        3
    }
}
