// src/browser/http.rs

//! Plain-HTTP page driver.
//!
//! Loads pages with a cookie-keeping `reqwest` client. It runs no scripts,
//! so it never observes background API traffic and cannot render
//! screenshots; the embedded payload, structured markup and DOM sources
//! still work on the served markup.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::browser::{ApiFetcher, ApiResponse, PageDriver, ResponseSink};
use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::utils::http::{create_async_client, fetch_text};

/// Follow-up API requests over the driver's current session.
#[derive(Debug, Clone)]
pub struct HttpApiFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

#[async_trait]
impl ApiFetcher for HttpApiFetcher {
    async fn get(&self, url: &str) -> Result<ApiResponse> {
        let (status, body) = fetch_text(&self.client, url, Some(self.timeout)).await?;
        Ok(ApiResponse { status, body })
    }
}

/// Page driver backed by plain HTTP requests.
pub struct HttpPageDriver {
    config: CrawlerConfig,
    proxies: Vec<String>,
    proxy_index: usize,
    api: HttpApiFetcher,
    html: Option<String>,
}

impl HttpPageDriver {
    /// Create a driver. `proxy_configuration` is the opaque run input value;
    /// its `proxyUrls` list, when present, is rotated on session retirement.
    pub fn new(config: &CrawlerConfig, proxy_configuration: Option<&Value>) -> Result<Self> {
        let proxies = proxy_urls(proxy_configuration);
        let client = create_async_client(config, proxies.first().map(String::as_str))?;

        Ok(Self {
            config: config.clone(),
            proxies,
            proxy_index: 0,
            api: HttpApiFetcher {
                client,
                timeout: Duration::from_secs(config.api_timeout_secs),
            },
            html: None,
        })
    }

    fn current_proxy(&self) -> Option<&str> {
        if self.proxies.is_empty() {
            None
        } else {
            Some(&self.proxies[self.proxy_index % self.proxies.len()])
        }
    }
}

#[async_trait]
impl PageDriver for HttpPageDriver {
    async fn navigate(&mut self, url: &str, _responses: ResponseSink) -> Result<()> {
        let (status, html) = fetch_text(&self.api.client, url, None)
            .await
            .map_err(|e| AppError::navigation(url, e))?;

        if status >= 500 {
            return Err(AppError::navigation(url, format!("HTTP status {status}")));
        }
        if status >= 400 {
            log::warn!("Page {url} answered HTTP {status}");
        }

        self.html = Some(html);
        Ok(())
    }

    fn detach_interception(&mut self) {}

    async fn content(&self) -> Result<String> {
        self.html
            .clone()
            .ok_or_else(|| AppError::crawl("content", "no page loaded"))
    }

    async fn screenshot(&self) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn api(&self) -> &dyn ApiFetcher {
        &self.api
    }

    fn retire_session(&mut self) {
        if !self.proxies.is_empty() {
            self.proxy_index = (self.proxy_index + 1) % self.proxies.len();
        }
        match create_async_client(&self.config, self.current_proxy()) {
            Ok(client) => {
                self.api.client = client;
                self.html = None;
                log::info!("Session retired");
            }
            Err(e) => log::error!("Failed to start a fresh session: {e}"),
        }
    }
}

/// Proxy URLs listed in an opaque proxy configuration.
fn proxy_urls(proxy_configuration: Option<&Value>) -> Vec<String> {
    proxy_configuration
        .and_then(|cfg| cfg.get("proxyUrls"))
        .and_then(Value::as_array)
        .map(|urls| {
            urls.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
