//! Interfaces to the navigation layer.
//!
//! Page loading, scrolling, clicking, fingerprinting and proxy/session
//! rotation belong to a [`PageDriver`]. The extraction core only asks it for
//! markup snapshots, intercepted responses and follow-up API requests.

mod http;
mod interception;

use async_trait::async_trait;

use crate::error::Result;

pub use http::HttpPageDriver;
pub use interception::{ResponseLog, ResponseSink, response_channel};

/// A follow-up API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request layer used for follow-up API calls, sharing the page's session.
#[async_trait]
pub trait ApiFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<ApiResponse>;
}

/// A browser-like page the visit pipeline drives.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load `url`. Responses observed from now until
    /// [`detach_interception`](Self::detach_interception) go to `responses`.
    async fn navigate(&mut self, url: &str, responses: ResponseSink) -> Result<()>;

    /// Bring the reviews section into view (tabs, links, scrolling).
    async fn reveal_reviews(&mut self) -> Result<()> {
        Ok(())
    }

    /// Stop forwarding intercepted responses.
    fn detach_interception(&mut self);

    /// Current rendered markup.
    async fn content(&self) -> Result<String>;

    /// Full-page screenshot, when the driver can render one.
    async fn screenshot(&self) -> Result<Option<Vec<u8>>>;

    /// Request layer bound to the current session.
    fn api(&self) -> &dyn ApiFetcher;

    /// Drop the current session/identity after a block.
    fn retire_session(&mut self);
}
