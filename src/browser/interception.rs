//! Visit-scoped log of intercepted responses.
//!
//! The sink side is handed to the navigation layer and may be fed from its
//! own tasks while the page loads. The log side is drained once, after
//! navigation settles, by the single visit pipeline.

use tokio::sync::mpsc;

use crate::extract::sources::InterceptedResponse;

/// Create a bounded sink/log pair for one visit.
pub fn response_channel(capacity: usize) -> (ResponseSink, ResponseLog) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ResponseSink { tx }, ResponseLog { rx })
}

/// Producer half, owned by the navigation layer for one visit.
#[derive(Debug, Clone)]
pub struct ResponseSink {
    tx: mpsc::Sender<InterceptedResponse>,
}

impl ResponseSink {
    /// Record a response. Never blocks; overflow is dropped.
    pub fn record(&self, response: InterceptedResponse) {
        if let Err(e) = self.tx.try_send(response) {
            match e {
                mpsc::error::TrySendError::Full(r) => {
                    log::debug!("Response log full, dropping {}", r.url)
                }
                mpsc::error::TrySendError::Closed(r) => {
                    log::debug!("Response log closed, dropping {}", r.url)
                }
            }
        }
    }
}

/// Consumer half, owned by the visit pipeline.
#[derive(Debug)]
pub struct ResponseLog {
    rx: mpsc::Receiver<InterceptedResponse>,
}

impl ResponseLog {
    /// Take everything recorded so far and close the log.
    pub fn drain(mut self) -> Vec<InterceptedResponse> {
        self.rx.close();
        let mut responses = Vec::new();
        while let Ok(response) = self.rx.try_recv() {
            responses.push(response);
        }
        responses
    }
}
