//! Block/challenge diagnostics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a page was classified as an anti-automation challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockReason {
    Captcha,
    Blocked,
    Bot,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockReason::Captcha => "captcha",
            BlockReason::Blocked => "blocked",
            BlockReason::Bot => "bot",
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point in a visit where the block was noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockStage {
    /// First markup snapshot, before any extraction
    Early,
    /// After extraction produced nothing
    PostExtract,
}

/// Identifiers pulled out of a challenge page body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetails {
    pub request_id: Option<String>,
    pub ip: Option<String>,
    pub snippet: Option<String>,
}

/// Diagnostic record persisted as `BLOCKED_<n>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockReport {
    pub stage: BlockStage,
    pub url: String,
    pub reason: BlockReason,
    #[serde(flatten)]
    pub details: BlockDetails,
    pub timestamp: DateTime<Utc>,
}

impl BlockReport {
    pub fn new(stage: BlockStage, url: &str, reason: BlockReason, details: BlockDetails) -> Self {
        Self {
            stage,
            url: url.to_string(),
            reason,
            details,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_flat_camel_case() {
        let report = BlockReport::new(
            BlockStage::PostExtract,
            "https://shop.example",
            BlockReason::Bot,
            BlockDetails {
                request_id: Some("abcd-1234".to_string()),
                ip: None,
                snippet: Some("Unusual traffic".to_string()),
            },
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["stage"], "post-extract");
        assert_eq!(json["reason"], "bot");
        assert_eq!(json["requestId"], "abcd-1234");
        assert!(json["ip"].is_null());
        assert!(json.get("timestamp").is_some());
    }
}
