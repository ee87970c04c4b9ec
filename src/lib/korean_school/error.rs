use std::time::Duration;

use thiserror::Error;

/// Failures of the upstream scrapers and decoders.
///
/// A school, teacher or grid entry that simply does not exist is not an error:
/// lookups return `Option::None` for that.
#[derive(Debug, Error)]
pub enum SchoolError {
    /// Transport-level failure talking to an upstream site.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The upstream answered, but not with what the scrape needed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The scrape session did not capture a payload in time.
    #[error("scrape timed out after {0:?}")]
    Timeout(Duration),

    /// Unexpected HTML or payload shape.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchoolError {
    /// `true` for network/scrape failures, `false` for decoding failures.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            SchoolError::Fetch(_) | SchoolError::Upstream(_) | SchoolError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SchoolError>;
