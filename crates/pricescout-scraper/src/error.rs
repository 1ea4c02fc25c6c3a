use std::time::Duration;

use thiserror::Error;

use crate::outcome::FailureKind;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid product URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("{stage} timed out after {}ms for {url}", .after.as_millis())]
    Timeout {
        stage: &'static str,
        url: String,
        after: Duration,
    },

    #[error("store {store} requires browser rendering, which is disabled")]
    RenderingDisabled { store: String },

    #[error("browser rendering unavailable: {0}")]
    BrowserUnavailable(String),

    #[error("browser rendering failed for {url}: {reason}")]
    Render { url: String, reason: String },

    #[error("failed to shut down browser session: {0}")]
    BrowserShutdown(String),

    #[error("no usable price found on {url}")]
    PriceNotFound { url: String },
}

impl ScraperError {
    /// Maps an internal error onto the caller-facing failure taxonomy.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ScraperError::Http(e) if e.is_timeout() => FailureKind::Timeout,
            ScraperError::Timeout { .. } => FailureKind::Timeout,
            ScraperError::InvalidUrl { .. } => FailureKind::UnsupportedStore,
            ScraperError::PriceNotFound { .. } => FailureKind::PriceNotFound,
            ScraperError::Http(_)
            | ScraperError::UnexpectedStatus { .. }
            | ScraperError::RenderingDisabled { .. }
            | ScraperError::BrowserUnavailable(_)
            | ScraperError::Render { .. }
            | ScraperError::BrowserShutdown(_) => FailureKind::FetchFailed,
        }
    }
}
