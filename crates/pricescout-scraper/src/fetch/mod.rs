//! Document retrieval.
//!
//! Two strategies share one output type: [`StaticFetcher`] issues a single
//! HTTP GET, [`RenderingFetcher`] drives a headless browser through a
//! [`Renderer`]. Which one runs is decided by [`FetchStrategy::for_rule`],
//! so extraction code never branches on how a page was obtained.

pub mod chromium;
mod render;
mod static_http;
mod user_agent;

use async_trait::async_trait;
use url::Url;

use crate::error::ScraperError;
use crate::rules::StoreRule;

pub use render::{LiveSessions, RenderSession, Renderer, RenderingFetcher};
pub use static_http::StaticFetcher;
pub use user_agent::{random_user_agent, USER_AGENTS};

/// Raw HTML retrieved for one extraction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL the content was served from, after redirects.
    pub final_url: Url,
    pub html: String,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieves `url`. `wait_for` names a CSS selector the caller expects
    /// the finished page to contain; fetchers that can observe the page
    /// while it loads may wait for it, others ignore it.
    ///
    /// # Errors
    ///
    /// Network failures, non-2xx responses, and expired deadlines are all
    /// returned as [`ScraperError`]s. Nothing is retried here.
    async fn fetch(&self, url: &Url, wait_for: Option<&str>) -> Result<FetchedPage, ScraperError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Static,
    Rendering,
}

impl FetchStrategy {
    /// Rendering only for registered stores that declare they need it.
    #[must_use]
    pub fn for_rule(rule: Option<&StoreRule>) -> Self {
        match rule {
            Some(rule) if rule.requires_rendering => FetchStrategy::Rendering,
            _ => FetchStrategy::Static,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FetchStrategy::Static => "static",
            FetchStrategy::Rendering => "rendering",
        }
    }
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
