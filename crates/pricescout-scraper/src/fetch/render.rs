//! Browser-rendered fetching.
//!
//! A [`Renderer`] opens one isolated [`RenderSession`] per fetch. The
//! [`RenderingFetcher`] owns every deadline and closes the session on every
//! exit path; sessions only expose the primitive browser operations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pricescout_core::EngineConfig;
use url::Url;

use super::{random_user_agent, FetchedPage, PageFetcher};
use crate::error::ScraperError;

/// Interval between probes while waiting for the price locator to appear.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Upper bound for reading the rendered DOM back out of the browser.
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for tearing a session down. The session is dropped once it
/// elapses, which releases whatever the close left behind.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// A browser engine able to open isolated sessions.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Starts a session whose requests identify as `user_agent`. The session
    /// blocks images, fonts, stylesheets, and media.
    async fn open_session(&self, user_agent: &str) -> Result<Box<dyn RenderSession>, ScraperError>;
}

/// One browser page plus whatever process or context backs it.
#[async_trait]
pub trait RenderSession: Send {
    /// Navigates and resolves once the document has loaded.
    async fn navigate(&mut self, url: &Url) -> Result<(), ScraperError>;
    /// Whether an element matching `css` is currently in the DOM.
    async fn has_element(&mut self, css: &str) -> bool;
    /// Serialized HTML of the current DOM.
    async fn html(&mut self) -> Result<String, ScraperError>;
    /// Current page URL, if the browser reports one.
    async fn current_url(&mut self) -> Option<Url>;
    /// Releases the page and every resource behind it.
    async fn close(self: Box<Self>) -> Result<(), ScraperError>;
}

/// Count of render sessions that have been opened and not yet released.
#[derive(Debug, Clone, Default)]
pub struct LiveSessions(Arc<AtomicUsize>);

impl LiveSessions {
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn enter(&self) -> SessionGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        SessionGuard(Arc::clone(&self.0))
    }
}

/// Decrements the live count when dropped, including when the owning future
/// is cancelled mid-fetch.
struct SessionGuard(Arc<AtomicUsize>);

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// [`PageFetcher`] that renders pages in a headless browser.
pub struct RenderingFetcher {
    renderer: Arc<dyn Renderer>,
    navigation_timeout: Duration,
    selector_wait: Duration,
    close_timeout: Duration,
    live: LiveSessions,
}

impl RenderingFetcher {
    #[must_use]
    pub fn new(renderer: Arc<dyn Renderer>, config: &EngineConfig) -> Self {
        Self {
            renderer,
            navigation_timeout: config.render_timeout(),
            selector_wait: config.selector_wait(),
            close_timeout: CLOSE_TIMEOUT,
            live: LiveSessions::default(),
        }
    }

    /// Overrides how long a session may take to shut down.
    #[must_use]
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// Handle on the number of sessions currently open through this fetcher.
    #[must_use]
    pub fn live_sessions(&self) -> LiveSessions {
        self.live.clone()
    }

    async fn drive(
        &self,
        session: &mut dyn RenderSession,
        url: &Url,
        wait_for: Option<&str>,
    ) -> Result<FetchedPage, ScraperError> {
        tokio::time::timeout(self.navigation_timeout, session.navigate(url))
            .await
            .map_err(|_| ScraperError::Timeout {
                stage: "navigation",
                url: url.to_string(),
                after: self.navigation_timeout,
            })??;

        if let Some(css) = wait_for {
            self.wait_for_selector(session, url, css).await;
        }

        let html = tokio::time::timeout(CAPTURE_TIMEOUT, session.html())
            .await
            .map_err(|_| ScraperError::Timeout {
                stage: "capture",
                url: url.to_string(),
                after: CAPTURE_TIMEOUT,
            })??;
        let final_url = tokio::time::timeout(CAPTURE_TIMEOUT, session.current_url())
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.clone());

        Ok(FetchedPage { final_url, html })
    }

    /// Polls for `css` until it appears or the wait budget runs out. Expiry
    /// is not an error: the page is captured as-is.
    async fn wait_for_selector(&self, session: &mut dyn RenderSession, url: &Url, css: &str) {
        let poll = async {
            while !session.has_element(css).await {
                tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
            }
        };
        if tokio::time::timeout(self.selector_wait, poll).await.is_err() {
            tracing::debug!(
                url = %url,
                css,
                wait_ms = u64::try_from(self.selector_wait.as_millis()).unwrap_or(u64::MAX),
                "price locator did not appear; capturing page anyway"
            );
        }
    }
}

#[async_trait]
impl PageFetcher for RenderingFetcher {
    async fn fetch(&self, url: &Url, wait_for: Option<&str>) -> Result<FetchedPage, ScraperError> {
        let user_agent = random_user_agent();
        let mut session = self.renderer.open_session(user_agent).await?;
        let _guard = self.live.enter();
        tracing::debug!(url = %url, user_agent, live = self.live.count(), "render session opened");

        let result = self.drive(session.as_mut(), url, wait_for).await;

        match tokio::time::timeout(self.close_timeout, session.close()).await {
            Ok(Ok(())) => tracing::debug!(url = %url, "render session closed"),
            Ok(Err(e)) => {
                tracing::warn!(url = %url, error = %e, "failed to close render session cleanly");
            }
            Err(_) => tracing::warn!(
                url = %url,
                timeout_ms = u64::try_from(self.close_timeout.as_millis()).unwrap_or(u64::MAX),
                "render session did not close in time; dropped it"
            ),
        }

        result
    }
}
