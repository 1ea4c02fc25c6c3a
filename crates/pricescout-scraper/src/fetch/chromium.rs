//! Headless Chromium sessions via `chromiumoxide`.
//!
//! Every session launches its own browser process with a throwaway profile
//! directory, so no cookies or cache leak between extractions. Dropping a
//! session without closing it still kills the process and removes the
//! profile.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams, EventRequestPaused, FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::page::Page;
use futures::StreamExt;
use pricescout_core::EngineConfig;
use tokio::task::JoinHandle;
use url::Url;

use super::{RenderSession, Renderer};
use crate::error::ScraperError;

/// Executables searched on `PATH` when no explicit path is configured.
const CHROMIUM_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// How long a browser gets to exit on its own before it is killed.
const EXIT_GRACE: Duration = Duration::from_secs(5);

/// Subresource types that never affect price markup.
const BLOCKED_RESOURCES: &[ResourceType] = &[
    ResourceType::Image,
    ResourceType::Font,
    ResourceType::Stylesheet,
    ResourceType::Media,
];

/// Finds a Chromium binary: `configured` if it exists, otherwise the first
/// candidate found on `PATH`.
#[must_use]
pub fn find_chromium(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        tracing::warn!(path = %path.display(), "configured Chromium path does not exist");
    }

    CHROMIUM_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Launches one headless Chromium per session.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    executable: PathBuf,
}

impl ChromiumRenderer {
    /// # Errors
    ///
    /// Returns [`ScraperError::BrowserUnavailable`] when no Chromium binary
    /// can be found. No browser is launched until a session is opened.
    pub fn new(config: &EngineConfig) -> Result<Self, ScraperError> {
        let executable = find_chromium(config.chromium_path.as_deref()).ok_or_else(|| {
            ScraperError::BrowserUnavailable(
                "no Chromium binary found; set PRICESCOUT_CHROMIUM_PATH".to_owned(),
            )
        })?;
        tracing::info!(executable = %executable.display(), "using Chromium for rendering");
        Ok(Self { executable })
    }

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn browser_config(&self, user_agent: &str, profile_dir: &Path) -> Result<BrowserConfig, ScraperError> {
        BrowserConfig::builder()
            .new_headless_mode()
            .chrome_executable(&self.executable)
            .user_data_dir(profile_dir)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={user_agent}"))
            .build()
            .map_err(|e| ScraperError::BrowserUnavailable(format!("invalid browser config: {e}")))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn open_session(&self, user_agent: &str) -> Result<Box<dyn RenderSession>, ScraperError> {
        let profile_dir =
            std::env::temp_dir().join(format!("pricescout-{:016x}", rand::random::<u64>()));
        let config = self.browser_config(user_agent, &profile_dir)?;

        let (browser, mut handler) = match Browser::launch(config).await {
            Ok(launched) => launched,
            Err(e) => {
                remove_profile(&profile_dir);
                return Err(ScraperError::BrowserUnavailable(format!(
                    "failed to launch Chromium: {e}"
                )));
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!(error = %e, "chromium handler event error");
                }
            }
        });

        // From here on, dropping `session` tears everything down.
        let mut session = ChromiumSession {
            browser,
            page: None,
            last_url: None,
            tasks: vec![handler_task],
            profile_dir,
        };

        let page = session
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserUnavailable(format!("failed to open page: {e}")))?;
        let interceptor = block_subresources(&page).await?;
        session.tasks.push(interceptor);
        session.page = Some(page);

        Ok(Box::new(session))
    }
}

/// Pauses every request for a [`BLOCKED_RESOURCES`] type and fails it.
async fn block_subresources(page: &Page) -> Result<JoinHandle<()>, ScraperError> {
    let setup_err =
        |e: chromiumoxide::error::CdpError| ScraperError::BrowserUnavailable(format!("request interception: {e}"));

    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(setup_err)?;

    let patterns = BLOCKED_RESOURCES
        .iter()
        .map(|kind| RequestPattern {
            url_pattern: Some("*".to_owned()),
            resource_type: Some(kind.clone()),
            request_stage: Some(RequestStage::Request),
        })
        .collect();
    page.execute(EnableParams {
        patterns: Some(patterns),
        handle_auth_requests: None,
    })
    .await
    .map_err(setup_err)?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let fail = FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
            if let Err(e) = page.execute(fail).await {
                tracing::trace!(error = %e, "failed to block subresource");
            }
        }
    }))
}

fn remove_profile(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(dir = %dir.display(), error = %e, "failed to remove browser profile");
        }
    }
}

/// A single Chromium process, its page, and its temporary profile.
pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    last_url: Option<String>,
    tasks: Vec<JoinHandle<()>>,
    profile_dir: PathBuf,
}

impl ChromiumSession {
    fn page(&self, url: &str) -> Result<&Page, ScraperError> {
        self.page.as_ref().ok_or_else(|| ScraperError::Render {
            url: url.to_owned(),
            reason: "session has no open page".to_owned(),
        })
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&mut self, url: &Url) -> Result<(), ScraperError> {
        self.last_url = Some(url.to_string());
        self.page(url.as_str())?
            .goto(url.as_str())
            .await
            .map(|_| ())
            .map_err(|e| ScraperError::Render {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    async fn has_element(&mut self, css: &str) -> bool {
        match &self.page {
            Some(page) => page.find_element(css).await.is_ok(),
            None => false,
        }
    }

    async fn html(&mut self) -> Result<String, ScraperError> {
        let url = self.last_url.clone().unwrap_or_else(|| "about:blank".to_owned());
        let page = self.page(&url)?;
        page.content().await.map_err(|e| ScraperError::Render {
            url,
            reason: format!("failed to capture HTML: {e}"),
        })
    }

    async fn current_url(&mut self) -> Option<Url> {
        let page = self.page.as_ref()?;
        let raw = page.url().await.ok().flatten()?;
        Url::parse(&raw).ok()
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        let mut this = self;
        if let Some(page) = this.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!(error = %e, "failed to close page");
            }
        }

        let graceful = async {
            this.browser
                .close()
                .await
                .map_err(|e| ScraperError::BrowserShutdown(e.to_string()))?;
            this.browser
                .wait()
                .await
                .map_err(|e| ScraperError::BrowserShutdown(e.to_string()))?;
            Ok::<(), ScraperError>(())
        };
        if let Ok(result) = tokio::time::timeout(EXIT_GRACE, graceful).await {
            return result;
        }

        tracing::warn!("browser did not exit in time; killing it");
        match this.browser.kill().await {
            Some(Err(e)) => Err(ScraperError::BrowserShutdown(e.to_string())),
            _ => Ok(()),
        }
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        remove_profile(&self.profile_dir);
    }
}
