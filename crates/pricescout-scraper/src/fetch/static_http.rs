use std::time::Duration;

use async_trait::async_trait;
use pricescout_core::EngineConfig;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{redirect, Client};
use url::Url;

use super::{random_user_agent, FetchedPage, PageFetcher};
use crate::error::ScraperError;

/// Plain HTTP GET with browser-like headers.
///
/// A fresh user agent is drawn for every request. Redirects are followed up
/// to the configured bound, and the whole request (connect, headers, body)
/// runs under one deadline.
pub struct StaticFetcher {
    client: Client,
    timeout: Duration,
}

impl StaticFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(config: &EngineConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(config.connect_timeout())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .default_headers(browser_headers())
            .build()?;
        Ok(Self {
            client,
            timeout: config.http_timeout(),
        })
    }

    fn map_error(&self, err: reqwest::Error, url: &Url) -> ScraperError {
        if err.is_timeout() {
            ScraperError::Timeout {
                stage: "http fetch",
                url: url.to_string(),
                after: self.timeout,
            }
        } else {
            ScraperError::Http(err)
        }
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &Url, _wait_for: Option<&str>) -> Result<FetchedPage, ScraperError> {
        let user_agent = random_user_agent();
        tracing::debug!(url = %url, user_agent, "static fetch");

        let response = self
            .client
            .get(url.clone())
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| self.map_error(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await.map_err(|e| self.map_error(e, url))?;

        Ok(FetchedPage { final_url, html })
    }
}
