//! The extraction orchestrator.
//!
//! One call walks `Resolving → Fetching → Extracting → Normalizing` exactly
//! once, leaving early on the first fatal error. Only a missing price is
//! fatal after a successful fetch; every other field falls back to a default.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use pricescout_core::{EngineConfig, ProductSnapshot};

use crate::cascade::{extract_field, non_empty};
use crate::document::ParsedDocument;
use crate::error::ScraperError;
use crate::fetch::chromium::ChromiumRenderer;
use crate::fetch::{FetchStrategy, PageFetcher, RenderingFetcher, StaticFetcher};
use crate::generic::{extract_generic, extract_structured, PartialSnapshot};
use crate::normalize::{currency_code, parse_availability, parse_price};
use crate::origin::{parse_product_url, store_host};
use crate::outcome::ExtractionOutcome;
use crate::rules::{Locator, RuleRegistry, StoreRule};

/// Anything that turns a product URL into an [`ExtractionOutcome`].
#[async_trait]
pub trait ProductExtractor: Send + Sync {
    /// Never fails: every error is reported as a typed failure outcome.
    async fn extract_product(&self, url: &str) -> ExtractionOutcome;
}

/// How rendering-required stores are served in this deployment.
enum RenderingPath {
    Disabled,
    Unavailable(String),
    Ready(Arc<dyn PageFetcher>),
}

pub struct Extractor {
    registry: Cow<'static, RuleRegistry>,
    static_fetcher: Arc<dyn PageFetcher>,
    rendering: RenderingPath,
}

impl Extractor {
    /// Builds the production engine: built-in store rules, a static HTTP
    /// fetcher, and Chromium rendering when enabled.
    ///
    /// A missing Chromium binary does not fail construction. Static stores
    /// keep working and rendering-required stores report `FetchFailed`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &EngineConfig) -> Result<Self, ScraperError> {
        let static_fetcher: Arc<dyn PageFetcher> = Arc::new(StaticFetcher::new(config)?);
        let rendering = if config.rendering_enabled {
            match ChromiumRenderer::new(config) {
                Ok(renderer) => {
                    RenderingPath::Ready(Arc::new(RenderingFetcher::new(Arc::new(renderer), config)))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "rendering enabled but no browser available");
                    RenderingPath::Unavailable(e.to_string())
                }
            }
        } else {
            tracing::info!("rendering disabled by configuration");
            RenderingPath::Disabled
        };

        Ok(Self {
            registry: Cow::Borrowed(RuleRegistry::builtin()),
            static_fetcher,
            rendering,
        })
    }

    /// Builds an engine from explicit parts with rendering disabled.
    #[must_use]
    pub fn from_parts(registry: RuleRegistry, static_fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            registry: Cow::Owned(registry),
            static_fetcher,
            rendering: RenderingPath::Disabled,
        }
    }

    /// Serves rendering-required stores through `fetcher`.
    #[must_use]
    pub fn with_rendering(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.rendering = RenderingPath::Ready(fetcher);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    fn fetcher_for(&self, strategy: FetchStrategy, store: &str) -> Result<&dyn PageFetcher, ScraperError> {
        match (strategy, &self.rendering) {
            (FetchStrategy::Static, _) => Ok(self.static_fetcher.as_ref()),
            (FetchStrategy::Rendering, RenderingPath::Ready(fetcher)) => Ok(fetcher.as_ref()),
            (FetchStrategy::Rendering, RenderingPath::Disabled) => Err(ScraperError::RenderingDisabled {
                store: store.to_owned(),
            }),
            (FetchStrategy::Rendering, RenderingPath::Unavailable(reason)) => {
                Err(ScraperError::BrowserUnavailable(reason.clone()))
            }
        }
    }

    async fn run(&self, raw_url: &str) -> Result<ProductSnapshot, ScraperError> {
        let url = parse_product_url(raw_url)?;
        let store = store_host(&url).ok_or_else(|| ScraperError::InvalidUrl {
            url: raw_url.to_owned(),
            reason: "missing host".to_owned(),
        })?;
        let rule = self.registry.resolve_host(&store);
        tracing::debug!(
            state = "resolving",
            url = %url,
            store,
            rule = rule.map(|r| r.name),
            "resolved store"
        );

        let strategy = FetchStrategy::for_rule(rule);
        let fetcher = self.fetcher_for(strategy, &store)?;
        let wait_for = rule.and_then(StoreRule::primary_price_locator).map(Locator::css);
        let fetch_started = Instant::now();
        tracing::debug!(state = "fetching", url = %url, %strategy, "fetching page");
        let page = fetcher.fetch(&url, wait_for).await?;
        tracing::debug!(
            url = %url,
            %strategy,
            bytes = page.html.len(),
            elapsed_ms = elapsed_ms(fetch_started),
            "page fetched"
        );

        // No await below this point: the parsed document is not `Send`.
        let document = ParsedDocument::parse(&page.html, page.final_url);
        tracing::debug!(state = "extracting", url = %url, "extracting fields");
        let partial = match rule {
            // Registered stores never take a price from free text.
            Some(rule) => extract_with_rule(&document, rule).or_fill(extract_structured(&document)),
            None => extract_generic(&document),
        };

        tracing::debug!(state = "normalizing", url = %url, "normalizing fields");
        assemble(partial, rule, store, &url)
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Runs a rule's cascades. Currency falls back to whatever the matched price
/// text itself names.
fn extract_with_rule(document: &ParsedDocument, rule: &StoreRule) -> PartialSnapshot {
    let parser = rule.price_parser;
    let (price, price_text) = extract_field(document, &rule.price, |raw| {
        parse_price(raw, parser).map(|price| (price, raw.to_owned()))
    })
    .unzip();

    let currency = extract_field(document, &rule.currency_symbol, |raw| {
        currency_code(raw).map(str::to_owned)
    })
    .or_else(|| {
        price_text
            .as_deref()
            .and_then(currency_code)
            .map(str::to_owned)
    });

    PartialSnapshot {
        price,
        price_text,
        currency,
        title: extract_field(document, &rule.title, non_empty),
        image: extract_field(document, &rule.image, |raw| document.absolutize(raw)),
        in_stock: extract_field(document, &rule.availability, |raw| {
            non_empty(raw).map(|text| parse_availability(&text))
        }),
    }
}

fn assemble(
    partial: PartialSnapshot,
    rule: Option<&StoreRule>,
    store: String,
    url: &url::Url,
) -> Result<ProductSnapshot, ScraperError> {
    let price = partial.price.ok_or_else(|| ScraperError::PriceNotFound {
        url: url.to_string(),
    })?;

    let currency = partial.currency.unwrap_or_else(|| {
        rule.map_or(ProductSnapshot::DEFAULT_CURRENCY, |r| r.default_currency)
            .to_owned()
    });

    Ok(ProductSnapshot {
        price,
        currency,
        title: partial.title.unwrap_or_else(|| ProductSnapshot::DEFAULT_TITLE.to_owned()),
        image: partial.image,
        in_stock: partial.in_stock.unwrap_or(true),
        store,
        scraped_at: Utc::now(),
    })
}

#[async_trait]
impl ProductExtractor for Extractor {
    async fn extract_product(&self, url: &str) -> ExtractionOutcome {
        let started = Instant::now();
        let result = self.run(url).await;
        let elapsed_ms = elapsed_ms(started);

        match &result {
            Ok(snapshot) => tracing::info!(
                url,
                store = %snapshot.store,
                price = snapshot.price,
                currency = %snapshot.currency,
                elapsed_ms,
                "extraction succeeded"
            ),
            Err(e) => tracing::warn!(
                url,
                kind = %e.failure_kind(),
                error = %e,
                elapsed_ms,
                "extraction failed"
            ),
        }

        ExtractionOutcome::from(result)
    }
}

#[async_trait]
impl<T: ProductExtractor + ?Sized> ProductExtractor for Arc<T> {
    async fn extract_product(&self, url: &str) -> ExtractionOutcome {
        (**self).extract_product(url).await
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
