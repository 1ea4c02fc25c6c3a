//! End-to-end tests for `Extractor::extract_product`.
//!
//! Static pages are served by a local `wiremock` server so no real network
//! traffic is made. The rendering path runs against an in-process fake
//! browser that counts opened and closed sessions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricescout_core::EngineConfig;
use pricescout_scraper::fetch::{RenderSession, Renderer, RenderingFetcher, StaticFetcher};
use pricescout_scraper::normalize::default_price_parser;
use pricescout_scraper::rules::{builtin_rules, Locator};
use pricescout_scraper::{
    Extractor, FailureKind, ProductExtractor, RuleRegistry, ScraperError, StoreRule,
};

/// Short deadlines so timeout scenarios finish quickly.
fn test_config() -> EngineConfig {
    EngineConfig {
        http_timeout_secs: 1,
        connect_timeout_secs: 1,
        render_timeout_secs: 1,
        selector_wait_ms: 300,
        ..EngineConfig::default()
    }
}

/// A rule for the mock server's host, which is always `127.0.0.1`.
fn local_rule(requires_rendering: bool) -> StoreRule {
    StoreRule {
        name: "Local Test Store",
        domain: "127.0.0.1",
        requires_rendering,
        price: vec![Locator::text(".pdp-price"), Locator::text(".legacy-price")],
        title: vec![Locator::text("h1.pdp-title")],
        image: vec![Locator::attr("img.pdp-hero", "src")],
        availability: vec![Locator::text(".pdp-stock")],
        currency_symbol: vec![],
        price_parser: default_price_parser,
        default_currency: "USD",
    }
}

fn engine(registry: RuleRegistry) -> Extractor {
    let fetcher = StaticFetcher::new(&test_config()).expect("failed to build static fetcher");
    Extractor::from_parts(registry, Arc::new(fetcher))
}

async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

const STATIC_PRODUCT: &str = r#"<html><body>
    <h1 class="pdp-title">Espresso Machine</h1>
    <img class="pdp-hero" src="/media/espresso.jpg">
    <div class="legacy-price">$1,299.00</div>
    <div class="pdp-stock">Only 2 left</div>
</body></html>"#;

// ---------------------------------------------------------------------------
// Static fetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registered_static_store_parses_thousands_price() {
    let server = MockServer::start().await;
    serve(&server, "/p/espresso", STATIC_PRODUCT).await;
    let engine = engine(RuleRegistry::new(vec![local_rule(false)]));

    let outcome = engine
        .extract_product(&format!("{}/p/espresso", server.uri()))
        .await;

    let snapshot = outcome.snapshot().expect("expected success");
    assert!((snapshot.price - 1299.00).abs() < 1e-9);
    assert_eq!(snapshot.currency, "USD");
    assert_eq!(snapshot.title, "Espresso Machine");
    assert_eq!(
        snapshot.image.as_deref(),
        Some(format!("{}/media/espresso.jpg", server.uri()).as_str())
    );
    assert!(snapshot.in_stock);
    assert_eq!(snapshot.store, "127.0.0.1");
}

#[tokio::test]
async fn repeated_extraction_of_unchanged_page_is_idempotent() {
    let server = MockServer::start().await;
    serve(&server, "/p/espresso", STATIC_PRODUCT).await;
    let engine = engine(RuleRegistry::new(vec![local_rule(false)]));
    let url = format!("{}/p/espresso", server.uri());

    let first = engine.extract_product(&url).await;
    let second = engine.extract_product(&url).await;

    let a = first.snapshot().expect("first call succeeds");
    let b = second.snapshot().expect("second call succeeds");
    assert!(a.same_reading(b));
}

#[tokio::test]
async fn non_2xx_response_is_fetch_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let engine = engine(RuleRegistry::new(vec![local_rule(false)]));

    let outcome = engine
        .extract_product(&format!("{}/p/missing", server.uri()))
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::FetchFailed));
}

#[tokio::test]
async fn slow_static_fetch_is_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(STATIC_PRODUCT)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let engine = engine(RuleRegistry::new(vec![local_rule(false)]));

    let outcome = engine
        .extract_product(&format!("{}/p/slow", server.uri()))
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Timeout));
}

#[tokio::test]
async fn unreachable_host_is_fetch_failed() {
    // Bind and immediately release a port so nothing is listening on it.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let engine = engine(RuleRegistry::new(vec![local_rule(false)]));

    let outcome = engine
        .extract_product(&format!("http://127.0.0.1:{port}/p/1"))
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::FetchFailed));
}

// ---------------------------------------------------------------------------
// Generic fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unregistered_store_with_og_price_succeeds() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/item/7",
        r#"<html><head>
            <meta property="og:title" content="Linen Apron">
            <meta property="og:price:amount" content="28.00">
            <meta property="og:price:currency" content="GBP">
            <meta property="og:image" content="/img/apron.png">
        </head><body><p>Hand made.</p></body></html>"#,
    )
    .await;
    let engine = engine(RuleRegistry::new(builtin_rules()));

    let outcome = engine
        .extract_product(&format!("{}/item/7", server.uri()))
        .await;

    let snapshot = outcome.snapshot().expect("expected success");
    assert!((snapshot.price - 28.0).abs() < 1e-9);
    assert_eq!(snapshot.currency, "GBP");
    assert_eq!(snapshot.title, "Linen Apron");
    assert_eq!(
        snapshot.image.as_deref(),
        Some(format!("{}/img/apron.png", server.uri()).as_str())
    );
    assert!(snapshot.in_stock);
}

#[tokio::test]
async fn unregistered_store_without_price_signals_is_price_not_found() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/blog/post",
        "<html><head><title>Our story</title></head><body><h1>Our story</h1><p>Since 1998.</p></body></html>",
    )
    .await;
    let engine = engine(RuleRegistry::new(builtin_rules()));

    let outcome = engine
        .extract_product(&format!("{}/blog/post", server.uri()))
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::PriceNotFound));
}

// ---------------------------------------------------------------------------
// Rendering fetch
// ---------------------------------------------------------------------------

/// Empty application shell, as served before client-side hydration.
const SPA_SHELL: &str = r#"<html><body><div id="app"></div><script src="/bundle.js"></script></body></html>"#;

/// The same page after the bundle has run.
const HYDRATED: &str = r#"<html><body><div id="app">
    <h1 class="pdp-title">Smart Thermostat</h1>
    <span class="pdp-price">$249.99</span>
    <div class="pdp-stock">Out of stock</div>
</div></body></html>"#;

#[derive(Default)]
struct SessionLog {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Pretends to be a browser: "navigation" sleeps, the DOM is `html`.
struct FakeBrowser {
    html: &'static str,
    navigation_delay: Duration,
    log: Arc<SessionLog>,
}

struct FakeTab {
    html: &'static str,
    navigation_delay: Duration,
    url: Option<Url>,
    log: Arc<SessionLog>,
}

#[async_trait]
impl Renderer for FakeBrowser {
    async fn open_session(&self, _user_agent: &str) -> Result<Box<dyn RenderSession>, ScraperError> {
        self.log.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeTab {
            html: self.html,
            navigation_delay: self.navigation_delay,
            url: None,
            log: Arc::clone(&self.log),
        }))
    }
}

#[async_trait]
impl RenderSession for FakeTab {
    async fn navigate(&mut self, url: &Url) -> Result<(), ScraperError> {
        tokio::time::sleep(self.navigation_delay).await;
        self.url = Some(url.clone());
        Ok(())
    }

    async fn has_element(&mut self, css: &str) -> bool {
        css == ".pdp-price" && self.html.contains("pdp-price")
    }

    async fn html(&mut self) -> Result<String, ScraperError> {
        Ok(self.html.to_owned())
    }

    async fn current_url(&mut self) -> Option<Url> {
        self.url.clone()
    }

    async fn close(self: Box<Self>) -> Result<(), ScraperError> {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn rendering_fetcher(
    html: &'static str,
    navigation_delay: Duration,
) -> (Arc<RenderingFetcher>, Arc<SessionLog>) {
    let log = Arc::new(SessionLog::default());
    let browser = FakeBrowser {
        html,
        navigation_delay,
        log: Arc::clone(&log),
    };
    let fetcher = RenderingFetcher::new(Arc::new(browser), &test_config());
    (Arc::new(fetcher), log)
}

#[tokio::test]
async fn rendering_finds_price_that_static_fetch_misses() {
    let server = MockServer::start().await;
    serve(&server, "/p/thermostat", SPA_SHELL).await;
    let url = format!("{}/p/thermostat", server.uri());

    // Treated as a static store, the shell has no price.
    let static_engine = engine(RuleRegistry::new(vec![local_rule(false)]));
    let static_outcome = static_engine.extract_product(&url).await;
    assert_eq!(static_outcome.failure_kind(), Some(FailureKind::PriceNotFound));

    // Rendered, the hydrated DOM does.
    let (fetcher, log) = rendering_fetcher(HYDRATED, Duration::ZERO);
    let rendering_engine =
        engine(RuleRegistry::new(vec![local_rule(true)])).with_rendering(fetcher.clone());
    let outcome = rendering_engine.extract_product(&url).await;

    let snapshot = outcome.snapshot().expect("expected success");
    assert!((snapshot.price - 249.99).abs() < 1e-9);
    assert_eq!(snapshot.title, "Smart Thermostat");
    assert!(!snapshot.in_stock);
    assert_eq!(log.opened.load(Ordering::SeqCst), 1);
    assert_eq!(log.closed.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.live_sessions().count(), 0);
}

#[tokio::test]
async fn rendering_timeout_reports_timeout_and_releases_session() {
    let (fetcher, log) = rendering_fetcher(HYDRATED, Duration::from_secs(30));
    let engine = engine(RuleRegistry::new(vec![local_rule(true)])).with_rendering(fetcher.clone());

    let outcome = engine
        .extract_product("http://127.0.0.1:9/p/thermostat")
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::Timeout));
    assert_eq!(log.opened.load(Ordering::SeqCst), 1);
    assert_eq!(log.closed.load(Ordering::SeqCst), 1);
    assert_eq!(fetcher.live_sessions().count(), 0);
}

#[tokio::test]
async fn rendering_required_store_with_rendering_disabled_is_fetch_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(HYDRATED))
        .expect(0)
        .mount(&server)
        .await;
    let engine = engine(RuleRegistry::new(vec![local_rule(true)]));

    let outcome = engine
        .extract_product(&format!("{}/p/thermostat", server.uri()))
        .await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::FetchFailed));
}

#[tokio::test]
async fn concurrent_rendered_extractions_release_every_session() {
    let (fetcher, log) = rendering_fetcher(HYDRATED, Duration::from_millis(20));
    let engine = Arc::new(
        engine(RuleRegistry::new(vec![local_rule(true)])).with_rendering(fetcher.clone()),
    );

    let calls = (0..8).map(|i| {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            engine
                .extract_product(&format!("http://127.0.0.1:9/p/{i}"))
                .await
        })
    });
    for handle in calls.collect::<Vec<_>>() {
        let outcome = handle.await.expect("task panicked");
        assert!(outcome.is_success());
    }

    assert_eq!(log.opened.load(Ordering::SeqCst), 8);
    assert_eq!(log.closed.load(Ordering::SeqCst), 8);
    assert_eq!(fetcher.live_sessions().count(), 0);
}

// ---------------------------------------------------------------------------
// Wire shape
// ---------------------------------------------------------------------------

#[tokio::test]
async fn outcomes_serialize_to_tagged_wire_shape() {
    let server = MockServer::start().await;
    serve(&server, "/p/espresso", STATIC_PRODUCT).await;
    let engine = engine(RuleRegistry::new(vec![local_rule(false)]));

    let success = engine
        .extract_product(&format!("{}/p/espresso", server.uri()))
        .await;
    let json = serde_json::to_value(&success).expect("serialize");
    assert_eq!(json["success"], true);
    assert_eq!(json["snapshot"]["price"], 1299.0);
    assert_eq!(json["snapshot"]["inStock"], true);
    assert!(json["snapshot"]["scrapedAt"].is_string());

    let failure = engine.extract_product("gopher://example.com/").await;
    let json = serde_json::to_value(&failure).expect("serialize");
    assert_eq!(json["success"], false);
    assert_eq!(json["kind"], "UnsupportedStore");
    assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert!(json.get("snapshot").is_none());
}
