use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the extraction engine.
///
/// Every field has a default, so an empty environment yields a working
/// configuration identical to [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub env: Environment,
    pub log_level: String,
    /// When `false`, stores that need a browser fail with `FetchFailed`
    /// instead of being fetched statically.
    pub rendering_enabled: bool,
    pub http_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_redirects: usize,
    pub render_timeout_secs: u64,
    /// Upper bound on waiting for the primary price locator after navigation.
    /// Expiry is not an error.
    pub selector_wait_ms: u64,
    /// Explicit Chromium binary. `None` means discover it on `PATH`.
    pub chromium_path: Option<PathBuf>,
    /// `0` disables the snapshot cache.
    pub cache_ttl_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            env: Environment::Development,
            log_level: "info".to_string(),
            rendering_enabled: true,
            http_timeout_secs: 12,
            connect_timeout_secs: 5,
            max_redirects: 5,
            render_timeout_secs: 30,
            selector_wait_ms: 5_000,
            chromium_path: None,
            cache_ttl_secs: 0,
            max_retries: 0,
            retry_backoff_base_ms: 1_000,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    #[must_use]
    pub fn selector_wait(&self) -> Duration {
        Duration::from_millis(self.selector_wait_ms)
    }

    /// Returns the cache TTL, or `None` when caching is disabled.
    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}
