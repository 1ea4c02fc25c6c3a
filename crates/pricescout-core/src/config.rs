use std::path::PathBuf;

use crate::app_config::{EngineConfig, Environment};
use crate::ConfigError;

/// Load engine configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_engine_config() -> Result<EngineConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_engine_config_from_env()
}

/// Load engine configuration from environment variables already in the process.
///
/// Unlike [`load_engine_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but its value is invalid.
pub fn load_engine_config_from_env() -> Result<EngineConfig, ConfigError> {
    build_engine_config(|key| std::env::var(key))
}

/// Build engine configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` lookup.
fn build_engine_config<F>(lookup: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = EngineConfig::default();

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    };

    let env = parse_environment(&or_default("PRICESCOUT_ENV", "development"))?;
    let log_level = or_default("PRICESCOUT_LOG_LEVEL", &defaults.log_level);

    let rendering_enabled = match lookup("PRICESCOUT_RENDERING_ENABLED") {
        Ok(raw) => parse_bool("PRICESCOUT_RENDERING_ENABLED", &raw)?,
        Err(_) => defaults.rendering_enabled,
    };

    let http_timeout_secs = parse_u64("PRICESCOUT_HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?;
    let connect_timeout_secs =
        parse_u64("PRICESCOUT_CONNECT_TIMEOUT_SECS", defaults.connect_timeout_secs)?;
    let max_redirects = parse_usize("PRICESCOUT_MAX_REDIRECTS", defaults.max_redirects)?;
    let render_timeout_secs =
        parse_u64("PRICESCOUT_RENDER_TIMEOUT_SECS", defaults.render_timeout_secs)?;
    let selector_wait_ms = parse_u64("PRICESCOUT_SELECTOR_WAIT_MS", defaults.selector_wait_ms)?;
    let chromium_path = lookup("PRICESCOUT_CHROMIUM_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let cache_ttl_secs = parse_u64("PRICESCOUT_CACHE_TTL_SECS", defaults.cache_ttl_secs)?;
    let max_retries = parse_u32("PRICESCOUT_MAX_RETRIES", defaults.max_retries)?;
    let retry_backoff_base_ms = parse_u64(
        "PRICESCOUT_RETRY_BACKOFF_BASE_MS",
        defaults.retry_backoff_base_ms,
    )?;

    if http_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICESCOUT_HTTP_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    if render_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICESCOUT_RENDER_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(EngineConfig {
        env,
        log_level,
        rendering_enabled,
        http_timeout_secs,
        connect_timeout_secs,
        max_redirects,
        render_timeout_secs,
        selector_wait_ms,
        chromium_path,
        cache_ttl_secs,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICESCOUT_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
