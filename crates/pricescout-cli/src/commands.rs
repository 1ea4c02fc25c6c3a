//! Subcommand handlers. Results go to stdout; logs go to stderr.

use std::process::ExitCode;

use pricescout_core::EngineConfig;
use pricescout_scraper::{
    extract_with_retry, registered_stores, resolve_rule, Extractor, ProductExtractor,
    SnapshotCache,
};

/// Runs one extraction per URL, in order, and prints each serialized
/// outcome.
///
/// With `PRICESCOUT_CACHE_TTL_SECS` set, a URL repeated within the TTL is
/// answered from the snapshot cache instead of being fetched again. Exits
/// non-zero when any outcome is a failure so scripts can branch on the
/// status without parsing JSON.
///
/// # Errors
///
/// Returns an error if the engine cannot be built or an outcome cannot be
/// serialized. Extraction failures are reported in the outcome, not here.
pub(crate) async fn run_extract(
    config: &EngineConfig,
    urls: &[String],
    no_retry: bool,
) -> anyhow::Result<ExitCode> {
    let engine = Extractor::new(config)
        .map_err(|e| anyhow::anyhow!("failed to build extraction engine: {e}"))?;
    let extractor: Box<dyn ProductExtractor> = match config.cache_ttl() {
        Some(ttl) => Box::new(SnapshotCache::new(engine, ttl)),
        None => Box::new(engine),
    };
    let max_retries = if no_retry { 0 } else { config.max_retries };

    let mut all_succeeded = true;
    for url in urls {
        tracing::debug!(url = %url, max_retries, "running extraction");
        let outcome =
            extract_with_retry(extractor.as_ref(), url, max_retries, config.retry_backoff_base_ms)
                .await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        all_succeeded &= outcome.is_success();
    }

    Ok(exit_code(all_succeeded))
}

fn exit_code(all_succeeded: bool) -> ExitCode {
    if all_succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

pub(crate) fn run_supported(url: &str) -> ExitCode {
    match resolve_rule(url) {
        Some(rule) => {
            println!("supported: {} ({})", rule.name, rule.domain);
            ExitCode::SUCCESS
        }
        None => {
            println!("not supported: generic extraction will be attempted");
            ExitCode::FAILURE
        }
    }
}

pub(crate) fn run_stores() {
    for line in store_lines() {
        println!("{line}");
    }
}

fn store_lines() -> Vec<String> {
    registered_stores()
        .iter()
        .map(|rule| {
            let fetch = if rule.requires_rendering {
                "rendered"
            } else {
                "static"
            };
            format!(
                "{:<16} {:<16} {:<8} {}",
                rule.name, rule.domain, fetch, rule.default_currency
            )
        })
        .collect()
}
