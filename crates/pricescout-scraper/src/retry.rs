//! Caller-side retry for whole extraction calls.
//!
//! The engine never retries on its own. Callers that re-check products on
//! a schedule can wrap a call in [`extract_with_retry`] to ride out
//! transient failures (`FetchFailed`, `Timeout`). `UnsupportedStore` and
//! `PriceNotFound` are returned immediately: retrying would fetch the same
//! page and reach the same verdict.

use std::time::Duration;

use crate::engine::ProductExtractor;
use crate::outcome::ExtractionOutcome;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Runs `extractor` on `url` with up to `max_retries` additional attempts on
/// transient failures.
///
/// Back-off schedule with `backoff_base_ms = 1_000`:
///
/// | Retry | Sleep before it                 |
/// |-------|---------------------------------|
/// | 1     | 1 000 ms × 2⁰ ± 25 % jitter    |
/// | 2     | 1 000 ms × 2¹ ± 25 % jitter    |
/// | 3     | 1 000 ms × 2² ± 25 % jitter    |
///
/// Delay is capped at 60 s. The outcome of the last attempt is returned.
pub async fn extract_with_retry<E>(
    extractor: &E,
    url: &str,
    max_retries: u32,
    backoff_base_ms: u64,
) -> ExtractionOutcome
where
    E: ProductExtractor + ?Sized,
{
    let mut attempt = 0u32;
    loop {
        let outcome = extractor.extract_product(url).await;
        let Some(kind) = outcome.failure_kind() else {
            return outcome;
        };
        if !kind.is_transient() || attempt >= max_retries {
            return outcome;
        }

        attempt += 1;
        let delay = backoff_delay(backoff_base_ms, attempt);
        tracing::warn!(
            url,
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            %kind,
            "transient extraction failure, retrying after back-off"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Exponential delay before retry number `attempt` (1-based), with ±25 %
/// jitter so concurrent re-checks of one store spread out.
fn backoff_delay(backoff_base_ms: u64, attempt: u32) -> Duration {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    Duration::from_millis(jittered)
}
