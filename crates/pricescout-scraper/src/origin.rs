//! Product URL validation and store-host extraction.

use url::Url;

use crate::error::ScraperError;

/// Parses a caller-supplied product URL, accepting only `http`/`https`
/// URLs that carry a host.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if the string does not parse, uses
/// another scheme, or has no host.
pub fn parse_product_url(raw: &str) -> Result<Url, ScraperError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| ScraperError::InvalidUrl {
        url: trimmed.to_owned(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScraperError::InvalidUrl {
            url: trimmed.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ScraperError::InvalidUrl {
            url: trimmed.to_owned(),
            reason: "URL has no host".to_owned(),
        });
    }

    Ok(url)
}

/// Returns the lowercased hostname with any leading `www.` removed.
///
/// Given `https://www.Amazon.com/dp/B0`, returns `amazon.com`.
#[must_use]
pub fn store_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.trim_end_matches('.');
    Some(host.strip_prefix("www.").unwrap_or(host).to_owned())
}
