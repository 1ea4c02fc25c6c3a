//! Caller-facing result of one extraction call.

use pricescout_core::ProductSnapshot;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ScraperError;

/// Why an extraction call produced no snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The URL cannot be handled by this engine at all.
    UnsupportedStore,
    /// Network error, DNS failure, non-2xx response, or unavailable renderer.
    FetchFailed,
    /// The page was fetched but no cascade or heuristic produced a price.
    PriceNotFound,
    /// The fetch or navigation exceeded its deadline.
    Timeout,
}

impl FailureKind {
    /// Suggested HTTP status class for callers exposing the engine over HTTP.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            FailureKind::UnsupportedStore | FailureKind::PriceNotFound => 400,
            FailureKind::FetchFailed | FailureKind::Timeout => 502,
        }
    }

    /// Whether a whole-call retry could plausibly succeed.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, FailureKind::FetchFailed | FailureKind::Timeout)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::UnsupportedStore => "UnsupportedStore",
            FailureKind::FetchFailed => "FetchFailed",
            FailureKind::PriceNotFound => "PriceNotFound",
            FailureKind::Timeout => "Timeout",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Either a complete snapshot or a typed failure. Nothing in between.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Success(ProductSnapshot),
    Failure(ExtractionFailure),
}

impl ExtractionOutcome {
    #[must_use]
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ExtractionOutcome::Failure(ExtractionFailure {
            kind,
            message: message.into(),
        })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionOutcome::Success(_))
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&ProductSnapshot> {
        match self {
            ExtractionOutcome::Success(snapshot) => Some(snapshot),
            ExtractionOutcome::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExtractionOutcome::Success(_) => None,
            ExtractionOutcome::Failure(failure) => Some(failure.kind),
        }
    }
}

impl From<Result<ProductSnapshot, ScraperError>> for ExtractionOutcome {
    fn from(result: Result<ProductSnapshot, ScraperError>) -> Self {
        match result {
            Ok(snapshot) => ExtractionOutcome::Success(snapshot),
            Err(err) => ExtractionOutcome::failure(err.failure_kind(), err.to_string()),
        }
    }
}

/// Wire shape: `{ "success": true, "snapshot": {..} }` or
/// `{ "success": false, "kind": "..", "message": ".." }`.
#[derive(Serialize)]
struct OutcomeWire<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<&'a ProductSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl Serialize for ExtractionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            ExtractionOutcome::Success(snapshot) => OutcomeWire {
                success: true,
                snapshot: Some(snapshot),
                kind: None,
                message: None,
            },
            ExtractionOutcome::Failure(failure) => OutcomeWire {
                success: false,
                snapshot: None,
                kind: Some(failure.kind),
                message: Some(&failure.message),
            },
        };
        wire.serialize(serializer)
    }
}
