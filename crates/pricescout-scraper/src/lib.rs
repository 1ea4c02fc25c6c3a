pub mod cache;
pub mod cascade;
pub mod document;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod generic;
pub mod normalize;
pub mod origin;
pub mod outcome;
pub mod retry;
pub mod rules;

pub use cache::SnapshotCache;
pub use engine::{Extractor, ProductExtractor};
pub use error::ScraperError;
pub use outcome::{ExtractionFailure, ExtractionOutcome, FailureKind};
pub use retry::extract_with_retry;
pub use rules::{is_supported_url, registered_stores, resolve_rule, RuleRegistry, StoreRule};
