use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized product reading taken from a single store page.
///
/// Only successful extractions produce a snapshot, so `price` is always a
/// finite, non-negative number and `title` is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub price: f64,
    /// ISO 4217 currency code, e.g. `"USD"`.
    pub currency: String,
    pub title: String,
    /// Absolute URL of the primary product image, if one was found.
    pub image: Option<String>,
    pub in_stock: bool,
    /// Hostname of the page with any leading `www.` removed.
    pub store: String,
    pub scraped_at: DateTime<Utc>,
}

impl ProductSnapshot {
    /// Title used when a page yields a price but no usable title.
    pub const DEFAULT_TITLE: &'static str = "Product";
    /// Currency used when no symbol or code can be mapped.
    pub const DEFAULT_CURRENCY: &'static str = "USD";

    /// Returns `true` if two snapshots describe the same reading, ignoring
    /// when they were taken.
    #[must_use]
    pub fn same_reading(&self, other: &Self) -> bool {
        self.price.to_bits() == other.price.to_bits()
            && self.currency == other.currency
            && self.title == other.title
            && self.image == other.image
            && self.in_stock == other.in_stock
            && self.store == other.store
    }
}
