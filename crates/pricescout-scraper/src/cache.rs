//! Optional caller-side snapshot cache.
//!
//! Sits in front of any [`ProductExtractor`] and remembers successful
//! snapshots per URL for a fixed TTL. Failures are never cached, so a
//! transient outage does not pin a failure for the whole TTL.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pricescout_core::ProductSnapshot;

use crate::engine::ProductExtractor;
use crate::outcome::ExtractionOutcome;

struct CacheEntry {
    stored_at: Instant,
    snapshot: ProductSnapshot,
}

pub struct SnapshotCache<E> {
    inner: E,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl<E: ProductExtractor> SnapshotCache<E> {
    #[must_use]
    pub fn new(inner: E, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of entries currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.lock().retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    /// Stores a fresh snapshot, sweeping expired entries first so URLs that
    /// are never requested again do not accumulate.
    fn store(&self, key: &str, snapshot: &ProductSnapshot) {
        let ttl = self.ttl;
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        entries.insert(
            key.to_owned(),
            CacheEntry {
                stored_at: Instant::now(),
                snapshot: snapshot.clone(),
            },
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, key: &str) -> Option<ProductSnapshot> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.snapshot.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl<E: ProductExtractor> ProductExtractor for SnapshotCache<E> {
    async fn extract_product(&self, url: &str) -> ExtractionOutcome {
        let key = url.trim();
        if let Some(snapshot) = self.lookup(key) {
            tracing::debug!(url = key, "snapshot cache hit");
            return ExtractionOutcome::Success(snapshot);
        }

        let outcome = self.inner.extract_product(key).await;
        if let ExtractionOutcome::Success(snapshot) = &outcome {
            self.store(key, snapshot);
        }
        outcome
    }
}
