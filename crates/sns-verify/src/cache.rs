//! Bounded certificate cache: signing certificate URL to PEM text.
//!
//! Entries never expire; the least recently used entry is evicted once the
//! cache holds more than its capacity. Pending maintenance is flushed on
//! every insert so that eviction is visible as soon as `insert` returns.

use std::sync::Arc;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tracing::debug;

/// Default number of certificates kept.
pub const DEFAULT_MAX_CERTS: u64 = 1000;

/// LRU map from certificate URL to PEM text. Cloning shares the entries.
#[derive(Clone)]
pub struct CertificateCache {
    inner: Option<Cache<String, Arc<str>>>,
    capacity: u64,
}

impl CertificateCache {
    pub fn new(capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            inner: Some(inner),
            capacity,
        }
    }

    /// A cache that stores nothing: every lookup misses.
    pub fn disabled() -> Self {
        Self {
            inner: None,
            capacity: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Look up a certificate, marking it most recently used.
    pub fn get(&self, url: &str) -> Option<Arc<str>> {
        let hit = self.inner.as_ref()?.get(url);
        debug!(url = %url, hit = hit.is_some(), "certificate cache lookup");
        hit
    }

    pub fn insert(&self, url: impl Into<String>, pem: impl Into<Arc<str>>) {
        let Some(inner) = &self.inner else {
            return;
        };
        inner.insert(url.into(), pem.into());
        inner.run_pending_tasks();
    }

    /// Presence check that does not affect recency.
    pub fn contains(&self, url: &str) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| inner.contains_key(url))
    }

    pub fn len(&self) -> u64 {
        match &self.inner {
            Some(inner) => {
                inner.run_pending_tasks();
                inner.entry_count()
            }
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(inner) = &self.inner {
            inner.invalidate_all();
            inner.run_pending_tasks();
        }
    }
}

impl Default for CertificateCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CERTS)
    }
}

impl std::fmt::Debug for CertificateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertificateCache")
            .field("enabled", &self.is_enabled())
            .field("capacity", &self.capacity)
            .finish()
    }
}
