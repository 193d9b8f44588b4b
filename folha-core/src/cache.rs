//! Caller-owned cache for reference data.
//!
//! Bracket tables and parameters change a few times a year but are read on
//! every calculation, so retrieval layers keep a short-lived copy. The cache
//! is an explicit object owned by whoever fetches the data — the calculators
//! never see it and stay state-free. Entries expire after a fixed TTL and can
//! be invalidated eagerly when an administrator edits the reference tables.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::debug;

struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
}

/// A read-through cache: key → {value, fetched_at}, with a TTL check on read.
pub struct ReferenceCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K: Eq + Hash, V> ReferenceCache<K, V> {
    /// Creates an empty cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Returns the cached value, or `None` when absent or expired. Expired
    /// entries are left in place; `put` overwrites them on the next fetch.
    pub fn get(
        &self,
        key: &K,
    ) -> Option<&V> {
        let entry = self.entries.get(key)?;
        if entry.fetched_at.elapsed() >= self.ttl {
            debug!("reference cache entry expired");
            return None;
        }
        Some(&entry.value)
    }

    /// Stores a freshly fetched value, resetting its TTL.
    pub fn put(
        &mut self,
        key: K,
        value: V,
    ) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drops one entry, forcing the next read to go to storage.
    pub fn invalidate(
        &mut self,
        key: &K,
    ) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
