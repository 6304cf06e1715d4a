//! # Bounded LRU Blob Store
//!
//! Owns synthesized audio payloads and the playable urls minted for them.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::config::CacheConfig;
use crate::cache::stats::CacheStats;
use crate::traits::BlobUrlRegistry;

/// One cached blob.
///
/// Owned exclusively by [`AudioCache`]; the `url` is revoked exactly once,
/// when the entry leaves the store.
#[derive(Debug, Clone)]
struct CacheEntry {
    blob: Bytes,
    url: String,
    size_bytes: u64,
    last_accessed_at: DateTime<Utc>,
}

#[derive(Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    insertions: u64,
}

struct CacheInner {
    entries: LruCache<String, CacheEntry>,
    total_bytes: u64,
    counters: Counters,
}

/// In-memory, size-bounded, least-recently-used audio blob cache.
///
/// Keys are a deterministic function of normalized chunk text only — never
/// of a session id — so independent sessions asking for identical text
/// share one entry. The key *is* the normalized text: a hashed key would
/// invite silent collisions serving the wrong audio, and the text is
/// already bounded in length.
///
/// # Invariant
///
/// After any operation completes, the sum of entry sizes never exceeds the
/// configured byte budget (with one deliberate exception: a single blob
/// larger than the whole budget is still inserted after emptying the store,
/// so that oversized chunks remain playable; the next insert evicts it).
pub struct AudioCache {
    config: CacheConfig,
    registry: Arc<dyn BlobUrlRegistry>,
    inner: Mutex<CacheInner>,
}

impl AudioCache {
    /// Create a cache with the given budget, minting urls via `registry`.
    pub fn new(config: CacheConfig, registry: Arc<dyn BlobUrlRegistry>) -> Self {
        Self {
            config,
            registry,
            inner: Mutex::new(CacheInner {
                entries: LruCache::unbounded(),
                total_bytes: 0,
                counters: Counters::default(),
            }),
        }
    }

    /// Derive the cache key for a piece of chunk text.
    ///
    /// Collapses interior whitespace and trims, so cosmetic spacing
    /// differences cannot split one logical chunk across two entries.
    pub fn key_for(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Whether an entry exists for this text. Does not touch LRU order.
    pub fn has(&self, text: &str) -> bool {
        let key = Self::key_for(text);
        self.inner.lock().entries.contains(&key)
    }

    /// Look up the playable url for this text.
    ///
    /// A hit refreshes the entry's recency; this never fetches.
    pub fn get(&self, text: &str) -> Option<String> {
        let key = Self::key_for(text);
        let mut inner = self.inner.lock();
        match inner.entries.get_mut(&key) {
            Some(entry) => {
                entry.last_accessed_at = Utc::now();
                let url = entry.url.clone();
                inner.counters.hits += 1;
                Some(url)
            }
            None => {
                inner.counters.misses += 1;
                None
            }
        }
    }

    /// Store a synthesized blob and return its playable url.
    ///
    /// If an entry already exists for the derived key its url is returned
    /// unchanged — no duplicate insertion, no double-counted size. Otherwise
    /// least-recently-accessed entries are evicted (urls revoked
    /// immediately) until the new blob fits, then it is inserted.
    pub fn set(&self, text: &str, blob: Bytes) -> String {
        let key = Self::key_for(text);
        let size_bytes = blob.len() as u64;
        let mut inner = self.inner.lock();

        if let Some(existing) = inner.entries.peek(&key) {
            return existing.url.clone();
        }

        while inner.total_bytes + size_bytes > self.config.max_bytes
            && !inner.entries.is_empty()
        {
            if let Some((evicted_key, evicted)) = inner.entries.pop_lru() {
                inner.total_bytes -= evicted.size_bytes;
                inner.counters.evictions += 1;
                debug!(
                    key_len = evicted_key.len(),
                    size = evicted.size_bytes,
                    "Evicting least-recently-used audio blob"
                );
                self.registry.revoke_url(&evicted.url);
            }
        }

        if size_bytes > self.config.max_bytes {
            warn!(
                size = size_bytes,
                budget = self.config.max_bytes,
                "Caching blob larger than the entire budget"
            );
        }

        let url = self.registry.create_url(blob.clone());
        inner.entries.push(
            key,
            CacheEntry {
                blob,
                url: url.clone(),
                size_bytes,
                last_accessed_at: Utc::now(),
            },
        );
        inner.total_bytes += size_bytes;
        inner.counters.insertions += 1;
        url
    }

    /// Release every entry's url and empty the store.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        while let Some((_, entry)) = inner.entries.pop_lru() {
            self.registry.revoke_url(&entry.url);
        }
        inner.total_bytes = 0;
        debug!("Audio cache cleared");
    }

    /// Total payload bytes currently held.
    pub fn total_bytes(&self) -> u64 {
        self.inner.lock().total_bytes
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Payload bytes for a cached entry, without touching LRU order.
    pub fn peek_blob(&self, text: &str) -> Option<Bytes> {
        let key = Self::key_for(text);
        self.inner.lock().entries.peek(&key).map(|e| e.blob.clone())
    }

    /// Snapshot of cache contents and lifetime counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            total_bytes: inner.total_bytes,
            budget_bytes: self.config.max_bytes,
            hits: inner.counters.hits,
            misses: inner.counters.misses,
            evictions: inner.counters.evictions,
            insertions: inner.counters.insertions,
            calculated_at: Utc::now(),
        }
    }

    /// When the entry for this text was last accessed, if cached.
    pub fn last_accessed_at(&self, text: &str) -> Option<DateTime<Utc>> {
        let key = Self::key_for(text);
        self.inner
            .lock()
            .entries
            .peek(&key)
            .map(|e| e.last_accessed_at)
    }
}

impl Drop for AudioCache {
    fn drop(&mut self) {
        // Remaining urls are revoked on teardown so the registry never leaks.
        self.clear();
    }
}
