//! Time-bounded query result cache.
//!
//! Entries are kept until [`QueryCache::clear`] runs; an entry older than the
//! TTL is treated as absent and overwritten by the next computation. Each
//! clear starts a new generation, and a computation that began in an earlier
//! generation is returned to its caller but never stored.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::keys::QueryKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

pub(crate) const METRIC_CACHE_HIT_TOTAL: &str = "vetrina_query_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS_TOTAL: &str = "vetrina_query_cache_miss_total";
pub(crate) const METRIC_CACHE_CLEAR_TOTAL: &str = "vetrina_query_cache_clear_total";
pub(crate) const METRIC_CACHE_ENTRIES: &str = "vetrina_query_cache_entries";
pub(crate) const METRIC_QUERY_COMPUTE_MS: &str = "vetrina_query_compute_ms";

struct CacheEntry<V> {
    value: Arc<V>,
    computed_at: Instant,
}

/// Point-in-time counters for a cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct QueryCache<V> {
    name: &'static str,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<QueryKey, CacheEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    generation: AtomicU64,
}

impl<V> QueryCache<V> {
    pub fn new(name: &'static str) -> Self {
        Self::with_clock(name, Arc::new(SystemClock))
    }

    pub fn with_clock(name: &'static str, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            clock,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            generation: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Return the cached value for `key` if it was computed less than `ttl` ago.
    pub fn get(&self, key: &QueryKey, ttl: Duration) -> Option<Arc<V>> {
        let now = self.clock.now();
        let entries = rw_read(&self.entries, SOURCE, "get");
        let value = entries
            .get(key)
            .filter(|entry| now.saturating_duration_since(entry.computed_at) < ttl)
            .map(|entry| Arc::clone(&entry.value));
        drop(entries);

        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            counter!(METRIC_CACHE_HIT_TOTAL, "cache" => self.name).increment(1);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            counter!(METRIC_CACHE_MISS_TOTAL, "cache" => self.name).increment(1);
        }
        value
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: QueryKey, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            computed_at: self.clock.now(),
        };
        let mut entries = rw_write(&self.entries, SOURCE, "insert");
        entries.insert(key, entry);
        gauge!(METRIC_CACHE_ENTRIES, "cache" => self.name).set(entries.len() as f64);
        value
    }

    /// Serve `key` from the cache or run `compute` and remember its result.
    ///
    /// `compute` runs without holding the lock; concurrent misses for the same
    /// key may both compute and the last writer wins. A result whose
    /// computation overlapped a [`QueryCache::clear`] is returned uncached.
    pub fn get_or_compute<E, F>(&self, key: &QueryKey, ttl: Duration, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key, ttl) {
            debug!(cache = self.name, key = %key, "Query cache hit");
            return Ok(value);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let started_at = Instant::now();
        let value = compute()?;
        histogram!(METRIC_QUERY_COMPUTE_MS, "cache" => self.name)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        match self.insert_if_current(key, value, generation) {
            Ok(value) => {
                debug!(cache = self.name, key = %key, "Query cache miss; stored fresh result");
                Ok(value)
            }
            Err(value) => {
                debug!(
                    cache = self.name,
                    key = %key,
                    "Cache cleared during computation; result not stored"
                );
                Ok(value)
            }
        }
    }

    /// Store under the write lock only while no clear has happened since
    /// `generation` was read; otherwise hand the value back unstored.
    fn insert_if_current(
        &self,
        key: &QueryKey,
        value: V,
        generation: u64,
    ) -> Result<Arc<V>, Arc<V>> {
        let value = Arc::new(value);
        let mut entries = rw_write(&self.entries, SOURCE, "insert_if_current");
        if self.generation.load(Ordering::Acquire) != generation {
            return Err(value);
        }
        entries.insert(
            key.clone(),
            CacheEntry {
                value: Arc::clone(&value),
                computed_at: self.clock.now(),
            },
        );
        gauge!(METRIC_CACHE_ENTRIES, "cache" => self.name).set(entries.len() as f64);
        Ok(value)
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = rw_write(&self.entries, SOURCE, "clear");
        self.generation.fetch_add(1, Ordering::AcqRel);
        let removed = entries.len();
        entries.clear();
        drop(entries);

        counter!(METRIC_CACHE_CLEAR_TOTAL, "cache" => self.name).increment(1);
        gauge!(METRIC_CACHE_ENTRIES, "cache" => self.name).set(0.0);
        debug!(cache = self.name, removed, "Query cache cleared");
        removed
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
