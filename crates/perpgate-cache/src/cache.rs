//! Generic TTL key/value store with size-bound eviction and
//! tag-based invalidation.
//!
//! Design points:
//! - Expiry is lazy: an expired entry is removed on the `get` that
//!   observes it, and that `get` counts as a miss.
//! - Eviction is insertion-ordered, not LRU: when a NEW key would push
//!   the store past `max_size`, the oldest-inserted live entry is
//!   dropped. No access-time tracking.
//! - Replacing an existing key restamps its TTL but keeps its original
//!   insertion rank.
//! - All operations are total; there is no error path.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Cumulative cache statistics since construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub current_size: usize,
}

/// One stored entry.
#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
    tags: Vec<String>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) >= self.ttl
    }
}

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    /// Keys in insertion order. Kept in sync with `entries` on every
    /// removal path, so the queue never outgrows the live set.
    order: VecDeque<String>,
}

/// Process-wide TTL cache, safe for concurrent use from request tasks.
///
/// Map and insertion-order queue sit behind one mutex; no lock is ever
/// held across an await point because the cache performs no I/O.
/// Hit/miss counters are atomics so `stats()` never contends with
/// writers.
#[derive(Debug)]
pub struct ResponseCache<V> {
    inner: Mutex<Inner<V>>,
    max_size: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache holding at most `max_size` live entries.
    pub fn new(max_size: usize) -> Self {
        assert!(max_size > 0, "cache max_size must be non-zero");
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_size,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up `key`, returning the value iff it exists and its TTL has
    /// not elapsed. An expired entry is removed as a side effect and
    /// reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) => {
                if !entry.is_expired(now) {
                    let value = entry.value.clone();
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(value);
                }
                true
            }
            None => false,
        };

        if expired {
            inner.entries.remove(key);
            inner.order.retain(|k| k.as_str() != key);
            debug!(key, "cache entry expired");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert or replace the entry for `key`, stamping `stored_at = now`.
    ///
    /// Inserting a NEW key while the store holds `max_size` live
    /// entries first evicts the oldest-inserted entry.
    pub fn set(&self, key: &str, value: V, ttl: Duration, tags: &[&str]) {
        let mut inner = self.inner.lock();

        let is_new = !inner.entries.contains_key(key);
        if is_new && inner.entries.len() >= self.max_size {
            Self::evict_oldest(&mut inner);
        }

        let entry = Entry {
            value,
            stored_at: Instant::now(),
            ttl,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        };

        if is_new {
            inner.order.push_back(key.to_string());
        }
        inner.entries.insert(key.to_string(), entry);
    }

    /// Remove every entry whose key equals `pattern`, matches a
    /// trailing-`*` prefix pattern, or whose tag set contains
    /// `pattern`. Returns the number of entries removed.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let mut inner = self.inner.lock();

        let matches = |key: &str, tags: &[String]| -> bool {
            if let Some(prefix) = pattern.strip_suffix('*') {
                if key.starts_with(prefix) {
                    return true;
                }
            } else if key == pattern {
                return true;
            }
            tags.iter().any(|t| t == pattern)
        };

        let doomed: Vec<String> = inner
            .entries
            .iter()
            .filter(|(key, entry)| matches(key, &entry.tags))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            inner.entries.remove(key);
        }

        if !doomed.is_empty() {
            let Inner { entries, order } = &mut *inner;
            order.retain(|k| entries.contains_key(k));
            debug!(pattern, removed = doomed.len(), "cache invalidated");
        }
        doomed.len()
    }

    /// Drop all entries unconditionally.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// Cumulative hit/miss counters plus current live-entry count.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            current_size: self.inner.lock().entries.len(),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pop insertion-order entries until one still live is found, and
    /// remove it.
    fn evict_oldest(inner: &mut Inner<V>) {
        while let Some(oldest) = inner.order.pop_front() {
            if inner.entries.remove(&oldest).is_some() {
                debug!(key = %oldest, "cache evicted oldest entry");
                return;
            }
        }
    }
}
