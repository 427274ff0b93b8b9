use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

// ─── Errors ──────────────────────────────────────────────────────

/// Caller misuse caught synchronously at the call site.
/// A miss is a normal `None`, never an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("ttl must be greater than zero")]
    ZeroTtl,
}

// ─── Store ───────────────────────────────────────────────────────

/// String-keyed, TTL-expiring value store with prefix invalidation.
///
/// Backs read-through callers that cache expensive aggregate query results
/// (the leaderboard service keys entries like `"leaderboard:{scope}:{limit}:{offset}"`
/// and invalidates the whole family with [`clear_by_prefix`] on every
/// score-changing write).
///
/// Expiry is lazy: an entry past its deadline reads as absent but keeps its
/// memory until it is overwritten, deleted, cleared, or swept by an explicit
/// [`purge_expired`] call. There is no background sweeper, so memory is
/// bounded by live key cardinality.
///
/// [`clear_by_prefix`]: TtlCache::clear_by_prefix
/// [`purge_expired`]: TtlCache::purge_expired
pub struct TtlCache<V> {
    inner: Mutex<HashMap<String, CacheEntry<V>>>,
}

/// One stored value with its expiry deadline. Built by `set`, never mutated.
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

// ─── TtlCache impl ───────────────────────────────────────────────

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Store `value` under `key` for `ttl`, unconditionally replacing any
    /// prior entry. A zero TTL is caller misuse and is rejected up front.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.set_at(key.into(), value, ttl, Instant::now())
    }

    fn set_at(
        &self,
        key: String,
        value: V,
        ttl: Duration,
        now: Instant,
    ) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::ZeroTtl);
        }
        self.inner.lock().insert(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    /// Remove a single entry. Returns whether one was physically present,
    /// expired or not.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().remove(key).is_some()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut entries = self.inner.lock();
        let removed = entries.len();
        entries.clear();
        debug!(removed, "cache cleared");
    }

    /// Remove every entry whose key starts with `prefix`; returns how many
    /// were dropped. Entries not matching are untouched.
    ///
    /// Mutation paths use this to invalidate an entire family of derived
    /// keys without enumerating the scope/limit/offset combinations.
    pub fn clear_by_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.inner.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        debug!(prefix, removed, "cache prefix invalidated");
        removed
    }

    /// Explicit reclamation pass: drop entries already past their deadline
    /// and return how many were reclaimed. Never runs implicitly, and
    /// `get`/`set` results are the same whether or not it ever runs.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.inner.lock();
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "expired cache entries purged");
        }
        removed
    }

    /// Physical entry count — expired-but-unswept entries included.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl<V: Clone> TtlCache<V> {
    /// Value stored under `key`, if present and not past its deadline.
    /// An expired entry reads as if the key were never set.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let entries = self.inner.lock();
        entries
            .get(key)
            .filter(|entry| now <= entry.expires_at)
            .map(|entry| entry.value.clone())
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────
