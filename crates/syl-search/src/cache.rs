//! Response cache keyed by (namespace, normalized query).
//!
//! Entries expire after a fixed TTL and are removed lazily on the next read.
//! Capacity is enforced on insert by evicting the oldest *inserted* entry;
//! reads do not refresh an entry's position.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use syl_config::CacheConfig;
use tokio::time::Instant;

/// Injected cache interface used by the answer pipeline.
pub trait ResponseStore<T>: Send + Sync {
    /// The cached payload, or `None` when absent or expired.
    fn get(&self, namespace: &str, query: &str) -> Option<T>;

    /// Insert or replace the payload for `(namespace, query)`.
    fn set(&self, namespace: &str, query: &str, payload: T);

    /// Drop every entry.
    fn clear(&self);

    /// Number of stored entries, including expired ones not yet read.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalized cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: String,
    query: String,
}

impl CacheKey {
    /// Lowercase, collapse whitespace and drop trailing `?`, `!` and `.`.
    #[must_use]
    pub fn new(namespace: &str, query: &str) -> Self {
        let query = query
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let query = query.trim_end_matches(['?', '!', '.']).trim_end().to_string();
        Self {
            namespace: namespace.trim().to_lowercase(),
            query,
        }
    }
}

#[derive(Debug)]
struct CacheEntry<T> {
    payload: T,
    created_at: Instant,
}

#[derive(Debug)]
struct Inner<T> {
    entries: HashMap<CacheKey, CacheEntry<T>>,
    order: VecDeque<CacheKey>,
}

impl<T> Inner<T> {
    fn remove(&mut self, key: &CacheKey) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}

/// In-process [`ResponseStore`] with TTL and insertion-order eviction.
#[derive(Debug)]
pub struct MemoryResponseStore<T> {
    inner: Mutex<Inner<T>>,
    ttl: Duration,
    max_entries: usize,
}

impl<T> MemoryResponseStore<T> {
    /// `max_entries` of zero is treated as one.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }
}

impl<T: Clone + Send> ResponseStore<T> for MemoryResponseStore<T> {
    fn get(&self, namespace: &str, query: &str) -> Option<T> {
        let key = CacheKey::new(namespace, query);
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let expired = {
            let entry = inner.entries.get(&key)?;
            entry.created_at.elapsed() >= self.ttl
        };
        if expired {
            tracing::debug!(namespace, "cache entry expired");
            inner.remove(&key);
            return None;
        }
        inner.entries.get(&key).map(|entry| entry.payload.clone())
    }

    fn set(&self, namespace: &str, query: &str, payload: T) {
        let key = CacheKey::new(namespace, query);
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if inner.entries.contains_key(&key) {
            inner.remove(&key);
        }
        while inner.entries.len() >= self.max_entries {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                payload,
                created_at: Instant::now(),
            },
        );
    }

    fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.entries.clear();
        inner.order.clear();
    }

    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(ttl_ms: u64, max_entries: usize) -> MemoryResponseStore<String> {
        MemoryResponseStore::new(Duration::from_millis(ttl_ms), max_entries)
    }

    #[tokio::test(start_paused = true)]
    async fn set_then_get_returns_payload() {
        let cache = store(1_000, 4);
        cache.set("default", "When is the exam?", "week 12".to_string());
        assert_eq!(cache.get("default", "When is the exam?").as_deref(), Some("week 12"));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = store(1_000, 4);
        cache.set("default", "q", "payload".to_string());

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(cache.get("default", "q").is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.get("default", "q").is_none());
        assert_eq!(cache.len(), 0, "expired entry is removed on read");
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_is_never_exceeded() {
        let cache = store(60_000, 3);
        for i in 0..4 {
            cache.set("ns", &format!("query {i}"), i.to_string());
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.get("ns", "query 0").is_none(), "oldest insert evicted");
        assert!(cache.get("ns", "query 3").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn reads_do_not_refresh_eviction_order() {
        let cache = store(60_000, 2);
        cache.set("ns", "a", "1".to_string());
        cache.set("ns", "b", "2".to_string());
        assert!(cache.get("ns", "a").is_some());
        cache.set("ns", "c", "3".to_string());

        assert!(cache.get("ns", "a").is_none());
        assert!(cache.get("ns", "b").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn rewriting_a_key_replaces_without_growth() {
        let cache = store(60_000, 2);
        cache.set("ns", "a", "old".to_string());
        cache.set("ns", "a", "new".to_string());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("ns", "a").as_deref(), Some("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_normalized_and_namespaced() {
        let cache = store(60_000, 8);
        cache.set("Default", "  What modules   are in Year 1? ", "x".to_string());

        assert!(cache.get("default", "what modules are in year 1").is_some());
        assert!(cache.get("other", "what modules are in year 1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_empties_store() {
        let cache = store(60_000, 8);
        cache.set("ns", "a", "1".to_string());
        cache.set("ns", "b", "2".to_string());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("ns", "a").is_none());
    }
}
