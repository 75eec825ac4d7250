use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Keyed results that expire after a fixed TTL. There is no per-key
/// locking: two concurrent misses on the same key both recompute.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached value, only while it is younger than the TTL.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.write().await.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops every entry; returns how many there were.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_fresh_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("matches", 7u32).await;
        assert_eq!(cache.get("matches").await, Some(7));
        assert_eq!(cache.get("matches_basic").await, None);
    }

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("matches", 7u32).await;
        assert_eq!(cache.get("matches").await, None);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("a", 1u32).await;
        cache.insert("b", 2u32).await;
        assert_eq!(cache.clear().await, 2);
        assert_eq!(cache.get("a").await, None);
    }
}
