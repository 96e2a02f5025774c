// File: src/cache/ttl_cache.rs

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key/value store where every entry expires a fixed time after insertion.
///
/// Reads never return an expired value: the deadline is checked on `get`.
/// Each insert also schedules one deferred removal at its deadline so
/// entries that are never read again do not pile up. That removal only
/// fires if the entry still carries the deadline it was scheduled for, so
/// a fresh insert for the same key is never evicted early.
#[derive(Clone)]
pub struct TtlCache<K, V>
where
    K: Eq + Hash,
{
    entries: Arc<DashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > now {
                return Some(entry.value.clone());
            }
        }
        // Expired but its timer has not fired yet.
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.entries.insert(key.clone(), CacheEntry { value, expires_at });
        self.schedule_removal(key, expires_at);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn schedule_removal(&self, key: K, expires_at: Instant) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            trace!("No runtime for deferred cache removal; relying on read-time expiry");
            return;
        };
        let entries = Arc::clone(&self.entries);
        handle.spawn(async move {
            tokio::time::sleep_until(expires_at).await;
            entries.remove_if(&key, |_, entry| entry.expires_at == expires_at);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn value_is_served_until_deadline() {
        let cache: TtlCache<String, String> = TtlCache::new(Duration::from_secs(60));
        cache.insert("Foo".into(), "abc".into());

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(cache.get(&"Foo".to_string()).as_deref(), Some("abc"));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(cache.get(&"Foo".to_string()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn deferred_removal_empties_the_map() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_millis(500));
        cache.insert(1, 10);
        assert_eq!(cache.len(), 1);

        tokio::time::sleep(Duration::from_millis(501)).await;
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_does_not_evict_a_fresh_insert() {
        let cache: TtlCache<u32, u32> = TtlCache::new(Duration::from_millis(1000));
        cache.insert(7, 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        cache.insert(7, 2);

        // First timer fires at t=1000 and must leave the second entry alone.
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(cache.get(&7), Some(2));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(cache.get(&7), None);
    }

    #[test]
    fn works_without_a_runtime() {
        let cache: TtlCache<&'static str, i32> = TtlCache::new(Duration::from_secs(5));
        cache.insert("k", 3);
        assert_eq!(cache.get(&"k"), Some(3));
    }
}
