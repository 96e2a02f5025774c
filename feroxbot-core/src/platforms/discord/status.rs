use std::sync::Arc;
use std::time::{Duration, Instant};

use twilight_cache_inmemory::DefaultInMemoryCache;

use feroxbot_common::traits::api::ClientStatus;

/// [`ClientStatus`] read from the gateway cache the shard runners keep up
/// to date.
pub struct CachedClientStatus {
    cache: Arc<DefaultInMemoryCache>,
    started_at: Instant,
}

impl CachedClientStatus {
    pub fn new(cache: Arc<DefaultInMemoryCache>) -> Self {
        Self {
            cache,
            started_at: Instant::now(),
        }
    }
}

impl ClientStatus for CachedClientStatus {
    fn guild_count(&self) -> usize {
        self.cache.stats().guilds()
    }

    fn member_count(&self) -> u64 {
        self.cache
            .iter()
            .guilds()
            .map(|guild| guild.value().member_count().unwrap_or(0))
            .sum()
    }

    fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_reports_nothing() {
        let status = CachedClientStatus::new(Arc::new(DefaultInMemoryCache::new()));
        assert_eq!(status.guild_count(), 0);
        assert_eq!(status.member_count(), 0);
        assert!(status.uptime() < Duration::from_secs(60));
    }
}
