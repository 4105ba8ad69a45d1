//! Caching module
//!
//! Memoizes result counts per rendered query. The optimizer re-issues the
//! query it just accepted as the next group's baseline, so a hit here saves
//! a round trip to PubMed.

use moka::future::Cache;
use std::time::Duration;

/// Cache of result counts keyed by engine and query
pub struct CountCache {
    cache: Cache<String, u64>,
}

impl CountCache {
    /// Create a new count cache with specified TTL
    pub fn new(ttl_seconds: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        Self { cache }
    }

    /// Get a cached count
    pub async fn get(&self, engine: &str, query: &str) -> Option<u64> {
        self.cache.get(&count_cache_key(engine, query)).await
    }

    /// Store a count
    pub async fn set(&self, engine: &str, query: &str, count: u64) {
        self.cache.insert(count_cache_key(engine, query), count).await;
    }
}

/// Generate a cache key for a query sent to an engine
pub fn count_cache_key(engine: &str, query: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(engine.as_bytes());
    hasher.update([0u8]);
    hasher.update(query.as_bytes());

    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_count_cache() {
        let cache = CountCache::new(60, 100);
        cache.set("esearch", "(a) OR (b)", 42).await;

        assert_eq!(cache.get("esearch", "(a) OR (b)").await, Some(42));
        assert_eq!(cache.get("pubmed_web", "(a) OR (b)").await, None);
        assert_eq!(cache.get("esearch", "(a)").await, None);
    }

    #[test]
    fn test_key_separates_engine_and_query() {
        assert_ne!(count_cache_key("ab", "c"), count_cache_key("a", "bc"));
    }
}
