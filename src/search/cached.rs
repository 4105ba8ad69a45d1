//! Count memoization in front of another search capability

use super::traits::SearchCapability;
use crate::cache::CountCache;
use crate::error::SearchError;
use crate::metrics::Metrics;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Serves repeated queries from a [`CountCache`]. Failures are not cached.
pub struct CachedSearch<S> {
    inner: S,
    cache: CountCache,
    metrics: Option<Arc<Metrics>>,
}

impl<S: SearchCapability> CachedSearch<S> {
    pub fn new(inner: S, cache: CountCache) -> Self {
        Self {
            inner,
            cache,
            metrics: None,
        }
    }

    /// Count cache hits in a shared metrics collector
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: SearchCapability> SearchCapability for CachedSearch<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn execute_search(&self, query: &str) -> Result<u64, SearchError> {
        if let Some(count) = self.cache.get(self.inner.name(), query).await {
            debug!("Cache hit ({} results) for {}", count, query);
            if let Some(ref metrics) = self.metrics {
                metrics.record_cache_hit();
            }
            return Ok(count);
        }

        let count = self.inner.execute_search(query).await?;
        self.cache.set(self.inner.name(), query, count).await;
        Ok(count)
    }
}
