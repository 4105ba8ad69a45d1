//! Search module
//!
//! The optimizer only sees [`SearchCapability`]; this module provides the
//! engine-backed implementation and the cache that can sit in front of it.

mod cached;
mod executor;
mod traits;

pub use cached::CachedSearch;
pub use executor::EngineSearch;
pub use traits::SearchCapability;

use crate::cache::CountCache;
use crate::config::Settings;
use crate::metrics::Metrics;
use std::sync::Arc;

/// Assemble the search capability described by the settings
pub fn from_settings(
    settings: &Settings,
    metrics: Arc<Metrics>,
) -> anyhow::Result<Box<dyn SearchCapability>> {
    let search = EngineSearch::from_settings(settings)?.with_metrics(metrics.clone());

    if !settings.search.cache {
        return Ok(Box::new(search));
    }

    let cache = CountCache::new(settings.search.cache_ttl, settings.search.cache_capacity);
    Ok(Box::new(CachedSearch::new(search, cache).with_metrics(metrics)))
}
