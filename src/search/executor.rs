//! Search execution against a count engine

use super::traits::SearchCapability;
use crate::config::Settings;
use crate::engines::{Engine, EngineLoader};
use crate::error::SearchError;
use crate::metrics::Metrics;
use crate::network::{ClientProfile, HttpClient};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Runs searches through one engine, throttled to the configured request rate
pub struct EngineSearch {
    /// HTTP client for making requests
    client: HttpClient,
    /// Engine that builds requests and reads counts
    engine: Box<dyn Engine>,
    /// Request throttle
    limiter: Option<DirectLimiter>,
    /// Shared run metrics
    metrics: Arc<Metrics>,
}

impl EngineSearch {
    /// Create a new search executor
    pub fn new(client: HttpClient, engine: Box<dyn Engine>) -> Self {
        Self {
            client,
            engine,
            limiter: None,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Build the engine, client, and throttle described by the settings
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let engine = EngineLoader::load(&settings.search)?;
        let profile = match engine.name() {
            "pubmed_web" => ClientProfile::Browser,
            _ => ClientProfile::Api,
        };
        let client = HttpClient::with_settings(&settings.outgoing, &settings.search, profile)?;
        let rate = settings.search.effective_rate();
        info!("Searching with {} at up to {} requests/s", engine.name(), rate);

        Ok(Self::new(client, engine).with_rate_limit(rate))
    }

    /// Allow at most `per_second` requests per second; 0 disables the throttle
    pub fn with_rate_limit(mut self, per_second: u32) -> Self {
        self.limiter = NonZeroU32::new(per_second).map(|n| RateLimiter::direct(Quota::per_second(n)));
        self
    }

    /// Share a metrics collector with other components
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    async fn count(&self, query: &str) -> Result<u64, SearchError> {
        let request = self.engine.request(query)?;
        let response = self.client.execute(request).await?;
        self.engine.response(response)
    }
}

#[async_trait]
impl SearchCapability for EngineSearch {
    fn name(&self) -> &str {
        self.engine.name()
    }

    async fn execute_search(&self, query: &str) -> Result<u64, SearchError> {
        if let Some(ref limiter) = self.limiter {
            limiter.until_ready().await;
        }

        let start = Instant::now();
        let result = self.count(query).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(count) => {
                self.metrics.record_search(elapsed);
                debug!(
                    "Engine {} counted {} results in {:?}",
                    self.engine.name(),
                    count,
                    elapsed
                );
            }
            Err(e) => {
                self.metrics.record_failure();
                warn!("Search with {} failed: {}", self.engine.name(), e);
            }
        }

        result
    }
}
