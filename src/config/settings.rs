//! Settings structures for the optimizer

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// Main settings structure, read from `pubmed-optimizer.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("PUBMED_OPTIMIZER_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = var("PUBMED_OPTIMIZER_ENGINE") {
            self.search.engine = val;
        }
        if let Some(val) = var("PUBMED_OPTIMIZER_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.outgoing.request_timeout = timeout;
            }
        }
        if let Some(val) = var("NCBI_API_KEY") {
            self.search.api_key = Some(val);
        }
        if let Some(val) = var("NCBI_EMAIL") {
            self.search.email = Some(val);
        }
    }

    /// Reject values that would only fail later, mid-run
    pub fn validate(&self) -> Result<()> {
        if let Some(ref base_url) = self.search.base_url {
            Url::parse(base_url).with_context(|| format!("invalid search.base_url {base_url:?}"))?;
        }
        if self.outgoing.request_timeout <= 0.0 {
            anyhow::bail!("outgoing.request_timeout must be positive");
        }
        if self.search.requests_per_second == Some(0) {
            anyhow::bail!("search.requests_per_second must be at least 1");
        }
        Ok(())
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Search backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Engine used to count results (`esearch` or `pubmed_web`)
    pub engine: String,
    /// Override the engine's endpoint (mirrors, tests)
    pub base_url: Option<String>,
    /// NCBI API key, raises the request allowance
    pub api_key: Option<String>,
    /// Tool name reported to NCBI
    pub tool: String,
    /// Contact address reported to NCBI
    pub email: Option<String>,
    /// Request budget; defaults to NCBI's limits
    pub requests_per_second: Option<u32>,
    /// Memoize counts per query for the run
    pub cache: bool,
    /// Cache entry lifetime in seconds
    pub cache_ttl: u64,
    /// Maximum number of cached counts
    pub cache_capacity: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            engine: "esearch".to_string(),
            base_url: None,
            api_key: None,
            tool: "pubmed-query-optimizer".to_string(),
            email: None,
            requests_per_second: None,
            cache: true,
            cache_ttl: 3600,
            cache_capacity: 10_000,
        }
    }
}

impl SearchSettings {
    /// NCBI allows 3 requests per second, 10 with an API key
    pub fn effective_rate(&self) -> u32 {
        self.requests_per_second
            .unwrap_or(if self.api_key.is_some() { 10 } else { 3 })
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Appended to the generated user agent
    pub useragent_suffix: Option<String>,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            useragent_suffix: None,
            pool_maxsize: 4,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}
