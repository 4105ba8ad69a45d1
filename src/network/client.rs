//! HTTP client for making requests to PubMed

use super::user_agent::{accept_html, accept_json, browser_user_agent, tool_user_agent};
use crate::config::{OutgoingSettings, SearchSettings};
use crate::engines::{EngineRequest, EngineResponse, HttpMethod};
use crate::error::SearchError;
use anyhow::Result;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// Which kind of agent the client presents itself as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientProfile {
    /// Descriptive tool agent, JSON accept header (E-utilities)
    Api,
    /// Browser-like agent, HTML accept header (pubmed.ncbi.nlm.nih.gov)
    Browser,
}

/// HTTP client wrapper with optimizer-specific configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
    accept: &'static str,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new(profile: ClientProfile) -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default(), &SearchSettings::default(), profile)
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(
        outgoing: &OutgoingSettings,
        search: &SearchSettings,
        profile: ClientProfile,
    ) -> Result<Self> {
        let timeout = Duration::from_secs_f64(outgoing.request_timeout);
        let mut builder = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(outgoing.pool_maxsize)
            .cookie_store(true)
            .gzip(true)
            .brotli(true);

        // SSL verification
        if !outgoing.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = outgoing.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = outgoing.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = outgoing.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        let suffix = outgoing.useragent_suffix.as_deref();
        let (user_agent, accept) = match profile {
            ClientProfile::Api => (tool_user_agent(&search.tool, suffix), accept_json()),
            ClientProfile::Browser => (browser_user_agent(suffix), accept_html()),
        };

        Ok(Self {
            client,
            default_timeout: timeout,
            user_agent,
            accept,
            extra_headers: outgoing.extra_headers.clone(),
        })
    }

    /// Execute an engine request
    pub async fn execute(&self, request: EngineRequest) -> Result<EngineResponse, SearchError> {
        self.execute_with_timeout(request, self.default_timeout).await
    }

    /// Execute an engine request with custom timeout
    pub async fn execute_with_timeout(
        &self,
        request: EngineRequest,
        timeout: Duration,
    ) -> Result<EngineResponse, SearchError> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        req_builder = req_builder
            .timeout(timeout)
            .header("User-Agent", &self.user_agent)
            .header("Accept", self.accept)
            .header("Accept-Language", "en-US,en;q=0.9");

        for (key, value) in self.extra_headers.iter().chain(&request.headers) {
            req_builder = req_builder.header(key, value);
        }

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(ref form) = request.form {
            req_builder = req_builder.form(form);
        }

        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }

    async fn parse_response(response: Response) -> Result<EngineResponse, SearchError> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let text = response.text().await?;

        Ok(EngineResponse { status, text, url })
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
