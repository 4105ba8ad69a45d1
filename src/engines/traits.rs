//! Count engine trait and the request/response types it trades in

use crate::config::SearchSettings;
use crate::error::SearchError;
use std::collections::HashMap;

/// Request an engine wants sent; the HTTP client owns the transport
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    /// Query string
    pub params: Vec<(String, String)>,
    /// `application/x-www-form-urlencoded` body
    pub form: Option<Vec<(String, String)>>,
}

impl EngineRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: HashMap::new(),
            params: Vec::new(),
            form: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// First query or form value for `key`
    pub fn value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .chain(self.form.iter().flatten())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// What came back for an [`EngineRequest`]
#[derive(Debug)]
pub struct EngineResponse {
    pub status: u16,
    pub text: String,
    /// Final URL after redirects
    pub url: String,
}

impl EngineResponse {
    /// Decode the body as JSON; a malformed body is an unreadable count
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, SearchError> {
        serde_json::from_str(&self.text)
            .map_err(|e| SearchError::ResultCount(format!("invalid JSON: {}", e)))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    /// PubMed answers bot traffic with a challenge page rather than an error
    pub fn is_captcha(&self) -> bool {
        let lower = self.text.to_lowercase();
        lower.contains("captcha") || lower.contains("unusual traffic")
    }

    /// Map 429 to [`SearchError::RateLimited`] and other non-2xx to [`SearchError::Http`]
    pub fn check_status(&self) -> Result<(), SearchError> {
        if self.is_rate_limited() {
            Err(SearchError::RateLimited)
        } else if !self.is_success() {
            Err(SearchError::Http(self.status))
        } else {
            Ok(())
        }
    }
}

/// A backend that can report how many PubMed records match a query.
///
/// Engines are pure translators: [`Engine::request`] turns a query into an
/// HTTP request and [`Engine::response`] turns the reply into a count. The
/// caller does the I/O, throttling, and caching.
pub trait Engine: Send + Sync {
    fn name(&self) -> &str;

    fn request(&self, term: &str) -> Result<EngineRequest, SearchError>;

    fn response(&self, response: EngineResponse) -> Result<u64, SearchError>;

    /// Apply settings; called once by the loader
    fn init(&mut self, _settings: &SearchSettings) -> Result<(), SearchError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, text: &str) -> EngineResponse {
        EngineResponse {
            status,
            text: text.to_string(),
            url: "https://example.org".to_string(),
        }
    }

    #[test]
    fn test_request_builder() {
        let request = EngineRequest::post("https://example.org")
            .param("db", "pubmed")
            .form_field("term", "cancer");

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.value("db"), Some("pubmed"));
        assert_eq!(request.value("term"), Some("cancer"));
        assert_eq!(request.value("missing"), None);
    }

    #[test]
    fn test_check_status() {
        assert!(response(200, "").check_status().is_ok());
        assert_eq!(
            response(429, "").check_status(),
            Err(SearchError::RateLimited)
        );
        assert_eq!(response(502, "").check_status(), Err(SearchError::Http(502)));
    }

    #[test]
    fn test_captcha_detection_ignores_case() {
        assert!(response(200, "<title>Captcha check</title>").is_captcha());
        assert!(!response(200, "<h3>42 results</h3>").is_captcha());
    }
}
