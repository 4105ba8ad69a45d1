//! NCBI E-utilities `esearch` engine
//!
//! Asks the official API for the number of PubMed records matching a term
//! (`rettype=count`), so no result pages are transferred.

use super::traits::*;
use crate::config::SearchSettings;
use crate::error::SearchError;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";

/// Terms longer than this are sent as a POST form to stay under URL limits
const MAX_GET_TERM_LEN: usize = 1500;

/// E-utilities count engine
pub struct ESearch {
    api_url: String,
    api_key: Option<String>,
    tool: Option<String>,
    email: Option<String>,
}

impl ESearch {
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_URL.to_string(),
            api_key: None,
            tool: None,
            email: None,
        }
    }

    fn parse_count(text: &str) -> Result<u64, SearchError> {
        text.trim()
            .parse()
            .map_err(|_| SearchError::ResultCount(format!("count {:?} is not a number", text)))
    }
}

impl Default for ESearch {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    esearchresult: Option<ESearchResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    count: Option<String>,
    #[serde(rename = "ERROR")]
    error: Option<String>,
    querytranslation: Option<String>,
}

impl Engine for ESearch {
    fn name(&self) -> &str {
        "esearch"
    }

    fn request(&self, term: &str) -> Result<EngineRequest, SearchError> {
        let mut request = if term.len() > MAX_GET_TERM_LEN {
            EngineRequest::post(&self.api_url).form_field("term", term)
        } else {
            EngineRequest::get(&self.api_url).param("term", term)
        };

        request = request
            .param("db", "pubmed")
            .param("retmode", "json")
            .param("rettype", "count");

        if let Some(ref key) = self.api_key {
            request = request.param("api_key", key);
        }
        if let Some(ref tool) = self.tool {
            request = request.param("tool", tool);
        }
        if let Some(ref email) = self.email {
            request = request.param("email", email);
        }

        Ok(request)
    }

    fn response(&self, response: EngineResponse) -> Result<u64, SearchError> {
        response.check_status()?;

        let envelope: Envelope = response.json()?;
        if let Some(error) = envelope.error {
            if error.to_lowercase().contains("rate limit") {
                return Err(SearchError::RateLimited);
            }
            return Err(SearchError::ResultCount(error));
        }

        let result = envelope
            .esearchresult
            .ok_or_else(|| SearchError::ResultCount("missing esearchresult".to_string()))?;

        if let Some(error) = result.error {
            return Err(SearchError::ResultCount(error));
        }
        if let Some(ref translation) = result.querytranslation {
            debug!("PubMed translated query to: {}", translation);
        }

        let count = result
            .count
            .ok_or_else(|| SearchError::ResultCount("missing count".to_string()))?;
        Self::parse_count(&count)
    }

    fn init(&mut self, settings: &SearchSettings) -> Result<(), SearchError> {
        if let Some(ref base_url) = settings.base_url {
            self.api_url = base_url.clone();
        }
        self.api_key = settings.api_key.clone();
        self.tool = Some(settings.tool.clone()).filter(|t| !t.is_empty());
        self.email = settings.email.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> EngineResponse {
        EngineResponse {
            status,
            text: body.to_string(),
            url: DEFAULT_URL.to_string(),
        }
    }

    #[test]
    fn test_esearch_request() {
        let engine = ESearch::new();
        let request = engine.request("cancer OR neoplasm").unwrap();

        assert!(request.url.contains("eutils.ncbi.nlm.nih.gov"));
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.value("term"), Some("cancer OR neoplasm"));
        assert_eq!(request.value("db"), Some("pubmed"));
        assert_eq!(request.value("rettype"), Some("count"));
        assert_eq!(request.value("api_key"), None);
    }

    #[test]
    fn test_long_term_is_posted() {
        let engine = ESearch::new();
        let term = vec!["(keyword)"; 400].join(" OR ");
        let request = engine.request(&term).unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert!(request.params.iter().all(|(k, _)| k != "term"));
        assert_eq!(request.value("term"), Some(term.as_str()));
    }

    #[test]
    fn test_init_applies_settings() {
        let mut engine = ESearch::new();
        let settings = SearchSettings {
            base_url: Some("http://localhost:9999/esearch".to_string()),
            api_key: Some("k".to_string()),
            email: Some("me@example.org".to_string()),
            ..Default::default()
        };
        engine.init(&settings).unwrap();

        let request = engine.request("x").unwrap();
        assert_eq!(request.url, "http://localhost:9999/esearch");
        assert_eq!(request.value("api_key"), Some("k"));
        assert_eq!(request.value("tool"), Some("pubmed-query-optimizer"));
        assert_eq!(request.value("email"), Some("me@example.org"));
    }

    #[test]
    fn test_parse_count() {
        let engine = ESearch::new();
        let body = r#"{"header":{"type":"esearch"},"esearchresult":{"count":"48213","retmax":"0","retstart":"0","idlist":[],"querytranslation":"cancer[All Fields]"}}"#;
        assert_eq!(engine.response(response(200, body)), Ok(48213));
    }

    #[test]
    fn test_api_errors() {
        let engine = ESearch::new();

        let body = r#"{"esearchresult":{"ERROR":"Invalid query"}}"#;
        assert_eq!(
            engine.response(response(200, body)),
            Err(SearchError::ResultCount("Invalid query".to_string()))
        );

        let body = r#"{"error":"API rate limit exceeded","count":"11"}"#;
        assert_eq!(
            engine.response(response(200, body)),
            Err(SearchError::RateLimited)
        );

        assert_eq!(
            engine.response(response(429, "")),
            Err(SearchError::RateLimited)
        );
        assert!(matches!(
            engine.response(response(200, "<html>")),
            Err(SearchError::ResultCount(_))
        ));
    }
}
