//! PubMed website engine
//!
//! Submits the term to the public search page and reads the result count
//! from the rendered HTML, the same element a person sees above the
//! results list.

use super::traits::*;
use crate::config::SearchSettings;
use crate::error::SearchError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

const DEFAULT_URL: &str = "https://pubmed.ncbi.nlm.nih.gov/";

static RESULT_AMOUNT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.results-amount > h3 > span.value").expect("valid selector")
});

static RESULT_COUNT_META: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="log_resultcount"]"#).expect("valid selector"));

static NO_RESULTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.results-amount .empty").expect("valid selector"));

/// A lone match redirects straight to the article page, e.g. `/31452104/`
static ARTICLE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^/]+/\d+/?(?:\?.*)?$").expect("valid regex"));

/// PubMed web search engine
pub struct PubMedWeb {
    base_url: String,
}

impl PubMedWeb {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
        }
    }

    /// Digits of a displayed count such as "1,234"
    fn parse_amount(text: &str) -> Option<u64> {
        let digits: String = text.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            None
        } else {
            digits.parse().ok()
        }
    }

    fn parse_html_count(html: &str) -> Option<u64> {
        let document = Html::parse_document(html);

        if let Some(element) = document.select(&RESULT_AMOUNT).next() {
            return Self::parse_amount(&element.text().collect::<String>());
        }

        if let Some(element) = document.select(&RESULT_COUNT_META).next() {
            if let Some(count) = element.value().attr("content").and_then(Self::parse_amount) {
                return Some(count);
            }
        }

        if document.select(&NO_RESULTS).next().is_some() || html.contains("No results were found") {
            return Some(0);
        }

        None
    }
}

impl Default for PubMedWeb {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for PubMedWeb {
    fn name(&self) -> &str {
        "pubmed_web"
    }

    fn request(&self, term: &str) -> Result<EngineRequest, SearchError> {
        Ok(EngineRequest::get(&self.base_url).param("term", term))
    }

    fn response(&self, response: EngineResponse) -> Result<u64, SearchError> {
        response.check_status()?;

        if ARTICLE_PATH.is_match(&response.url) {
            return Ok(1);
        }

        match Self::parse_html_count(&response.text) {
            Some(count) => Ok(count),
            None if response.is_captcha() => Err(SearchError::Captcha),
            None => Err(SearchError::ResultCount(
                "result count element not found".to_string(),
            )),
        }
    }

    fn init(&mut self, settings: &SearchSettings) -> Result<(), SearchError> {
        if let Some(ref base_url) = settings.base_url {
            self.base_url = base_url.clone();
        }
        Ok(())
    }
}
