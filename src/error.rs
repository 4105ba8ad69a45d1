//! Error types for parsing, searching, and optimization

use crate::query::Operator;
use thiserror::Error;

/// Malformed input query. Positions are 0-based character offsets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("query is empty")]
    Empty,

    #[error("unmatched '(' at position {position}")]
    UnmatchedOpen { position: usize },

    #[error("unmatched ')' at position {position}")]
    UnmatchedClose { position: usize },

    #[error("operator {operator} at position {position} is missing an operand")]
    MissingOperand { operator: Operator, position: usize },

    #[error("expected AND, OR or NOT before position {position}")]
    MissingOperator { position: usize },

    #[error("empty group at position {position}")]
    EmptyGroup { position: usize },

    #[error("parentheses nested too deeply at position {position}")]
    TooDeep { position: usize },

    #[error("unterminated '{delimiter}' starting at position {position}")]
    Unterminated { delimiter: char, position: usize },
}

/// Failure of the external search capability
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("too many requests")]
    RateLimited,

    #[error("CAPTCHA required")]
    Captcha,

    #[error("could not read result count: {0}")]
    ResultCount(String),

    #[error("search is misconfigured: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Http(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Top-level failure of an optimization run
#[derive(Debug, Error)]
pub enum OptimizationError {
    #[error("cannot parse query {query:?}: {source}")]
    Parse {
        query: String,
        #[source]
        source: ParseError,
    },

    #[error("baseline search failed for group {group} of query {query:?}: {source}")]
    Baseline {
        query: String,
        group: String,
        #[source]
        source: SearchError,
    },
}

impl OptimizationError {
    /// The query the run was started with
    pub fn query(&self) -> &str {
        match self {
            Self::Parse { query, .. } | Self::Baseline { query, .. } => query,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_names_position() {
        let err = ParseError::MissingOperand {
            operator: Operator::And,
            position: 3,
        };
        assert_eq!(
            err.to_string(),
            "operator AND at position 3 is missing an operand"
        );
    }

    #[test]
    fn test_optimization_error_keeps_query() {
        let err = OptimizationError::Baseline {
            query: "a OR b".to_string(),
            group: "(a) OR (b)".to_string(),
            source: SearchError::Timeout,
        };
        assert_eq!(err.query(), "a OR b");
        assert!(err.to_string().contains("request timed out"));
    }
}
