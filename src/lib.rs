//! PubMed query optimizer
//!
//! Parses a PubMed boolean query, finds the innermost OR groups of plain
//! keywords, and drops every keyword whose removal leaves the query's result
//! count unchanged. Counts come from a [`SearchCapability`]; the bundled ones
//! talk to NCBI E-utilities or scrape the PubMed website.

pub mod cache;
pub mod config;
pub mod engines;
pub mod error;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod query;
pub mod search;

pub use config::Settings;
pub use error::{OptimizationError, ParseError, SearchError};
pub use optimizer::{OptimizationReport, Optimizer};
pub use query::{find_minimal_groups, parse, render, QueryNode};
pub use search::SearchCapability;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
