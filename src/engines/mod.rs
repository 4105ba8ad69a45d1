//! Search engine module
//!
//! Defines the Engine trait and the backends that count PubMed matches.

mod loader;
mod traits;

// Engine implementations
pub mod esearch;
pub mod pubmed_web;

pub use loader::EngineLoader;
pub use traits::*;
