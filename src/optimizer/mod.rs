//! Query optimization
//!
//! [`Optimizer`] drives the pruning loop over a parsed query and produces an
//! [`OptimizationReport`].

mod executor;
mod models;

pub use executor::Optimizer;
pub use models::{GroupOutcome, GroupReport, OptimizationReport};
