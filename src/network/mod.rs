//! HTTP networking module
//!
//! Provides the HTTP client the PubMed engines run their requests through.

mod client;
mod user_agent;

pub use client::{ClientProfile, HttpClient};
pub use user_agent::{browser_user_agent, tool_user_agent};
