//! The search capability the optimizer depends on

use crate::error::SearchError;
use async_trait::async_trait;

/// Something that can tell how many records a query matches.
///
/// Calls are awaited one at a time; implementations may assume no two
/// searches are in flight together.
#[async_trait]
pub trait SearchCapability: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Run `query` and return its result count
    async fn execute_search(&self, query: &str) -> Result<u64, SearchError>;
}
