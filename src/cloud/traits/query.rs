// ABOUTME: Analytics query operations trait.
// ABOUTME: Start a query and read back its execution state.

use super::shared_types::{QueryExecution, QueryRequest};
use crate::cloud::CloudError;
use async_trait::async_trait;

#[async_trait]
pub trait QueryOps: Send + Sync {
    /// Start a query, returning its execution id.
    async fn start_query(&self, request: &QueryRequest) -> Result<String, CloudError>;

    async fn query_execution(&self, id: &str) -> Result<QueryExecution, CloudError>;
}
