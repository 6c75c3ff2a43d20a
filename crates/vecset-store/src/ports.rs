use async_trait::async_trait;
use vecset_core::error::Result;
use vecset_core::models::{DocumentRecord, IndexDescription, IndexStats, Metric};

/// Port for a remote vector index service
///
/// Errors that may clear up on their own (timeouts, rate limiting, unavailable
/// servers) are reported as `VecsetError::TransientUpload`; everything else is
/// treated as permanent by callers.
#[async_trait]
pub trait IndexService: Send + Sync {
    /// Check whether an index with this name exists
    async fn index_exists(&self, name: &str) -> Result<bool>;

    /// Describe an existing index
    /// Returns `IndexNotFound` when the index does not exist
    async fn describe_index(&self, name: &str) -> Result<IndexDescription>;

    /// Create an index and wait until it accepts writes
    async fn create_index(&self, name: &str, dimension: usize, metric: Metric) -> Result<()>;

    /// Insert or overwrite records by id
    /// Returns the number of records the service acknowledged
    async fn upsert(&self, index: &str, namespace: &str, records: &[DocumentRecord])
        -> Result<usize>;

    /// Vector counts for the whole index and per namespace
    async fn describe_index_stats(&self, name: &str) -> Result<IndexStats>;
}
