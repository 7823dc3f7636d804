//! Sample repository trait: upload batches and computed results.

use async_trait::async_trait;
use serde::Serialize;

use super::error::RepositoryResult;
use crate::models::{NewBatch, SampleId, SampleRecord, ScoredSample, UploadBatch};

/// Connection pool statistics reported by pooled backends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub connections_in_use: u32,
    pub idle_connections: u32,
    pub total_connections: u32,
    pub max_size: u32,
    pub total_queries: u64,
    pub failed_queries: u64,
    pub retried_operations: u64,
}

/// Storage operations for water samples.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// Check if the storage backend is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if healthy
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Pool statistics, for backends that hold a connection pool.
    fn pool_stats(&self) -> Option<PoolStats> {
        None
    }

    /// Store one upload and all of its scored samples atomically.
    ///
    /// Sample ids are assigned here, strictly increasing across calls.
    ///
    /// # Returns
    /// The stored batch and the stored samples, in input order.
    async fn store_batch(
        &self,
        batch: &NewBatch,
        samples: &[ScoredSample],
    ) -> RepositoryResult<(UploadBatch, Vec<SampleRecord>)>;

    /// All stored samples ordered by id.
    async fn list_samples(&self) -> RepositoryResult<Vec<SampleRecord>>;

    /// One stored sample.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` if the id is unknown
    async fn get_sample(&self, sample_id: SampleId) -> RepositoryResult<SampleRecord>;

    /// All upload batches ordered by id.
    async fn list_batches(&self) -> RepositoryResult<Vec<UploadBatch>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;

    #[test]
    fn test_in_memory_backend_has_no_pool() {
        assert!(LocalRepository::new().pool_stats().is_none());
    }

    #[test]
    fn test_pool_stats_field_names() {
        let stats = PoolStats {
            connections_in_use: 2,
            idle_connections: 3,
            total_connections: 5,
            max_size: 10,
            ..PoolStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["connections_in_use"], 2);
        assert_eq!(json["max_size"], 10);
        assert_eq!(json["failed_queries"], 0);
    }
}
