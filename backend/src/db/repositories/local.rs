//! In-memory local repository implementation.
//!
//! All data lives in memory behind a single lock, which makes it the default
//! backend for local development and the backend every test uses.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::{
    AlertConfig, AlertDispatch, BatchId, NewBatch, SampleId, SampleRecord, ScoredSample,
    UploadBatch,
};

/// In-memory local repository.
///
/// Cloning is cheap and every clone shares the same data.
///
/// # Example
/// ```ignore
/// use hpi_rust::db::repositories::LocalRepository;
///
/// #[tokio::test]
/// async fn test_sample_storage() {
///     let repo = LocalRepository::new();
///     let (batch, records) = repo.store_batch(&new_batch, &scored).await.unwrap();
///     assert_eq!(repo.sample_count(), records.len());
/// }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    samples: Vec<SampleRecord>,
    batches: Vec<UploadBatch>,
    alert_config: Option<AlertConfig>,
    dispatches: Vec<AlertDispatch>,

    next_sample_id: i64,
    next_batch_id: i64,

    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            batches: Vec::new(),
            alert_config: None,
            dispatches: Vec::new(),
            next_sample_id: 1,
            next_batch_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data, keeping the health flag.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn sample_count(&self) -> usize {
        self.data.read().samples.len()
    }

    pub fn batch_count(&self) -> usize {
        self.data.read().batches.len()
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Repository is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SampleRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn store_batch(
        &self,
        batch: &NewBatch,
        samples: &[ScoredSample],
    ) -> RepositoryResult<(UploadBatch, Vec<SampleRecord>)> {
        self.check_health("store_batch")?;

        let mut data = self.data.write();

        let batch_id = BatchId::new(data.next_batch_id);
        data.next_batch_id += 1;

        let first_id = data.next_sample_id;
        let records: Vec<SampleRecord> = samples
            .iter()
            .enumerate()
            .map(|(offset, scored)| {
                SampleRecord::from_scored(SampleId::new(first_id + offset as i64), batch_id, scored)
            })
            .collect();
        data.next_sample_id += records.len() as i64;

        let stored = UploadBatch {
            batch_id,
            file_name: batch.file_name.clone(),
            format: batch.format,
            checksum: batch.checksum.clone(),
            sample_count: records.len(),
            uploaded_at: Utc::now(),
        };

        data.batches.push(stored.clone());
        data.samples.extend(records.iter().cloned());

        Ok((stored, records))
    }

    async fn list_samples(&self) -> RepositoryResult<Vec<SampleRecord>> {
        self.check_health("list_samples")?;
        // Ids are assigned in insertion order, so the vector is already sorted.
        Ok(self.data.read().samples.clone())
    }

    async fn get_sample(&self, sample_id: SampleId) -> RepositoryResult<SampleRecord> {
        self.check_health("get_sample")?;
        let data = self.data.read();
        data.samples
            .binary_search_by_key(&sample_id, |s| s.id)
            .map(|idx| data.samples[idx].clone())
            .map_err(|_| {
                RepositoryError::not_found_with_context(
                    format!("Sample {} not found", sample_id),
                    ErrorContext::new("get_sample")
                        .with_entity("sample")
                        .with_entity_id(sample_id),
                )
            })
    }

    async fn list_batches(&self) -> RepositoryResult<Vec<UploadBatch>> {
        self.check_health("list_batches")?;
        Ok(self.data.read().batches.clone())
    }
}

#[async_trait]
impl AlertRepository for LocalRepository {
    async fn get_alert_config(&self) -> RepositoryResult<AlertConfig> {
        self.check_health("get_alert_config")?;
        Ok(self.data.read().alert_config.clone().unwrap_or_default())
    }

    async fn save_alert_config(&self, config: &AlertConfig) -> RepositoryResult<AlertConfig> {
        self.check_health("save_alert_config")?;
        self.data.write().alert_config = Some(config.clone());
        Ok(config.clone())
    }

    async fn record_dispatch(&self, dispatch: &AlertDispatch) -> RepositoryResult<()> {
        self.check_health("record_dispatch")?;
        self.data.write().dispatches.push(dispatch.clone());
        Ok(())
    }

    async fn list_dispatches(&self) -> RepositoryResult<Vec<AlertDispatch>> {
        self.check_health("list_dispatches")?;
        let mut dispatches = self.data.read().dispatches.clone();
        dispatches.reverse();
        Ok(dispatches)
    }
}
