//! High-level database service layer.
//!
//! Repository-agnostic operations used by the HTTP handlers. Business rules
//! that must hold for every backend live here: results are computed before
//! storage, every upload is checksummed, and threshold exceedances are logged.
//!
//! # Usage
//!
//! ```no_run
//! use hpi_rust::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let samples = services::list_samples(&repo).await?;
//!     println!("Found {} samples", samples.len());
//!     Ok(())
//! }
//! ```

use log::{info, warn};

use super::checksum::calculate_checksum;
use super::repository::{FullRepository, RepositoryResult};
use crate::models::{
    FileFormat, IndicesSummary, NewBatch, SampleId, SampleInput, SampleRecord, ScoredSample,
    UploadBatch,
};
use crate::services::alerts::count_exceedances;
use crate::services::calculator::PollutionCalculator;

// ==================== Health & Connection ====================

pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Samples ====================

/// Score parsed samples and store them as one upload batch.
///
/// # Arguments
/// * `file_name` - Name the client gave the uploaded file
/// * `content` - Raw uploaded bytes, used for the batch checksum
/// * `samples` - Rows parsed from `content`
///
/// # Returns
/// The stored records in input order, each with its assigned id.
pub async fn ingest_samples<R: FullRepository + ?Sized>(
    repo: &R,
    calculator: &PollutionCalculator,
    file_name: &str,
    format: FileFormat,
    content: &[u8],
    samples: &[SampleInput],
) -> RepositoryResult<Vec<SampleRecord>> {
    let scored: Vec<ScoredSample> = samples
        .iter()
        .map(|input| ScoredSample {
            input: *input,
            result: calculator.evaluate(&input.concentrations),
        })
        .collect();

    let batch = NewBatch {
        file_name: file_name.to_string(),
        format,
        checksum: calculate_checksum(content),
    };

    let (stored, records) = repo.store_batch(&batch, &scored).await?;
    info!(
        "Stored batch {} ('{}', {}, checksum {}): {} samples",
        stored.batch_id,
        stored.file_name,
        stored.format,
        stored.checksum,
        stored.sample_count
    );

    match repo.get_alert_config().await {
        Ok(config) => {
            let exceeding = count_exceedances(&records, &config);
            if exceeding > 0 {
                warn!(
                    "Batch {}: {} of {} samples exceed alert thresholds (HPI >= {}, Cd >= {})",
                    stored.batch_id,
                    exceeding,
                    records.len(),
                    config.hpi_threshold,
                    config.cd_threshold
                );
            }
        }
        Err(e) => warn!("Could not load alert config for exceedance check: {}", e),
    }

    Ok(records)
}

pub async fn list_samples<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<SampleRecord>> {
    repo.list_samples().await
}

pub async fn get_sample<R: FullRepository + ?Sized>(
    repo: &R,
    sample_id: SampleId,
) -> RepositoryResult<SampleRecord> {
    repo.get_sample(sample_id).await
}

pub async fn list_batches<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<UploadBatch>> {
    repo.list_batches().await
}

/// Averages and category counts over every stored sample.
pub async fn indices_summary<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<IndicesSummary> {
    let samples = repo.list_samples().await?;
    Ok(IndicesSummary::from_samples(&samples))
}
