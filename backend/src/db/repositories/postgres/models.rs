use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{
    alert_configs, alert_dispatches, pollution_results, upload_batches, water_samples,
};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::{
    AlertConfig, AlertDispatch, BatchId, MetalConcentrations, PollutionResult, SampleId,
    SampleRecord, ScoredSample, UploadBatch,
};

/// The alert configuration table holds a single row with this key.
pub const ALERT_CONFIG_ID: i32 = 1;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = upload_batches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UploadBatchRow {
    pub batch_id: i64,
    pub file_name: String,
    pub format: String,
    pub checksum: String,
    pub sample_count: i32,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = upload_batches)]
pub struct NewUploadBatchRow {
    pub file_name: String,
    pub format: String,
    pub checksum: String,
    pub sample_count: i32,
}

impl TryFrom<UploadBatchRow> for UploadBatch {
    type Error = RepositoryError;

    fn try_from(row: UploadBatchRow) -> RepositoryResult<Self> {
        let format = row.format.parse().map_err(|e: String| {
            RepositoryError::validation_with_context(
                e,
                ErrorContext::new("decode_batch")
                    .with_entity("batch")
                    .with_entity_id(row.batch_id),
            )
        })?;

        Ok(UploadBatch {
            batch_id: BatchId::new(row.batch_id),
            file_name: row.file_name,
            format,
            checksum: row.checksum,
            sample_count: row.sample_count.max(0) as usize,
            uploaded_at: row.uploaded_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = water_samples)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at is only used for auditing in SQL
pub struct WaterSampleRow {
    pub sample_id: i64,
    pub batch_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub arsenic: Option<f64>,
    pub cadmium: Option<f64>,
    pub lead: Option<f64>,
    pub zinc: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = water_samples)]
pub struct NewWaterSampleRow {
    pub batch_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub arsenic: Option<f64>,
    pub cadmium: Option<f64>,
    pub lead: Option<f64>,
    pub zinc: Option<f64>,
}

impl NewWaterSampleRow {
    pub fn from_scored(batch_id: i64, scored: &ScoredSample) -> Self {
        let c = &scored.input.concentrations;
        Self {
            batch_id,
            latitude: scored.input.latitude,
            longitude: scored.input.longitude,
            arsenic: c.arsenic,
            cadmium: c.cadmium,
            lead: c.lead,
            zinc: c.zinc,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = pollution_results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PollutionResultRow {
    pub sample_id: i64,
    pub heavy_metal_pollution_index: f64,
    pub hpi_category: String,
    pub degree_of_contamination: f64,
    pub cd_category: String,
}

impl PollutionResultRow {
    pub fn new(sample_id: i64, result: &PollutionResult) -> Self {
        Self {
            sample_id,
            heavy_metal_pollution_index: result.heavy_metal_pollution_index,
            hpi_category: result.hpi_category.label().to_string(),
            degree_of_contamination: result.degree_of_contamination,
            cd_category: result.cd_category.label().to_string(),
        }
    }
}

/// Join a sample row with its result row.
pub fn sample_record(
    sample: WaterSampleRow,
    result: PollutionResultRow,
) -> RepositoryResult<SampleRecord> {
    let decode_error = |e: String| {
        RepositoryError::validation_with_context(
            e,
            ErrorContext::new("decode_sample")
                .with_entity("sample")
                .with_entity_id(sample.sample_id),
        )
    };

    Ok(SampleRecord {
        id: SampleId::new(sample.sample_id),
        batch_id: BatchId::new(sample.batch_id),
        latitude: sample.latitude,
        longitude: sample.longitude,
        concentrations: MetalConcentrations {
            arsenic: sample.arsenic,
            cadmium: sample.cadmium,
            lead: sample.lead,
            zinc: sample.zinc,
        },
        result: PollutionResult {
            heavy_metal_pollution_index: result.heavy_metal_pollution_index,
            hpi_category: result.hpi_category.parse().map_err(decode_error)?,
            degree_of_contamination: result.degree_of_contamination,
            cd_category: result.cd_category.parse().map_err(decode_error)?,
        },
    })
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = alert_configs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)]
pub struct AlertConfigRow {
    pub config_id: i32,
    pub hpi_threshold: f64,
    pub cd_threshold: f64,
    pub email_recipients: String,
    pub sms_recipients: String,
    pub policy: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = alert_configs)]
pub struct AlertConfigUpsert {
    pub config_id: i32,
    pub hpi_threshold: f64,
    pub cd_threshold: f64,
    pub email_recipients: String,
    pub sms_recipients: String,
    pub policy: Value,
    pub updated_at: DateTime<Utc>,
}

impl From<&AlertConfig> for AlertConfigUpsert {
    fn from(config: &AlertConfig) -> Self {
        Self {
            config_id: ALERT_CONFIG_ID,
            hpi_threshold: config.hpi_threshold,
            cd_threshold: config.cd_threshold,
            email_recipients: config.email_recipients.clone(),
            sms_recipients: config.sms_recipients.clone(),
            policy: config.policy.clone(),
            updated_at: Utc::now(),
        }
    }
}

impl From<AlertConfigRow> for AlertConfig {
    fn from(row: AlertConfigRow) -> Self {
        AlertConfig {
            hpi_threshold: row.hpi_threshold,
            cd_threshold: row.cd_threshold,
            email_recipients: row.email_recipients,
            sms_recipients: row.sms_recipients,
            policy: row.policy,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = alert_dispatches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AlertDispatchRow {
    pub dispatch_id: Uuid,
    pub channel: String,
    pub recipients: String,
    pub message: String,
    pub hotspot_count: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&AlertDispatch> for AlertDispatchRow {
    fn from(dispatch: &AlertDispatch) -> Self {
        Self {
            dispatch_id: dispatch.dispatch_id,
            channel: dispatch.channel.as_str().to_string(),
            recipients: dispatch.recipients.clone(),
            message: dispatch.message.clone(),
            hotspot_count: i32::try_from(dispatch.hotspot_count).unwrap_or(i32::MAX),
            status: dispatch.status.as_str().to_string(),
            created_at: dispatch.created_at,
        }
    }
}

impl TryFrom<AlertDispatchRow> for AlertDispatch {
    type Error = RepositoryError;

    fn try_from(row: AlertDispatchRow) -> RepositoryResult<Self> {
        let decode_error = |e: String| {
            RepositoryError::validation_with_context(
                e,
                ErrorContext::new("decode_dispatch")
                    .with_entity("alert_dispatch")
                    .with_entity_id(row.dispatch_id),
            )
        };

        Ok(AlertDispatch {
            dispatch_id: row.dispatch_id,
            channel: row.channel.parse().map_err(decode_error)?,
            recipients: row.recipients.clone(),
            message: row.message.clone(),
            hotspot_count: row.hotspot_count.max(0) as usize,
            status: row.status.parse().map_err(decode_error)?,
            created_at: row.created_at,
        })
    }
}
