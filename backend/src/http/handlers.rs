//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use super::dto::{
    AlertConfig, AlertDispatch, HealthResponse, HotspotPrediction, IndicesSummary,
    SampleRecord, SendAlertRequest, SendAlertResponse, UploadBatch, WelcomeResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::repository::{AlertRepository, SampleRepository};
use crate::db::services as db_services;
use crate::models::SampleId;
use crate::parsing;
use crate::routes::alerts::{SEND_ALERT, UPDATE_ALERT_CONFIG};
use crate::routes::ingest::{parse_upload, UploadKind, FILE_FIELD, NO_FILE_MESSAGE};
use crate::services::{alerts, export};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Landing & Health
// =============================================================================

/// GET /
pub async fn welcome(State(state): State<AppState>) -> Json<WelcomeResponse> {
    Json(WelcomeResponse::new(state.static_dir.is_some()))
}

/// GET /health
///
/// Verify the service is running and the repository is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        pool: state.repository.pool_stats(),
    }))
}

// =============================================================================
// Uploads
// =============================================================================

/// File part of a multipart upload.
struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Take the `file` field from a multipart body, skipping any other fields.
async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(UploadedFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::BadRequest(NO_FILE_MESSAGE.to_string()))
}

/// Detect the format and parse the upload off the async runtime.
async fn parse_uploaded(
    upload: &UploadedFile,
    kind: UploadKind,
) -> Result<(parsing::FileFormat, Vec<crate::models::SampleInput>), AppError> {
    let format = parsing::detect_format(upload.content_type.as_deref(), upload.file_name.as_deref())?;
    let bytes = upload.bytes.clone();

    let rows = tokio::task::spawn_blocking(move || parse_upload(kind, format, &bytes)).await??;
    tracing::debug!(
        "{}: parsed {} rows from {} upload '{}'",
        kind.operation(),
        rows.len(),
        format,
        upload.file_name.as_deref().unwrap_or("<unnamed>")
    );

    Ok((format, rows))
}

/// POST /api/v1/upload-and-calculate/
///
/// Parse a sample table, compute HPI and Cd per row, store the rows as one
/// batch and return the stored records.
pub async fn upload_and_calculate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> HandlerResult<Vec<SampleRecord>> {
    let upload = read_upload(multipart).await?;
    let (format, samples) = parse_uploaded(&upload, UploadKind::Samples).await?;

    let records = db_services::ingest_samples(
        state.repository.as_ref(),
        &state.calculator,
        upload.file_name.as_deref().unwrap_or("upload"),
        format,
        &upload.bytes,
        &samples,
    )
    .await?;

    Ok(Json(records))
}

/// POST /api/v1/predict-hotspots/
///
/// Score each uploaded location against the stored samples. Nothing is stored.
pub async fn predict_hotspots(
    State(state): State<AppState>,
    multipart: Multipart,
) -> HandlerResult<Vec<HotspotPrediction>> {
    let upload = read_upload(multipart).await?;
    let (_, locations) = parse_uploaded(&upload, UploadKind::Locations).await?;

    let samples = db_services::list_samples(state.repository.as_ref()).await?;
    let model = state.hotspot_model;
    let predictions =
        tokio::task::spawn_blocking(move || model.predict_all(&locations, &samples)).await?;

    Ok(Json(predictions))
}

// =============================================================================
// Datasets
// =============================================================================

/// GET /api/v1/datasets/
pub async fn list_datasets(State(state): State<AppState>) -> HandlerResult<Vec<SampleRecord>> {
    let samples = db_services::list_samples(state.repository.as_ref()).await?;
    Ok(Json(samples))
}

/// GET /api/v1/datasets/{sample_id}
pub async fn get_dataset(
    State(state): State<AppState>,
    Path(sample_id): Path<i64>,
) -> HandlerResult<SampleRecord> {
    let sample = db_services::get_sample(state.repository.as_ref(), SampleId::new(sample_id)).await?;
    Ok(Json(sample))
}

/// GET /api/v1/datasets/batches
pub async fn list_batches(State(state): State<AppState>) -> HandlerResult<Vec<UploadBatch>> {
    let batches = db_services::list_batches(state.repository.as_ref()).await?;
    Ok(Json(batches))
}

/// GET /api/v1/datasets/export.csv
pub async fn export_datasets(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let samples = db_services::list_samples(state.repository.as_ref()).await?;
    let body = export::samples_to_csv(&samples)
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export::EXPORT_FILE_NAME),
            ),
        ],
        body,
    ))
}

/// GET /api/v1/indices/
pub async fn get_indices(State(state): State<AppState>) -> HandlerResult<IndicesSummary> {
    let summary = db_services::indices_summary(state.repository.as_ref()).await?;
    Ok(Json(summary))
}

// =============================================================================
// Alerts
// =============================================================================

/// GET /api/v1/alerts/config
pub async fn get_alert_config(State(state): State<AppState>) -> HandlerResult<AlertConfig> {
    let config = state.repository.get_alert_config().await?;
    Ok(Json(config))
}

/// PUT /api/v1/alerts/config
pub async fn update_alert_config(
    State(state): State<AppState>,
    Json(config): Json<AlertConfig>,
) -> HandlerResult<AlertConfig> {
    let saved = alerts::update_alert_config(state.repository.as_ref(), config).await?;
    tracing::info!(
        "{}: hpi >= {}, cd >= {}",
        UPDATE_ALERT_CONFIG,
        saved.hpi_threshold,
        saved.cd_threshold
    );
    Ok(Json(saved))
}

/// POST /api/v1/alerts/send
pub async fn send_alert(
    State(state): State<AppState>,
    Json(request): Json<SendAlertRequest>,
) -> HandlerResult<SendAlertResponse> {
    let dispatch = alerts::send_alert(
        state.repository.as_ref(),
        state.notifier.as_ref(),
        &request.channel,
        &request.message,
    )
    .await?;

    tracing::info!(
        "{}: alert {} via {}: {} ({} exceeding samples)",
        SEND_ALERT,
        dispatch.dispatch_id,
        dispatch.channel,
        dispatch.status.as_str(),
        dispatch.hotspot_count
    );
    Ok(Json(SendAlertResponse::from(&dispatch)))
}

/// GET /api/v1/alerts/history
pub async fn alert_history(State(state): State<AppState>) -> HandlerResult<Vec<AlertDispatch>> {
    let dispatches = state.repository.list_dispatches().await?;
    Ok(Json(dispatches))
}
