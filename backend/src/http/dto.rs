//! Data Transfer Objects for the HTTP API.
//!
//! Most payloads are domain models or route types that already derive
//! Serialize/Deserialize and are re-exported here.

use serde::Serialize;

use crate::db::repository::PoolStats;

pub use crate::api::{
    // Alerts
    AlertConfig, AlertDispatch, SendAlertRequest, SendAlertResponse,
    // Datasets
    IndicesSummary, SampleRecord, UploadBatch,
    // Hotspots
    HotspotPrediction,
    // Landing
    WelcomeResponse,
};

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `connected`, `disconnected` or `error: <reason>`
    pub database: String,
    /// Present for pooled backends only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolStats>,
}
