//! Public API surface for the service.
//!
//! Consolidates the types that appear in HTTP request and response bodies.
//! All of them derive Serialize/Deserialize.

pub use crate::models::{
    AlertChannel, AlertConfig, AlertDispatch, BatchId, CdCategory, DispatchStatus,
    EstimateBasis, FileFormat, HotspotPrediction, HpiCategory, IndicesSummary,
    MetalConcentrations, PollutionResult, RiskCategory, SampleId, SampleInput, SampleRecord,
    UploadBatch,
};
pub use crate::routes::alerts::{SendAlertRequest, SendAlertResponse};
pub use crate::routes::landing::WelcomeResponse;
pub use crate::services::{PermissibleLimits, HotspotSettings};
