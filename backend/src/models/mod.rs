//! Domain models shared by the parsing, service, repository and HTTP layers.

pub mod alert;
pub mod batch;
pub mod hotspot;
pub mod macros;
pub mod sample;
pub mod summary;

pub use alert::{AlertChannel, AlertConfig, AlertDispatch, DispatchStatus};
pub use batch::{FileFormat, NewBatch, UploadBatch};
pub use hotspot::{EstimateBasis, HotspotPrediction, RiskCategory};
pub use sample::{
    BatchId, CdCategory, HpiCategory, Metal, MetalConcentrations, PollutionResult, SampleId,
    SampleInput, SampleRecord, ScoredSample,
};
pub use summary::IndicesSummary;
