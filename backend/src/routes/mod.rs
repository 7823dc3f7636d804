//! Route-level request/response types and operation names.
//!
//! Each submodule groups the payloads of one area of the API. The axum
//! handlers in `crate::http` translate between these types and the services.

pub mod alerts;
pub mod ingest;
pub mod landing;

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_structure() {
        assert_eq!(super::ingest::UPLOAD_AND_CALCULATE, "upload_and_calculate");
        assert_eq!(super::ingest::PREDICT_HOTSPOTS, "predict_hotspots");
        assert_eq!(super::alerts::SEND_ALERT, "send_alert");
        assert_eq!(super::alerts::UPDATE_ALERT_CONFIG, "update_alert_config");
        assert_eq!(super::landing::WELCOME, "welcome");
    }
}
