//! Service layer: index calculation, hotspot prediction, alerting and export.
//!
//! These modules hold the domain rules. Storage orchestration lives in
//! [`crate::db::services`] and HTTP concerns in `crate::http`.

pub mod alerts;
pub mod calculator;
pub mod export;
pub mod hotspot;

pub use alerts::{
    notifier_from_settings, send_alert, update_alert_config, AlertError, AlertMessage,
    AlertNotifier, AlertSettings, LogNotifier, WebhookNotifier,
};
pub use calculator::{
    calculate_degree_of_contamination, calculate_hpi, PermissibleLimits, PollutionCalculator,
};
pub use export::samples_to_csv;
pub use hotspot::{HotspotModel, HotspotSettings};
