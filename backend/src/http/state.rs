//! Application state for the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::repository::FullRepository;
use crate::services::{
    notifier_from_settings, AlertError, AlertNotifier, HotspotModel, LogNotifier,
    PollutionCalculator,
};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    pub calculator: PollutionCalculator,
    pub hotspot_model: HotspotModel,
    /// Delivers alerts; the log notifier unless a webhook is configured
    pub notifier: Arc<dyn AlertNotifier>,
    /// Front-end assets served under `/app`
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// State with default standards, hotspot settings and the log notifier.
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        let defaults = AppConfig::default();
        let calculator = PollutionCalculator::default();
        Self {
            repository,
            calculator,
            hotspot_model: HotspotModel::new(defaults.hotspot, calculator),
            notifier: Arc::new(LogNotifier),
            static_dir: None,
            max_upload_bytes: defaults.server.max_upload_bytes,
        }
    }

    /// State built from the loaded service configuration.
    pub fn from_config(
        repository: Arc<dyn FullRepository>,
        config: &AppConfig,
    ) -> Result<Self, AlertError> {
        let calculator = PollutionCalculator::new(config.standards);
        Ok(Self {
            repository,
            calculator,
            hotspot_model: HotspotModel::new(config.hotspot, calculator),
            notifier: notifier_from_settings(&config.alerts)?,
            static_dir: config.server.static_dir.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn AlertNotifier>) -> Self {
        self.notifier = notifier;
        self
    }
}
