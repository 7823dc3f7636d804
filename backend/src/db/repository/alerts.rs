//! Alert repository trait: configuration and dispatch history.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{AlertConfig, AlertDispatch};

#[async_trait]
pub trait AlertRepository: Send + Sync {
    /// The saved alert configuration, or [`AlertConfig::default`] if none was saved.
    async fn get_alert_config(&self) -> RepositoryResult<AlertConfig>;

    /// Replace the alert configuration. Returns what was stored.
    async fn save_alert_config(&self, config: &AlertConfig) -> RepositoryResult<AlertConfig>;

    /// Append a dispatch attempt to the history.
    async fn record_dispatch(&self, dispatch: &AlertDispatch) -> RepositoryResult<()>;

    /// Dispatch history, newest first.
    async fn list_dispatches(&self) -> RepositoryResult<Vec<AlertDispatch>>;
}
