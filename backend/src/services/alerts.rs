//! Alert configuration rules and dispatch.
//!
//! Sending an alert counts the stored samples that exceed the configured
//! thresholds, hands the alert to an [`AlertNotifier`] and records the attempt.
//! Two notifiers exist: [`LogNotifier`] writes the alert to the log, and
//! [`WebhookNotifier`] POSTs it as JSON to a configured URL.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::{AlertChannel, AlertConfig, AlertDispatch, DispatchStatus, SampleRecord};

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Invalid channel: {0}. Use 'email' or 'sms'.")]
    InvalidChannel(String),

    #[error("Invalid alert configuration: {0}")]
    InvalidConfig(String),

    #[error("Alert delivery via {notifier} failed: {message}")]
    Delivery {
        notifier: &'static str,
        message: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// `[alerts]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Deliver alerts to this URL instead of the log.
    pub webhook_url: Option<String>,
    pub webhook_timeout_sec: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_timeout_sec: 10,
        }
    }
}

/// Payload handed to a notifier, and the JSON body of webhook deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub dispatch_id: Uuid,
    pub channel: AlertChannel,
    pub recipients: Vec<String>,
    pub message: String,
    pub hotspot_count: usize,
}

#[async_trait]
pub trait AlertNotifier: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn deliver(&self, alert: &AlertMessage) -> Result<(), AlertError>;
}

/// Writes alerts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl AlertNotifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, alert: &AlertMessage) -> Result<(), AlertError> {
        log::info!(
            "ALERT {} [{}] to {}: {} ({} samples above thresholds)",
            alert.dispatch_id,
            alert.channel,
            alert.recipients.join(", "),
            alert.message,
            alert.hotspot_count
        );
        Ok(())
    }
}

/// POSTs alerts as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlertError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AlertNotifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, alert: &AlertMessage) -> Result<(), AlertError> {
        let delivery_error = |message: String| AlertError::Delivery {
            notifier: "webhook",
            message,
        };

        let response = self
            .client
            .post(&self.url)
            .json(alert)
            .send()
            .await
            .map_err(|e| delivery_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(delivery_error(format!("HTTP {}: {}", status, body.trim())));
        }
        Ok(())
    }
}

/// The webhook notifier when a URL is configured, the log notifier otherwise.
pub fn notifier_from_settings(settings: &AlertSettings) -> Result<Arc<dyn AlertNotifier>, AlertError> {
    match settings.webhook_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            let notifier =
                WebhookNotifier::new(url, Duration::from_secs(settings.webhook_timeout_sec))?;
            Ok(Arc::new(notifier))
        }
        _ => Ok(Arc::new(LogNotifier)),
    }
}

/// Split a comma-separated recipient list, dropping empty entries.
pub fn split_recipients(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_valid_email(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !address.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn is_valid_phone(number: &str) -> bool {
    let digits = number.strip_prefix('+').unwrap_or(number);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Validate a submitted configuration and normalize its recipient lists.
pub fn normalize_config(config: AlertConfig) -> Result<AlertConfig, AlertError> {
    for (name, value) in [
        ("hpi_threshold", config.hpi_threshold),
        ("cd_threshold", config.cd_threshold),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(AlertError::InvalidConfig(format!(
                "{} must be a non-negative number",
                name
            )));
        }
    }

    let emails = split_recipients(&config.email_recipients);
    if let Some(bad) = emails.iter().find(|e| !is_valid_email(e)) {
        return Err(AlertError::InvalidConfig(format!(
            "'{}' is not a valid email address",
            bad
        )));
    }

    let phones = split_recipients(&config.sms_recipients);
    if let Some(bad) = phones.iter().find(|p| !is_valid_phone(p)) {
        return Err(AlertError::InvalidConfig(format!(
            "'{}' is not a valid phone number",
            bad
        )));
    }

    let policy = match config.policy {
        serde_json::Value::Null => serde_json::Value::Object(Default::default()),
        policy @ serde_json::Value::Object(_) => policy,
        _ => {
            return Err(AlertError::InvalidConfig(
                "policy must be a JSON object".to_string(),
            ))
        }
    };

    Ok(AlertConfig {
        hpi_threshold: config.hpi_threshold,
        cd_threshold: config.cd_threshold,
        email_recipients: emails.join(","),
        sms_recipients: phones.join(","),
        policy,
    })
}

/// Samples whose HPI or Cd reaches the configured threshold.
pub fn count_exceedances(samples: &[SampleRecord], config: &AlertConfig) -> usize {
    samples
        .iter()
        .filter(|s| {
            s.result.heavy_metal_pollution_index >= config.hpi_threshold
                || s.result.degree_of_contamination >= config.cd_threshold
        })
        .count()
}

/// Validate and store a new alert configuration.
pub async fn update_alert_config<R: FullRepository + ?Sized>(
    repo: &R,
    config: AlertConfig,
) -> Result<AlertConfig, AlertError> {
    let config = normalize_config(config)?;
    let saved = repo.save_alert_config(&config).await?;
    log::info!(
        "Alert config updated: HPI >= {}, Cd >= {}, {} email / {} sms recipients",
        saved.hpi_threshold,
        saved.cd_threshold,
        split_recipients(&saved.email_recipients).len(),
        split_recipients(&saved.sms_recipients).len()
    );
    Ok(saved)
}

/// Send an alert on `channel` and record the attempt.
///
/// With no recipients configured for the channel nothing is delivered and the
/// record is `skipped`. A notifier failure is recorded as `failed` and returned
/// as [`AlertError::Delivery`].
pub async fn send_alert<R: FullRepository + ?Sized>(
    repo: &R,
    notifier: &dyn AlertNotifier,
    channel: &str,
    message: &str,
) -> Result<AlertDispatch, AlertError> {
    let channel: AlertChannel = channel.parse().map_err(AlertError::InvalidChannel)?;
    let config = repo.get_alert_config().await?;
    let samples = repo.list_samples().await?;

    let recipients = config.recipients_for(channel).to_string();
    let mut dispatch = AlertDispatch {
        dispatch_id: Uuid::new_v4(),
        channel,
        recipients: recipients.clone(),
        message: message.to_string(),
        hotspot_count: count_exceedances(&samples, &config),
        status: DispatchStatus::Skipped,
        created_at: Utc::now(),
    };

    let recipient_list = split_recipients(&recipients);
    if recipient_list.is_empty() {
        log::warn!("Alert {} skipped: no {} recipients configured", dispatch.dispatch_id, channel);
        repo.record_dispatch(&dispatch).await?;
        return Ok(dispatch);
    }

    let alert = AlertMessage {
        dispatch_id: dispatch.dispatch_id,
        channel,
        recipients: recipient_list,
        message: dispatch.message.clone(),
        hotspot_count: dispatch.hotspot_count,
    };

    match notifier.deliver(&alert).await {
        Ok(()) => {
            dispatch.status = DispatchStatus::Sent;
            repo.record_dispatch(&dispatch).await?;
            Ok(dispatch)
        }
        Err(e) => {
            log::error!("Alert {} failed: {}", dispatch.dispatch_id, e);
            dispatch.status = DispatchStatus::Failed;
            repo.record_dispatch(&dispatch).await?;
            Err(e)
        }
    }
}
