//! Alert configuration and dispatch records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_HPI_THRESHOLD: f64 = 100.0;
pub const DEFAULT_CD_THRESHOLD: f64 = 3.0;

/// Thresholds and recipients used when dispatching alerts.
///
/// Recipients are comma-separated lists. `policy` is an opaque JSON object
/// reserved for region-specific routing rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub hpi_threshold: f64,
    pub cd_threshold: f64,
    pub email_recipients: String,
    pub sms_recipients: String,
    pub policy: serde_json::Value,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            hpi_threshold: DEFAULT_HPI_THRESHOLD,
            cd_threshold: DEFAULT_CD_THRESHOLD,
            email_recipients: String::new(),
            sms_recipients: String::new(),
            policy: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl AlertConfig {
    /// Recipient list configured for `channel`.
    pub fn recipients_for(&self, channel: AlertChannel) -> &str {
        match channel {
            AlertChannel::Email => &self.email_recipients,
            AlertChannel::Sms => &self.sms_recipients,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertChannel {
    Email,
    Sms,
}

impl AlertChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertChannel::Email => "email",
            AlertChannel::Sms => "sms",
        }
    }
}

impl fmt::Display for AlertChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "email" => Ok(AlertChannel::Email),
            "sms" => Ok(AlertChannel::Sms),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Sent,
    Skipped,
    Failed,
}

impl DispatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchStatus::Sent => "sent",
            DispatchStatus::Skipped => "skipped",
            DispatchStatus::Failed => "failed",
        }
    }
}

impl FromStr for DispatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(DispatchStatus::Sent),
            "skipped" => Ok(DispatchStatus::Skipped),
            "failed" => Ok(DispatchStatus::Failed),
            other => Err(format!("Unknown dispatch status: {}", other)),
        }
    }
}

/// One attempt to send an alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDispatch {
    pub dispatch_id: Uuid,
    pub channel: AlertChannel,
    pub recipients: String,
    pub message: String,
    pub hotspot_count: usize,
    pub status: DispatchStatus,
    pub created_at: DateTime<Utc>,
}
