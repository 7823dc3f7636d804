use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AlertChannel, AlertDispatch, DispatchStatus};

pub const UPDATE_ALERT_CONFIG: &str = "update_alert_config";
pub const SEND_ALERT: &str = "send_alert";

/// Body of `POST /api/v1/alerts/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendAlertRequest {
    pub channel: String,
    #[serde(default)]
    pub message: String,
}

/// Result of a send attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendAlertResponse {
    pub status: DispatchStatus,
    pub channel: AlertChannel,
    /// Recipient list of the channel, comma separated.
    pub to: String,
    /// Stored samples exceeding either threshold.
    pub count: usize,
    pub dispatch_id: Uuid,
}

impl From<&AlertDispatch> for SendAlertResponse {
    fn from(dispatch: &AlertDispatch) -> Self {
        Self {
            status: dispatch.status,
            channel: dispatch.channel,
            to: dispatch.recipients.clone(),
            count: dispatch.hotspot_count,
            dispatch_id: dispatch.dispatch_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_message_defaults_to_empty() {
        let req: SendAlertRequest = serde_json::from_str(r#"{"channel":"sms"}"#).unwrap();
        assert_eq!(req.channel, "sms");
        assert!(req.message.is_empty());
    }

    #[test]
    fn test_response_from_dispatch() {
        let dispatch = AlertDispatch {
            dispatch_id: Uuid::new_v4(),
            channel: AlertChannel::Email,
            recipients: "a@x.org,b@y.org".to_string(),
            message: "check wells".to_string(),
            hotspot_count: 4,
            status: DispatchStatus::Sent,
            created_at: Utc::now(),
        };

        let response = SendAlertResponse::from(&dispatch);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "sent");
        assert_eq!(json["channel"], "email");
        assert_eq!(json["to"], "a@x.org,b@y.org");
        assert_eq!(json["count"], 4);
        assert_eq!(json["dispatch_id"], dispatch.dispatch_id.to_string());
    }
}
