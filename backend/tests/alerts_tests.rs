//! Alert configuration and dispatch, including webhook delivery against a
//! local receiver.

#![cfg(feature = "http-server")]

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use parking_lot::Mutex;

use hpi_rust::db::repositories::LocalRepository;
use hpi_rust::db::repository::AlertRepository;
use hpi_rust::db::services;
use hpi_rust::models::{
    AlertChannel, AlertConfig, DispatchStatus, FileFormat, MetalConcentrations, SampleInput,
};
use hpi_rust::services::alerts::{
    notifier_from_settings, send_alert, update_alert_config, AlertError, AlertMessage,
    AlertSettings, LogNotifier, WebhookNotifier,
};
use hpi_rust::services::PollutionCalculator;

#[derive(Clone)]
struct Receiver {
    received: Arc<Mutex<Vec<AlertMessage>>>,
    status: StatusCode,
}

async fn hook(State(receiver): State<Receiver>, Json(alert): Json<AlertMessage>) -> StatusCode {
    receiver.received.lock().push(alert);
    receiver.status
}

/// Start a webhook receiver answering every POST with `status`.
async fn spawn_receiver(status: StatusCode) -> (String, Arc<Mutex<Vec<AlertMessage>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().route("/hook", post(hook)).with_state(Receiver {
        received: Arc::clone(&received),
        status,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/hook", addr), received)
}

/// Repository holding the two reference samples: one moderate, one low.
async fn seeded_repo() -> LocalRepository {
    let repo = LocalRepository::new();
    services::ingest_samples(
        &repo,
        &PollutionCalculator::default(),
        "seed.csv",
        FileFormat::Csv,
        b"",
        &[
            SampleInput::new(28.7, 77.1, MetalConcentrations::new(15.0, 4.0, 12.0, 5500.0)),
            SampleInput::new(19.0, 72.8, MetalConcentrations::new(5.0, 1.0, 4.0, 2000.0)),
        ],
    )
    .await
    .unwrap();
    repo
}

async fn configure(repo: &LocalRepository, email: &str, sms: &str) {
    update_alert_config(
        repo,
        AlertConfig {
            email_recipients: email.to_string(),
            sms_recipients: sms.to_string(),
            ..AlertConfig::default()
        },
    )
    .await
    .unwrap();
}

// =========================================================
// Configuration
// =========================================================

#[tokio::test]
async fn test_update_normalizes_recipients() {
    let repo = LocalRepository::new();
    let saved = update_alert_config(
        &repo,
        AlertConfig {
            hpi_threshold: 120.0,
            email_recipients: " ops@example.org , ,lab@example.org ".to_string(),
            sms_recipients: "+15551234567,".to_string(),
            policy: serde_json::Value::Null,
            ..AlertConfig::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(saved.email_recipients, "ops@example.org,lab@example.org");
    assert_eq!(saved.sms_recipients, "+15551234567");
    assert!(saved.policy.is_object());
    assert_eq!(repo.get_alert_config().await.unwrap(), saved);
}

#[tokio::test]
async fn test_update_rejects_invalid_values() {
    let repo = LocalRepository::new();

    let cases = [
        AlertConfig {
            hpi_threshold: -1.0,
            ..AlertConfig::default()
        },
        AlertConfig {
            cd_threshold: f64::NAN,
            ..AlertConfig::default()
        },
        AlertConfig {
            email_recipients: "not-an-address".to_string(),
            ..AlertConfig::default()
        },
        AlertConfig {
            sms_recipients: "12ab".to_string(),
            ..AlertConfig::default()
        },
        AlertConfig {
            policy: serde_json::json!(["region-a"]),
            ..AlertConfig::default()
        },
    ];

    for config in cases {
        let err = update_alert_config(&repo, config).await.unwrap_err();
        assert!(matches!(err, AlertError::InvalidConfig(_)), "{}", err);
    }
    assert_eq!(repo.get_alert_config().await.unwrap(), AlertConfig::default());
}

// =========================================================
// Dispatch
// =========================================================

#[tokio::test]
async fn test_send_without_recipients_is_skipped() {
    let repo = seeded_repo().await;
    let dispatch = send_alert(&repo, &LogNotifier, "email", "check wells").await.unwrap();

    assert_eq!(dispatch.status, DispatchStatus::Skipped);
    assert_eq!(dispatch.recipients, "");
    assert_eq!(dispatch.hotspot_count, 1);
    assert_eq!(repo.list_dispatches().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_send_counts_exceedances() {
    let repo = seeded_repo().await;
    configure(&repo, "ops@example.org", "").await;

    let dispatch = send_alert(&repo, &LogNotifier, "EMAIL", "check wells").await.unwrap();
    assert_eq!(dispatch.status, DispatchStatus::Sent);
    assert_eq!(dispatch.channel, AlertChannel::Email);
    assert_eq!(dispatch.recipients, "ops@example.org");
    // Moderate sample: HPI 133.95 >= 100 and Cd 5.13 >= 3. Low sample: neither.
    assert_eq!(dispatch.hotspot_count, 1);

    update_alert_config(
        &repo,
        AlertConfig {
            cd_threshold: 1.5,
            email_recipients: "ops@example.org".to_string(),
            ..AlertConfig::default()
        },
    )
    .await
    .unwrap();
    let dispatch = send_alert(&repo, &LogNotifier, "email", "").await.unwrap();
    assert_eq!(dispatch.hotspot_count, 2);
}

#[tokio::test]
async fn test_invalid_channel_records_nothing() {
    let repo = seeded_repo().await;
    let err = send_alert(&repo, &LogNotifier, "pager", "hi").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid channel: pager. Use 'email' or 'sms'.");
    assert!(repo.list_dispatches().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_delivery() {
    let (url, received) = spawn_receiver(StatusCode::OK).await;
    let notifier = WebhookNotifier::new(url, Duration::from_secs(5)).unwrap();

    let repo = seeded_repo().await;
    configure(&repo, "", "+15551234567,+447700900123").await;

    let dispatch = send_alert(&repo, &notifier, "sms", "Lead above limit").await.unwrap();
    assert_eq!(dispatch.status, DispatchStatus::Sent);

    let received = received.lock();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].dispatch_id, dispatch.dispatch_id);
    assert_eq!(received[0].channel, AlertChannel::Sms);
    assert_eq!(received[0].recipients, vec!["+15551234567", "+447700900123"]);
    assert_eq!(received[0].message, "Lead above limit");
    assert_eq!(received[0].hotspot_count, 1);
}

#[tokio::test]
async fn test_webhook_error_status_is_recorded_as_failed() {
    let (url, received) = spawn_receiver(StatusCode::SERVICE_UNAVAILABLE).await;
    let notifier = WebhookNotifier::new(url, Duration::from_secs(5)).unwrap();

    let repo = seeded_repo().await;
    configure(&repo, "ops@example.org", "").await;

    let err = send_alert(&repo, &notifier, "email", "x").await.unwrap_err();
    assert!(matches!(err, AlertError::Delivery { notifier: "webhook", .. }));
    assert!(err.to_string().contains("503"));
    assert_eq!(received.lock().len(), 1);

    let history = repo.list_dispatches().await.unwrap();
    assert_eq!(history[0].status, DispatchStatus::Failed);
}

#[tokio::test]
async fn test_unreachable_webhook_fails() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier =
        WebhookNotifier::new(format!("http://{}/hook", addr), Duration::from_secs(2)).unwrap();
    let repo = seeded_repo().await;
    configure(&repo, "ops@example.org", "").await;

    let err = send_alert(&repo, &notifier, "email", "x").await.unwrap_err();
    assert!(matches!(err, AlertError::Delivery { .. }));
}

#[test]
fn test_notifier_selection() {
    let log = notifier_from_settings(&AlertSettings::default()).unwrap();
    assert_eq!(log.name(), "log");

    let blank = notifier_from_settings(&AlertSettings {
        webhook_url: Some("  ".to_string()),
        ..AlertSettings::default()
    })
    .unwrap();
    assert_eq!(blank.name(), "log");

    let webhook = notifier_from_settings(&AlertSettings {
        webhook_url: Some("http://127.0.0.1:9/hook".to_string()),
        ..AlertSettings::default()
    })
    .unwrap();
    assert_eq!(webhook.name(), "webhook");
}
