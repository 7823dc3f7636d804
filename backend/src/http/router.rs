//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; the front end may be served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Uploads
        .route("/upload-and-calculate", post(handlers::upload_and_calculate))
        .route("/upload-and-calculate/", post(handlers::upload_and_calculate))
        .route("/predict-hotspots", post(handlers::predict_hotspots))
        .route("/predict-hotspots/", post(handlers::predict_hotspots))
        // Stored data
        .route("/datasets", get(handlers::list_datasets))
        .route("/datasets/", get(handlers::list_datasets))
        .route("/datasets/batches", get(handlers::list_batches))
        .route("/datasets/export.csv", get(handlers::export_datasets))
        .route("/datasets/{sample_id}", get(handlers::get_dataset))
        .route("/indices", get(handlers::get_indices))
        .route("/indices/", get(handlers::get_indices))
        // Alerts
        .route(
            "/alerts/config",
            get(handlers::get_alert_config).put(handlers::update_alert_config),
        )
        .route("/alerts/send", post(handlers::send_alert))
        .route("/alerts/history", get(handlers::alert_history));

    let mut router = Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_v1);

    if let Some(dir) = &state.static_dir {
        tracing::info!("Serving front-end assets from {} at /app", dir.display());
        router = router.nest_service("/app", ServeDir::new(dir).append_index_html_on_directories(true));
    }

    router
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
