//! Substance heatmap API service library.
//!
//! Exposes the router and its modules so they can be exercised in tests
//! without binding a socket.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod state;

use axum::{
    extract::Extension,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use config::ServiceConfig;
pub use state::AppState;

/// Build the HTTP router over a loaded state.
pub fn router(state: Arc<AppState>, prometheus_handle: PrometheusHandle) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        // Read-only views
        .route("/api/substances", get(handlers::substances_handler))
        .route("/api/quarters", get(handlers::quarters_handler))
        .route("/api/report", get(handlers::report_handler))
        .route("/api/view", get(handlers::view_handler))
        // Selection entry points
        .route(
            "/api/selection/substances/:name/toggle",
            post(handlers::toggle_substance_handler),
        )
        .route("/api/selection/all", post(handlers::select_all_handler))
        .route("/api/selection/clear", post(handlers::clear_selection_handler))
        .route("/api/selection/quarter", put(handlers::set_quarter_handler))
        .route("/api/selection/all-time", put(handlers::set_all_time_handler))
        // Layer extensions
        .layer(Extension(state))
        .layer(Extension(prometheus_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
