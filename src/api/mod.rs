pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod validation;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::utils::app_config::AppConfig;
use handlers::{flows::*, health};

pub fn build_router(app_config: AppConfig) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Flow dashboards
        .route("/api/sources", get(get_sources))
        .route("/api/:source", get(get_flows))
        .route("/api/:source/:window", get(get_flow_window))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_config)
}
