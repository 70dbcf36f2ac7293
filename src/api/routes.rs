//! Shared state and router construction.
use axum::http::{header, Method};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers;
use crate::config::Config;
use crate::genai::GenAiClient;
use crate::publish::GraphClient;

/// Immutable per-process state. Requests share nothing mutable.
pub struct AppState {
    pub genai: GenAiClient,
    pub graph: GraphClient,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        AppState {
            genai: GenAiClient::from_config(config),
            graph: GraphClient::from_config(config),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/generate-text", post(handlers::generate_text))
        .route("/api/generate-image", post(handlers::generate_image))
        .route("/api/generate-video", post(handlers::generate_video))
        .route("/api/post", post(handlers::publish))
        .layer(cors)
        .with_state(state)
}
