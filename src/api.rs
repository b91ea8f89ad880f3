// src/api.rs
//! Thin HTTP surface: one digest endpoint plus a health probe, with
//! permissive CORS for the browser client. All pipeline failure handling
//! lives below this layer; handlers never error.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::digest::Digest;
use crate::pipeline::DigestPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DigestPipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/digest", get(digest))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn digest(State(state): State<AppState>) -> Json<Digest> {
    Json(state.pipeline.run().await)
}
