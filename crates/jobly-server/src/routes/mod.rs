//! HTTP routes.

mod auth;
mod companies;
mod jobs;
mod users;

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::Router;
use axum::routing::get;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// The full API with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(companies::routes())
        .merge(jobs::routes())
        .merge(users::routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
