//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/departures", get(latest_departures))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The latest batch event, success or failure.
async fn latest_departures(State(state): State<AppState>) -> Response {
    match state.latest().await {
        Some(event) => Json(event).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "no departures fetched yet").into_response(),
    }
}
