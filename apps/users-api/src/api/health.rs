//! Readiness endpoint

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ReadinessResponse {
    status: &'static str,
    mongodb: bool,
    response_time_ms: u64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// 200 when MongoDB answers a ping, 503 otherwise
async fn readiness_check(State(state): State<AppState>) -> Response {
    let health = database::mongodb::check_health_detailed(&state.mongo_client).await;

    if let Some(message) = &health.message {
        tracing::warn!(error = %message, "MongoDB readiness check failed");
    }

    let (status, label) = if health.healthy {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status,
        Json(ReadinessResponse {
            status: label,
            mongodb: health.healthy,
            response_time_ms: health.response_time_ms,
        }),
    )
        .into_response()
}
