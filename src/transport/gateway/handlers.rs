use super::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::Value;

/// GET /health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let body = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "row_policy": state.pipeline.config().row_policy.to_string(),
    });
    Json(body)
}

/// POST /v1/finalize -- raw generator candidate in, finalized turn out
pub(super) async fn handle_finalize(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let Ok(candidate) = serde_json::from_slice::<Value>(&body) else {
        tracing::debug!(bytes = body.len(), "finalize body is not JSON");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid request body"})),
        );
    };

    let turn = state.pipeline.finalize(&candidate);
    (StatusCode::OK, Json(turn.to_value()))
}
