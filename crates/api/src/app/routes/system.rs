use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

/// Liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
