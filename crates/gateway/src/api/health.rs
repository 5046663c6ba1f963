//! `GET /health`: liveness probe, no dependency checks.

use axum::http::StatusCode;
use axum::Json;

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
