//! Maps `briefing_domain::error::Error` onto HTTP responses (spec §7).
//!
//! Only `OwnershipMismatch` and `ValidationError` get their own wire
//! status; every other variant reaching the API boundary is `Unhandled`
//! and surfaced as a generic 500 alongside a freshly generated request id,
//! which is also what gets logged (we never leak internal error detail to
//! the client for anything we didn't anticipate).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use briefing_domain::error::Error;

pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            Error::OwnershipMismatch => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "not found or access denied" })),
            )
                .into_response(),

            Error::ValidationError(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),

            other => {
                let request_id = uuid::Uuid::new_v4().to_string();
                tracing::error!(request_id = %request_id, error = %other, "unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "internal error",
                        "request_id": request_id,
                    })),
                )
                    .into_response()
            }
        }
    }
}
