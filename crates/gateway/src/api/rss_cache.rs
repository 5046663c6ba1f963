//! `POST /agent/rss-cache/generate` (spec §4.3, §6, C3): an on-demand,
//! deadline-bounded run of the cache materialiser.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::state::AppState;

pub async fn generate_rss_cache(State(state): State<AppState>) -> Response {
    let sources: Vec<(String, String)> = state
        .config
        .rss
        .sources
        .iter()
        .map(|s| (s.name.clone(), s.url.clone()))
        .collect();

    match briefing_rss::generate_cache_with_deadline(&sources, &state.config.rss.fetch, &state.config.rss.cache).await
    {
        Ok(artifact) => Json(serde_json::json!({
            "status": "ok",
            "summary": artifact.summary,
        }))
        .into_response(),
        Err(briefing_rss::CacheError::Timeout) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(serde_json::json!({ "error": "rss cache generation exceeded its wall-clock limit" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "rss cache generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "rss cache generation failed" })),
            )
                .into_response()
        }
    }
}
