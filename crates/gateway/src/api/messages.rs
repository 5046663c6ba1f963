//! `GET /conversations/{id}/messages` (spec §6, C8): the ordered transcript
//! of a conversation, decoded back into its thinking/text halves.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use briefing_domain::error::Error;
use briefing_domain::tool::Role;
use briefing_store::decode_content;

use crate::api::visitor::Visitor;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub thinking: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    #[serde(default = "d_limit")]
    pub limit: usize,
}

fn d_limit() -> usize {
    200
}

pub async fn list_messages(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> Response {
    if state.store.get(&id, &visitor).await.ok().flatten().is_none() {
        return ApiError(Error::OwnershipMismatch).into_response();
    }

    match state.store.recent_messages(&id, query.limit).await {
        Ok(messages) => {
            let body: Vec<MessageResponse> = messages
                .into_iter()
                .map(|m| {
                    let (thinking, content) = decode_content(&m.content);
                    MessageResponse { id: m.id, role: m.role, content, thinking, timestamp: m.timestamp }
                })
                .collect();
            Json(body).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}
