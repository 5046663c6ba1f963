//! Conversation CRUD (spec §6): thin ownership-checked wrappers over C8.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use briefing_domain::error::Error;
use briefing_providers::traits::ChatOptions;
use briefing_store::{Conversation, ConversationType};

use crate::api::visitor::Visitor;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub visitor_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub conversation_type: ConversationType,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            visitor_id: c.visitor_id,
            title: c.title,
            conversation_type: c.conversation_type,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

pub async fn create_conversation(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Json(body): Json<CreateConversationRequest>,
) -> Response {
    let title = body.title.unwrap_or_else(|| "New conversation".into());
    match state.store.create_conversation(&visitor, title, ConversationType::Chat).await {
        Ok(conversation) => (StatusCode::CREATED, Json(ConversationResponse::from(conversation))).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListConversationsQuery {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "d_limit")]
    pub limit: usize,
    #[serde(default)]
    pub conversation_type: Option<ConversationType>,
}

fn d_limit() -> usize {
    50
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Query(query): Query<ListConversationsQuery>,
) -> Response {
    match state
        .store
        .list(&visitor, query.skip, query.limit, query.conversation_type)
        .await
    {
        Ok(conversations) => {
            let body: Vec<ConversationResponse> = conversations.into_iter().map(ConversationResponse::from).collect();
            Json(body).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(id): Path<String>,
) -> Response {
    match state.store.get(&id, &visitor).await {
        Ok(Some(conversation)) => Json(ConversationResponse::from(conversation)).into_response(),
        Ok(None) => ApiError(Error::OwnershipMismatch).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn delete_conversation(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(id): Path<String>,
) -> Response {
    match state.store.delete(&id, &visitor).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTitleRequest {
    pub title: String,
}

pub async fn update_title(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(id): Path<String>,
    Json(body): Json<UpdateTitleRequest>,
) -> Response {
    match state.store.update_title(&id, body.title, &visitor).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateTitleRequest {
    pub first_message: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateTitleResponse {
    pub title: String,
}

const MAX_TITLE_CHARS: usize = 15;

/// Derive a short title from the first message. Title generation never
/// propagates errors (spec §7, §9 open question) — any provider failure
/// silently falls back to a truncated prefix of the message itself.
pub async fn generate_title(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Path(id): Path<String>,
    Json(body): Json<GenerateTitleRequest>,
) -> Response {
    if state.store.get(&id, &visitor).await.ok().flatten().is_none() {
        return ApiError(Error::OwnershipMismatch).into_response();
    }

    let title = synthesize_title(&state, &body.first_message)
        .await
        .unwrap_or_else(|| truncate_chars(&body.first_message, MAX_TITLE_CHARS));

    if let Err(e) = state.store.update_title(&id, title.clone(), &visitor).await {
        return ApiError(e).into_response();
    }

    Json(GenerateTitleResponse { title }).into_response()
}

async fn synthesize_title(state: &AppState, first_message: &str) -> Option<String> {
    let (provider, mut options) = state.llm.resolve(&state.config.llm.agent_model).ok()?;
    options.temperature = Some(0.0);
    let options = ChatOptions { max_tokens: Some(32), ..options };

    let prompt = briefing_domain::tool::Message::user(format!(
        "Summarize this message as a plain title of at most {MAX_TITLE_CHARS} characters, no quotes or punctuation at the end: {first_message}"
    ));

    let raw = state.llm.complete_cached(&provider, std::slice::from_ref(&prompt), &options).await.ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(truncate_chars(trimmed, MAX_TITLE_CHARS))
    }
}

/// Truncate to at most `max` `char`s — never splits inside a multi-byte
/// character.
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
