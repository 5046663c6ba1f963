//! `POST /chat/stream` — the streaming chat endpoint (spec §6, C9): runs
//! one agent-loop turn and serialises every emitted `AgentEvent` as an SSE
//! frame.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::Stream;
use serde::Deserialize;

use briefing_domain::agent_event::AgentEvent;
use briefing_domain::error::Error;
use briefing_domain::tool::{Message, MessageContent, Role};
use briefing_store::decode_content;

use crate::api::visitor::Visitor;
use crate::error::ApiError;
use crate::runtime::{run_agent_loop, CancelToken};
use crate::state::AppState;

const SYSTEM_DIRECTIVE: &str = "\
You are a helpful assistant with access to a small set of tools for reading \
a daily-cached RSS news digest and analyzing uploaded documents. Use a tool \
only when it would materially improve your answer; otherwise respond directly.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub conversation_id: String,
    pub message: String,
    #[serde(default)]
    pub thinking_enabled: Option<bool>,
}

pub async fn stream_chat(
    State(state): State<AppState>,
    Visitor(visitor): Visitor,
    Json(body): Json<ChatRequest>,
) -> Response {
    if body.message.trim().is_empty() {
        return ApiError(Error::ValidationError("message must not be empty".into())).into_response();
    }

    let conversation = match state.store.get(&body.conversation_id, &visitor).await {
        Ok(Some(c)) => c,
        Ok(None) => return ApiError(Error::OwnershipMismatch).into_response(),
        Err(e) => return ApiError(e).into_response(),
    };

    let history = match state
        .store
        .recent_messages(&conversation.id, state.config.sessions.max_history_messages)
        .await
    {
        Ok(h) => h,
        Err(e) => return ApiError(e).into_response(),
    };

    if let Err(e) = state
        .store
        .append_message(&conversation.id, Role::User, &body.message, None)
        .await
    {
        return ApiError(e).into_response();
    }

    let mut messages = vec![Message::system(SYSTEM_DIRECTIVE)];
    for stored in &history {
        let (_thinking, content) = decode_content(&stored.content);
        messages.push(Message { role: stored.role, content: MessageContent::Text(content) });
    }
    messages.push(Message::user(body.message));

    let (provider, mut options) = match state.llm.resolve(&state.config.llm.agent_model) {
        Ok(r) => r,
        Err(e) => return ApiError(e).into_response(),
    };
    options.temperature = Some(state.config.llm.temperature);
    options.max_tokens = state.config.llm.max_tokens;
    options.thinking_enabled = body.thinking_enabled.unwrap_or(false);

    let rx = run_agent_loop(
        provider,
        state.tools.clone(),
        state.tool_defs.as_ref().clone(),
        messages,
        options,
        state.config.llm.max_loop_iterations,
        CancelToken::new(),
    );

    Sse::new(event_stream(state, conversation.id, rx))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Relay `AgentEvent`s onto the SSE wire, persisting the assistant's final
/// turn (thinking + text) to the conversation store as it completes.
/// Tool-call chatter is ephemeral per request and not persisted — only
/// user and assistant turns make up the stored transcript.
fn event_stream(
    state: AppState,
    conversation_id: String,
    mut rx: tokio::sync::mpsc::Receiver<AgentEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        let mut thinking = String::new();
        let mut text = String::new();

        while let Some(event) = rx.recv().await {
            match &event {
                AgentEvent::Thinking { content } => thinking.push_str(content),
                AgentEvent::Delta { content } => text.push_str(content),
                AgentEvent::Done => {
                    let thinking_ref = if thinking.is_empty() { None } else { Some(thinking.as_str()) };
                    if let Err(e) = state.store.append_message(&conversation_id, Role::Assistant, &text, thinking_ref).await {
                        tracing::warn!(error = %e, "failed to persist assistant turn");
                    }
                }
                AgentEvent::Error { .. } | AgentEvent::ToolCall { .. } | AgentEvent::ToolResult { .. } => {}
            }

            let frame = Event::default().json_data(&event).unwrap_or_else(|_| Event::default().data("{}"));
            yield Ok(frame);
        }
    }
}
