//! The agent loop (spec §4.6, C6) — the hardest component in this crate.
//!
//! Given a ready-made context (system directive + prior turns + the new
//! user message, already composed by the caller), runs at most
//! `max_iterations` rounds of: stream a completion, reassemble any
//! tool-call fragments, dispatch tools strictly in emission order subject
//! to the duplicate-call guard, and loop — emitting `AgentEvent`s onto a
//! channel the caller drains.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;

use briefing_domain::agent_event::AgentEvent;
use briefing_domain::error::Error;
use briefing_domain::stream::StreamEvent;
use briefing_domain::tool::{ContentPart, Message, MessageContent, Role, ToolDefinition};
use briefing_providers::traits::{ChatOptions, LlmProvider};
use briefing_tools::ToolRegistry;

/// Cooperative cancellation signal, checked between loop iterations and
/// before each tool dispatch (spec §5 "client disconnection... the
/// request should terminate promptly"). Cheap to clone and share.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Spawn the agent loop and return the event channel the stream transport
/// (C9) drains. The channel closes once a terminal event has been sent.
pub fn run_agent_loop(
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    tool_defs: Vec<ToolDefinition>,
    messages: Vec<Message>,
    options: ChatOptions,
    max_iterations: usize,
    cancel: CancelToken,
) -> mpsc::Receiver<AgentEvent> {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        run_inner(provider, tools, tool_defs, messages, options, max_iterations, cancel, tx).await;
    });
    rx
}

/// A per-request record of one executed tool call, used by the
/// duplicate-call guard. Lives only for the lifetime of one request (spec
/// §9 "Duplicate-call guard lifetime" — per-request, not global).
struct CallRecord {
    name: String,
    arguments: Value,
}

/// Whether `(name, arguments)` counts as "similar" to `record` (spec
/// §4.6): same tool name, and for `fetch_rss_news` always, for
/// `filter_rss_news` when the `query` argument matches. Any other tool
/// falls back to an exact-argument match, the closest reading of a rule
/// the spec only spells out for those two tools.
fn is_similar(name: &str, arguments: &Value, record: &CallRecord) -> bool {
    if name != record.name {
        return false;
    }
    match name {
        "fetch_rss_news" => true,
        "filter_rss_news" => {
            let query = arguments.get("query").and_then(Value::as_str);
            let prior_query = record.arguments.get("query").and_then(Value::as_str);
            query.is_some() && query == prior_query
        }
        _ => *arguments == record.arguments,
    }
}

/// One tool call fully reassembled from its index-keyed stream fragments.
struct AssembledCall {
    index: u32,
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

async fn run_inner(
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    tool_defs: Vec<ToolDefinition>,
    mut messages: Vec<Message>,
    options: ChatOptions,
    max_iterations: usize,
    cancel: CancelToken,
    tx: mpsc::Sender<AgentEvent>,
) {
    let mut call_records: Vec<CallRecord> = Vec::new();

    for _round in 0..max_iterations.max(1) {
        if cancel.is_cancelled() {
            return;
        }

        let mut stream = match provider.stream(&messages, &tool_defs, &options).await {
            Ok(s) => s,
            Err(e) => {
                let _ = tx.send(AgentEvent::Error { content: e.to_string() }).await;
                return;
            }
        };

        let mut full_text = String::new();
        let mut in_flight: Vec<AssembledCall> = Vec::new();
        let mut stream_error: Option<String> = None;

        while let Some(item) = stream.next().await {
            match item {
                Ok(StreamEvent::Token { text }) => {
                    full_text.push_str(&text);
                    if tx.send(AgentEvent::Delta { content: text }).await.is_err() {
                        return;
                    }
                }
                Ok(StreamEvent::Thinking { text }) => {
                    if tx.send(AgentEvent::Thinking { content: text }).await.is_err() {
                        return;
                    }
                }
                Ok(StreamEvent::ToolCallFragment { index, id, name, arguments_delta }) => {
                    let entry = match in_flight.iter_mut().find(|c| c.index == index) {
                        Some(c) => c,
                        None => {
                            in_flight.push(AssembledCall { index, id: None, name: None, arguments: String::new() });
                            in_flight.last_mut().expect("just pushed")
                        }
                    };
                    if id.is_some() {
                        entry.id = id;
                    }
                    if name.is_some() {
                        entry.name = name;
                    }
                    if let Some(delta) = arguments_delta {
                        entry.arguments.push_str(&delta);
                    }
                }
                Ok(StreamEvent::Done { .. }) => break,
                Ok(StreamEvent::Error { message }) => {
                    stream_error = Some(message);
                    break;
                }
                Err(e) => {
                    stream_error = Some(e.to_string());
                    break;
                }
            }
        }

        if let Some(message) = stream_error {
            let _ = tx.send(AgentEvent::Error { content: message }).await;
            return;
        }

        if in_flight.is_empty() {
            // No tool calls this round: terminal success (spec §4.6 step 4).
            messages.push(Message::assistant(full_text));
            let _ = tx.send(AgentEvent::Done).await;
            return;
        }

        // Tool calls were produced (spec §4.6 step 5).
        let mut parts: Vec<ContentPart> = vec![ContentPart::Text { text: full_text }];
        for call in &in_flight {
            parts.push(ContentPart::ToolUse {
                id: call.id.clone().unwrap_or_else(|| format!("call_{}", call.index)),
                name: call.name.clone().unwrap_or_default(),
                input: decode_arguments(&call.arguments),
            });
        }
        messages.push(Message { role: Role::Assistant, content: MessageContent::Parts(parts) });

        for call in in_flight {
            if cancel.is_cancelled() {
                return;
            }

            let call_id = call.id.clone().unwrap_or_else(|| format!("call_{}", call.index));
            let tool_name = call.name.clone().unwrap_or_default();
            let arguments = decode_arguments(&call.arguments);

            let already_executed = call_records
                .iter()
                .filter(|r| is_similar(&tool_name, &arguments, r))
                .count();

            if already_executed >= 2 {
                let event = AgentEvent::duplicate_call_warning(&tool_name);
                let warning_content = match &event {
                    AgentEvent::ToolResult { content, .. } => content.clone(),
                    _ => unreachable!(),
                };
                messages.push(Message::tool_result(&call_id, &warning_content));
                if tx.send(event).await.is_err() {
                    return;
                }
                continue;
            }

            call_records.push(CallRecord { name: tool_name.clone(), arguments: arguments.clone() });

            let announce = AgentEvent::announce_tool_call(&tool_name, &arguments);
            if tx
                .send(AgentEvent::ToolCall {
                    tool_name: tool_name.clone(),
                    tool_arguments: arguments.clone(),
                    content: announce,
                })
                .await
                .is_err()
            {
                return;
            }

            let (content, metadata) = match tools.execute(&tool_name, arguments).await {
                Ok(value) => (serialize_result(&value), None),
                Err(e @ Error::UnknownTool(_)) | Err(e @ Error::ToolFailure(_)) => {
                    (e.to_string(), Some(serde_json::json!({ "error": true })))
                }
                Err(e) => (e.to_string(), Some(serde_json::json!({ "error": true }))),
            };

            messages.push(Message::tool_result(&call_id, &content));
            if tx
                .send(AgentEvent::ToolResult { tool_name, content, metadata })
                .await
                .is_err()
            {
                return;
            }
        }
        // Loop to step 1 (spec §4.6 step 5c).
    }

    // Iteration cap reached with no terminal step (spec §4.6 step 6).
    let _ = tx
        .send(AgentEvent::Delta {
            content: "\n\n[stopped: reached the maximum number of tool-calling rounds for this turn]".into(),
        })
        .await;
    let _ = tx.send(AgentEvent::Done).await;
}

/// Decode a tool call's argument buffer as JSON; malformed JSON becomes an
/// empty mapping so the tool still runs (spec §4.6, §7 `SchemaDecodeError`).
fn decode_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::Object(Default::default()))
}

/// Serialise a tool's return value for both the LLM-visible message and
/// the `tool_result` event: JSON text for mappings/lists, the bare string
/// otherwise (spec §4.6 step 5b).
fn serialize_result(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => serde_json::to_string(value).unwrap_or_default(),
        other => other.to_string(),
    }
}
