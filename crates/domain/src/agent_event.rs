//! Wire envelope emitted by the agent loop and framed by the stream
//! transport (spec §4.9, §6). One `AgentEvent` maps 1:1 onto one framed
//! unit on the client's event stream.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum AgentEvent {
    #[serde(rename = "thinking")]
    Thinking { content: String },

    #[serde(rename = "delta")]
    Delta { content: String },

    #[serde(rename = "tool_call")]
    ToolCall {
        tool_name: String,
        tool_arguments: Value,
        content: String,
    },

    #[serde(rename = "tool_result")]
    ToolResult {
        tool_name: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },

    #[serde(rename = "done")]
    Done,

    #[serde(rename = "error")]
    Error { content: String },
}

impl AgentEvent {
    /// A human-readable announcement line for a tool invocation, shown in
    /// the `tool_call` event's `content` field.
    pub fn announce_tool_call(tool_name: &str, arguments: &Value) -> String {
        format!("Calling `{tool_name}` with {arguments}")
    }

    /// The warning `tool_result` emitted when the duplicate-call guard
    /// skips execution (spec §4.6, S2). Content begins with "⚠️" per the
    /// scenario's literal expectation.
    pub fn duplicate_call_warning(tool_name: &str) -> Self {
        AgentEvent::ToolResult {
            tool_name: tool_name.to_string(),
            content: format!(
                "⚠️ `{tool_name}` was already called with these arguments; relying on the prior result instead of calling it again."
            ),
            metadata: Some(serde_json::json!({ "duplicate_skipped": true })),
        }
    }
}
