use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// A boxed async stream, used for LLM streaming responses.
pub type BoxStream<'a, T> = Pin<Box<dyn futures_core::Stream<Item = T> + Send + 'a>>;

/// One incremental unit of LLM output (spec §4.7).
///
/// A provider's `stream()` yields a lazy sequence of these. Tagged variants
/// per delta kind (rather than one struct with every field optional) keep
/// the shape closed and provider-agnostic (spec §9 design note).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// A text token chunk.
    #[serde(rename = "token")]
    Token { text: String },

    /// A reasoning/thinking token chunk, kept on a channel distinct from
    /// `Token` end-to-end (spec §9 "Thinking vs. text channels").
    #[serde(rename = "thinking")]
    Thinking { text: String },

    /// One fragment of a tool call, keyed by its stable stream index.
    /// Providers may split name and arguments across many fragments; the
    /// agent loop assembles fragments sharing an `index` into one call
    /// (spec §4.6 "Tool-call stream reconstruction").
    #[serde(rename = "tool_call_fragment")]
    ToolCallFragment {
        index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments_delta: Option<String>,
    },

    /// Stream is finished.
    #[serde(rename = "done")]
    Done {
        usage: Option<Usage>,
        finish_reason: Option<String>,
    },

    /// An error occurred during streaming.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Token usage for a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
