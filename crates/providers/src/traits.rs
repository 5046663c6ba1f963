//! The capability set shared by every LLM adapter (spec §4.7, C7).
//!
//! Deliberately small: `stream` for the agent loop, `complete` for
//! one-shot synthesis (title generation). A tagged `StreamEvent` enum
//! (see `briefing_domain::stream`) keeps the delta shape closed and
//! provider-agnostic rather than growing an ever-wider struct of optional
//! fields (spec §9 design note).

use briefing_domain::error::Result;
use briefing_domain::stream::{BoxStream, StreamEvent};
use briefing_domain::tool::{Message, ToolDefinition};

/// Per-request knobs independent of the provider selected.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Model identifier override. `None` uses the provider's configured default.
    pub model: Option<String>,
    /// Ask the provider to surface its reasoning as a distinct `Thinking`
    /// channel, if it supports one (spec §9 "Thinking vs. text channels").
    pub thinking_enabled: bool,
}

/// Every provider adapter implements this capability set.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Stream a chat completion. The returned stream yields deltas in
    /// arrival order; the caller (the agent loop) consumes them strictly
    /// sequentially (spec §5).
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: &ChatOptions,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>>;

    /// A one-shot, non-streaming completion (used for title synthesis).
    async fn complete(&self, messages: &[Message], options: &ChatOptions) -> Result<String>;

    /// A unique identifier for this provider instance, as configured.
    fn provider_id(&self) -> &str;
}
