//! The gateway provider (spec §4.7): "routes to many models by identifier."
//!
//! Any `provider_tag` in `LlmConfig.providers` that isn't one of the two
//! built-in kinds (and any tag a caller names that isn't registered at all)
//! is treated as a call through here, with the tag itself used as the
//! model identifier — this is how multi-model routers (OpenRouter-style
//! endpoints) are addressed: one endpoint, one credential, many models
//! selected purely by the `model` field on the wire request.
//!
//! The wire format such gateways expose is, in practice, the same
//! OpenAI-compatible chat-completions contract `OpenAiCompatProvider`
//! already speaks, so this wraps one internally rather than duplicating
//! the request/response/SSE plumbing.

use briefing_domain::config::{LlmConfig, ProviderConfig};
use briefing_domain::error::Result;
use briefing_domain::stream::{BoxStream, StreamEvent};
use briefing_domain::tool::{Message, ToolDefinition};

use crate::openai_compat::OpenAiCompatProvider;
use crate::traits::{ChatOptions, LlmProvider};

pub struct GatewayProvider {
    id: String,
    inner: OpenAiCompatProvider,
}

impl GatewayProvider {
    pub fn from_config(cfg: &ProviderConfig, llm: &LlmConfig) -> Result<Self> {
        Ok(Self {
            id: cfg.id.clone(),
            inner: OpenAiCompatProvider::from_config(cfg, llm)?,
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for GatewayProvider {
    async fn stream(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: &ChatOptions,
    ) -> Result<BoxStream<'static, Result<StreamEvent>>> {
        self.inner.stream(messages, tools, options).await
    }

    async fn complete(&self, messages: &[Message], options: &ChatOptions) -> Result<String> {
        self.inner.complete(messages, options).await
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}
