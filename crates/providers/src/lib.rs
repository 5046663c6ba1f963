//! LLM provider adapters and the registry that resolves a `"tag/model"`
//! string to a concrete one (spec §4.7, C7).

pub mod anthropic;
pub mod gateway;
pub mod openai_compat;
pub mod registry;
pub mod retry;
pub mod traits;
pub(crate) mod sse;
pub(crate) mod util;

pub use anthropic::AnthropicProvider;
pub use gateway::GatewayProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use registry::ProviderRegistry;
pub use traits::{ChatOptions, LlmProvider};
