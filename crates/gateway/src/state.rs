use std::sync::Arc;

use briefing_domain::config::Config;
use briefing_domain::tool::ToolDefinition;
use briefing_providers::registry::ProviderRegistry;
use briefing_store::ConversationStore;
use briefing_tools::ToolRegistry;

/// Shared application state passed to every API handler.
///
/// Deliberately small — the Agent Execution Core's dependencies only:
/// config, the LLM provider registry (C7), the tool registry (C4), a
/// stable snapshot of the tool catalogue handed to every request, and the
/// conversation store (C8).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm: Arc<ProviderRegistry>,
    pub tools: Arc<ToolRegistry>,
    /// `tools.describe_all()`, snapshotted once at startup — the registry
    /// is write-once (spec §5 "Tool Registry: write-once at startup,
    /// read-only during serving").
    pub tool_defs: Arc<Vec<ToolDefinition>>,
    pub store: Arc<dyn ConversationStore>,
}
