//! [`AppState`] construction, shared by `serve` and `run` (spec §4: builds
//! the Agent Execution Core's three collaborators — C7 provider registry,
//! C4 tool registry, C8 conversation store — from config).

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use briefing_domain::config::{Config, ConfigSeverity};
use briefing_providers::registry::ProviderRegistry;
use briefing_store::FileConversationStore;
use briefing_tools::build_default_registry;

use crate::state::AppState;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`]. Shared by `serve` and `run`.
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues.iter().filter(|i| i.severity == ConfigSeverity::Error).count()
        );
    }

    let llm = Arc::new(ProviderRegistry::from_config(&config.llm).context("initializing LLM providers")?);
    if llm.is_empty() {
        tracing::warn!("no LLM providers initialized — chat and title generation will fail");
    } else {
        tracing::info!(providers = llm.len(), "LLM provider registry ready");
    }

    let tools = Arc::new(build_default_registry(config.rss.clone()));
    let tool_defs = Arc::new(tools.describe_all());
    tracing::info!(tools = tool_defs.len(), "tool registry ready");

    let store = Arc::new(
        FileConversationStore::new(Path::new(&config.sessions.state_dir))
            .context("initializing conversation store")?,
    );
    tracing::info!(state_dir = %config.sessions.state_dir, "conversation store ready");

    Ok(AppState { config, llm, tools, tool_defs, store })
}
