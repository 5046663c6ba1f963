//! Tool registry (spec §4.4, C4).
//!
//! Registration happens once at agent construction; the registry is not
//! thread-safe for mutation during serving. Lookup and execution happen
//! freely from any number of concurrent requests.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use briefing_domain::error::{Error, Result};
use briefing_domain::tool::ToolDefinition;
use serde_json::Value;

pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;
pub type ToolHandler = Arc<dyn Fn(Value) -> ToolFuture + Send + Sync>;

struct RegisteredTool {
    definition: ToolDefinition,
    handler: ToolHandler,
}

/// Maps tool names to their schema + handler. Built once, read many times.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register a tool. Re-registering an existing name overwrites the
    /// previous entry and logs a warning (names are case-sensitive).
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: ToolHandler,
    ) {
        let name = name.into();
        if self.tools.contains_key(&name) {
            tracing::warn!(tool = %name, "overwriting previously registered tool");
        }
        let definition = ToolDefinition { name: name.clone(), description: description.into(), parameters };
        self.tools.insert(name, RegisteredTool { definition, handler });
    }

    /// Tool schemas in the shape a provider's `tools` catalogue expects —
    /// a stable projection independent of which provider is in use.
    pub fn describe_all(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition.clone()).collect()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Look up and invoke a tool by name with the decoded argument mapping.
    pub async fn execute(&self, name: &str, arguments: Value) -> Result<Value> {
        let tool = self.tools.get(name).ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        (tool.handler)(arguments)
            .await
            .map_err(|e| Error::ToolFailure(format!("{name}: {e}")))
    }
}
