//! The set of authorized tools handed to the agent.

use crate::arcade::{to_function_tool, ToolDefinition, ToolProvider};
use crate::error::{AgentError, Result};
use async_openai::types::ChatCompletionTool;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Authorized tools, addressable by model function name or qualified name.
#[derive(Clone, Default)]
pub struct ToolSet {
    provider: Option<Arc<dyn ToolProvider>>,
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolSet {
    /// Create a tool set executing through `provider`.
    pub fn new(provider: Arc<dyn ToolProvider>, tools: Vec<ToolDefinition>) -> Self {
        let mut index = HashMap::with_capacity(tools.len() * 2);
        for (i, tool) in tools.iter().enumerate() {
            index.insert(tool.function_name(), i);
            index.insert(tool.qualified_name(), i);
        }

        Self {
            provider: Some(provider),
            tools,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Qualified names, in provisioning order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(ToolDefinition::qualified_name).collect()
    }

    /// Look up a tool by function name or qualified name.
    pub fn resolve(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Function schemas advertised to the model.
    pub fn function_tools(&self) -> Vec<ChatCompletionTool> {
        self.tools.iter().map(to_function_tool).collect()
    }

    /// Execute a tool for a user and render its result as text.
    pub async fn execute(
        &self,
        tool: &ToolDefinition,
        args: Value,
        user_id: &str,
    ) -> Result<String> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| AgentError::Tool("No tool provider configured".to_string()))?;

        let name = tool.qualified_name();
        debug!("Executing {} for {}", name, user_id);

        let response = provider
            .execute(&name, args, user_id)
            .await
            .map_err(|e| AgentError::Tool(format!("{}: {}", name, e)))?;

        Ok(response.result_text())
    }
}
