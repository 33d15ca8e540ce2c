//! Tool discovery against the tool provider.

use crate::arcade::{ToolDefinition, ToolProvider};
use crate::config::ArcadeSettings;
use crate::error::{AgentError, Result};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Largest page requested from the provider.
const MAX_PAGE_SIZE: usize = 100;

/// Which tools to provision.
#[derive(Debug, Clone)]
pub struct ToolQuery {
    /// Toolkits whose tools are all included.
    pub toolkits: Vec<String>,
    /// Isolated tools by qualified name.
    pub tools: Vec<String>,
    /// Upper bound on the number of definitions returned.
    pub limit: usize,
}

impl ToolQuery {
    pub fn from_settings(settings: &ArcadeSettings) -> Self {
        Self {
            toolkits: settings.toolkits.clone(),
            tools: settings.tools.clone(),
            limit: settings.limit,
        }
    }

    /// Replace the configured toolkits when `toolkits` is non-empty.
    pub fn with_toolkits(mut self, toolkits: Vec<String>) -> Self {
        if !toolkits.is_empty() {
            self.toolkits = toolkits;
        }
        self
    }
}

/// Fetch the tool definitions described by `query`.
///
/// Toolkits are paged through in order, then isolated tools are appended.
/// Duplicates (by qualified name) keep their first occurrence and the
/// result is truncated to `query.limit`.
#[instrument(skip(provider))]
pub async fn provision_tools(
    provider: &dyn ToolProvider,
    query: &ToolQuery,
) -> Result<Vec<ToolDefinition>> {
    if query.limit == 0 {
        return Err(AgentError::Config("Tool limit must be at least 1".to_string()));
    }

    let mut seen = HashSet::new();
    let mut tools = Vec::new();
    let mut push = |tool: ToolDefinition, tools: &mut Vec<ToolDefinition>| {
        if seen.insert(tool.qualified_name()) {
            tools.push(tool);
        }
    };

    let page_size = query.limit.min(MAX_PAGE_SIZE);

    for toolkit in &query.toolkits {
        let mut offset = 0;
        loop {
            let page = provider
                .list_tools(toolkit, page_size, offset)
                .await
                .map_err(|e| AgentError::Provisioning(format!("toolkit {}: {}", toolkit, e)))?;

            let received = page.items.len();
            debug!("Toolkit {} page at offset {}: {} tools", toolkit, offset, received);
            for tool in page.items {
                push(tool, &mut tools);
            }

            offset += received;
            let exhausted = match page.total_count {
                Some(total) => offset as u64 >= total,
                None => received < page_size,
            };
            if received == 0 || exhausted || tools.len() >= query.limit {
                break;
            }
        }
    }

    for name in &query.tools {
        let tool = provider
            .get_tool(name)
            .await
            .map_err(|e| AgentError::Provisioning(format!("tool {}: {}", name, e)))?;
        push(tool, &mut tools);
    }

    tools.truncate(query.limit);

    if tools.is_empty() {
        return Err(AgentError::Provisioning(format!(
            "No tools found for toolkits [{}] and tools [{}]",
            query.toolkits.join(", "),
            query.tools.join(", ")
        )));
    }

    info!("Provisioned {} tools", tools.len());
    Ok(tools)
}
