//! Tools command - list what the agent would be given.

use super::setup;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::tools::ToolQuery;
use anyhow::Result;

/// List the tools discovered for the configured (or given) toolkits.
pub async fn run_tools(toolkits: Vec<String>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Tools)?;

    let client = setup::arcade_client(&settings)?;
    let query = ToolQuery::from_settings(&settings.arcade).with_toolkits(toolkits);
    let tools = setup::provision(&client, &query).await?;

    Output::header("Tools");
    for tool in &tools {
        Output::tool_item(&tool.qualified_name(), tool.description.as_deref());
    }

    let needs_auth = tools.iter().filter(|t| t.requires_authorization()).count();
    println!();
    Output::kv("Total", &tools.len().to_string());
    Output::kv("Requiring authorization", &needs_auth.to_string());

    Ok(())
}
