//! Authorize command - run the authorization gate without chatting.

use super::setup;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{resolve_user_id, Overrides, Settings};
use crate::tools::ToolQuery;
use anyhow::Result;

/// Authorize every discovered tool for the user.
pub async fn run_authorize(
    user_id: Option<String>,
    toolkits: Vec<String>,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Authorize)?;

    let overrides = Overrides {
        user_id,
        model: None,
    };
    let user_id = resolve_user_id(|key| std::env::var(key).ok(), &overrides)?;

    let client = setup::arcade_client(&settings)?;
    let query = ToolQuery::from_settings(&settings.arcade).with_toolkits(toolkits);
    let tools = setup::provision(&client, &query).await?;
    let report = setup::authorize(&client, tools, &user_id, &settings).await?;

    Output::header(&format!("Authorized for {}", user_id));
    for tool in &report.authorized {
        Output::tool_item(&tool.qualified_name(), None);
    }
    if !report.skipped.is_empty() {
        Output::warning(&format!("{} tool(s) skipped", report.skipped.len()));
    }

    Ok(())
}
