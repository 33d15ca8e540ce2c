//! Startup steps shared by the commands that talk to Arcade.

use crate::arcade::{ArcadeClient, ToolDefinition, ToolProvider};
use crate::cli::interactive::ConsoleAuthPrompt;
use crate::cli::Output;
use crate::config::{ArcadeCredentials, Settings};
use crate::tools::{provision_tools, AuthorizationGate, AuthorizationReport, ToolQuery};
use anyhow::Result;
use std::time::Duration;

/// Arcade client from the environment and settings.
pub fn arcade_client(settings: &Settings) -> Result<ArcadeClient> {
    let credentials = ArcadeCredentials::from_env(settings);
    Ok(ArcadeClient::from_credentials(&credentials, settings)?)
}

/// Discover tools behind a spinner.
pub async fn provision(
    provider: &dyn ToolProvider,
    query: &ToolQuery,
) -> Result<Vec<ToolDefinition>> {
    let spinner = Output::spinner(&format!(
        "Discovering tools in {}...",
        query.toolkits.join(", ")
    ));
    let result = provision_tools(provider, query).await;
    spinner.finish_and_clear();

    let tools = result?;
    Output::success(&format!("Found {} tools", tools.len()));
    Ok(tools)
}

/// Authorize `tools` for `user_id`, showing any links the user must visit.
pub async fn authorize(
    provider: &dyn ToolProvider,
    tools: Vec<ToolDefinition>,
    user_id: &str,
    settings: &Settings,
) -> Result<AuthorizationReport> {
    let spinner = Output::spinner(&format!("Authorizing {} tools for {}...", tools.len(), user_id));
    let prompt = ConsoleAuthPrompt::new(spinner.clone());

    let gate = AuthorizationGate::new(provider, settings.arcade.on_auth_failure)
        .with_timeout(Duration::from_secs(settings.arcade.auth_timeout_secs))
        .with_prompt(&prompt);
    let result = gate.authorize_all(tools, user_id).await;
    spinner.finish_and_clear();

    let report = result?;
    for (tool, reason) in &report.skipped {
        Output::warning(&format!("Skipped {}: {}", tool, reason));
    }
    Output::success(&format!("Authorized {} tools", report.authorized.len()));
    Ok(report)
}
