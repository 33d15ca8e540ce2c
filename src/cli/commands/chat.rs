//! Interactive chat command.

use super::setup;
use crate::agent::{
    Agent, AutoApprove, BeforeToolCallback, ChatModel, InMemorySessionService, OpenAIChatModel,
    Runner, SessionService,
};
use crate::cli::interactive::{stdin_input, ConsoleConfirmation, SharedInput};
use crate::cli::preflight::{self, Operation};
use crate::cli::repl::{ChatLoop, LoopEnd};
use crate::cli::{ChatArgs, Output};
use crate::config::{AgentPrompts, Environment, Overrides, Settings};
use crate::error::AgentError;
use crate::tools::{ToolQuery, ToolSet};
use anyhow::Result;
use console::style;
use serde_json::{Map, Value};
use std::io;
use std::sync::Arc;
use tracing::info;

/// Run the interactive chat command.
pub async fn run_chat(args: ChatArgs, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat) {
        Output::error(&format!("{}", e));
        Output::info("Run 'ytagent doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let overrides = Overrides {
        user_id: args.user_id,
        model: args.model,
    };
    let env = Environment::from_env(&settings, &overrides)?;
    let prompts = AgentPrompts::load(&settings)?;

    let client = Arc::new(crate::arcade::ArcadeClient::from_credentials(
        &env.arcade,
        &settings,
    )?);

    let query = ToolQuery::from_settings(&settings.arcade).with_toolkits(args.toolkit);
    let tools = setup::provision(client.as_ref(), &query).await?;
    let report = setup::authorize(client.as_ref(), tools, &env.user_id, &settings).await?;
    if report.authorized.is_empty() {
        return Err(AgentError::Provisioning("No tools could be authorized".to_string()).into());
    }
    let tools = report.into_tool_set(client);

    let input = stdin_input();
    let confirm = confirmation(args.yes, &settings, input.clone());
    let model: Arc<dyn ChatModel> = Arc::new(OpenAIChatModel::new(&env.model)?);
    let agent = assemble_agent(&settings, &prompts, model, tools, confirm);
    info!("Assembled {:?}", agent);

    let sessions = Arc::new(InMemorySessionService::new());
    let app_name = settings.agent.app_name.clone();
    let mut state = Map::new();
    state.insert("user_id".to_string(), Value::String(env.user_id.clone()));
    let session = sessions
        .create_session(&app_name, &env.user_id, state)
        .await?;
    let runner = Runner::new(&app_name, Arc::new(agent), sessions.clone());

    let banner = format!(
        "Chatting with {} ({}). Type 'exit' to quit.",
        settings.agent.name, env.model
    );
    eprintln!("{}", style(banner).dim());

    let mut chat = ChatLoop::new(&runner, &env.user_id, &session.id, input, io::stdout());
    let end = chat.run().await?;
    info!("Chat ended: {:?}", end);

    sessions
        .delete_session(&app_name, &env.user_id, &session.id)
        .await?;

    if end == LoopEnd::Eof {
        // Leave the shell prompt on its own line.
        println!();
    }
    Ok(())
}

/// Confirmation hook for tool calls.
fn confirmation(
    yes: bool,
    settings: &Settings,
    input: SharedInput,
) -> Arc<dyn BeforeToolCallback> {
    if yes || !settings.agent.require_confirmation {
        Arc::new(AutoApprove)
    } else {
        Arc::new(ConsoleConfirmation::new(input, io::stdout()))
    }
}

/// Build the agent from settings, prompts and the authorized tools.
pub fn assemble_agent(
    settings: &Settings,
    prompts: &AgentPrompts,
    model: Arc<dyn ChatModel>,
    tools: ToolSet,
    before_tool: Arc<dyn BeforeToolCallback>,
) -> Agent {
    Agent::new(&settings.agent.name, model)
        .with_description(&prompts.description)
        .with_instruction(&prompts.instruction)
        .with_tools(tools)
        .with_before_tool(before_tool)
        .with_max_iterations(settings.agent.max_iterations)
}
