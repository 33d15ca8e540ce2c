//! ytagent - a command-line chat agent with YouTube tools
//!
//! Wires an OpenAI chat model to the YouTube toolkit hosted on the Arcade
//! tool platform and runs an interactive chat loop in the terminal.
//!
//! # Overview
//!
//! At startup ytagent:
//! - loads `.env` and the optional TOML config
//! - discovers the toolkit's tools from Arcade
//! - authorizes every tool for the configured user, walking them through
//!   any OAuth flow
//! - assembles an agent and an in-memory session
//! - reads lines from stdin and prints the agent's replies
//!
//! # Architecture
//!
//! - `config` - Settings, dotfile loading and environment resolution
//! - `arcade` - Arcade HTTP client and tool schema conversion
//! - `tools` - Tool provisioning, authorization gate and the agent's tool set
//! - `agent` - Agent, chat model, sessions and the tool-calling runner
//! - `cli` - Command-line interface and the chat loop
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use serde_json::Map;
//! use ytagent::agent::{
//!     Agent, Content, InMemorySessionService, OpenAIChatModel, Runner, SessionService,
//! };
//! use ytagent::arcade::ArcadeClient;
//! use ytagent::config::{AuthFailurePolicy, Settings};
//! use ytagent::tools::{provision_tools, AuthorizationGate, ToolQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let client = Arc::new(ArcadeClient::new(
//!         "https://api.arcade.dev",
//!         "arc_...",
//!         std::time::Duration::from_secs(60),
//!     )?);
//!
//!     let query = ToolQuery::from_settings(&settings.arcade);
//!     let tools = provision_tools(client.as_ref(), &query).await?;
//!     let report = AuthorizationGate::new(client.as_ref(), AuthFailurePolicy::Abort)
//!         .authorize_all(tools, "me@example.com")
//!         .await?;
//!
//!     let model = Arc::new(OpenAIChatModel::new("gpt-4o-mini")?);
//!     let agent = Agent::new("youtube_agent", model).with_tools(report.into_tool_set(client));
//!
//!     let sessions = Arc::new(InMemorySessionService::new());
//!     let session = sessions
//!         .create_session("my_agent", "me@example.com", Map::new())
//!         .await?;
//!     let runner = Runner::new("my_agent", Arc::new(agent), sessions);
//!
//!     let message = Content::user_text("find cat videos");
//!     let mut events = runner.run("me@example.com", &session.id, message);
//!     while let Some(event) = events.next().await {
//!         if let Some(line) = event?.display_line() {
//!             println!("{}", line);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod arcade;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AgentError, Result};
