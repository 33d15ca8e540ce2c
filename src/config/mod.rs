//! Configuration module for ytagent.
//!
//! Handles the `.env` dotfile, environment credentials, the TOML settings
//! file and the agent's instruction text.

pub mod env;
mod prompts;
mod settings;

pub use env::{load_dotenv, resolve_user_id, ArcadeCredentials, Environment, Overrides};
pub use prompts::{AgentPrompts, DEFAULT_DESCRIPTION, DEFAULT_INSTRUCTION};
pub use settings::{AgentSettings, ArcadeSettings, AuthFailurePolicy, GeneralSettings, Settings};
