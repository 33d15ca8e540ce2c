//! Tool provisioning, per-user authorization and the agent's tool set.

mod auth;
mod provision;
mod registry;

pub use auth::{AuthPrompt, AuthorizationGate, AuthorizationReport, SilentPrompt};
pub use provision::{provision_tools, ToolQuery};
pub use registry::ToolSet;
