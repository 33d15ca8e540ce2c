//! CLI command implementations.

mod authorize;
mod chat;
mod config;
mod doctor;
mod setup;
mod tools;

pub use authorize::run_authorize;
pub use chat::{assemble_agent, run_chat};
pub use config::run_config;
pub use doctor::run_doctor;
pub use tools::run_tools;
