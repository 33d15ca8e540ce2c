//! Error types for ytagent.

use thiserror::Error;

/// Library-level error type for ytagent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool provisioning failed: {0}")]
    Provisioning(String),

    #[error("Authorization failed for {tool}: {reason}")]
    Authorization { tool: String, reason: String },

    #[error("Arcade API error ({status}): {message}")]
    Arcade { status: u16, message: String },

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Tool execution failed: {0}")]
    Tool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for ytagent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
