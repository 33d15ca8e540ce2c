//! Configuration settings for ytagent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub arcade: ArcadeSettings,
    pub agent: AgentSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Dotfile loaded into the environment at startup.
    pub env_file: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            env_file: ".env".to_string(),
        }
    }
}

/// What to do when a tool cannot be authorized for the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthFailurePolicy {
    /// Stop startup on the first failed authorization.
    #[default]
    Abort,
    /// Drop the failed tool and continue with the rest.
    Skip,
}

impl std::fmt::Display for AuthFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailurePolicy::Abort => write!(f, "abort"),
            AuthFailurePolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Arcade tool service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeSettings {
    /// API base URL. `ARCADE_BASE_URL` wins over this when set.
    pub base_url: Option<String>,
    /// Toolkits whose tools are all handed to the agent.
    pub toolkits: Vec<String>,
    /// Individual tools added on top of the toolkits (qualified names).
    pub tools: Vec<String>,
    /// Maximum number of tool definitions to provision.
    pub limit: usize,
    /// Behavior when a tool fails to authorize.
    pub on_auth_failure: AuthFailurePolicy,
    /// How long to wait for the user to finish an authorization flow.
    pub auth_timeout_secs: u64,
    /// Timeout for a single Arcade API request.
    pub request_timeout_secs: u64,
}

impl Default for ArcadeSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            toolkits: vec!["Youtube".to_string()],
            tools: Vec::new(),
            limit: 100,
            on_auth_failure: AuthFailurePolicy::Abort,
            auth_timeout_secs: 600,
            request_timeout_secs: 60,
        }
    }
}

/// Agent assembly and runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Application name the session is keyed under.
    pub app_name: String,
    /// Agent name, printed as the author of reply events.
    pub name: String,
    /// Fallback model when `OPENAI_MODEL` is not set.
    pub model: Option<String>,
    /// Override for the agent description.
    pub description: Option<String>,
    /// Markdown file replacing the built-in instruction.
    pub instruction_file: Option<String>,
    /// Maximum model calls per user turn.
    pub max_iterations: usize,
    /// Ask before every tool call.
    pub require_confirmation: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            app_name: "my_agent".to_string(),
            name: "youtube_agent".to_string(),
            model: None,
            description: None,
            instruction_file: None,
            max_iterations: 15,
            require_confirmation: true,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ytagent")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded dotfile path.
    pub fn env_file(&self) -> PathBuf {
        Self::expand_path(&self.general.env_file)
    }
}
