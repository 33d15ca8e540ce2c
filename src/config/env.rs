//! Environment loading: the `.env` dotfile and the credentials read from it.

use super::Settings;
use crate::error::{AgentError, Result};
use std::path::Path;
use tracing::debug;

pub const USER_ID_VAR: &str = "ARCADE_USER_ID";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const ARCADE_API_KEY_VAR: &str = "ARCADE_API_KEY";
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const ARCADE_BASE_URL_VAR: &str = "ARCADE_BASE_URL";

/// Default Arcade API endpoint.
pub const DEFAULT_ARCADE_BASE_URL: &str = "https://api.arcade.dev";

/// Parse `KEY=VALUE` lines from dotfile content.
///
/// Blank lines and `#` comments are ignored, an `export ` prefix is
/// accepted, and matching surrounding quotes are stripped from values.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some((key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    // Unquoted values may carry a trailing comment.
    match value.find(" #") {
        Some(idx) => value[..idx].trim_end(),
        None => value,
    }
}

/// Load a dotfile into the process environment.
///
/// A missing file is not an error. Returns the number of variables set.
pub fn load_dotenv(path: &Path, override_existing: bool) -> Result<usize> {
    if !path.exists() {
        debug!("No dotfile at {}", path.display());
        return Ok(0);
    }

    let content = std::fs::read_to_string(path)?;
    let mut count = 0;
    for (key, value) in parse_dotenv(&content) {
        if !override_existing && std::env::var_os(&key).is_some() {
            continue;
        }
        std::env::set_var(&key, value);
        count += 1;
    }

    debug!("Loaded {} variables from {}", count, path.display());
    Ok(count)
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub user_id: Option<String>,
    pub model: Option<String>,
}

/// Arcade API key and endpoint.
#[derive(Debug, Clone)]
pub struct ArcadeCredentials {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl ArcadeCredentials {
    /// Resolve from the process environment.
    pub fn from_env(settings: &Settings) -> Self {
        Self::resolve(|key| std::env::var(key).ok(), settings)
    }

    /// Resolve using an arbitrary variable lookup.
    pub fn resolve<F>(lookup: F, settings: &Settings) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_key: non_empty(ARCADE_API_KEY_VAR),
            base_url: non_empty(ARCADE_BASE_URL_VAR)
                .or_else(|| settings.arcade.base_url.clone())
                .unwrap_or_else(|| DEFAULT_ARCADE_BASE_URL.to_string()),
        }
    }
}

/// Values the agent needs from the process environment.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Authorization subject and session key.
    pub user_id: String,
    /// Chat model identifier.
    pub model: String,
    pub arcade: ArcadeCredentials,
}

impl Environment {
    /// Resolve from the process environment.
    pub fn from_env(settings: &Settings, overrides: &Overrides) -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok(), settings, overrides)
    }

    /// Resolve using an arbitrary variable lookup.
    pub fn resolve<F>(lookup: F, settings: &Settings, overrides: &Overrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_id = resolve_user_id(&lookup, overrides)?;

        let model = overrides
            .model
            .clone()
            .or_else(|| lookup(MODEL_VAR))
            .or_else(|| settings.agent.model.clone())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                AgentError::Config(format!("Missing {}. Add it to your .env file.", MODEL_VAR))
            })?;

        Ok(Self {
            user_id,
            model,
            arcade: ArcadeCredentials::resolve(lookup, settings),
        })
    }
}

/// Resolve the user identity, which must be non-empty.
pub fn resolve_user_id<F>(lookup: F, overrides: &Overrides) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    overrides
        .user_id
        .clone()
        .or_else(|| lookup(USER_ID_VAR))
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            AgentError::Config(format!("Missing {}. Add it to your .env file.", USER_ID_VAR))
        })
}
