//! Pre-flight checks before expensive operations.
//!
//! Validates that the credentials an operation needs are present before
//! starting work that would otherwise fail midway (after discovering tools,
//! or in the middle of a chat turn).

use crate::config::env::{ARCADE_API_KEY_VAR, OPENAI_API_KEY_VAR};
use crate::error::{AgentError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chat needs both the Arcade and the OpenAI key.
    Chat,
    /// Listing tools only talks to Arcade.
    Tools,
    /// Authorization only talks to Arcade.
    Authorize,
}

/// Run pre-flight checks against the process environment.
pub fn check(operation: Operation) -> Result<()> {
    check_with(operation, |key| std::env::var(key).ok())
}

/// Run pre-flight checks using an arbitrary variable lookup.
pub fn check_with<F>(operation: Operation, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    match operation {
        Operation::Chat => {
            check_key(&lookup, ARCADE_API_KEY_VAR, "arc_...")?;
            check_key(&lookup, OPENAI_API_KEY_VAR, "sk-...")?;
        }
        Operation::Tools | Operation::Authorize => {
            check_key(&lookup, ARCADE_API_KEY_VAR, "arc_...")?;
        }
    }
    Ok(())
}

fn check_key<F>(lookup: &F, name: &str, example: &str) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(key) if !key.trim().is_empty() => Ok(()),
        Some(_) => Err(AgentError::Config(format!(
            "{} is empty. Set it in .env or with: export {}='{}'",
            name, name, example
        ))),
        None => Err(AgentError::Config(format!(
            "{} not set. Set it in .env or with: export {}='{}'",
            name, name, example
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_needs_both_keys() {
        let only_arcade = |key: &str| (key == ARCADE_API_KEY_VAR).then(|| "arc_x".to_string());
        let err = check_with(Operation::Chat, only_arcade).unwrap_err();
        assert!(err.to_string().contains(OPENAI_API_KEY_VAR));

        assert!(check_with(Operation::Tools, only_arcade).is_ok());
        assert!(check_with(Operation::Authorize, only_arcade).is_ok());

        let both = |_: &str| Some("key".to_string());
        assert!(check_with(Operation::Chat, both).is_ok());
    }

    #[test]
    fn test_empty_key_rejected() {
        let empty = |_: &str| Some("  ".to_string());
        let err = check_with(Operation::Tools, empty).unwrap_err();
        assert!(err.to_string().contains("ARCADE_API_KEY is empty"));
    }
}
