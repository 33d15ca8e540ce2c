//! CLI module for ytagent.

pub mod commands;
pub mod interactive;
mod output;
pub mod preflight;
pub mod repl;

pub use output::Output;

use clap::{Args, Parser, Subcommand};

/// ytagent - chat with an LLM agent that can search YouTube
///
/// Tools come from the Arcade platform and are authorized for your user
/// before the conversation starts. Type 'exit' to leave the chat.
#[derive(Parser, Debug)]
#[command(name = "ytagent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "YTAGENT_CONFIG")]
    pub config: Option<String>,

    /// Dotfile loaded into the environment (default: .env)
    #[arg(long, global = true)]
    pub env_file: Option<String>,

    /// Command to run (default: chat)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat with the YouTube agent
    Chat(ChatArgs),

    /// List the tools discovered for the configured toolkits
    Tools {
        /// Toolkit to list (repeatable; default from config)
        #[arg(short, long)]
        toolkit: Vec<String>,
    },

    /// Authorize the discovered tools for a user without chatting
    Authorize {
        /// User identity (default: $ARCADE_USER_ID)
        #[arg(short, long)]
        user_id: Option<String>,

        /// Toolkit to authorize (repeatable; default from config)
        #[arg(short, long)]
        toolkit: Vec<String>,
    },

    /// Check credentials and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Default)]
pub struct ChatArgs {
    /// LLM model to use (default: $OPENAI_MODEL)
    #[arg(short, long)]
    pub model: Option<String>,

    /// User identity (default: $ARCADE_USER_ID)
    #[arg(short, long)]
    pub user_id: Option<String>,

    /// Toolkit to provision (repeatable; default from config)
    #[arg(short, long)]
    pub toolkit: Vec<String>,

    /// Run tools without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_is_default() {
        let cli = Cli::try_parse_from(["ytagent"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_chat_flags() {
        let cli = Cli::try_parse_from([
            "ytagent", "-vv", "chat", "--model", "gpt-4o-mini", "-t", "Youtube", "-t", "Spotify",
            "--yes",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Chat(args)) => {
                assert_eq!(args.model.as_deref(), Some("gpt-4o-mini"));
                assert_eq!(args.toolkit, vec!["Youtube", "Spotify"]);
                assert!(args.yes);
                assert!(args.user_id.is_none());
            }
            other => panic!("Expected chat command, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["ytagent", "tools", "--env-file", "dev.env"]).unwrap();
        assert_eq!(cli.env_file.as_deref(), Some("dev.env"));
        assert!(matches!(cli.command, Some(Commands::Tools { .. })));
    }
}
