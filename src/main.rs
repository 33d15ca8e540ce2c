//! ytagent CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ytagent::cli::{commands, ChatArgs, Cli, Commands};
use ytagent::config::{load_dotenv, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout carries the conversation.
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("ytagent={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Dotfile values win over the inherited environment.
    let env_file = cli
        .env_file
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(|| settings.env_file());
    load_dotenv(&env_file, true)?;

    // Execute command
    match cli.command {
        None => {
            commands::run_chat(ChatArgs::default(), settings).await?;
        }

        Some(Commands::Chat(args)) => {
            commands::run_chat(args, settings).await?;
        }

        Some(Commands::Tools { toolkit }) => {
            commands::run_tools(toolkit, settings).await?;
        }

        Some(Commands::Authorize { user_id, toolkit }) => {
            commands::run_authorize(user_id, toolkit, settings).await?;
        }

        Some(Commands::Doctor) => {
            commands::run_doctor(&settings, config_path.as_ref(), &env_file).await?;
        }

        Some(Commands::Config { action }) => {
            commands::run_config(&action, &settings, config_path.as_ref())?;
        }
    }

    Ok(())
}
