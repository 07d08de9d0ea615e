//! Ollachat - chat with locally served language models
//!
#![doc = "Ollachat - chat with locally served language models"]
#![doc = "Main entry point for the relay server and the terminal chat."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ollachat::cli::{Cli, Commands};
use ollachat::commands;
use ollachat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Serve { bind } => {
            tracing::info!("Starting relay server");
            commands::serve::run_serve(config, bind).await?;
            Ok(())
        }
        Commands::Chat { model, direct } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            if direct {
                tracing::debug!("Bypassing the relay");
            }

            commands::chat::run_chat(config, model, direct).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::debug!("Starting history command");
            commands::history::handle_history(command, &config)?;
            Ok(())
        }
        Commands::Status => {
            commands::status::run_status(&config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins; otherwise `--verbose` raises the default level to debug.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "ollachat=debug" } else { "ollachat=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
