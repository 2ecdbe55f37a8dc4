// Lino conversational task assistant
// Main entry point for the lino binary

use clap::Parser;
use lino_engine::cli::{Cli, Command, ConfigAction};
use lino_engine::config::Config;
use lino_engine::handlers::{handle_chat, handle_config_path, handle_config_show, handle_status};
use lino_engine::telemetry;
use sdk::errors::LinoErrorExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load_or_create(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}\nhint: {}", e.user_hint());
            std::process::exit(1);
        }
    };

    // CLI flag wins over config for the log level; RUST_LOG wins over both.
    let level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    telemetry::init(level);

    tracing::info!("Lino v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Chat => handle_chat(&config).await,
        Command::Status => handle_status(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Path => {
                handle_config_path();
                Ok(())
            }
            ConfigAction::Show => handle_config_show(&config),
        },
    }
}
