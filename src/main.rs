//! Switchboard CLI binary entry point.

use std::io;
use std::sync::Arc;

use clap::Parser;
use switchboard::cli::{commands, Cli, Commands};
use switchboard::config::SwitchboardConfig;
use switchboard::mcp::MCPToolAggregator;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = SwitchboardConfig::from_env();
    if let Some(path) = cli.config {
        config.config_path = Some(path);
    }
    let aggregator = Arc::new(MCPToolAggregator::from_config(config));

    let result = match cli.command {
        Commands::Status => commands::handle_status(&aggregator).await,
        Commands::Tools => commands::handle_tools(&aggregator).await,
        Commands::Call(args) => {
            commands::handle_call(&aggregator, &args.tool, args.arguments.as_deref()).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
