mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricescout")]
#[command(about = "Extract normalized product prices from store pages")]
struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract product snapshots and print each outcome as JSON.
    Extract {
        #[arg(required = true)]
        urls: Vec<String>,
        /// Make exactly one attempt, ignoring `PRICESCOUT_MAX_RETRIES`.
        #[arg(long)]
        no_retry: bool,
    },
    /// Report whether a URL belongs to a registered store.
    Supported { url: String },
    /// List every registered store.
    Stores,
}

fn init_tracing(log_level: &str, json: bool) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = pricescout_core::load_engine_config_from_env()?;
    init_tracing(&config.log_level, cli.json_logs)?;

    match cli.command {
        Commands::Extract { urls, no_retry } => {
            commands::run_extract(&config, &urls, no_retry).await
        }
        Commands::Supported { url } => Ok(commands::run_supported(&url)),
        Commands::Stores => {
            commands::run_stores();
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests;
