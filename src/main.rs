//! awsbastion CLI entry point that dispatches to subcommands.

use awsbastion::cli::{Cli, Commands};
use awsbastion::config::{Config, ConfigManager};
use awsbastion::error::BastionResult;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> BastionResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    let cache_path = ConfigManager::cache_path(cli.cache_file.as_deref(), &config);
    debug!("Credential cache at {}", cache_path.display());

    match cli.command {
        Commands::Session(args) => {
            awsbastion::cli::commands::session(args, &config, &cache_path).await
        }
        Commands::Status => awsbastion::cli::commands::status(&cache_path).await,
        Commands::Purge => awsbastion::cli::commands::purge(&cache_path).await,
        Commands::Config(args) => {
            awsbastion::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins when set
fn init_logging(verbose: u8, config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("awsbastion=warn"),
        1 => EnvFilter::new("awsbastion=info"),
        _ => EnvFilter::new("awsbastion=debug"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
