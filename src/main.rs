//! Matrix Stats CLI application
//!
//! Command-line interface for browsing a feature comparison matrix and
//! tracking plugin download statistics.

use std::process;

use tracing::info;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, EnvFilter};

use matrix_stats::cli::{
    handle_columns, handle_config, handle_stats, handle_table, handle_watch, Cli, Commands,
};
use matrix_stats::config::AppConfig;
use matrix_stats::errors::{ConfigError, Result};

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    let config = AppConfig::load(cli.global.config.clone()).await?;

    init_logging(&cli, &config)?;

    info!("Matrix Stats v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Table(args) => {
            info!("Executing table command");
            handle_table(args, &config).await
        }
        Commands::Columns(args) => {
            info!("Executing columns command");
            handle_columns(args, &config).await
        }
        Commands::Stats(args) => {
            info!("Executing stats command");
            handle_stats(args, &config).await
        }
        Commands::Watch(args) => {
            info!("Executing watch command");
            handle_watch(args, &config).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(args, &config).await
        }
    }
}

/// Initialize logging from CLI verbosity, falling back to the configured level
fn init_logging(cli: &Cli, config: &AppConfig) -> Result<()> {
    let global = &cli.global;
    let level = if global.quiet || global.verbose || global.very_verbose {
        cli.log_level().to_string().to_lowercase()
    } else {
        config.logging.level.clone()
    };

    let directive: Directive = format!("matrix_stats={}", level)
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            field: "logging.level".to_string(),
            value: level.clone(),
            reason: "Expected one of error, warn, info, debug, trace".to_string(),
        })?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if global.very_verbose {
        info!("Very verbose logging enabled");
    } else if global.verbose {
        info!("Verbose logging enabled");
    }
    Ok(())
}
