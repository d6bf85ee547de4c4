//! Command-line argument parsing for Matrix Stats
//!
//! This module defines the CLI structure using clap derive macros: browsing a
//! feature comparison matrix and tracking plugin download statistics.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Matrix Stats - Compare plugin features and track downloads
#[derive(Parser, Debug)]
#[command(
    name = "matrix_stats",
    version,
    about = "Browse a feature comparison matrix and track plugin download statistics",
    long_about = "Reads a CSV feature matrix and reports how many competing products support
each feature. Also fetches download statistics through a chain of relays, either once or
polling on an interval."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the comparison matrix with support ratios
    Table(TableArgs),

    /// List comparison columns and how their headers were interpreted
    Columns(ColumnsArgs),

    /// Fetch download statistics once
    Stats(StatsArgs),

    /// Poll download statistics until interrupted
    Watch(WatchArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Output format for the table command
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Csv,
    Json,
}

/// Arguments for the table command
#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    /// CSV file containing the comparison matrix
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only show features whose name or description contains this text
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Hide a comparison column (repeatable)
    #[arg(long = "hide", value_name = "COLUMN")]
    pub hidden: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the columns command
#[derive(Args, Debug, Clone)]
pub struct ColumnsArgs {
    /// CSV file containing the comparison matrix
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the stats command
#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Plugin slug (overrides configuration)
    #[arg(long)]
    pub slug: Option<String>,

    /// Print this many of the most recent history points
    #[arg(long, default_value = "7")]
    pub history: usize,
}

/// Arguments for the watch command
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Plugin slug (overrides configuration)
    #[arg(long)]
    pub slug: Option<String>,

    /// Poll interval, e.g. "2m" or "30s" (overrides configuration)
    #[arg(short, long, value_parser = humantime_serde::re::humantime::parse_duration)]
    pub interval: Option<Duration>,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file if none exists
    Init {
        /// Write to this path instead of the user config directory
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    pub fn log_level(&self) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}

impl WatchArgs {
    pub fn validate(&self) -> Result<(), String> {
        if matches!(self.interval, Some(interval) if interval.is_zero()) {
            return Err("Poll interval must be greater than zero".to_string());
        }
        Ok(())
    }
}
