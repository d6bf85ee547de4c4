//! Command-line interface components
//!
//! This module contains CLI-specific code for Matrix Stats: argument parsing
//! and the command handlers that render results to the terminal.

pub mod args;
pub mod commands;

pub use args::{
    Cli, ColumnsArgs, Commands, ConfigAction, ConfigArgs, GlobalArgs, OutputFormat, StatsArgs,
    TableArgs, WatchArgs,
};
pub use commands::{handle_columns, handle_config, handle_stats, handle_table, handle_watch};
