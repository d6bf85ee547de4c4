//! Prelude module for Matrix Stats Library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use matrix_stats::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use matrix_stats::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = StatsConfig::default();
//!     let fetcher = build_fetcher(&ClientConfig::default(), config.relay_chain())?;
//!     let pipeline = Arc::new(StatsPipeline::new(fetcher, &config)?);
//!
//!     let poller = StatsPoller::spawn(pipeline.clone(), config.poll_interval);
//!     // Read pipeline.snapshot() or pipeline.subscribe() as updates arrive...
//!     poller.cancel().await;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, FetchError, Result};

// Comparison matrix
pub use crate::app::{
    build_capability_map, compute_ratio, is_row_visible, parse, ComparisonView, Markers,
    ParsedTable, ProductCapabilityMap, ReconcilerConfig, SupportRatio,
};

// Download statistics
pub use crate::app::{
    build_fetcher, ClientConfig, DownloadStats, FallbackFetcher, HistoryPoint, Relay,
    StatsConfig, StatsPipeline, StatsPoller, StatsSnapshot, Transport,
};

pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{DEFAULT_SLUG, POLL_INTERVAL, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

pub use tokio;
