//! Core application logic for Matrix Stats
//!
//! This module contains the two halves of the application: the comparison
//! table (parsing and capability reconciliation) and the download statistics
//! pipeline (relay client, fetch orchestration and polling).
//!
//! # Examples
//!
//! ```rust,no_run
//! use matrix_stats::app::{ComparisonView, ParsedTable, ReconcilerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let table = ParsedTable::from_path("matrix.csv".as_ref()).await?;
//! let view = ComparisonView::build(&table, "coupon", &[], &ReconcilerConfig::default());
//!
//! for row in &view.rows {
//!     println!("{}: {}", row.feature, row.ratio);
//! }
//! # Ok(())
//! # }
//! ```

pub mod capability;
pub mod client;
pub mod signals;
pub mod stats;
pub mod table;

// Re-export main public API
pub use capability::{
    build_capability_map, compute_ratio, is_row_visible, visible_comparison_columns,
    ComparisonView, Markers, ProductCapabilityMap, ReconcilerConfig, SupportLevel, SupportRatio,
};
pub use client::{build_fetcher, ClientConfig, FallbackFetcher, HttpHandler, Relay, Transport};
pub use stats::{
    DownloadStats, HistoryOutcome, HistoryPoint, PollerHandle, RefreshOutcome, StatsConfig,
    StatsPipeline, StatsPoller, StatsSnapshot,
};
pub use table::{parse, ParsedTable};
