//! Download statistics pipeline
//!
//! [`StatsPipeline`] owns the fetch state for one tracked plugin: it pulls the
//! summary through the relay chain, publishes it straight away, and only goes
//! back for the (much larger) history document when the all-time total has
//! moved. Consumers watch a [`StatsSnapshot`] channel rather than calling in.
//!
//! Each fetch kind has an in-flight flag. A refresh that finds the summary
//! flag already set returns immediately, so overlapping timer ticks and manual
//! refreshes never issue duplicate requests.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use matrix_stats::app::client::{build_fetcher, ClientConfig};
//! use matrix_stats::app::stats::{StatsConfig, StatsPipeline, StatsPoller};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StatsConfig::default();
//! let fetcher = build_fetcher(&ClientConfig::default(), config.relay_chain())?;
//! let pipeline = Arc::new(StatsPipeline::new(fetcher, &config)?);
//!
//! let mut updates = pipeline.subscribe();
//! let poller = StatsPoller::spawn(pipeline.clone(), config.poll_interval);
//!
//! updates.changed().await?;
//! println!("{:?}", updates.borrow().stats);
//! poller.cancel().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod poller;


use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::app::client::FallbackFetcher;
use crate::errors::{FetchResult, StatsResult};

pub use config::StatsConfig;
pub use models::{
    parse_count, parse_history, parse_summary, with_synthetic_point, DownloadStats, HistoryPoint,
};
pub use poller::{PollerHandle, StatsPoller};

/// State published to consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub stats: Option<DownloadStats>,
    /// Sorted history, ending with the synthetic point when non-empty
    pub history: Vec<HistoryPoint>,
    /// True until the first summary is published
    pub loading: bool,
}

impl Default for StatsSnapshot {
    fn default() -> Self {
        Self {
            stats: None,
            history: Vec::new(),
            loading: true,
        }
    }
}

/// What happened to history during a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// Total unchanged, history left alone
    Unchanged,
    Refreshed,
    /// Another history fetch was already running
    InFlight,
    /// Fetch failed, previous history kept
    Failed,
}

/// Result of a single refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A summary fetch was already in flight
    Skipped,
    /// Summary fetch or parse failed, state untouched
    SummaryFailed,
    Published { history: HistoryOutcome },
}

/// Clears its flag on drop, including on early return
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Summary + history fetcher with in-flight deduplication
pub struct StatsPipeline {
    fetcher: FallbackFetcher,
    summary_url: String,
    history_url: String,
    summary_in_flight: AtomicBool,
    history_in_flight: AtomicBool,
    state: watch::Sender<StatsSnapshot>,
}

impl StatsPipeline {
    /// Create a pipeline for the endpoints described by `config`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the endpoint URLs cannot be built
    pub fn new(fetcher: FallbackFetcher, config: &StatsConfig) -> FetchResult<Self> {
        Ok(Self::with_urls(
            fetcher,
            config.summary_url()?,
            config.history_url()?,
        ))
    }

    pub fn with_urls(
        fetcher: FallbackFetcher,
        summary_url: impl Into<String>,
        history_url: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(StatsSnapshot::default());
        Self {
            fetcher,
            summary_url: summary_url.into(),
            history_url: history_url.into(),
            summary_in_flight: AtomicBool::new(false),
            history_in_flight: AtomicBool::new(false),
            state,
        }
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<StatsSnapshot> {
        self.state.subscribe()
    }

    /// Current published state
    pub fn snapshot(&self) -> StatsSnapshot {
        self.state.borrow().clone()
    }

    /// Run one refresh cycle
    ///
    /// The summary is published before history is considered. History is
    /// fetched only on the first successful summary or when the total
    /// changed. Failures are logged and leave the previous state in place.
    ///
    /// Each fetch kind is deduplicated separately: the summary flag is
    /// released once the summary is published, so a refresh arriving during
    /// a slow history fetch still updates the summary.
    pub async fn refresh(&self, is_polling: bool) -> RefreshOutcome {
        let Some(summary_guard) = InFlight::acquire(&self.summary_in_flight) else {
            debug!("Summary fetch already in flight, skipping refresh");
            return RefreshOutcome::Skipped;
        };

        let stats = match self.fetch_summary().await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Stats fetch failed: {}", e);
                return RefreshOutcome::SummaryFailed;
            }
        };

        let previous_total = self
            .state
            .borrow()
            .stats
            .as_ref()
            .map(|s| s.total_downloads);
        let history_stale = previous_total != Some(stats.total_downloads);
        let today = stats.today;

        if is_polling {
            debug!(
                "Polled summary: {} total, {} today",
                stats.total_downloads, stats.today
            );
        } else {
            info!(
                "Fetched summary: {} total, {} today",
                stats.total_downloads, stats.today
            );
        }

        self.state.send_modify(|snapshot| {
            snapshot.stats = Some(stats);
            snapshot.loading = false;
        });
        // Summary work is done; history has its own flag
        drop(summary_guard);

        if !history_stale {
            debug!("Total downloads unchanged, keeping history");
            return RefreshOutcome::Published {
                history: HistoryOutcome::Unchanged,
            };
        }

        let Some(_history) = InFlight::acquire(&self.history_in_flight) else {
            debug!("History fetch already in flight");
            return RefreshOutcome::Published {
                history: HistoryOutcome::InFlight,
            };
        };

        let history = match self.fetch_history().await {
            Ok(history) => with_synthetic_point(history, today),
            Err(e) => {
                error!("Failed to update history: {}", e);
                return RefreshOutcome::Published {
                    history: HistoryOutcome::Failed,
                };
            }
        };

        debug!("Publishing {} history points", history.len());
        self.state.send_modify(|snapshot| snapshot.history = history);

        RefreshOutcome::Published {
            history: HistoryOutcome::Refreshed,
        }
    }

    async fn fetch_summary(&self) -> StatsResult<DownloadStats> {
        let body = self.fetcher.fetch_json(&self.summary_url).await?;
        parse_summary(&body, Utc::now())
    }

    async fn fetch_history(&self) -> StatsResult<Vec<HistoryPoint>> {
        let body = self.fetcher.fetch_json(&self.history_url).await?;
        parse_history(&body)
    }
}
