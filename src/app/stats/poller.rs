//! Background polling for the statistics pipeline
//!
//! The poller runs one non-polling refresh at startup and then refreshes on a
//! fixed interval until cancelled. Cancelling stops the timer only; a refresh
//! already underway finishes and publishes into the pipeline as usual.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::StatsPipeline;
use crate::constants::poller::TASK_SHUTDOWN_TIMEOUT;

/// Spawns the polling task
pub struct StatsPoller;

impl StatsPoller {
    pub fn spawn(pipeline: Arc<StatsPipeline>, interval: Duration) -> PollerHandle {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let task = tokio::spawn(async move {
            pipeline.refresh(false).await;

            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let outcome = pipeline.refresh(true).await;
                        debug!("Poll finished: {:?}", outcome);
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Stats poller received shutdown signal");
                        break;
                    }
                }
            }
        });

        PollerHandle { shutdown_tx, task }
    }
}

/// Handle to a running poller
pub struct PollerHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop the timer and wait for the task to wind down
    pub async fn cancel(self) {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, self.task).await {
            Ok(Ok(())) => debug!("Stats poller stopped"),
            Ok(Err(e)) => warn!("Stats poller task failed: {}", e),
            Err(_) => warn!(
                "Stats poller shutdown timed out after {:?}",
                TASK_SHUTDOWN_TIMEOUT
            ),
        }
    }
}
