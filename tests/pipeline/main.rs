//! Integration tests for the statistics pipeline
//!
//! These tests drive the relay chain, the pipeline and the poller through the
//! public API over an in-memory transport that routes by relay prefix.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use matrix_stats::app::*;
use matrix_stats::errors::{FetchError, FetchResult};

const SUMMARY: &str = r#"{"all_time":"52,310","today":"48","yesterday":"61"}"#;
const HISTORY: &str = r#"{"2024-06-01":"40","2024-05-31":"55","bogus":"1","2024-06-02":null}"#;

/// Responds per relay host: each host is either up (serving the endpoint
/// bodies) or returns a fixed failure body/status
struct RelayNetwork {
    outages: Mutex<HashMap<String, Outage>>,
    requests: Mutex<Vec<String>>,
    summary_body: Mutex<String>,
    history_calls: AtomicUsize,
}

#[derive(Clone)]
enum Outage {
    Status(u16),
    Body(&'static str),
}

impl RelayNetwork {
    fn new() -> Self {
        Self {
            outages: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            summary_body: Mutex::new(SUMMARY.to_string()),
            history_calls: AtomicUsize::new(0),
        }
    }

    fn take_down(&self, host: &str, outage: Outage) {
        self.outages.lock().unwrap().insert(host.to_string(), outage);
    }

    fn hosts_requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|url| host_of(url))
            .collect()
    }
}

fn host_of(url: &str) -> String {
    url.split("://")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl Transport for RelayNetwork {
    async fn get_text(&self, url: &str) -> FetchResult<String> {
        self.requests.lock().unwrap().push(url.to_string());

        if let Some(outage) = self.outages.lock().unwrap().get(&host_of(url)).cloned() {
            return match outage {
                Outage::Status(status) => Err(FetchError::Status { status }),
                Outage::Body(body) => Ok(body.to_string()),
            };
        }

        if url.contains("historical_summary") {
            Ok(self.summary_body.lock().unwrap().clone())
        } else if url.contains("limit") {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            Ok(HISTORY.to_string())
        } else {
            Err(FetchError::Status { status: 404 })
        }
    }
}

fn relays() -> Vec<Relay> {
    vec![
        Relay::from_template("https://relay-one.test/get?url={url}"),
        Relay::from_template("https://relay-two.test/?{url}"),
        Relay::from_template("https://relay-three.test/raw?q={url}"),
    ]
}

fn pipeline(network: Arc<RelayNetwork>) -> StatsPipeline {
    let config = StatsConfig::default().with_slug("campaignbay");
    let fetcher = FallbackFetcher::new(network, relays());
    StatsPipeline::new(fetcher, &config).unwrap()
}

#[tokio::test]
async fn test_healthy_chain_uses_first_relay() {
    let network = Arc::new(RelayNetwork::new());
    let pipeline = pipeline(network.clone());

    pipeline.refresh(false).await;

    assert_eq!(
        network.hosts_requested(),
        vec!["relay-one.test", "relay-one.test"]
    );
    let snapshot = pipeline.snapshot();
    let stats = snapshot.stats.unwrap();
    assert_eq!(stats.total_downloads, 52_310);
    assert_eq!(stats.today, 48);

    // Invalid keys are skipped, null counts become zero
    let history: Vec<(String, u64)> = snapshot
        .history
        .iter()
        .map(|p| (p.date.to_string(), p.downloads))
        .collect();
    assert_eq!(
        history,
        vec![
            ("2024-05-31".to_string(), 55),
            ("2024-06-01".to_string(), 40),
            ("2024-06-02".to_string(), 0),
            ("2024-06-03".to_string(), 48),
        ]
    );
}

#[tokio::test]
async fn test_target_url_is_encoded_into_relay() {
    let network = Arc::new(RelayNetwork::new());
    let pipeline = pipeline(network.clone());
    pipeline.refresh(false).await;

    let first = network.requests.lock().unwrap()[0].clone();
    assert!(first.starts_with("https://relay-one.test/get?url=https%3A%2F%2Fapi.wordpress.org"));
    assert!(first.contains("slug%3Dcampaignbay"));
    assert!(!first.contains("&historical_summary"));
}

#[tokio::test]
async fn test_fallback_across_failure_kinds() {
    let network = Arc::new(RelayNetwork::new());
    network.take_down("relay-one.test", Outage::Status(429));
    network.take_down("relay-two.test", Outage::Body("<html>blocked</html>"));
    let pipeline = pipeline(network.clone());

    let outcome = pipeline.refresh(false).await;
    assert!(matches!(outcome, RefreshOutcome::Published { .. }));
    assert_eq!(
        network.hosts_requested(),
        vec![
            "relay-one.test",
            "relay-two.test",
            "relay-three.test",
            "relay-one.test",
            "relay-two.test",
            "relay-three.test",
        ]
    );
    assert_eq!(pipeline.snapshot().history.len(), 4);
}

#[tokio::test]
async fn test_refresh_runs_on_spawned_task() {
    let network = Arc::new(RelayNetwork::new());
    network.take_down("relay-one.test", Outage::Status(502));
    let pipeline = Arc::new(pipeline(network.clone()));

    let task = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.refresh(false).await })
    };

    assert_eq!(
        task.await.unwrap(),
        RefreshOutcome::Published {
            history: HistoryOutcome::Refreshed
        }
    );
    assert_eq!(pipeline.snapshot().stats.unwrap().total_downloads, 52_310);
}

#[tokio::test]
async fn test_all_relays_down_reports_unavailable() {
    let network = Arc::new(RelayNetwork::new());
    network.take_down("relay-one.test", Outage::Status(500));
    network.take_down("relay-two.test", Outage::Body(""));
    network.take_down("relay-three.test", Outage::Body("{not json"));

    let fetcher = FallbackFetcher::new(network.clone(), relays());
    let url = StatsConfig::default().summary_url().unwrap();
    let error = fetcher.fetch_json(&url).await.unwrap_err();

    match error {
        FetchError::DataSourceUnavailable { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected DataSourceUnavailable, got {:?}", other),
    }
    assert!(error_text(&fetcher, &url).await.contains("Unable to connect to data source"));

    let pipeline = StatsPipeline::new(fetcher, &StatsConfig::default()).unwrap();
    assert_eq!(pipeline.refresh(false).await, RefreshOutcome::SummaryFailed);
    assert!(pipeline.snapshot().loading);
}

async fn error_text(fetcher: &FallbackFetcher, url: &str) -> String {
    fetcher.fetch_json(url).await.unwrap_err().to_string()
}

#[tokio::test]
async fn test_recovery_after_outage() {
    let network = Arc::new(RelayNetwork::new());
    for host in ["relay-one.test", "relay-two.test", "relay-three.test"] {
        network.take_down(host, Outage::Status(503));
    }
    let pipeline = pipeline(network.clone());
    assert_eq!(pipeline.refresh(false).await, RefreshOutcome::SummaryFailed);

    network.outages.lock().unwrap().clear();
    assert!(matches!(
        pipeline.refresh(true).await,
        RefreshOutcome::Published { .. }
    ));
    let snapshot = pipeline.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.history.len(), 4);
}

#[tokio::test]
async fn test_poller_refetches_history_only_on_total_change() {
    let network = Arc::new(RelayNetwork::new());
    let pipeline = Arc::new(pipeline(network.clone()));
    let mut updates = pipeline.subscribe();

    let poller = StatsPoller::spawn(pipeline.clone(), Duration::from_millis(30));

    // Initial refresh publishes summary then history
    updates.changed().await.unwrap();
    tokio::time::sleep(Duration::from_millis(45)).await;
    assert_eq!(network.history_calls.load(Ordering::SeqCst), 1);

    *network.summary_body.lock().unwrap() = r#"{"all_time":52320,"today":58}"#.to_string();
    tokio::time::sleep(Duration::from_millis(90)).await;
    poller.cancel().await;

    assert_eq!(network.history_calls.load(Ordering::SeqCst), 2);
    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.stats.unwrap().total_downloads, 52_320);
    assert_eq!(snapshot.history.last().unwrap().downloads, 58);
}
