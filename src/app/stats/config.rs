//! Statistics pipeline configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::client::Relay;
use crate::constants::stats;
use crate::errors::{FetchError, FetchResult};

/// Endpoint, polling and relay settings for the statistics pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Plugin slug
    pub slug: String,
    /// Statistics endpoint without query string
    pub api_base: String,
    /// Days requested from the history endpoint
    pub history_limit: u32,
    /// Time between polls
    pub poll_interval: Duration,
    /// Relay templates, tried in order
    pub relays: Vec<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            slug: stats::DEFAULT_SLUG.to_string(),
            api_base: stats::API_BASE.to_string(),
            history_limit: stats::DEFAULT_HISTORY_LIMIT,
            poll_interval: stats::POLL_INTERVAL,
            relays: stats::DEFAULT_RELAYS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl StatsConfig {
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Summary document URL (`historical_summary=1`)
    pub fn summary_url(&self) -> FetchResult<String> {
        self.endpoint(&[("slug", self.slug.as_str()), ("historical_summary", "1")])
    }

    /// History document URL (`limit=<history_limit>`)
    pub fn history_url(&self) -> FetchResult<String> {
        let limit = self.history_limit.to_string();
        self.endpoint(&[("slug", self.slug.as_str()), ("limit", limit.as_str())])
    }

    fn endpoint(&self, params: &[(&str, &str)]) -> FetchResult<String> {
        Url::parse_with_params(&self.api_base, params)
            .map(String::from)
            .map_err(|e| FetchError::InvalidUrl {
                url: self.api_base.clone(),
                error: e.to_string(),
            })
    }

    /// Relay chain built from the configured templates
    pub fn relay_chain(&self) -> Vec<Relay> {
        self.relays
            .iter()
            .map(|template| Relay::from_template(template))
            .collect()
    }
}
