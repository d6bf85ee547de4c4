//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used to reach the statistics relays.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::constants::http;
use crate::errors::{FetchError, FetchResult};

/// Configuration for the relay HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout (None = transport default)
    pub request_timeout: Option<Duration>,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// User agent sent with every request
    pub user_agent: String,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(http::DEFAULT_TIMEOUT),
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            user_agent: http::USER_AGENT.to_string(),
            rate_limit_rps: http::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> FetchResult<Client> {
        let mut client_builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent.as_str());

        if let Some(timeout) = self.request_timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(FetchError::Http)
    }
}
