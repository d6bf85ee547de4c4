//! Core HTTP operations with rate limiting
//!
//! [`Transport`] is the seam between the relay chain and the network. The
//! production implementation, [`HttpHandler`], wraps a `reqwest` client behind
//! a `governor` rate limiter; tests substitute a scripted transport.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{clock::DefaultClock, state::InMemoryState, Jitter, Quota, RateLimiter};
use reqwest::Client;

use super::config::ClientConfig;
use crate::errors::{FetchError, FetchResult};

/// Performs a single GET and returns the body of a successful response
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`; non-2xx statuses are errors
    async fn get_text(&self, url: &str) -> FetchResult<String>;
}

/// HTTP operations handler with rate limiting
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
    rate_limiter: RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client and rate limiting
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Other` if `rate_limit_rps` is zero
    pub fn new(client: Client, rate_limit_rps: u32) -> FetchResult<Self> {
        let rate_limiter = Self::build_rate_limiter(rate_limit_rps)?;
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Build a handler straight from client configuration
    pub fn from_config(config: &ClientConfig) -> FetchResult<Self> {
        Self::new(config.build_http_client()?, config.rate_limit_rps)
    }

    fn build_rate_limiter(
        rate_limit_rps: u32,
    ) -> FetchResult<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>> {
        let rps = NonZeroU32::new(rate_limit_rps)
            .ok_or_else(|| FetchError::Other("Rate limit must be non-zero".to_string()))?;
        Ok(RateLimiter::direct(Quota::per_second(rps)))
    }
}

#[async_trait]
impl Transport for HttpHandler {
    async fn get_text(&self, url: &str) -> FetchResult<String> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        tracing::debug!("Fetched {} bytes from {}", text.len(), url);
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter_creation() {
        let rate_limiter = HttpHandler::build_rate_limiter(5).unwrap();
        rate_limiter.until_ready().await;
    }

    #[test]
    fn test_rate_limiter_zero_fails() {
        assert!(HttpHandler::build_rate_limiter(0).is_err());
    }

    #[tokio::test]
    async fn test_http_handler_creation() {
        let config = ClientConfig::default();
        assert!(HttpHandler::from_config(&config).is_ok());

        let zero = ClientConfig {
            rate_limit_rps: 0,
            ..Default::default()
        };
        assert!(HttpHandler::from_config(&zero).is_err());
    }
}
