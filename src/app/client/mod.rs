//! HTTP access to the public statistics endpoint
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: the [`Transport`] seam and its rate-limited `reqwest` implementation
//! - `relay`: relay URL transformations and the [`FallbackFetcher`] chain

use std::sync::Arc;

pub mod config;
pub mod http;
pub mod relay;

pub use config::ClientConfig;
pub use http::{HttpHandler, Transport};
pub use relay::{default_relays, first_success, FallbackFetcher, Relay};

use crate::errors::FetchResult;

/// Build a fetcher over the real network with the given relay chain
pub fn build_fetcher(config: &ClientConfig, relays: Vec<Relay>) -> FetchResult<FallbackFetcher> {
    let handler = HttpHandler::from_config(config)?;
    tracing::info!(
        "Created relay client with {} relay(s) at {} req/s",
        relays.len(),
        config.rate_limit_rps
    );
    Ok(FallbackFetcher::new(Arc::new(handler), relays))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fetcher() {
        let fetcher = build_fetcher(&ClientConfig::default(), default_relays()).unwrap();
        assert_eq!(fetcher.relays().len(), 3);
    }
}
