//! Error types for Matrix Stats
//!
//! This module defines the error types for every component of the application.
//! Network and parse failures are expected in normal operation (public relays
//! come and go), so most of these end up logged rather than surfaced.

use std::path::PathBuf;
use thiserror::Error;

/// Relay and HTTP transport errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error (connection refused, DNS, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Relay returned a non-success status
    #[error("Relay responded with status: {status}")]
    Status { status: u16 },

    /// Relay returned an empty body
    #[error("Relay returned an empty body")]
    EmptyBody,

    /// Body did not look like a JSON object
    #[error("Relay returned non-JSON content")]
    NotJson,

    /// Body looked like JSON but failed strict parsing
    #[error("Relay returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Target or relay URL could not be built
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// No relays configured
    #[error("No relays configured")]
    NoRelays,

    /// Every relay in the chain failed
    #[error(
        "Unable to connect to data source after {attempts} relay attempts ({last_error})"
    )]
    DataSourceUnavailable { attempts: usize, last_error: String },

    /// Scripted or otherwise opaque transport failure
    #[error("{0}")]
    Other(String),
}

/// Statistics pipeline errors
#[derive(Error, Debug)]
pub enum StatsError {
    /// Summary document lacked `all_time` or it was not an integer
    #[error("Invalid summary response: {reason}")]
    MalformedSummary { reason: String },

    /// History document was not a date-keyed object
    #[error("Invalid history response: {reason}")]
    MalformedHistory { reason: String },

    /// Underlying fetch failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Comparison table loading errors
#[derive(Error, Debug)]
pub enum TableError {
    /// Table file could not be read
    #[error("Failed to read table file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output serialization failed
    #[error("Failed to serialize table: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Statistics error
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// Table error
    #[error(transparent)]
    Table(#[from] TableError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is transient and worth waiting out until the next poll
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Fetch(e) | AppError::Stats(StatsError::Fetch(e)) => e.is_recoverable(),
            AppError::Stats(StatsError::MalformedSummary { .. })
            | AppError::Stats(StatsError::MalformedHistory { .. }) => true,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Fetch(_) => "fetch",
            AppError::Stats(_) => "stats",
            AppError::Table(_) => "table",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

impl FetchError {
    /// Configuration problems will not fix themselves between polls
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, FetchError::InvalidUrl { .. } | FetchError::NoRelays)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Statistics result type alias
pub type StatsResult<T> = std::result::Result<T, StatsError>;

/// Table result type alias
pub type TableResult<T> = std::result::Result<T, TableError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_source_unavailable_embeds_last_error() {
        let err = FetchError::DataSourceUnavailable {
            attempts: 3,
            last_error: FetchError::Status { status: 502 }.to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("Relay responded with status: 502"));
        assert!(message.contains("3 relay attempts"));
    }

    #[test]
    fn test_error_categories() {
        let err = AppError::from(StatsError::MalformedSummary {
            reason: "missing \"all_time\" field".to_string(),
        });
        assert_eq!(err.category(), "stats");
        assert!(err.is_recoverable());

        let err = AppError::from(FetchError::NoRelays);
        assert_eq!(err.category(), "fetch");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_stats_error_is_transparent_over_fetch() {
        let err = StatsError::from(FetchError::EmptyBody);
        assert_eq!(err.to_string(), "Relay returned an empty body");
    }
}
