//! Configuration management for Matrix Stats
//!
//! This module provides unified configuration management with first-run
//! initialization, multi-source loading, and zero-config defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::capability::{default_rules, HeaderRule, Markers, ReconcilerConfig};
use crate::app::{ClientConfig, StatsConfig};
use crate::constants::{env, http, logging, stats, table};
use crate::errors::{AppError, ConfigError, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Statistics endpoint and polling settings
    pub stats: StatsConfigToml,
    /// Comparison table settings
    pub table: TableConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Request timeout in seconds (None = transport default)
    pub request_timeout_secs: Option<u64>,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// User agent header
    pub user_agent: String,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_secs: Some(http::DEFAULT_TIMEOUT.as_secs()),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            user_agent: http::USER_AGENT.to_string(),
            rate_limit_rps: http::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

/// TOML-friendly statistics configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatsConfigToml {
    /// Plugin slug
    pub slug: String,
    /// Statistics endpoint
    pub api_base: String,
    /// Days of history to request
    pub history_limit: u32,
    /// Poll interval, e.g. "2m" or "90s"
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Relay templates tried in order; `{url}` is the encoded target
    pub relays: Vec<String>,
}

impl Default for StatsConfigToml {
    fn default() -> Self {
        let defaults = StatsConfig::default();
        Self {
            slug: defaults.slug,
            api_base: defaults.api_base,
            history_limit: defaults.history_limit,
            poll_interval: defaults.poll_interval,
            relays: defaults.relays,
        }
    }
}

/// TOML-friendly comparison table configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableConfigToml {
    /// First-party product excluded from ratios
    pub first_party: String,
    /// Columns hidden unless shown explicitly
    pub hidden_columns: Vec<String>,
    /// Cell marker vocabulary
    pub markers: Markers,
    /// Header derivation rules, first match wins
    pub rules: Vec<HeaderRule>,
}

impl Default for TableConfigToml {
    fn default() -> Self {
        Self {
            first_party: table::FIRST_PARTY.to_string(),
            hidden_columns: Vec::new(),
            markers: Markers::default(),
            rules: default_rules(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// CLI arguments are applied by the command handlers on top of this.
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        let config_path = match config_file_override {
            Some(ref path) => Some(path.clone()),
            None => Self::find_config_file(),
        };

        if let Some(path) = config_path {
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                config = Self::load_from_file(&path).await?;
            } else if config_file_override.is_some() {
                return Err(ConfigError::NotFound { path }.into());
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `MATRIX_STATS_*` overrides using the given variable lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(slug) = lookup(env::SLUG).filter(|s| !s.trim().is_empty()) {
            debug!("Using slug from {}: {}", env::SLUG, slug);
            self.stats.slug = slug.trim().to_string();
        }

        if let Some(raw) = lookup(env::POLL_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: env::POLL_SECS.to_string(),
                value: raw.clone(),
                reason: "Expected a whole number of seconds".to_string(),
            })?;
            self.stats.poll_interval = Duration::from_secs(secs);
        }

        self.validate()
    }

    /// Reject settings that would make the pipeline unusable
    pub fn validate(&self) -> Result<()> {
        if self.stats.poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "stats.poll_interval".to_string(),
                value: "0s".to_string(),
                reason: "Poll interval must be greater than zero".to_string(),
            }
            .into());
        }
        if self.client.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Rate limit must be non-zero".to_string(),
            }
            .into());
        }
        if self.stats.relays.iter().all(|r| r.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "stats.relays".to_string(),
                value: format!("{:?}", self.stats.relays),
                reason: "At least one relay template is required".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize configuration on first run
    ///
    /// Creates a default config file if none exists and returns its path
    pub async fn initialize_first_run() -> Result<PathBuf> {
        let config_path = Self::get_default_config_path()?;
        Self::write_default_config(&config_path).await?;
        Ok(config_path)
    }

    /// Write the commented default configuration unless `path` already exists
    pub async fn write_default_config(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        info!("Creating default configuration file...");

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::generic(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(|e| {
                AppError::generic(format!(
                    "Failed to write config file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(true)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Render(e).into())
    }

    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![
            PathBuf::from("./matrix-stats.toml"),
            PathBuf::from("./config.toml"),
        ];
        if let Ok(user_config) = Self::get_default_config_path() {
            search_paths.push(user_config);
        }

        let found = search_paths.into_iter().find(|path| path.exists());
        match &found {
            Some(path) => debug!("Found config file: {}", path.display()),
            None => debug!("No config file found in standard locations"),
        }
        found
    }

    /// Get the default config file path for the current user
    pub fn get_default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::generic("Could not determine user config directory"))?;

        Ok(config_dir.join("matrix-stats").join("config.toml"))
    }

    async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::generic(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::InvalidFormat)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    fn generate_default_config_content() -> String {
        let relays = stats::DEFAULT_RELAYS
            .iter()
            .map(|r| format!("    \"{}\",", r))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"# Matrix Stats Configuration
# This file was automatically generated on first run.

[client]
request_timeout_secs = {timeout}
connect_timeout_secs = {connect}
pool_idle_timeout_secs = {idle}
rate_limit_rps = {rps}

[stats]
# Plugin whose downloads are tracked
slug = "{slug}"
api_base = "{api_base}"
history_limit = {limit}
# How often to poll, e.g. "2m", "90s"
poll_interval = "2m"
# Relays are tried in order; {{url}} is replaced with the encoded target
relays = [
{relays}
]

[table]
# Columns matching this name (case-insensitive) never count toward ratios
first_party = "{first_party}"
hidden_columns = []

[logging]
# Used when no verbosity flag is given
level = "{log_level}"  # error, warn, info, debug, trace
"#,
            timeout = http::DEFAULT_TIMEOUT.as_secs(),
            connect = http::CONNECT_TIMEOUT.as_secs(),
            idle = http::POOL_IDLE_TIMEOUT.as_secs(),
            rps = http::DEFAULT_RATE_LIMIT_RPS,
            slug = stats::DEFAULT_SLUG,
            api_base = stats::API_BASE,
            limit = stats::DEFAULT_HISTORY_LIMIT,
            relays = relays,
            first_party = table::FIRST_PARTY,
            log_level = logging::DEFAULT_LOG_LEVEL,
        )
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
            rate_limit_rps: self.rate_limit_rps,
        }
    }
}

impl StatsConfigToml {
    /// Convert to runtime StatsConfig
    pub fn to_runtime_config(&self) -> StatsConfig {
        StatsConfig {
            slug: self.slug.clone(),
            api_base: self.api_base.clone(),
            history_limit: self.history_limit,
            poll_interval: self.poll_interval,
            relays: self.relays.clone(),
        }
    }
}

impl TableConfigToml {
    /// Convert to runtime ReconcilerConfig
    pub fn to_runtime_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            first_party: self.first_party.clone(),
            rules: self.rules.clone(),
            markers: self.markers.clone(),
        }
    }
}
