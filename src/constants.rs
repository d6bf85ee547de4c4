//! Application constants for Matrix Stats
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names for overrides
pub mod env {
    /// Plugin slug whose statistics are tracked
    pub const SLUG: &str = "MATRIX_STATS_SLUG";

    /// Poll interval override in seconds
    pub const POLL_SECS: &str = "MATRIX_STATS_POLL_SECS";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("matrix-stats/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Default outbound request rate (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
}

/// Public statistics endpoint and relay chain
pub mod stats {
    use super::Duration;

    /// Plugin download statistics endpoint
    pub const API_BASE: &str = "https://api.wordpress.org/stats/plugin/1.0/downloads.php";

    /// Default plugin slug
    pub const DEFAULT_SLUG: &str = "campaignbay";

    /// Number of days requested from the history endpoint
    pub const DEFAULT_HISTORY_LIMIT: u32 = 267;

    /// Interval between polls
    pub const POLL_INTERVAL: Duration = Duration::from_secs(2 * 60);

    /// Placeholder replaced with the URL-encoded target in relay templates
    pub const ENCODED_PLACEHOLDER: &str = "{url}";

    /// Placeholder replaced with the raw target in relay templates
    pub const RAW_PLACEHOLDER: &str = "{raw}";

    /// Relay templates, tried in order
    pub const DEFAULT_RELAYS: [&str; 3] = [
        "https://api.allorigins.win/raw?url={url}",
        "https://corsproxy.io/?{url}",
        "https://api.codetabs.com/v1/proxy?quest={url}",
    ];

    /// Summary field carrying the all-time download count
    pub const FIELD_ALL_TIME: &str = "all_time";

    /// Summary field carrying today's download count
    pub const FIELD_TODAY: &str = "today";

    /// Calendar date format used by the history endpoint
    pub const DATE_FORMAT: &str = "%Y-%m-%d";
}

/// Comparison table vocabulary
pub mod table {
    /// Index of the feature name column
    pub const FEATURE_COLUMN: usize = 0;

    /// Index of the description column
    pub const DESCRIPTION_COLUMN: usize = 1;

    /// First index holding a comparison column
    pub const FIRST_COMPARISON_COLUMN: usize = 2;

    /// Field delimiter
    pub const DELIMITER: char = ',';

    /// Quote character
    pub const QUOTE: char = '"';

    /// Product whose own columns are excluded from ratios
    pub const FIRST_PARTY: &str = "CampaignBay";

    /// Cell marker for a supported feature
    pub const SUPPORTED_MARKER: &str = "✅";

    /// Cell marker for an unsupported feature
    pub const UNSUPPORTED_MARKER: &str = "❌";

    /// Cell marker for partial support
    pub const PARTIAL_MARKER: &str = "🟡";

    /// Word that turns a supported cell into an upcoming one
    pub const UPCOMING_WORD: &str = "Upcoming";

    /// Word that turns an unsupported cell into a missing one
    pub const MISSING_WORD: &str = "Missing";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

/// Background polling constants
pub mod poller {
    use super::Duration;

    /// Timeout for the polling task to wind down after cancellation
    pub const TASK_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);
}

pub use http::USER_AGENT;
pub use stats::{DEFAULT_SLUG, POLL_INTERVAL};
