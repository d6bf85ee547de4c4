//! Download statistics data models
//!
//! Parsing for the two documents served by the statistics endpoint. Counts
//! arrive either as numbers or as strings with thousands separators
//! (`"1,234"`), so both go through [`parse_count`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::constants::stats::{DATE_FORMAT, FIELD_ALL_TIME, FIELD_TODAY};
use crate::errors::{StatsError, StatsResult};

/// Summary counters for the tracked plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadStats {
    pub total_downloads: u64,
    pub today: u64,
    pub last_updated: DateTime<Utc>,
}

/// One day of download history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryPoint {
    /// Serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    pub downloads: u64,
    /// Set on the fabricated "today" point appended after real history
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl HistoryPoint {
    pub fn new(date: NaiveDate, downloads: u64) -> Self {
        Self {
            date,
            downloads,
            synthetic: false,
        }
    }
}

/// Parse a count given as a number or a possibly comma-grouped string
///
/// Strings are read like `parseInt`: separators are dropped, leading digits
/// are taken and anything after them ignored. Negative or digit-less values
/// yield `None`.
pub fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f.trunc() as u64)
        }),
        Value::String(s) => {
            let cleaned = s.replace(',', "");
            let cleaned = cleaned.trim_start();
            let cleaned = cleaned.strip_prefix('+').unwrap_or(cleaned);
            let digits: String = cleaned.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Parse the summary document
///
/// # Errors
///
/// Returns `StatsError::MalformedSummary` when the document is not JSON, or
/// `all_time` is absent, null or not an integer. A bad `today` becomes 0.
pub fn parse_summary(body: &str, now: DateTime<Utc>) -> StatsResult<DownloadStats> {
    let document: Value = serde_json::from_str(body).map_err(|e| StatsError::MalformedSummary {
        reason: e.to_string(),
    })?;

    let raw_all_time = match document.get(FIELD_ALL_TIME) {
        None => {
            return Err(StatsError::MalformedSummary {
                reason: format!("missing \"{}\" field", FIELD_ALL_TIME),
            })
        }
        Some(Value::Null) => {
            return Err(StatsError::MalformedSummary {
                reason: "download count is null".to_string(),
            })
        }
        Some(value) => value,
    };

    let total_downloads =
        parse_count(raw_all_time).ok_or_else(|| StatsError::MalformedSummary {
            reason: format!("could not parse number from API: {}", raw_all_time),
        })?;

    let today = document
        .get(FIELD_TODAY)
        .and_then(parse_count)
        .unwrap_or(0);

    Ok(DownloadStats {
        total_downloads,
        today,
        last_updated: now,
    })
}

/// Parse the date-keyed history document into points sorted by date
///
/// Keys that are not `YYYY-MM-DD` dates are skipped; unparsable counts are 0.
pub fn parse_history(body: &str) -> StatsResult<Vec<HistoryPoint>> {
    let document: Value = serde_json::from_str(body).map_err(|e| StatsError::MalformedHistory {
        reason: e.to_string(),
    })?;
    let entries = document
        .as_object()
        .ok_or_else(|| StatsError::MalformedHistory {
            reason: "expected an object keyed by date".to_string(),
        })?;

    let mut history: Vec<HistoryPoint> = entries
        .iter()
        .filter_map(|(key, value)| match NaiveDate::parse_from_str(key, DATE_FORMAT) {
            Ok(date) => Some(HistoryPoint::new(date, parse_count(value).unwrap_or(0))),
            Err(_) => {
                debug!("Skipping history entry with non-date key '{}'", key);
                None
            }
        })
        .collect();

    history.sort_by_key(|point| point.date);
    Ok(history)
}

/// Append a synthetic point dated the day after the last real point
///
/// Empty history is returned unchanged.
pub fn with_synthetic_point(mut history: Vec<HistoryPoint>, today: u64) -> Vec<HistoryPoint> {
    let next_date = history.last().and_then(|last| last.date.succ_opt());
    if let Some(date) = next_date {
        history.push(HistoryPoint {
            date,
            downloads: today,
            synthetic: true,
        });
    }
    history
}
