//! Capability reconciliation for the comparison table
//!
//! Consumes a [`ParsedTable`](crate::app::table::ParsedTable) and answers the
//! questions the comparison view asks on every render:
//!
//! - [`rules`] - header vocabulary that tags columns as free or pro
//! - [`map`] - per-product column pairs and the free/pro support ratio
//! - [`filter`] - search and "has visible data" row filtering
//! - [`markers`] - cell marker vocabulary and support classification
//!
//! # Examples
//!
//! ```rust
//! use matrix_stats::app::capability::{ComparisonView, ReconcilerConfig};
//! use matrix_stats::app::table::parse;
//!
//! let table = parse("Feature,Description,Acme Free,Acme Pro\nBOGO,Buy one get one,❌,✅");
//! let view = ComparisonView::build(&table, "", &[], &ReconcilerConfig::default());
//! assert_eq!(view.rows[0].ratio.to_string(), "0 / 1");
//! ```

pub mod filter;
pub mod map;
pub mod markers;
pub mod rules;

use serde::{Deserialize, Serialize};

use crate::constants::table;

pub use filter::{
    is_row_visible, visible_comparison_columns, ColumnVisibility, ComparisonRow, ComparisonView,
};
pub use map::{
    build_capability_map, compute_ratio, is_first_party, ProductCapabilityMap, ProductColumns,
    SupportRatio,
};
pub use markers::{Markers, SupportLevel};
pub use rules::{default_rules, derive_column, CapabilityColumn, HeaderRule, MatchKind, Variant};

/// Runtime settings for reconciling comparison columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Product whose own columns never count toward ratios
    pub first_party: String,
    /// Header derivation rules, first match wins
    pub rules: Vec<HeaderRule>,
    pub markers: Markers,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            first_party: table::FIRST_PARTY.to_string(),
            rules: default_rules(),
            markers: Markers::default(),
        }
    }
}

impl ReconcilerConfig {
    /// Tag every comparison column with its product and tier
    pub fn describe_columns(&self, headers: &[String]) -> Vec<CapabilityColumn> {
        headers
            .iter()
            .enumerate()
            .skip(table::FIRST_COMPARISON_COLUMN)
            .filter(|(_, header)| !is_first_party(header, &self.first_party))
            .map(|(index, header)| derive_column(index, header, &self.rules))
            .collect()
    }
}
