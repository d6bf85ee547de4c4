//! Product capability map and support ratio
//!
//! Comparison columns come in free/pro pairs per competitor. The map groups
//! them by product so a row can be tallied once per product: a product that
//! supports a feature in its free tier is counted as free and never also as
//! pro.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::trace;

use super::markers::Markers;
use super::rules::{derive_column, Variant};
use super::ReconcilerConfig;
use crate::app::table::ParsedTable;
use crate::constants::table::FIRST_COMPARISON_COLUMN;

/// Column indices for one product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProductColumns {
    pub free: Option<usize>,
    pub pro: Option<usize>,
}

/// Product name to its free/pro column indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductCapabilityMap {
    products: BTreeMap<String, ProductColumns>,
}

impl ProductCapabilityMap {
    pub fn get(&self, product: &str) -> Option<&ProductColumns> {
        self.products.get(product)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductColumns)> {
        self.products.iter().map(|(name, cols)| (name.as_str(), cols))
    }

    /// Record a column; a repeated product/tier overwrites the earlier index
    pub fn insert(&mut self, product: &str, variant: Variant, index: usize) {
        let entry = self.products.entry(product.to_string()).or_default();
        match variant {
            Variant::Free => entry.free = Some(index),
            Variant::Pro => entry.pro = Some(index),
        }
    }
}

/// Free/pro support tally for a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SupportRatio {
    pub free: usize,
    pub pro: usize,
}

impl fmt::Display for SupportRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.free, self.pro)
    }
}

/// True when `header` names the first-party product (case-insensitive)
pub fn is_first_party(header: &str, first_party: &str) -> bool {
    !first_party.is_empty() && header.to_lowercase().contains(&first_party.to_lowercase())
}

/// Group comparison columns into per-product free/pro pairs
///
/// Feature and description columns, first-party columns and hidden columns
/// are skipped.
pub fn build_capability_map(
    headers: &[String],
    hidden_columns: &[String],
    config: &ReconcilerConfig,
) -> ProductCapabilityMap {
    let mut map = ProductCapabilityMap::default();

    for (index, header) in headers.iter().enumerate().skip(FIRST_COMPARISON_COLUMN) {
        if hidden_columns.contains(header) || is_first_party(header, &config.first_party) {
            continue;
        }

        let column = derive_column(index, header, &config.rules);
        trace!(
            "Column {} '{}' -> {} ({})",
            index,
            header,
            column.product,
            column.variant
        );
        map.insert(&column.product, column.variant, index);
    }

    map
}

/// Tally how many products support a row's feature in each tier
pub fn compute_ratio(row: &[String], map: &ProductCapabilityMap, markers: &Markers) -> SupportRatio {
    let supported = |index: Option<usize>| {
        index.is_some_and(|i| markers.is_supported(ParsedTable::cell(row, i)))
    };

    map.iter()
        .fold(SupportRatio::default(), |mut ratio, (_, columns)| {
            if supported(columns.free) {
                ratio.free += 1;
            } else if supported(columns.pro) {
                ratio.pro += 1;
            }
            ratio
        })
}
