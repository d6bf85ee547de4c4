//! Row visibility and the filtered comparison view

use std::fmt;

use serde::Serialize;

use super::map::{build_capability_map, compute_ratio, SupportRatio};
use super::markers::{Markers, SupportLevel};
use super::ReconcilerConfig;
use crate::app::table::ParsedTable;
use crate::constants::table::{DESCRIPTION_COLUMN, FEATURE_COLUMN, FIRST_COMPARISON_COLUMN};

/// Indices of comparison columns that are not hidden
pub fn visible_comparison_columns(headers: &[String], hidden_columns: &[String]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .skip(FIRST_COMPARISON_COLUMN)
        .filter(|(_, header)| !hidden_columns.contains(header))
        .map(|(index, _)| index)
        .collect()
}

/// A row is shown when the search term matches its feature or description
/// and at least one visible cell carries meaningful data.
///
/// The data rule applies even with an empty search term.
pub fn is_row_visible(
    row: &[String],
    search_term: &str,
    visible_columns: &[usize],
    markers: &Markers,
) -> bool {
    let term = search_term.to_lowercase();
    let feature = ParsedTable::cell(row, FEATURE_COLUMN).to_lowercase();
    let description = ParsedTable::cell(row, DESCRIPTION_COLUMN).to_lowercase();
    let matches_search = feature.contains(&term) || description.contains(&term);

    matches_search && has_meaningful_data(row, visible_columns, markers)
}

fn has_meaningful_data(row: &[String], visible_columns: &[usize], markers: &Markers) -> bool {
    visible_columns
        .iter()
        .any(|&index| markers.has_data(ParsedTable::cell(row, index)))
}

/// Visible vs total comparison column count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnVisibility {
    pub visible: usize,
    pub total: usize,
}

impl ColumnVisibility {
    pub fn new(headers: &[String], hidden_columns: &[String]) -> Self {
        let total = headers.len().saturating_sub(FIRST_COMPARISON_COLUMN);
        Self {
            visible: visible_comparison_columns(headers, hidden_columns).len(),
            total,
        }
    }
}

impl fmt::Display for ColumnVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.visible, self.total)
    }
}

/// One visible row with its ratio
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub feature: String,
    pub description: String,
    pub cells: Vec<String>,
    /// Classification of each entry in `cells`
    pub levels: Vec<SupportLevel>,
    pub ratio: SupportRatio,
}

/// Rows surviving the search and data filters, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonView {
    /// Headers of the visible comparison columns
    pub columns: Vec<String>,
    pub rows: Vec<ComparisonRow>,
    pub visibility: ColumnVisibility,
}

impl ComparisonView {
    pub fn build(
        table: &ParsedTable,
        search_term: &str,
        hidden_columns: &[String],
        config: &ReconcilerConfig,
    ) -> Self {
        let visible = visible_comparison_columns(&table.headers, hidden_columns);
        let map = build_capability_map(&table.headers, hidden_columns, config);

        let rows = table
            .rows
            .iter()
            .filter(|row| is_row_visible(row, search_term, &visible, &config.markers))
            .map(|row| {
                let cells: Vec<String> = visible
                    .iter()
                    .map(|&i| ParsedTable::cell(row, i).to_string())
                    .collect();
                ComparisonRow {
                    feature: ParsedTable::cell(row, FEATURE_COLUMN).to_string(),
                    description: ParsedTable::cell(row, DESCRIPTION_COLUMN).to_string(),
                    levels: cells.iter().map(|c| config.markers.classify(c)).collect(),
                    cells,
                    ratio: compute_ratio(row, &map, &config.markers),
                }
            })
            .collect();

        Self {
            columns: visible.iter().map(|&i| table.headers[i].clone()).collect(),
            rows,
            visibility: ColumnVisibility::new(&table.headers, hidden_columns),
        }
    }

    /// Number of features shown
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
