//! Delimiter-aware table parsing
//!
//! Turns raw comparison-table text into a header row and data rows. Fields may
//! be wrapped in double quotes to carry the delimiter, and a doubled quote
//! inside a field stands for one literal quote.
//!
//! Column-count reconciliation is left to the caller: a data line whose
//! trailing fields are empty may yield fewer cells than the header.
//!
//! An unterminated quote is absorbing. Once the scanner is inside a quoted
//! field it stays there until the end of the line, so every later delimiter
//! becomes literal text. Malformed quoting never produces an error.

use std::mem::take;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::constants::table::{DELIMITER, QUOTE};
use crate::errors::{TableError, TableResult};

/// Header row plus data rows, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParsedTable {
    /// Read and parse a table file
    pub async fn from_path(path: &Path) -> TableResult<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TableError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let table = parse(&text);
        debug!(
            "Parsed {} with {} columns and {} rows",
            path.display(),
            table.headers.len(),
            table.rows.len()
        );
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Cell at `index` of `row`, or "" when the row is short
    pub fn cell(row: &[String], index: usize) -> &str {
        row.get(index).map(String::as_str).unwrap_or("")
    }

    /// Serialize back to delimited text with the same quoting rule
    pub fn to_csv_string(&self) -> String {
        let mut out = String::new();
        if self.headers.is_empty() {
            return out;
        }
        push_row(&mut out, &self.headers);
        for row in &self.rows {
            out.push('\n');
            push_row(&mut out, row);
        }
        out
    }
}

/// Parse raw delimited text; the first line is the header
pub fn parse(text: &str) -> ParsedTable {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return ParsedTable::default();
    }

    let mut lines = trimmed.lines();
    let headers = lines.next().map(split_line).unwrap_or_default();
    let rows = lines.map(split_line).collect();

    ParsedTable { headers, rows }
}

/// Split one physical line into cleaned fields
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            QUOTE => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            DELIMITER if !in_quotes => {
                fields.push(clean_field(&take(&mut current)));
            }
            _ => current.push(ch),
        }
    }
    fields.push(clean_field(&current));

    fields
}

/// Trim, drop one layer of surrounding quotes, collapse `""` to `"`
fn clean_field(raw: &str) -> String {
    let field = raw.trim();
    let field = field.strip_prefix(QUOTE).unwrap_or(field);
    let field = field.strip_suffix(QUOTE).unwrap_or(field);
    field.replace("\"\"", "\"")
}

fn needs_quotes(field: &str) -> bool {
    field.contains(DELIMITER)
        || field.contains(QUOTE)
        || field.contains('\n')
        || field.contains('\r')
        || field.trim() != field
}

/// Render a single row with the parser's quoting rule
pub fn write_row(row: &[String]) -> String {
    let mut out = String::new();
    push_row(&mut out, row);
    out
}

fn push_row(out: &mut String, row: &[String]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        if needs_quotes(cell) {
            out.push(QUOTE);
            out.push_str(&cell.replace('"', "\"\""));
            out.push(QUOTE);
        } else {
            out.push_str(cell);
        }
    }
}
