use super::grid::TableGrid;
use crate::util::collapse_whitespace;
use serde::{Deserialize, Serialize};

/// Column holding the row label in every pipeline table.
pub const LABEL_COLUMN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowRole {
    Header,
    SubTotal,
    Total,
    DataRow,
}

/// Lowercase with whitespace runs collapsed to one space.
pub fn normalize_label(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Role of `row`, judged by its cell in `label_column`. Row 0 is the header.
pub fn detect_role(grid: &TableGrid, row: usize, label_column: usize) -> RowRole {
    if row == 0 {
        RowRole::Header
    } else {
        classify_label(grid.text(row, label_column))
    }
}

/// Role of a non-header row from its label text.
///
/// "Sub Total", "SubTotal" and "sub  total" are all subtotals; only an exact
/// "total" (ignoring case and surrounding space) is a total.
pub fn classify_label(label: &str) -> RowRole {
    let compact: String = label
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if compact == "subtotal" {
        RowRole::SubTotal
    } else if normalize_label(label) == "total" {
        RowRole::Total
    } else {
        RowRole::DataRow
    }
}

pub fn row_roles(grid: &TableGrid, label_column: usize) -> Vec<RowRole> {
    (0..grid.row_count())
        .map(|row| detect_role(grid, row, label_column))
        .collect()
}

pub fn rows_with_role(roles: &[RowRole], role: RowRole) -> Vec<usize> {
    roles
        .iter()
        .enumerate()
        .filter(|(_, r)| **r == role)
        .map(|(i, _)| i)
        .collect()
}
