use super::grid::TableGrid;
use super::roles::normalize_label;
use crate::util::group_adjacent;
use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::debug;

/// Which neighbouring cells of a column belong to the same run.
#[derive(Clone, Copy)]
pub enum MergePredicate<'a> {
    /// Equal text after [`normalize_label`].
    SameText,
    /// Every cell whose normalized text satisfies the predicate.
    Matches(&'a dyn Fn(&str) -> bool),
}

/// A rectangle of cells merged into its top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergedRun {
    pub first_row: usize,
    pub last_row: usize,
    pub first_column: usize,
    pub last_column: usize,
}

impl MergedRun {
    pub fn contains(&self, row: usize, column: usize) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_column..=self.last_column).contains(&column)
    }
}

/// Merges the rectangle `rows` x `columns`, keeping the top-left text and
/// clearing the covered cells.
///
/// Returns `None` without changing anything when the rectangle is a single
/// cell, leaves the grid, or touches a cell that is already part of a merge.
pub fn merge_range(
    grid: &mut TableGrid,
    rows: RangeInclusive<usize>,
    columns: RangeInclusive<usize>,
) -> Option<MergedRun> {
    let (first_row, last_row) = (*rows.start(), *rows.end());
    let (first_column, last_column) = (*columns.start(), *columns.end());

    if first_row > last_row || first_column > last_column {
        return None;
    }
    if first_row == last_row && first_column == last_column {
        return None;
    }
    if last_row >= grid.row_count() || last_column >= grid.column_count() {
        debug!(first_row, last_row, first_column, last_column, "merge leaves the table");
        return None;
    }

    let overlaps = rows.clone().any(|r| {
        columns
            .clone()
            .any(|c| grid.cell(r, c).map_or(true, |cell| !cell.is_plain()))
    });
    if overlaps {
        debug!(first_row, last_row, first_column, last_column, "merge overlaps an existing merge");
        return None;
    }

    for r in rows {
        for c in columns.clone() {
            let Some(cell) = grid.cell_mut(r, c) else {
                continue;
            };
            if r == first_row && c == first_column {
                cell.row_span = last_row - first_row + 1;
                cell.grid_span = last_column - first_column + 1;
                continue;
            }
            cell.v_merge = r > first_row;
            cell.h_merge = c > first_column;
            cell.text.clear();
        }
    }

    Some(MergedRun {
        first_row,
        last_row,
        first_column,
        last_column,
    })
}

/// Vertical merge of `column` over `first_row..=last_row`.
pub fn merge_rows(
    grid: &mut TableGrid,
    column: usize,
    first_row: usize,
    last_row: usize,
) -> Option<MergedRun> {
    merge_range(grid, first_row..=last_row, column..=column)
}

/// Horizontal merge of `row` over `first_column..=last_column`.
pub fn merge_columns(
    grid: &mut TableGrid,
    row: usize,
    first_column: usize,
    last_column: usize,
) -> Option<MergedRun> {
    merge_range(grid, row..=row, first_column..=first_column.max(last_column))
}

/// Merges every run of two or more consecutive rows (from `rows`) of `column`
/// whose cells satisfy `predicate`.
///
/// Cells already covered by a merge are skipped and break adjacency, as do
/// empty cells. Running it twice merges nothing new.
pub fn merge_contiguous(
    grid: &mut TableGrid,
    column: usize,
    rows: &[usize],
    predicate: MergePredicate<'_>,
) -> Vec<MergedRun> {
    let mut rows = rows.to_vec();
    rows.sort_unstable();
    rows.dedup();

    let candidates: Vec<(usize, Option<String>)> = rows
        .into_iter()
        .filter(|&row| grid.cell(row, column).is_some_and(|cell| !cell.is_covered()))
        .map(|row| {
            let text = normalize_label(grid.text(row, column));
            let key = match predicate {
                _ if text.is_empty() => None,
                MergePredicate::SameText => Some(text),
                MergePredicate::Matches(matches) => matches(&text).then(String::new),
            };
            (row, key)
        })
        .collect();

    // Rows that are consecutive both in the grid and in the candidate list
    // share `row - position`.
    let groups = group_adjacent(candidates.into_iter().enumerate(), |(position, (row, key))| {
        (row - position, key.clone())
    });

    groups
        .into_iter()
        .filter(|group| group.len() > 1 && group[0].1 .1.is_some())
        .filter_map(|group| {
            let first = group[0].1 .0;
            let last = group[group.len() - 1].1 .0;
            merge_rows(grid, column, first, last)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::grid::{TableCell, TableRow};
    use proptest::prelude::*;

    fn grid(columns: &[&[&str]]) -> TableGrid {
        let row_count = columns[0].len();
        TableGrid {
            rows: (0..row_count)
                .map(|r| TableRow {
                    cells: columns.iter().map(|col| TableCell::new(col[r])).collect(),
                    height: None,
                })
                .collect(),
            column_widths: vec![100; columns.len()],
        }
    }

    #[test]
    fn same_text_runs_merge_and_keep_top_text() {
        let mut g = grid(&[&["Status", "Done", "done ", "Done", "Open", "Open", "Done"]]);

        let runs = merge_contiguous(&mut g, 0, &[1, 2, 3, 4, 5, 6], MergePredicate::SameText);

        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].first_row, runs[0].last_row), (1, 3));
        assert_eq!((runs[1].first_row, runs[1].last_row), (4, 5));
        assert_eq!(g.text(1, 0), "Done");
        assert_eq!(g.text(2, 0), "");
        assert!(g.cell(3, 0).unwrap().v_merge);
        assert_eq!(g.cell(1, 0).unwrap().row_span, 3);
        assert!(g.cell(6, 0).unwrap().is_plain());
    }

    #[test]
    fn empty_cells_break_runs() {
        let mut g = grid(&[&["h", "a", "", "a", "a"]]);

        let runs = merge_contiguous(&mut g, 0, &[1, 2, 3, 4], MergePredicate::SameText);

        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].first_row, runs[0].last_row), (3, 4));
    }

    #[test]
    fn gaps_in_row_list_break_runs() {
        let mut g = grid(&[&["h", "x", "x", "x", "x"]]);

        let runs = merge_contiguous(&mut g, 0, &[1, 2, 4], MergePredicate::SameText);

        assert_eq!(runs, vec![MergedRun { first_row: 1, last_row: 2, first_column: 0, last_column: 0 }]);
        assert!(g.cell(4, 0).unwrap().is_plain());
    }

    #[test]
    fn predicate_runs_ignore_text_differences() {
        let issued = |t: &str| t.contains("issued");
        let mut g = grid(&[&["h", "Issued 2024-01", "issued 2024-03", "Pending", "Issued"]]);

        let runs = merge_contiguous(&mut g, 0, &[1, 2, 3, 4], MergePredicate::Matches(&issued));

        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].first_row, runs[0].last_row), (1, 2));
        assert_eq!(g.text(1, 0), "Issued 2024-01");
    }

    #[test]
    fn overlapping_merge_is_a_no_op() {
        let mut g = grid(&[&["h", "a", "b", "c"], &["h", "a", "b", "c"]]);
        assert!(merge_rows(&mut g, 0, 1, 2).is_some());
        let before = g.clone();

        assert!(merge_columns(&mut g, 2, 0, 1).is_none());
        assert_eq!(g, before);
    }

    #[test]
    fn covered_cells_are_skipped() {
        let mut g = grid(&[&["h", "a", "a", "a", "a"]]);
        merge_rows(&mut g, 0, 1, 2).unwrap();

        let runs = merge_contiguous(&mut g, 0, &[1, 2, 3, 4], MergePredicate::SameText);

        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].first_row, runs[0].last_row), (3, 4));
    }

    #[test]
    fn horizontal_merge_sets_grid_span() {
        let mut g = grid(&[&["h", "Sub Total"], &["h", ""], &["h", ""], &["h", "9"]]);

        let run = merge_columns(&mut g, 1, 0, 2).unwrap();

        assert_eq!(run.last_column, 2);
        let origin = g.cell(1, 0).unwrap();
        assert_eq!(origin.grid_span, 3);
        assert!(g.cell(1, 2).unwrap().h_merge);
        assert!(!g.cell(1, 2).unwrap().v_merge);
        assert!(g.cell(1, 3).unwrap().is_plain());
    }

    proptest! {
        #[test]
        fn runs_partition_scanned_rows(texts in prop::collection::vec(prop::sample::select(vec!["a", "b", ""]), 1..24)) {
            let mut column = vec!["header"];
            column.extend(texts.iter().copied());
            let mut g = grid(&[column.as_slice()]);
            let rows: Vec<usize> = (1..column.len()).collect();

            let runs = merge_contiguous(&mut g, 0, &rows, MergePredicate::SameText);

            for (i, run) in runs.iter().enumerate() {
                prop_assert!(run.last_row > run.first_row);
                prop_assert!(run.first_row >= 1);
                for other in &runs[i + 1..] {
                    prop_assert!(run.last_row < other.first_row || other.last_row < run.first_row);
                }
                let text = column[run.first_row];
                prop_assert!(!text.is_empty());
                for row in run.first_row..=run.last_row {
                    prop_assert_eq!(column[row], text);
                }
            }
            prop_assert!(merge_contiguous(&mut g, 0, &rows, MergePredicate::SameText).is_empty());
        }
    }
}
