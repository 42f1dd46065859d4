use super::grid::TableGrid;
use super::merge::{merge_contiguous, merge_range, MergePredicate, MergedRun};
use super::roles::{classify_label, normalize_label, row_roles, rows_with_role, RowRole, LABEL_COLUMN};
use super::shape::{redistribute_heights, redistribute_widths, TableShape};
use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::debug;

pub const HEADER_FILL: &str = "0E63B5";
pub const SUBTOTAL_FILL: &str = "D9D9D9";
pub const TOTAL_FILL: &str = "FFF200";
const PLAIN_FILL: &str = "FFFFFF";

const PROJECT_NUMBER_COLUMN: usize = 2;
const DAP_COLUMN: usize = 9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestructureSummary {
    pub shape: Option<TableShape>,
    pub roles: Vec<RowRole>,
    pub merges: Vec<MergedRun>,
    pub widths_redistributed: bool,
    pub heights_redistributed: bool,
}

/// Applies the merge, fill and sizing rules of the table shape that
/// `headers` identify. Tables of no known shape only get their subtotal and
/// total rows filled.
pub fn restructure(grid: &mut TableGrid, headers: &[&str]) -> RestructureSummary {
    let shape = TableShape::detect(headers).filter(|s| s.column_count() == grid.column_count());
    let roles = row_roles(grid, LABEL_COLUMN);

    let mut pass = Pass {
        grid: &mut *grid,
        roles: &roles,
        headers,
        merges: Vec::new(),
    };

    match shape {
        Some(shape) if pass.grid.row_count() > 2 => {
            pass.grid.fill_row(0, HEADER_FILL);
            match shape {
                TableShape::Route => pass.route(),
                TableShape::Permits => pass.permits(),
                TableShape::ConstructionPlan => pass.label_cell_fills(),
                TableShape::CodPipeline | TableShape::CodPipelineExtended => pass.pipeline(),
            }
        }
        Some(_) => pass.grid.fill_row(0, HEADER_FILL),
        None if pass.grid.column_count() > LABEL_COLUMN => pass.role_row_fills(),
        None => {}
    }

    let merges = pass.merges;
    let (widths_redistributed, heights_redistributed) = match shape {
        Some(shape) => (
            redistribute_widths(grid, shape),
            redistribute_heights(grid, shape),
        ),
        None => (false, false),
    };

    debug!(?shape, merges = merges.len(), "restructured table");
    RestructureSummary {
        shape,
        roles,
        merges,
        widths_redistributed,
        heights_redistributed,
    }
}

struct Pass<'a> {
    grid: &'a mut TableGrid,
    roles: &'a [RowRole],
    headers: &'a [&'a str],
    merges: Vec<MergedRun>,
}

impl Pass<'_> {
    fn last_row(&self) -> usize {
        self.grid.row_count() - 1
    }

    fn subtotal_rows(&self) -> Vec<usize> {
        rows_with_role(self.roles, RowRole::SubTotal)
    }

    /// The last row, when it is a total row.
    fn trailing_total(&self) -> Option<usize> {
        let last = self.last_row();
        (self.roles[last] == RowRole::Total).then_some(last)
    }

    fn column_named(&self, needle: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| normalize_label(h).contains(needle))
    }

    /// Rows of `rows` whose project number falls in `numbers`.
    fn project_rows(&self, rows: &[usize], numbers: RangeInclusive<u32>) -> Vec<usize> {
        rows.iter()
            .copied()
            .filter(|&row| {
                self.grid
                    .text(row, PROJECT_NUMBER_COLUMN)
                    .trim()
                    .parse::<u32>()
                    .is_ok_and(|n| numbers.contains(&n))
            })
            .collect()
    }

    fn merge(&mut self, rows: RangeInclusive<usize>, columns: RangeInclusive<usize>) -> bool {
        match merge_range(self.grid, rows, columns) {
            Some(run) => {
                self.merges.push(run);
                true
            }
            None => false,
        }
    }

    fn merge_with_text(
        &mut self,
        rows: RangeInclusive<usize>,
        columns: RangeInclusive<usize>,
        text: &str,
    ) {
        let origin = (*rows.start(), *columns.start());
        let single = rows.start() == rows.end() && columns.start() == columns.end();
        if single || self.merge(rows, columns) {
            self.grid.set_text(origin.0, origin.1, text);
        }
    }

    fn merge_runs(&mut self, column: usize, rows: &[usize], predicate: MergePredicate<'_>) {
        let runs = merge_contiguous(self.grid, column, rows, predicate);
        self.merges.extend(runs);
    }

    fn fill_columns(&mut self, row: usize, columns: RangeInclusive<usize>, color: &str) {
        for column in columns {
            self.grid.set_fill(row, column, color);
        }
    }

    fn route(&mut self) {
        let last = self.last_row();
        let merge_end = match self.trailing_total() {
            Some(total) if total > 1 => total - 1,
            _ => last,
        };
        let subtotals = self.subtotal_rows();
        let spv_fill = TableShape::Route.spv_fill();
        let columns = self.grid.column_count();

        for row in 1..=last {
            self.grid.set_fill(row, 0, spv_fill);
            if self.roles[row] == RowRole::Total {
                self.fill_columns(row, 1..=columns - 1, TOTAL_FILL);
            }
        }

        self.merge(1..=merge_end, 0..=0);
        self.phases(&subtotals, merge_end);

        if let Some(column) = self.column_named("rec tariff") {
            let first_line = self
                .grid
                .text(1, column)
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string);
            if self.merge(1..=merge_end, column..=column) {
                if let Some(line) = first_line {
                    self.grid.set_text(1, column, &line);
                }
            }
        }

        if let Some(column) = self.column_named("offtaker") {
            let rows: Vec<usize> = (1..=merge_end).collect();
            self.merge_runs(column, &rows, MergePredicate::SameText);
        }

        if let Some(column) = self.column_named("status") {
            let mut lines: Vec<String> = Vec::new();
            for row in 1..=merge_end {
                let text = self.grid.text(row, column).trim();
                let keep = !text.is_empty()
                    && classify_label(text) != RowRole::SubTotal
                    && !lines.iter().any(|l| l == text);
                if keep {
                    lines.push(text.to_string());
                }
            }
            self.merge_with_text(1..=merge_end, column..=column, &lines.join("\n"));
        }

        for row in subtotals {
            self.merge_with_text(row..=row, 3..=4, "SubTotal");
        }
    }

    fn permits(&mut self) {
        let last = self.last_row();
        let total = self.trailing_total();
        let subtotals = self.subtotal_rows();
        let columns = self.grid.column_count();
        let data_rows: Vec<usize> = (1..=last)
            .filter(|&row| {
                let number = self.grid.text(row, PROJECT_NUMBER_COLUMN).trim();
                !number.is_empty() && number.chars().all(|c| c.is_ascii_digit())
            })
            .collect();

        for row in 1..=last {
            let project_row = data_rows.contains(&row);
            for column in 0..columns {
                let fill = match self.roles[row] {
                    RowRole::Total if column == 0 => SUBTOTAL_FILL,
                    RowRole::Total => TOTAL_FILL,
                    RowRole::SubTotal => SUBTOTAL_FILL,
                    _ if column == 0 => TableShape::Permits.spv_fill(),
                    _ if column == 2 || (project_row && column >= 2) => PLAIN_FILL,
                    _ => SUBTOTAL_FILL,
                };
                self.grid.set_fill(row, column, fill);
            }
        }

        self.merge(1..=total.unwrap_or(last), 0..=0);
        self.grid.set_fill(1, 0, TableShape::Permits.spv_fill());

        let phase_two_end = total.map_or(last, |t| t - 1);
        self.phases(&subtotals, phase_two_end);

        for row in subtotals {
            self.merge_with_text(row..=row, 2..=4, "Sub Total");
        }
        if let Some(row) = total {
            self.merge_with_text(row..=row, 2..=4, "TOTAL");
        }

        let issued = |t: &str| t == "issued";
        let not_subject = |t: &str| t.contains("not subject to dap");
        self.merge_runs(5, &data_rows, MergePredicate::Matches(&issued));

        // DAP status merges stay inside fixed project-number bands; free
        // runs are merged only when no band produced one.
        let bands = [
            (1..=2, MergePredicate::Matches(&not_subject)),
            (3..=4, MergePredicate::Matches(&issued)),
            (5..=7, MergePredicate::Matches(&issued)),
        ];
        let mut banded = false;
        for (numbers, predicate) in bands {
            let rows = self.project_rows(&data_rows, numbers);
            let runs = merge_contiguous(self.grid, DAP_COLUMN, &rows, predicate);
            banded |= !runs.is_empty();
            self.merges.extend(runs);
        }
        if !banded {
            self.merge_runs(DAP_COLUMN, &data_rows, MergePredicate::Matches(&not_subject));
            self.merge_runs(DAP_COLUMN, &data_rows, MergePredicate::Matches(&issued));
        }
        for column in [10, 11] {
            self.merge_runs(column, &data_rows, MergePredicate::SameText);
        }

        // One shared assessment value spans both assessment columns.
        if let (Some(&first), Some(&end)) = (data_rows.first(), data_rows.last()) {
            let value = self.grid.text(first, 7).trim().to_string();
            let uniform = !value.is_empty()
                && data_rows
                    .iter()
                    .all(|&row| self.grid.text(row, 7).trim() == value);
            if uniform {
                self.merge_with_text(first..=end, 7..=8, &value);
            }
        }
    }

    fn pipeline(&mut self) {
        let last = self.last_row();
        let subtotals = self.subtotal_rows();
        let total = self.roles.iter().rposition(|r| *r == RowRole::Total);
        let columns = self.grid.column_count();
        let cod = columns - 1;

        let phase_one_end = subtotals
            .first()
            .copied()
            .or(total.map(|t| t - 1))
            .unwrap_or(last);
        let spv_end = total.or(subtotals.last().copied()).unwrap_or(phase_one_end);

        if self.merge(1..=spv_end, 0..=0) {
            self.grid.set_fill(1, 0, TableShape::CodPipeline.spv_fill());
        }

        self.merge_with_text(1..=phase_one_end, 1..=1, "1");
        self.merge(1..=phase_one_end, cod..=cod);
        if let &[first, second, ..] = subtotals.as_slice() {
            self.merge_with_text(first + 1..=second, 1..=1, "2");
            self.merge(first + 1..=second, cod..=cod);
        }

        for &row in &subtotals {
            self.merge_with_text(row..=row, 2..=3, "Sub Total");
            self.grid.fill_row(row, SUBTOTAL_FILL);
        }
        if let Some(row) = total {
            self.merge_with_text(row..=row, 1..=4.min(columns - 1), "TOTAL");
            self.grid.fill_row(row, TOTAL_FILL);
        }
    }

    /// Phase 1 runs down to the first subtotal row, phase 2 from there to
    /// the second subtotal row or `phase_two_end`.
    fn phases(&mut self, subtotals: &[usize], phase_two_end: usize) {
        let Some(&first) = subtotals.first() else {
            return;
        };
        self.merge_with_text(1..=first, 1..=1, "1");
        let end = subtotals.get(1).copied().unwrap_or(phase_two_end);
        self.merge_with_text(first + 1..=end, 1..=1, "2");
    }

    /// Any body cell reading "subtotal" or "total" gets the matching fill.
    fn label_cell_fills(&mut self) {
        for row in 1..self.grid.row_count() {
            for column in 0..self.grid.column_count() {
                let fill = match classify_label(self.grid.text(row, column)) {
                    RowRole::SubTotal => SUBTOTAL_FILL,
                    RowRole::Total => TOTAL_FILL,
                    _ => continue,
                };
                self.grid.set_fill(row, column, fill);
            }
        }
    }

    fn role_row_fills(&mut self) {
        for (row, role) in self.roles.iter().enumerate() {
            match role {
                RowRole::SubTotal => self.grid.fill_row(row, SUBTOTAL_FILL),
                RowRole::Total => self.grid.fill_row(row, TOTAL_FILL),
                _ => {}
            }
        }
    }
}
