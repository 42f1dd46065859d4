use super::grid::TableGrid;
use super::roles::normalize_label;
use serde::{Deserialize, Serialize};

/// The table layouts the restructurer knows, recognised from header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableShape {
    /// Ten-column route table with a "REC Tariff" column.
    Route,
    /// Twelve-column permit tracker with "Hanjeon PPA" and "EBL" columns.
    Permits,
    /// Eight-column construction schedule.
    ConstructionPlan,
    /// Seven-column commercial-operation pipeline.
    CodPipeline,
    /// Eight-column pipeline with an extra date column.
    CodPipelineExtended,
}

const CONSTRUCTION_HEADERS: [&str; 8] = [
    "spv",
    "phase #",
    "no.",
    "pjt name",
    "capacity (kwp)",
    "rtb date",
    "expected soc",
    "expected cod",
];

impl TableShape {
    pub fn detect(headers: &[&str]) -> Option<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_label(h)).collect();
        let any = |needle: &str| normalized.iter().any(|h| h.contains(needle));

        if normalized.len() == 12 && any("hanjeon ppa") && any("ebl") {
            return Some(Self::Permits);
        }
        if normalized.len() == 10 && any("rec tariff") && any("pjt name") {
            return Some(Self::Route);
        }
        if normalized == CONSTRUCTION_HEADERS {
            return Some(Self::ConstructionPlan);
        }

        let pipeline = normalized.first().is_some_and(|h| h == "spv")
            && normalized.iter().any(|h| h == "pjt name")
            && normalized.last().is_some_and(|h| h == "cod");
        match normalized.len() {
            7 if pipeline => Some(Self::CodPipeline),
            8 if pipeline => Some(Self::CodPipelineExtended),
            _ => None,
        }
    }

    /// Detects the shape from the first row of `grid`.
    pub fn detect_grid(grid: &TableGrid) -> Option<Self> {
        let headers: Vec<&str> = (0..grid.column_count()).map(|c| grid.text(0, c)).collect();
        Self::detect(&headers)
    }

    pub fn column_count(self) -> usize {
        self.ratios().len()
    }

    /// Relative column widths; they need not sum to one.
    pub fn ratios(self) -> &'static [f64] {
        match self {
            Self::Route => &[0.05, 0.05, 0.04, 0.16, 0.09, 0.08, 0.10, 0.08, 0.08, 0.27],
            Self::Permits => &[
                0.06, 0.05, 0.06, 0.15, 0.08, 0.09, 0.09, 0.09, 0.09, 0.09, 0.09, 0.16,
            ],
            Self::ConstructionPlan => &[0.08, 0.07, 0.05, 0.25, 0.11, 0.14, 0.14, 0.16],
            Self::CodPipeline => &[0.10, 0.09, 0.06, 0.30, 0.17, 0.13, 0.15],
            Self::CodPipelineExtended => &[0.08, 0.08, 0.06, 0.28, 0.14, 0.12, 0.12, 0.12],
        }
    }

    /// Header row height as `(cap in inches, share of the table height)`;
    /// body rows split the rest evenly.
    pub fn header_height(self) -> Option<(f64, f64)> {
        match self {
            Self::Route => Some((0.42, 0.14)),
            Self::Permits => Some((0.5, 0.16)),
            Self::CodPipeline | Self::CodPipelineExtended => Some((0.52, 0.18)),
            Self::ConstructionPlan => None,
        }
    }

    /// Fill of the SPV column.
    pub fn spv_fill(self) -> &'static str {
        match self {
            Self::Route => "2EDC6F",
            _ => "3DDC84",
        }
    }
}

/// Spreads the table's current total width over its columns by the ratio
/// table of `shape`. Returns `false` and leaves the widths alone when the
/// column count differs.
pub fn redistribute_widths(grid: &mut TableGrid, shape: TableShape) -> bool {
    redistribute_by_ratios(grid, shape.ratios())
}

/// Rounding error lands on the last column so the total is unchanged.
pub fn redistribute_by_ratios(grid: &mut TableGrid, ratios: &[f64]) -> bool {
    if ratios.len() != grid.column_count() || ratios.is_empty() {
        return false;
    }
    let sum: f64 = ratios.iter().sum();
    if sum <= 0.0 {
        return false;
    }

    let total = grid.total_width();
    let mut widths: Vec<i64> = ratios
        .iter()
        .map(|r| (total as f64 * r / sum).floor() as i64)
        .collect();
    let assigned: i64 = widths.iter().sum();
    if let Some(last) = widths.last_mut() {
        *last += total - assigned;
    }

    grid.column_widths = widths;
    true
}

const EMU_PER_INCH: f64 = 914_400.0;

/// Keeps the table height, giving the header row its share (capped) and
/// splitting the remainder evenly over the body rows. Every row needs an
/// explicit height.
pub fn redistribute_heights(grid: &mut TableGrid, shape: TableShape) -> bool {
    let Some((cap_inches, share)) = shape.header_height() else {
        return false;
    };
    if grid.row_count() < 2 {
        return false;
    }
    let Some(heights) = grid
        .rows
        .iter()
        .map(|row| row.height)
        .collect::<Option<Vec<i64>>>()
    else {
        return false;
    };

    let total: i64 = heights.iter().sum();
    if total <= 0 {
        return false;
    }
    let header = ((cap_inches * EMU_PER_INCH) as i64).min((total as f64 * share) as i64);
    let body = (total - header) / (grid.row_count() as i64 - 1);
    if body <= 0 {
        return false;
    }

    for (index, row) in grid.rows.iter_mut().enumerate() {
        row.height = Some(if index == 0 { header } else { body });
    }
    true
}
