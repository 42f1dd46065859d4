//! Structural editing of DrawingML tables: row roles, contiguous merges,
//! fills and width redistribution over an in-memory [`TableGrid`].

pub mod grid;
pub mod merge;
pub mod restructure;
pub mod roles;
pub mod shape;

pub use grid::{TableCell, TableGrid, TableRow};
pub use merge::{merge_columns, merge_contiguous, merge_range, merge_rows, MergePredicate, MergedRun};
pub use restructure::{restructure, RestructureSummary, HEADER_FILL, SUBTOTAL_FILL, TOTAL_FILL};
pub use roles::{classify_label, detect_role, normalize_label, row_roles, RowRole, LABEL_COLUMN};
pub use shape::{redistribute_heights, redistribute_widths, TableShape};
