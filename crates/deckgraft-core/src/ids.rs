//! Identifier allocation over a snapshot of what is already in use.
//!
//! These functions hold no state. Callers pass the live set of ids at the
//! moment of allocation.

use crate::error::{DeckError, Result};
use crate::package::parts::slide_number;
use std::collections::HashSet;

/// Lowest slide id PowerPoint accepts.
pub const SLIDE_ID_BASE: u32 = 256;
/// Highest slide id allowed by the file format.
pub const SLIDE_ID_MAX: u32 = 2_147_483_647;

/// Lowest `rId<n>` (n >= 1) not present in `existing`.
pub fn next_relationship_id(existing: &HashSet<String>) -> String {
    (1u32..)
        .map(|n| format!("rId{}", n))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_else(|| "rId1".to_string())
}

/// One past the largest id in use, never below [`SLIDE_ID_BASE`].
pub fn next_slide_id(existing: impl IntoIterator<Item = u32>) -> Result<u32> {
    let next = match existing.into_iter().max() {
        Some(max) => u64::from(max) + 1,
        None => u64::from(SLIDE_ID_BASE),
    };
    let next = next.max(u64::from(SLIDE_ID_BASE));

    if next > u64::from(SLIDE_ID_MAX) {
        return Err(DeckError::integrity(format!(
            "slide id space exhausted (next id {} exceeds {})",
            next, SLIDE_ID_MAX
        )));
    }
    Ok(next as u32)
}

/// One past the highest `ppt/slides/slideN.xml` among `names`.
pub fn next_slide_part_number<'a>(names: impl IntoIterator<Item = &'a str>) -> u32 {
    names
        .into_iter()
        .filter_map(slide_number)
        .max()
        .map_or(1, |max| max + 1)
}
