use super::document::PresentationDocument;
use crate::error::{DeckError, Result};
use crate::package::parts::{rels_path_for, resolve_target};
use crate::package::relationships::relationship_types;
use crate::package::Package;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// What a removal did. Positions that did not name a slide are listed in
/// `ignored` and otherwise left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub removed: Vec<usize>,
    pub ignored: Vec<usize>,
    pub deleted_parts: Vec<String>,
}

/// Removes the slides at the given zero-based positions.
///
/// Surviving slides keep their relative order, slide ids and relationship
/// ids. Out-of-range positions are a no-op reported in
/// [`RemovalReport::ignored`]; use [`remove_slides_strict`] to reject them.
pub fn remove_slides(
    package: &mut Package,
    indices: impl IntoIterator<Item = usize>,
) -> Result<RemovalReport> {
    let mut presentation = PresentationDocument::load(package)?;
    let slide_count = presentation.slide_count();

    let (valid, ignored): (BTreeSet<usize>, BTreeSet<usize>) = indices
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .partition(|&i| i < slide_count);

    if !ignored.is_empty() {
        warn!(
            ?ignored,
            slide_count, "ignoring slide positions outside the presentation"
        );
    }

    let mut report = RemovalReport {
        removed: valid.iter().copied().collect(),
        ignored: ignored.into_iter().collect(),
        deleted_parts: Vec::new(),
    };
    if valid.is_empty() {
        return Ok(report);
    }

    let mut doomed_parts = Vec::new();
    for &position in &valid {
        match presentation.slide_part(position) {
            Ok(slide_part) => {
                doomed_parts.extend(notes_parts_of(package, &slide_part)?);
                doomed_parts.push(rels_path_for(&slide_part));
                doomed_parts.push(slide_part);
            }
            Err(err) => warn!(position, %err, "slide entry has no part; dropping entry only"),
        }
    }

    let removed_entries = presentation.manifest_mut().remove_positions(&valid);
    let removed_ids: HashSet<u32> = removed_entries.iter().map(|e| e.slide_id).collect();
    let removed_rels: HashSet<String> = removed_entries
        .into_iter()
        .map(|e| e.relationship_id)
        .collect();

    presentation
        .relationships_mut()
        .retain(|rel| !removed_rels.contains(&rel.id));
    presentation.forget_slides(&removed_ids, &removed_rels);

    let surviving: HashSet<String> = (0..presentation.slide_count())
        .filter_map(|pos| presentation.slide_part(pos).ok())
        .collect();
    doomed_parts.retain(|part| !surviving.contains(part));

    let mut content_types = package.content_types()?;
    for part in &doomed_parts {
        if package.delete(part)? {
            debug!(part = %part, "deleted part");
            report.deleted_parts.push(part.clone());
        }
        content_types.remove_override(part);
    }

    presentation.store(package)?;
    package.write_content_types(&content_types)?;

    info!(
        removed = report.removed.len(),
        remaining = presentation.slide_count(),
        "removed slides"
    );
    Ok(report)
}

/// Like [`remove_slides`] but fails with [`DeckError::OutOfRangeRemoval`]
/// before touching the package when any position is out of range.
pub fn remove_slides_strict(
    package: &mut Package,
    indices: impl IntoIterator<Item = usize>,
) -> Result<RemovalReport> {
    let indices: BTreeSet<usize> = indices.into_iter().collect();
    let slide_count = PresentationDocument::load(package)?.slide_count();

    let out_of_range: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| i >= slide_count)
        .collect();
    if !out_of_range.is_empty() {
        return Err(DeckError::OutOfRangeRemoval {
            indices: out_of_range,
            slide_count,
        });
    }

    remove_slides(package, indices)
}

/// Removes positions `start..=end_inclusive`.
pub fn remove_range(
    package: &mut Package,
    start: usize,
    end_inclusive: usize,
) -> Result<RemovalReport> {
    remove_slides(package, start..=end_inclusive)
}

/// Keeps the first `keep` slides and removes the rest.
pub fn prune_to(package: &mut Package, keep: usize) -> Result<RemovalReport> {
    let slide_count = PresentationDocument::load(package)?.slide_count();
    remove_slides(package, keep..slide_count)
}

/// The notes slide of `slide_part` and its relationship part, if any.
fn notes_parts_of(package: &Package, slide_part: &str) -> Result<Vec<String>> {
    let rels = package.relationships(slide_part)?;
    Ok(rels
        .iter()
        .filter(|rel| rel.rel_type == relationship_types::NOTES_SLIDE && !rel.is_external())
        .flat_map(|rel| {
            let notes = resolve_target(slide_part, &rel.target);
            [rels_path_for(&notes), notes]
        })
        .collect())
}
