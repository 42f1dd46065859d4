use super::document::PresentationDocument;
use super::manifest::SlideIdEntry;
use crate::error::{DeckError, Result};
use crate::hash::sha256_hex;
use crate::ids;
use crate::package::content_types::{content_type_values, mime_for_extension};
use crate::package::parts::{
    extension, is_media_part, relative_target, rels_path_for, resolve_target, slide_part_name,
};
use crate::package::relationships::relationship_types;
use crate::package::{ContentTypeRegistry, Package, RelationshipTable};
use tracing::{debug, info};

/// Grafts slides from one source package into destination packages.
///
/// The source's presentation part and content types are parsed once and
/// reused for every graft.
pub struct SlideGrafter<'a> {
    source: &'a Package,
    presentation: PresentationDocument,
    content_types: ContentTypeRegistry,
}

/// Everything a graft will write, computed before the destination changes.
struct GraftPlan {
    slide_part: String,
    slide_xml: Vec<u8>,
    slide_rels: RelationshipTable,
    media: Vec<(String, Vec<u8>)>,
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl<'a> SlideGrafter<'a> {
    pub fn new(source: &'a Package) -> Result<Self> {
        Ok(Self {
            source,
            presentation: PresentationDocument::load(source)?,
            content_types: source.content_types()?,
        })
    }

    pub fn source_slide_count(&self) -> usize {
        self.presentation.slide_count()
    }

    /// Copies source slide `source_slide_index` into `dest` at manifest
    /// position `dest_position` (clamped to the end) and returns its new
    /// slide id. On error `dest` is left unchanged.
    pub fn graft(
        &self,
        dest: &mut Package,
        source_slide_index: usize,
        dest_position: usize,
    ) -> Result<u32> {
        if source_slide_index >= self.source_slide_count() {
            return Err(DeckError::SourceNotFound {
                index: source_slide_index,
                available: self.source_slide_count(),
            });
        }
        let source_part = self.presentation.slide_part(source_slide_index)?;

        let mut presentation = PresentationDocument::load(dest)?;
        let mut content_types = dest.content_types()?;
        let plan = self.plan(dest, &content_types, &source_part)?;

        let slide_id = ids::next_slide_id(presentation.manifest().slide_ids())?;
        let target = relative_target(presentation.part_name(), &plan.slide_part);
        let relationship_id = presentation
            .relationships_mut()
            .allocate(relationship_types::SLIDE, &target);
        let position = presentation.manifest_mut().insert(
            dest_position,
            SlideIdEntry {
                slide_id,
                relationship_id: relationship_id.clone(),
            },
        );

        for (extension, content_type) in &plan.defaults {
            content_types.add_default(extension, content_type);
        }
        for (part_name, content_type) in &plan.overrides {
            content_types.set_override(part_name, content_type);
        }
        content_types.set_override(&plan.slide_part, content_type_values::SLIDE);

        for (name, bytes) in plan.media {
            debug!(part = %name, "copying media");
            dest.write(&name, bytes)?;
        }
        dest.write(&plan.slide_part, plan.slide_xml)?;
        if !plan.slide_rels.is_empty() {
            dest.write_relationships(&plan.slide_part, &plan.slide_rels)?;
        }
        dest.write_content_types(&content_types)?;
        presentation.store(dest)?;

        info!(
            source = %source_part,
            dest = %plan.slide_part,
            slide_id,
            relationship_id = %relationship_id,
            position,
            "grafted slide"
        );
        Ok(slide_id)
    }

    /// Appends each listed source slide in order.
    pub fn graft_all(&self, dest: &mut Package, indices: &[usize]) -> Result<Vec<u32>> {
        indices
            .iter()
            .map(|&index| self.graft(dest, index, usize::MAX))
            .collect()
    }

    fn plan(
        &self,
        dest: &Package,
        dest_types: &ContentTypeRegistry,
        source_part: &str,
    ) -> Result<GraftPlan> {
        let number = ids::next_slide_part_number(dest.list());
        let slide_part = slide_part_name(number);
        if dest.contains(&slide_part) || dest.contains(&rels_path_for(&slide_part)) {
            return Err(DeckError::integrity(format!(
                "destination already contains '{}'",
                slide_part
            )));
        }

        let slide_xml = self.source.read(source_part)?.to_vec();
        let source_rels = self.source.relationships(source_part)?;

        let mut plan = GraftPlan {
            slide_part,
            slide_xml,
            slide_rels: RelationshipTable::new(),
            media: Vec::new(),
            defaults: Vec::new(),
            overrides: Vec::new(),
        };

        for rel in source_rels.iter() {
            if rel.is_external() {
                plan.slide_rels.insert(rel.clone())?;
                continue;
            }
            if rel.rel_type == relationship_types::NOTES_SLIDE {
                debug!(id = %rel.id, "dropping notes relationship");
                continue;
            }

            // Source and destination slides live in the same directory, so
            // relative targets stay valid unchanged.
            let target = resolve_target(source_part, &rel.target);
            if rel.is_media() || is_media_part(&target) {
                self.stage_media(dest, dest_types, &target, &mut plan)?;
            } else if !dest.contains(&target) {
                return Err(DeckError::integrity(format!(
                    "slide '{}' references '{}' which the destination lacks",
                    source_part, target
                )));
            }
            plan.slide_rels.insert(rel.clone())?;
        }

        Ok(plan)
    }

    fn stage_media(
        &self,
        dest: &Package,
        dest_types: &ContentTypeRegistry,
        target: &str,
        plan: &mut GraftPlan,
    ) -> Result<()> {
        let bytes = self.source.get(target).ok_or_else(|| {
            DeckError::integrity(format!("source media '{}' is missing", target))
        })?;

        if let Some(existing) = dest.get(target) {
            if sha256_hex(existing) != sha256_hex(bytes) {
                return Err(DeckError::integrity(format!(
                    "media '{}' differs between source and destination",
                    target
                )));
            }
            return Ok(());
        }
        if plan.media.iter().any(|(name, _)| name == target) {
            return Ok(());
        }
        plan.media.push((target.to_string(), bytes.to_vec()));

        if let Some(content_type) = self.content_types.override_for(target) {
            plan.overrides
                .push((target.to_string(), content_type.to_string()));
            return Ok(());
        }

        let ext = extension(target).ok_or_else(|| {
            DeckError::integrity(format!("media '{}' has no extension", target))
        })?;
        let known = dest_types.has_default(ext)
            || plan
                .defaults
                .iter()
                .any(|(e, _)| e.eq_ignore_ascii_case(ext));
        if known {
            return Ok(());
        }

        let content_type = self
            .content_types
            .default_for(ext)
            .or_else(|| mime_for_extension(ext))
            .ok_or_else(|| {
                DeckError::integrity(format!("no content type known for '.{}' media", ext))
            })?;
        plan.defaults.push((ext.to_string(), content_type.to_string()));
        Ok(())
    }
}

/// Grafts one slide of `source` into `dest`; see [`SlideGrafter::graft`].
pub fn graft_slide(
    dest: &mut Package,
    source: &Package,
    source_slide_index: usize,
    dest_position: usize,
) -> Result<u32> {
    SlideGrafter::new(source)?.graft(dest, source_slide_index, dest_position)
}
