use super::manifest::SlideManifest;
use crate::error::{DeckError, Result};
use crate::package::parts::{resolve_target, PRESENTATION_PART};
use crate::package::relationships::relationship_types;
use crate::package::{Package, RelationshipTable};
use crate::xml::{XName, XmlDocument, P, P14, R};
use std::collections::HashSet;

/// Name of the main presentation part, following the package relationship
/// when there is one.
pub fn presentation_part_name(package: &Package) -> Result<String> {
    let package_rels = package.relationships("")?;
    Ok(package_rels
        .find_by_type(relationship_types::OFFICE_DOCUMENT)
        .map(|rel| resolve_target("", &rel.target))
        .unwrap_or_else(|| PRESENTATION_PART.to_string()))
}

/// `ppt/presentation.xml` together with its relationship table and slide list.
#[derive(Debug)]
pub struct PresentationDocument {
    part_name: String,
    xml: XmlDocument,
    manifest: SlideManifest,
    relationships: RelationshipTable,
}

impl PresentationDocument {
    pub fn load(package: &Package) -> Result<Self> {
        let part_name = presentation_part_name(package)?;
        let xml = package.read_xml(&part_name)?;
        let manifest = SlideManifest::read(&xml)?;
        let relationships = package.relationships(&part_name)?;
        Ok(Self {
            part_name,
            xml,
            manifest,
            relationships,
        })
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn xml(&self) -> &XmlDocument {
        &self.xml
    }

    pub fn manifest(&self) -> &SlideManifest {
        &self.manifest
    }

    pub fn manifest_mut(&mut self) -> &mut SlideManifest {
        &mut self.manifest
    }

    pub fn relationships(&self) -> &RelationshipTable {
        &self.relationships
    }

    pub fn relationships_mut(&mut self) -> &mut RelationshipTable {
        &mut self.relationships
    }

    pub fn slide_count(&self) -> usize {
        self.manifest.len()
    }

    /// Part name of the slide at `position`.
    pub fn slide_part(&self, position: usize) -> Result<String> {
        let entry = self.manifest.get(position).ok_or(DeckError::SourceNotFound {
            index: position,
            available: self.manifest.len(),
        })?;
        let rel = self.relationships.get(&entry.relationship_id).ok_or_else(|| {
            DeckError::integrity(format!(
                "slide {} refers to unknown relationship '{}'",
                entry.slide_id, entry.relationship_id
            ))
        })?;
        Ok(resolve_target(&self.part_name, &rel.target))
    }

    pub fn slide_parts(&self) -> Result<Vec<String>> {
        (0..self.slide_count()).map(|pos| self.slide_part(pos)).collect()
    }

    /// Drops section-list and custom-show references to removed slides so
    /// that no other element of the presentation names them.
    pub fn forget_slides(&mut self, slide_ids: &HashSet<u32>, relationship_ids: &HashSet<String>) {
        let Some(root) = self.xml.root() else {
            return;
        };
        let id_attr = XName::local("id");

        let stale: Vec<_> = self
            .xml
            .descendants(root)
            .filter(|&node| {
                if self.xml.is_named(node, &P14::sldId()) {
                    self.xml
                        .attribute(node, &id_attr)
                        .and_then(|v| v.parse::<u32>().ok())
                        .is_some_and(|id| slide_ids.contains(&id))
                } else if self.xml.is_named(node, &P::sld()) {
                    self.xml
                        .ancestors(node)
                        .any(|a| self.xml.is_named(a, &P::custShowLst()))
                        && self
                            .xml
                            .attribute(node, &R::id())
                            .is_some_and(|rid| relationship_ids.contains(rid))
                } else {
                    false
                }
            })
            .collect();

        for node in stale {
            self.xml.remove(node);
        }
    }

    /// Writes the slide list back into the presentation part and stores the
    /// part and its relationships.
    pub fn store(&mut self, package: &mut Package) -> Result<()> {
        self.manifest.write(&mut self.xml)?;
        package.write_xml(&self.part_name, &self.xml)?;
        package.write_relationships(&self.part_name, &self.relationships)
    }
}
