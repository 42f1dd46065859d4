use crate::error::{DeckError, Result};
use crate::ids;
use crate::xml::{builder, parser, XAttribute, XName, XmlDocument, XmlNodeData, PR};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetMode {
    #[default]
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    #[serde(default)]
    pub target_mode: TargetMode,
}

impl Relationship {
    pub fn new(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::Internal,
        }
    }

    pub fn external(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::External,
        }
    }

    pub fn is_external(&self) -> bool {
        self.target_mode == TargetMode::External
    }

    /// Images, audio, video and generic embedded media.
    pub fn is_media(&self) -> bool {
        relationship_types::MEDIA_TYPES.contains(&self.rel_type.as_str())
    }
}

/// The relationships owned by one part, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipTable {
    relationships: Vec<Relationship>,
}

impl RelationshipTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let doc = parser::parse_bytes(bytes)?;
        let root = doc
            .root()
            .ok_or_else(|| DeckError::malformed("relationship part has no root element"))?;

        let mut relationships = Vec::new();
        for node in doc.elements_by_name(root, &PR::Relationship()) {
            let attr = |name: &str| doc.attribute(node, &XName::local(name));
            let (Some(id), Some(rel_type), Some(target)) =
                (attr("Id"), attr("Type"), attr("Target"))
            else {
                return Err(DeckError::malformed(
                    "relationship is missing Id, Type or Target",
                ));
            };
            let target_mode = match attr("TargetMode") {
                Some(mode) if mode.eq_ignore_ascii_case("External") => TargetMode::External,
                _ => TargetMode::Internal,
            };
            relationships.push(Relationship {
                id: id.to_string(),
                rel_type: rel_type.to_string(),
                target: target.to_string(),
                target_mode,
            });
        }

        Ok(Self { relationships })
    }

    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut doc = XmlDocument::new();
        let root = doc.add_root(XmlNodeData::element_with_attrs(
            PR::Relationships(),
            vec![XAttribute::new(XName::local("xmlns"), PR::NS)],
        ));

        for rel in &self.relationships {
            let mut attrs = vec![
                XAttribute::new(XName::local("Id"), &rel.id),
                XAttribute::new(XName::local("Type"), &rel.rel_type),
                XAttribute::new(XName::local("Target"), &rel.target),
            ];
            if rel.is_external() {
                attrs.push(XAttribute::new(XName::local("TargetMode"), "External"));
            }
            doc.add_child(
                root,
                XmlNodeData::element_with_attrs(PR::Relationship(), attrs),
            );
        }

        builder::serialize_bytes(&doc)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    pub fn find_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.rel_type == rel_type)
    }

    pub fn ids(&self) -> HashSet<String> {
        self.relationships.iter().map(|r| r.id.clone()).collect()
    }

    /// Adds an internal relationship under the lowest free id and returns it.
    pub fn allocate(&mut self, rel_type: &str, target: &str) -> String {
        let id = ids::next_relationship_id(&self.ids());
        self.relationships
            .push(Relationship::new(&id, rel_type, target));
        id
    }

    /// Fails if the id is already taken.
    pub fn insert(&mut self, rel: Relationship) -> Result<()> {
        if self.get(&rel.id).is_some() {
            return Err(DeckError::integrity(format!(
                "relationship id '{}' already exists",
                rel.id
            )));
        }
        self.relationships.push(rel);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.relationships.iter().position(|r| r.id == id)?;
        Some(self.relationships.remove(pos))
    }

    pub fn retain(&mut self, keep: impl FnMut(&Relationship) -> bool) {
        self.relationships.retain(keep);
    }
}

pub mod relationship_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const TABLE_STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";
    pub const PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
    pub const VIEW_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const AUDIO: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/audio";
    pub const VIDEO: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/video";
    pub const MEDIA: &str = "http://schemas.microsoft.com/office/2007/relationships/media";

    pub const MEDIA_TYPES: &[&str] = &[IMAGE, AUDIO, VIDEO, MEDIA];
}
