use crate::error::{DeckError, Result};
use crate::xml::{XAttribute, XName, XmlDocument, XmlNodeData, P, R};
use indextree::NodeId;
use std::collections::BTreeSet;

/// One `p:sldId` of the slide list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideIdEntry {
    pub slide_id: u32,
    pub relationship_id: String,
}

/// The ordered slide list of `ppt/presentation.xml`. Position in the list is
/// the slide's position in the deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideManifest {
    entries: Vec<SlideIdEntry>,
}

impl SlideManifest {
    pub fn read(doc: &XmlDocument) -> Result<Self> {
        let root = doc
            .root()
            .ok_or_else(|| DeckError::malformed("presentation part has no root element"))?;
        let Some(list) = doc.find_child(root, &P::sldIdLst()) else {
            return Ok(Self::default());
        };

        let mut entries = Vec::new();
        for node in doc.elements_by_name(list, &P::sldId()) {
            let slide_id = doc
                .attribute(node, &XName::local("id"))
                .and_then(|v| v.parse::<u32>().ok())
                .ok_or_else(|| DeckError::malformed("p:sldId without a numeric id"))?;
            let relationship_id = doc
                .attribute(node, &R::id())
                .ok_or_else(|| DeckError::malformed(format!("p:sldId {} without r:id", slide_id)))?;
            entries.push(SlideIdEntry {
                slide_id,
                relationship_id: relationship_id.to_string(),
            });
        }

        Ok(Self { entries })
    }

    /// Replaces the `p:sldIdLst` of `doc` with this manifest, creating the
    /// list in its schema position when absent.
    pub fn write(&self, doc: &mut XmlDocument) -> Result<()> {
        let root = doc
            .root()
            .ok_or_else(|| DeckError::malformed("presentation part has no root element"))?;

        let list = match doc.find_child(root, &P::sldIdLst()) {
            Some(list) => {
                doc.remove_children(list);
                list
            }
            None => insert_slide_list(doc, root),
        };

        for entry in &self.entries {
            doc.add_child(
                list,
                XmlNodeData::element_with_attrs(
                    P::sldId(),
                    vec![
                        XAttribute::new(XName::local("id"), &entry.slide_id.to_string()),
                        XAttribute::new(R::id(), &entry.relationship_id),
                    ],
                ),
            );
        }

        Ok(())
    }

    pub fn entries(&self) -> &[SlideIdEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&SlideIdEntry> {
        self.entries.get(position)
    }

    pub fn slide_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|e| e.slide_id)
    }

    /// Inserts at `position`, clamped to the end of the list. Returns the
    /// position actually used.
    pub fn insert(&mut self, position: usize, entry: SlideIdEntry) -> usize {
        let position = position.min(self.entries.len());
        self.entries.insert(position, entry);
        position
    }

    pub fn push(&mut self, entry: SlideIdEntry) {
        self.entries.push(entry);
    }

    /// Removes the given positions and returns the removed entries in
    /// ascending position order. Survivors keep their relative order.
    pub fn remove_positions(&mut self, positions: &BTreeSet<usize>) -> Vec<SlideIdEntry> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.entries.len());
        for (pos, entry) in self.entries.drain(..).enumerate() {
            if positions.contains(&pos) {
                removed.push(entry);
            } else {
                kept.push(entry);
            }
        }
        self.entries = kept;
        removed
    }
}

fn insert_slide_list(doc: &mut XmlDocument, root: NodeId) -> NodeId {
    let preceding = [
        P::handoutMasterIdLst(),
        P::notesMasterIdLst(),
        P::sldMasterIdLst(),
    ];
    let anchor = preceding
        .iter()
        .find_map(|name| doc.find_child(root, name));

    let first = doc.element_children(root).next();

    let list = XmlNodeData::element(P::sldIdLst());
    match (anchor, first) {
        (Some(anchor), _) => doc.add_after(anchor, list),
        (None, Some(first)) => doc.add_before(first, list),
        (None, None) => doc.add_child(root, list),
    }
}
