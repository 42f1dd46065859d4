use super::parts::{extension, normalize_name};
use crate::error::{DeckError, Result};
use crate::xml::{builder, parser, XAttribute, XName, XmlDocument, XmlNodeData, CT};
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeDeclaration {
    Default {
        extension: String,
        content_type: String,
    },
    Override {
        part_name: String,
        content_type: String,
    },
}

impl ContentTypeDeclaration {
    pub fn content_type(&self) -> &str {
        match self {
            Self::Default { content_type, .. } | Self::Override { content_type, .. } => {
                content_type
            }
        }
    }
}

/// Parsed `[Content_Types].xml`. Declarations keep their document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypeRegistry {
    declarations: Vec<ContentTypeDeclaration>,
}

impl ContentTypeRegistry {
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.add_default("rels", content_type_values::RELATIONSHIPS);
        registry.add_default("xml", content_type_values::XML);
        registry
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let doc = parser::parse_bytes(bytes)?;
        let root = doc
            .root()
            .ok_or_else(|| DeckError::malformed("content types part has no root element"))?;

        let mut declarations = Vec::new();
        for node in doc.element_children(root) {
            let attr = |name: &str| doc.attribute(node, &XName::local(name));
            let Some(content_type) = attr("ContentType") else {
                return Err(DeckError::malformed("content type declaration without ContentType"));
            };
            if doc.is_named(node, &CT::Default()) {
                let extension = attr("Extension")
                    .ok_or_else(|| DeckError::malformed("Default without Extension"))?;
                declarations.push(ContentTypeDeclaration::Default {
                    extension: extension.to_string(),
                    content_type: content_type.to_string(),
                });
            } else if doc.is_named(node, &CT::Override()) {
                let part_name = attr("PartName")
                    .ok_or_else(|| DeckError::malformed("Override without PartName"))?;
                declarations.push(ContentTypeDeclaration::Override {
                    part_name: normalize_name(part_name).to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        Ok(Self { declarations })
    }

    /// Defaults are written before overrides, as Office does.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut doc = XmlDocument::new();
        let root = doc.add_root(XmlNodeData::element_with_attrs(
            CT::Types(),
            vec![XAttribute::new(XName::local("xmlns"), CT::NS)],
        ));

        for (extension, content_type) in self.defaults() {
            doc.add_child(
                root,
                XmlNodeData::element_with_attrs(
                    CT::Default(),
                    vec![
                        XAttribute::new(XName::local("Extension"), extension),
                        XAttribute::new(XName::local("ContentType"), content_type),
                    ],
                ),
            );
        }
        for (part_name, content_type) in self.overrides() {
            doc.add_child(
                root,
                XmlNodeData::element_with_attrs(
                    CT::Override(),
                    vec![
                        XAttribute::new(XName::local("PartName"), &format!("/{}", part_name)),
                        XAttribute::new(XName::local("ContentType"), content_type),
                    ],
                ),
            );
        }

        builder::serialize_bytes(&doc)
    }

    pub fn declarations(&self) -> &[ContentTypeDeclaration] {
        &self.declarations
    }

    pub fn defaults(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().filter_map(|d| match d {
            ContentTypeDeclaration::Default {
                extension,
                content_type,
            } => Some((extension.as_str(), content_type.as_str())),
            _ => None,
        })
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().filter_map(|d| match d {
            ContentTypeDeclaration::Override {
                part_name,
                content_type,
            } => Some((part_name.as_str(), content_type.as_str())),
            _ => None,
        })
    }

    /// Override first, then the extension default.
    pub fn resolve(&self, part_name: &str) -> Option<&str> {
        self.override_for(part_name)
            .or_else(|| extension(part_name).and_then(|ext| self.default_for(ext)))
    }

    pub fn override_for(&self, part_name: &str) -> Option<&str> {
        let part_name = normalize_name(part_name);
        self.overrides()
            .find(|(name, _)| name.eq_ignore_ascii_case(part_name))
            .map(|(_, ct)| ct)
    }

    pub fn default_for(&self, extension: &str) -> Option<&str> {
        self.defaults()
            .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
            .map(|(_, ct)| ct)
    }

    pub fn has_default(&self, extension: &str) -> bool {
        self.default_for(extension).is_some()
    }

    /// Returns false when a default for the extension already exists.
    pub fn add_default(&mut self, extension: &str, content_type: &str) -> bool {
        if self.has_default(extension) {
            return false;
        }
        self.declarations.push(ContentTypeDeclaration::Default {
            extension: extension.to_ascii_lowercase(),
            content_type: content_type.to_string(),
        });
        true
    }

    pub fn set_override(&mut self, part_name: &str, content_type: &str) {
        let part_name = normalize_name(part_name);
        for decl in &mut self.declarations {
            if let ContentTypeDeclaration::Override {
                part_name: existing,
                content_type: ct,
            } = decl
            {
                if existing.eq_ignore_ascii_case(part_name) {
                    *ct = content_type.to_string();
                    return;
                }
            }
        }
        self.declarations.push(ContentTypeDeclaration::Override {
            part_name: part_name.to_string(),
            content_type: content_type.to_string(),
        });
    }

    pub fn remove_override(&mut self, part_name: &str) -> bool {
        let part_name = normalize_name(part_name);
        let before = self.declarations.len();
        self.declarations.retain(|d| {
            !matches!(d, ContentTypeDeclaration::Override { part_name: p, .. }
                if p.eq_ignore_ascii_case(part_name))
        });
        self.declarations.len() != before
    }

    /// Drops every override for which `keep` returns false; returns the dropped names.
    pub fn retain_overrides(&mut self, mut keep: impl FnMut(&str) -> bool) -> Vec<String> {
        let mut dropped = Vec::new();
        self.declarations.retain(|d| match d {
            ContentTypeDeclaration::Override { part_name, .. } if !keep(part_name) => {
                dropped.push(part_name.clone());
                false
            }
            _ => true,
        });
        dropped
    }
}

static MEDIA_MIME_TYPES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("gif", "image/gif"),
        ("bmp", "image/bmp"),
        ("tiff", "image/tiff"),
        ("tif", "image/tiff"),
        ("svg", "image/svg+xml"),
        ("wmf", "image/x-wmf"),
        ("emf", "image/x-emf"),
    ])
});

/// Fallback MIME type for media extensions missing from a source registry.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    MEDIA_MIME_TYPES
        .get(extension.to_ascii_lowercase().as_str())
        .copied()
}

pub mod content_type_values {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const TABLE_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
    pub const PRES_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
    pub const VIEW_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="PNG" ContentType="image/png"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>"#;

    #[test]
    fn override_wins_over_default() {
        let registry = ContentTypeRegistry::parse(TYPES.as_bytes()).unwrap();

        assert_eq!(
            registry.resolve("ppt/slides/slide1.xml"),
            Some(content_type_values::SLIDE)
        );
        assert_eq!(registry.resolve("ppt/slides/slide2.xml"), Some("application/xml"));
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        let registry = ContentTypeRegistry::parse(TYPES.as_bytes()).unwrap();

        assert_eq!(registry.resolve("ppt/media/image1.png"), Some("image/png"));
        assert_eq!(registry.resolve("ppt/media/clip.mp4"), None);

        let mut copy = registry.clone();
        assert!(!copy.add_default("png", "image/png"));
        assert!(copy.add_default("mp4", "video/mp4"));
    }

    #[test]
    fn set_override_replaces_existing_entry() {
        let mut registry = ContentTypeRegistry::new();
        registry.set_override("/ppt/slides/slide1.xml", "a");
        registry.set_override("ppt/slides/slide1.xml", "b");

        assert_eq!(registry.overrides().count(), 1);
        assert_eq!(registry.resolve("ppt/slides/slide1.xml"), Some("b"));
        assert!(registry.remove_override("ppt/slides/slide1.xml"));
        assert!(!registry.remove_override("ppt/slides/slide1.xml"));
    }

    #[test]
    fn serialized_registry_parses_back_identically() {
        let registry = ContentTypeRegistry::parse(TYPES.as_bytes()).unwrap();
        let reparsed = ContentTypeRegistry::parse(&registry.to_xml().unwrap()).unwrap();

        assert_eq!(reparsed, registry);
    }

    #[test]
    fn fallback_mime_table_covers_common_images() {
        assert_eq!(mime_for_extension("JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("emf"), Some("image/x-emf"));
        assert_eq!(mime_for_extension("docx"), None);
    }
}
