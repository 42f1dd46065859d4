//! Package-level checks, read independently of the engine's own model with
//! `roxmltree`:
//!
//! 1. every XML part is well-formed,
//! 2. every internal relationship resolves to a part of the package,
//! 3. every part resolves to a content type,
//! 4. slide ids are unique, within range and each points at a slide part.

use deckgraft_core::package::parts::resolve_target;
use deckgraft_core::Package;
use roxmltree::Document;
use std::collections::HashSet;

const PML_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Panics with every problem found.
pub fn assert_valid(package: &Package) {
    let result = validate_package(package);
    assert!(result.is_valid(), "package is not valid:\n{}", result.errors.join("\n"));
}

pub fn validate_package(package: &Package) -> ValidationResult {
    let mut errors = Vec::new();
    let names: HashSet<String> = package.list().map(str::to_string).collect();

    for name in &names {
        if is_xml(name) {
            let text = String::from_utf8_lossy(package.read(name).unwrap()).into_owned();
            if let Err(err) = Document::parse(&text) {
                errors.push(format!("{}: not well-formed: {}", name, err));
            }
        }
    }

    for rels_part in names.iter().filter(|n| n.ends_with(".rels")) {
        let source = source_of(rels_part);
        let Ok(table) = package.relationships(&source) else {
            errors.push(format!("{}: unreadable relationship part", rels_part));
            continue;
        };
        for rel in table.iter().filter(|r| !r.is_external()) {
            let target = resolve_target(&source, &rel.target);
            if !names.contains(&target) {
                errors.push(format!("{}: {} points at missing '{}'", rels_part, rel.id, target));
            }
        }
    }

    match package.content_types() {
        Ok(types) => {
            for name in names.iter().filter(|n| n.as_str() != "[Content_Types].xml") {
                if types.resolve(name).is_none() {
                    errors.push(format!("{}: no content type", name));
                }
            }
        }
        Err(err) => errors.push(format!("[Content_Types].xml: {}", err)),
    }

    errors.extend(slide_list_errors(package));
    ValidationResult { errors }
}

/// Slide ids in manifest order, read straight from the presentation part.
pub fn slide_ids(package: &Package) -> Vec<u32> {
    let text = String::from_utf8_lossy(package.read("ppt/presentation.xml").unwrap()).into_owned();
    let doc = Document::parse(&text).unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name((PML_NS, "sldId")))
        .filter_map(|n| n.attribute("id")?.parse().ok())
        .collect()
}

/// Slide part names in manifest order.
pub fn slide_parts(package: &Package) -> Vec<String> {
    let text = String::from_utf8_lossy(package.read("ppt/presentation.xml").unwrap()).into_owned();
    let doc = Document::parse(&text).unwrap();
    let rels = package.relationships("ppt/presentation.xml").unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name((PML_NS, "sldId")))
        .filter_map(|n| n.attribute((REL_NS, "id")))
        .filter_map(|rid| rels.get(rid))
        .map(|rel| resolve_target("ppt/presentation.xml", &rel.target))
        .collect()
}

pub fn part_text(package: &Package, name: &str) -> String {
    String::from_utf8_lossy(package.read(name).unwrap()).into_owned()
}

fn slide_list_errors(package: &Package) -> Vec<String> {
    let mut errors = Vec::new();
    let Ok(bytes) = package.read("ppt/presentation.xml") else {
        return vec!["ppt/presentation.xml is missing".to_string()];
    };
    let text = String::from_utf8_lossy(bytes).into_owned();
    let Ok(doc) = Document::parse(&text) else {
        return errors;
    };
    let Ok(rels) = package.relationships("ppt/presentation.xml") else {
        return vec!["presentation relationships unreadable".to_string()];
    };

    let mut seen = HashSet::new();
    for entry in doc.descendants().filter(|n| n.has_tag_name((PML_NS, "sldId"))) {
        let id: Option<u32> = entry.attribute("id").and_then(|v| v.parse().ok());
        match id {
            Some(id) if (256..=2_147_483_647).contains(&id) => {
                if !seen.insert(id) {
                    errors.push(format!("duplicate slide id {}", id));
                }
            }
            other => errors.push(format!("slide id {:?} out of range", other)),
        }

        let rel = entry.attribute((REL_NS, "id")).and_then(|rid| rels.get(rid));
        match rel {
            Some(rel) if rel.rel_type == SLIDE_REL => {
                let part = resolve_target("ppt/presentation.xml", &rel.target);
                if !package.contains(&part) {
                    errors.push(format!("slide part '{}' is missing", part));
                }
            }
            _ => errors.push(format!("slide {:?} has no slide relationship", id)),
        }
    }
    errors
}

fn is_xml(name: &str) -> bool {
    name.ends_with(".xml") || name.ends_with(".rels")
}

/// `ppt/slides/_rels/slide1.xml.rels` belongs to `ppt/slides/slide1.xml`;
/// `_rels/.rels` to the package itself (the empty name).
fn source_of(rels_part: &str) -> String {
    let trimmed = rels_part.trim_end_matches(".rels");
    match trimmed.rsplit_once("_rels/") {
        Some((dir, file)) => format!("{}{}", dir, file),
        None => trimmed.to_string(),
    }
}
