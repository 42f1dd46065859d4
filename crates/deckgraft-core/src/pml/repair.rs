//! Normalizes a presentation so that office applications open it without a
//! repair prompt.
//!
//! Loading and storing are separate phases: [`load_through_model`] reads and
//! validates everything it needs without touching the package, and
//! [`store_through_model`] computes every write before applying any.

use super::document::PresentationDocument;
use crate::error::{DeckError, Result};
use crate::package::content_types::{content_type_values, mime_for_extension};
use crate::package::parts::{extension, relative_target, resolve_target, CONTENT_TYPES_PART};
use crate::package::relationships::relationship_types;
use crate::package::{ContentTypeRegistry, Package, RelationshipTable};
use crate::xml::{
    builder, XAttribute, XName, XmlDocument, XmlNodeData, A, CP, DC, DCTERMS, P, R, XMLNS, XSI,
};
use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

const TABLE_STYLES_PART: &str = "ppt/tableStyles.xml";
const PRES_PROPS_PART: &str = "ppt/presProps.xml";
const VIEW_PROPS_PART: &str = "ppt/viewProps.xml";
const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// "Medium Style 2 - Accent 1", the table style PowerPoint applies by default.
pub const DEFAULT_TABLE_STYLE_ID: &str = "{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}";

/// The parts of a package the repair pass reasons about, parsed.
#[derive(Debug)]
pub struct PresentationModel {
    presentation: PresentationDocument,
    content_types: ContentTypeRegistry,
    package_relationships: RelationshipTable,
    part_names: Vec<String>,
}

impl PresentationModel {
    pub fn slide_count(&self) -> usize {
        self.presentation.slide_count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub added_parts: Vec<String>,
    pub added_defaults: Vec<String>,
    pub added_overrides: Vec<String>,
    pub dropped_overrides: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.added_parts.is_empty()
            && self.added_defaults.is_empty()
            && self.added_overrides.is_empty()
            && self.dropped_overrides.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    Repaired(RepairReport),
    /// The pass could not run; the package is untouched.
    Skipped(String),
}

pub fn load_through_model(package: &Package) -> Result<PresentationModel> {
    let presentation = PresentationDocument::load(package).map_err(repair_failure)?;
    for part in presentation.slide_parts().map_err(repair_failure)? {
        if !package.contains(&part) {
            return Err(DeckError::RepairFailure {
                message: format!("slide part '{}' is missing", part),
            });
        }
    }

    Ok(PresentationModel {
        presentation,
        content_types: package.content_types().map_err(repair_failure)?,
        package_relationships: package.relationships("").map_err(repair_failure)?,
        part_names: package.list().map(str::to_string).collect(),
    })
}

pub fn store_through_model(
    mut model: PresentationModel,
    package: &mut Package,
) -> Result<RepairReport> {
    let mut report = RepairReport::default();
    let mut staged: Vec<(String, Vec<u8>)> = Vec::new();
    let presentation_part = model.presentation.part_name().to_string();

    let presentation_parts = [
        (
            relationship_types::TABLE_STYLES,
            TABLE_STYLES_PART,
            content_type_values::TABLE_STYLES,
            table_styles_xml as fn() -> Result<Vec<u8>>,
        ),
        (
            relationship_types::PRES_PROPS,
            PRES_PROPS_PART,
            content_type_values::PRES_PROPS,
            pres_props_xml,
        ),
        (
            relationship_types::VIEW_PROPS,
            VIEW_PROPS_PART,
            content_type_values::VIEW_PROPS,
            view_props_xml,
        ),
    ];

    for (rel_type, default_part, content_type, render) in presentation_parts {
        let part = ensure_related_part(
            model.presentation.relationships_mut(),
            &presentation_part,
            rel_type,
            default_part,
        );
        if !model.part_names.contains(&part) {
            staged.push((part.clone(), render()?));
            report.added_parts.push(part.clone());
        }
        if model.content_types.override_for(&part).is_none() {
            model.content_types.set_override(&part, content_type);
        }
    }

    let core = ensure_related_part(
        &mut model.package_relationships,
        "",
        relationship_types::CORE_PROPERTIES,
        CORE_PROPERTIES_PART,
    );
    if !model.part_names.contains(&core) {
        staged.push((core.clone(), core_properties_xml()?));
        report.added_parts.push(core.clone());
    }
    if model.content_types.override_for(&core).is_none() {
        model
            .content_types
            .set_override(&core, content_type_values::CORE_PROPERTIES);
    }

    for slide in model.presentation.slide_parts()? {
        if model.content_types.override_for(&slide).is_none() {
            model
                .content_types
                .set_override(&slide, content_type_values::SLIDE);
            report.added_overrides.push(slide);
        }
    }

    let mut live: Vec<&str> = model.part_names.iter().map(String::as_str).collect();
    live.extend(staged.iter().map(|(name, _)| name.as_str()));

    report.dropped_overrides = model
        .content_types
        .retain_overrides(|name| live.iter().any(|p| p.eq_ignore_ascii_case(name)));

    for part in &live {
        if *part == CONTENT_TYPES_PART || model.content_types.resolve(part).is_some() {
            continue;
        }
        let Some(ext) = extension(part) else {
            continue;
        };
        if let Some(mime) = mime_for_extension(ext) {
            model.content_types.add_default(ext, mime);
            report.added_defaults.push(ext.to_ascii_lowercase());
        } else {
            warn!(part = %part, "part has no resolvable content type");
        }
    }

    staged.push((CONTENT_TYPES_PART.to_string(), model.content_types.to_xml()?));
    staged.push((
        crate::package::parts::PACKAGE_RELS_PART.to_string(),
        model.package_relationships.to_xml()?,
    ));

    model.presentation.store(package)?;
    for (name, bytes) in staged {
        debug!(part = %name, "repair writes part");
        package.write(&name, bytes)?;
    }

    Ok(report)
}

/// Runs both phases. Failures are logged and reported as
/// [`RepairOutcome::Skipped`]; they never abort generation.
pub fn repair(package: &mut Package) -> RepairOutcome {
    let result = load_through_model(package).and_then(|model| {
        // The caller's package only changes once the store succeeded.
        let mut scratch = package.clone();
        let report = store_through_model(model, &mut scratch)?;
        Ok((scratch, report))
    });

    match result {
        Ok((repaired, report)) => {
            *package = repaired;
            info!(
                added_parts = report.added_parts.len(),
                dropped_overrides = report.dropped_overrides.len(),
                "repair pass finished"
            );
            RepairOutcome::Repaired(report)
        }
        Err(err) => {
            warn!(%err, "repair pass skipped");
            RepairOutcome::Skipped(err.to_string())
        }
    }
}

fn repair_failure(err: DeckError) -> DeckError {
    match err {
        DeckError::RepairFailure { .. } => err,
        other => DeckError::RepairFailure {
            message: other.to_string(),
        },
    }
}

/// Name of the part `source` relates to by `rel_type`, adding the
/// relationship (to `default_part`) when there is none.
fn ensure_related_part(
    table: &mut RelationshipTable,
    source: &str,
    rel_type: &str,
    default_part: &str,
) -> String {
    if let Some(rel) = table.find_by_type(rel_type).filter(|r| !r.is_external()) {
        return resolve_target(source, &rel.target);
    }
    table.allocate(rel_type, &relative_target(source, default_part));
    default_part.to_string()
}

fn xmlns(prefix: &str, ns: &str) -> XAttribute {
    XAttribute::new(XMLNS::prefixed(prefix), ns)
}

fn table_styles_xml() -> Result<Vec<u8>> {
    let mut doc = XmlDocument::new();
    doc.add_root(XmlNodeData::element_with_attrs(
        A::tblStyleLst(),
        vec![
            xmlns("a", A::NS),
            XAttribute::new(XName::local("def"), DEFAULT_TABLE_STYLE_ID),
        ],
    ));
    builder::serialize_bytes(&doc)
}

fn pres_props_xml() -> Result<Vec<u8>> {
    props_part(P::presentationPr())
}

fn view_props_xml() -> Result<Vec<u8>> {
    props_part(P::viewPr())
}

fn props_part(root_name: XName) -> Result<Vec<u8>> {
    let mut doc = XmlDocument::new();
    doc.add_root(XmlNodeData::element_with_attrs(
        root_name,
        vec![xmlns("a", A::NS), xmlns("r", R::NS), xmlns("p", P::NS)],
    ));
    builder::serialize_bytes(&doc)
}

fn core_properties_xml() -> Result<Vec<u8>> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut doc = XmlDocument::new();
    let root = doc.add_root(XmlNodeData::element_with_attrs(
        CP::coreProperties(),
        vec![
            xmlns("cp", CP::NS),
            xmlns("dc", DC::NS),
            xmlns("dcterms", DCTERMS::NS),
            xmlns("dcmitype", "http://purl.org/dc/dcmitype/"),
            xmlns("xsi", XSI::NS),
        ],
    ));

    let title = doc.add_child(root, XmlNodeData::element(DC::title()));
    doc.set_text(title, "Presentation");
    let creator = doc.add_child(root, XmlNodeData::element(DC::creator()));
    doc.set_text(creator, "deckgraft");
    let modified_by = doc.add_child(root, XmlNodeData::element(CP::lastModifiedBy()));
    doc.set_text(modified_by, "deckgraft");
    let revision = doc.add_child(root, XmlNodeData::element(CP::revision()));
    doc.set_text(revision, "1");

    for name in [DCTERMS::created(), DCTERMS::modified()] {
        let node = doc.add_child(
            root,
            XmlNodeData::element_with_attrs(
                name,
                vec![XAttribute::new(XSI::type_(), "dcterms:W3CDTF")],
            ),
        );
        doc.set_text(node, &now);
    }

    builder::serialize_bytes(&doc)
}
