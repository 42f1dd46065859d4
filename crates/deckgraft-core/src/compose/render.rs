use super::{SlideContent, TableContent};
use crate::error::{DeckError, Result};
use crate::hash::content_addressed_name;
use crate::package::content_types::mime_for_extension;
use crate::package::parts::{relative_target, MEDIA_DIR};
use crate::package::relationships::relationship_types;
use crate::package::{ContentTypeRegistry, Package, RelationshipTable};
use crate::pml::PresentationDocument;
use crate::table::grid::{set_cell_text, set_paragraph_text};
use crate::table::{restructure, TableGrid};
use crate::util::{make_valid_xml, substitute_placeholders};
use crate::xml::{XName, XmlDocument, XmlNodeData, A, P, R};
use indextree::NodeId;
use std::path::Path;
use tracing::{debug, warn};

/// Slides carry at most this many images.
pub const MAX_IMAGES: usize = 2;

/// Writes a slide's content into one slide of a working copy of the template
/// before that slide is grafted.
pub trait ContentRenderer {
    fn render(&self, package: &mut Package, slide_index: usize, content: &SlideContent)
        -> Result<()>;
}

impl<R: ContentRenderer + ?Sized> ContentRenderer for &R {
    fn render(
        &self,
        package: &mut Package,
        slide_index: usize,
        content: &SlideContent,
    ) -> Result<()> {
        (**self).render(package, slide_index, content)
    }
}

/// Fills `{title}`, `{slide_title}`, `{subtitle}` and `{content}` tokens,
/// the first table and the image placeholders of a template slide.
#[derive(Debug, Clone)]
pub struct PlaceholderRenderer {
    restructure_tables: bool,
}

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self {
            restructure_tables: true,
        }
    }

    pub fn restructure_tables(mut self, enabled: bool) -> Self {
        self.restructure_tables = enabled;
        self
    }
}

impl Default for PlaceholderRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentRenderer for PlaceholderRenderer {
    fn render(
        &self,
        package: &mut Package,
        slide_index: usize,
        content: &SlideContent,
    ) -> Result<()> {
        let slide_part = PresentationDocument::load(package)?.slide_part(slide_index)?;
        let mut doc = package.read_xml(&slide_part)?;
        let mut rels = package.relationships(&slide_part)?;
        let mut content_types = package.content_types()?;

        let mut media = MediaTarget {
            package: &mut *package,
            rels: &mut rels,
            content_types: &mut content_types,
            slide_part: &slide_part,
        };
        for (ordinal, path) in content.image_paths.iter().take(MAX_IMAGES).enumerate() {
            media.place_image(&mut doc, path, ordinal + 1)?;
        }

        if let Some(table) = &content.table {
            fill_first_table(&mut doc, table, self.restructure_tables)?;
        }

        let values = placeholder_values(content);
        let pairs: Vec<(&str, &str)> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();
        replace_text(&mut doc, &pairs);

        package.write_xml(&slide_part, &doc)?;
        package.write_relationships(&slide_part, &rels)?;
        package.write_content_types(&content_types)?;
        debug!(slide = %slide_part, title = %content.title, "rendered slide content");
        Ok(())
    }
}

fn placeholder_values(content: &SlideContent) -> Vec<(&'static str, String)> {
    let subtitle = content.subtitle.clone().unwrap_or_default();
    let body = content.body_text.clone().unwrap_or_default();
    vec![
        ("title", content.title.clone()),
        ("slide_title", content.title.clone()),
        ("subtitle", subtitle),
        ("content", body.clone()),
        ("body", body),
    ]
}

/// Substitutes tokens run by run, splits multi-line results into one
/// paragraph per line and drops paragraphs the substitution left blank.
fn replace_text(doc: &mut XmlDocument, values: &[(&str, &str)]) {
    let Some(root) = doc.root() else {
        return;
    };
    let texts: Vec<NodeId> = doc.descendants_named(root, &A::t()).collect();

    let mut touched: Vec<NodeId> = Vec::new();
    for t in texts {
        let before = doc.text_content(t);
        if !before.contains('{') {
            continue;
        }
        let after = substitute_placeholders(&before, values);
        if after == before {
            continue;
        }
        doc.set_text(t, &make_valid_xml(&after));
        if let Some(p) = doc.ancestors(t).find(|&a| doc.is_named(a, &A::p())) {
            if !touched.contains(&p) {
                touched.push(p);
            }
        }
    }

    let mut paragraphs = Vec::new();
    for p in touched {
        paragraphs.extend(split_lines(doc, p));
    }
    for p in paragraphs {
        let text = paragraph_text(doc, p);
        let blank = matches!(text.trim(), "" | "•" | "●" | "-");
        let has_siblings = doc
            .parent(p)
            .is_some_and(|body| doc.elements_by_name(body, &A::p()).count() > 1);
        if blank && has_siblings {
            doc.remove(p);
        }
    }
}

fn paragraph_text(doc: &XmlDocument, p: NodeId) -> String {
    doc.descendants_named(p, &A::t())
        .map(|t| doc.text_content(t))
        .collect()
}

/// Returns the paragraphs that now hold the lines of `p`.
fn split_lines(doc: &mut XmlDocument, p: NodeId) -> Vec<NodeId> {
    let text = paragraph_text(doc, p);
    if !text.contains('\n') {
        return vec![p];
    }

    let mut lines = text.split('\n');
    set_paragraph_text(doc, p, lines.next().unwrap_or(""));
    let mut result = vec![p];
    for line in lines {
        let Some(&last) = result.last() else {
            break;
        };
        if let Some(copy) = doc.clone_after(last) {
            set_paragraph_text(doc, copy, line);
            result.push(copy);
        }
    }
    result
}

/// Fills the first `a:tbl` of the slide with `table`, reshaping it to the
/// header width and row count by cloning the last template column and row.
fn fill_first_table(doc: &mut XmlDocument, table: &TableContent, restructure_tables: bool) -> Result<bool> {
    let Some(tbl) = doc.root().and_then(|root| doc.find_descendant(root, &A::tbl())) else {
        warn!("slide has no table to fill");
        return Ok(false);
    };
    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return Ok(false);
    }

    resize_columns(doc, tbl, columns)?;
    resize_rows(doc, tbl, table.rows.len() + 1)?;

    let rows: Vec<NodeId> = doc.elements_by_name(tbl, &A::tr()).collect();
    for (r, tr) in rows.into_iter().enumerate() {
        let cells: Vec<NodeId> = doc.elements_by_name(tr, &A::tc()).collect();
        for (c, tc) in cells.into_iter().enumerate() {
            for attr in ["rowSpan", "gridSpan", "vMerge", "hMerge"] {
                doc.remove_attribute(tc, &XName::local(attr));
            }
            let text = match r {
                0 => table.headers.get(c),
                _ => table.rows.get(r - 1).and_then(|row| row.get(c)),
            };
            set_cell_text(doc, tc, text.map_or("", String::as_str));
        }
    }

    if restructure_tables {
        let mut grid = TableGrid::from_table(doc, tbl)?;
        let headers: Vec<&str> = table.headers.iter().map(String::as_str).collect();
        let summary = restructure(&mut grid, &headers);
        grid.flush(doc, tbl)?;
        debug!(shape = ?summary.shape, merges = summary.merges.len(), "filled table");
    }
    Ok(true)
}

fn resize_rows(doc: &mut XmlDocument, tbl: NodeId, wanted: usize) -> Result<()> {
    let mut rows: Vec<NodeId> = doc.elements_by_name(tbl, &A::tr()).collect();
    let Some(&template_row) = rows.last() else {
        return Err(DeckError::malformed("table has no rows"));
    };
    while rows.len() < wanted {
        let Some(copy) = doc.clone_after(*rows.last().unwrap_or(&template_row)) else {
            break;
        };
        rows.push(copy);
    }
    while rows.len() > wanted.max(1) {
        if let Some(extra) = rows.pop() {
            doc.remove(extra);
        }
    }
    Ok(())
}

fn resize_columns(doc: &mut XmlDocument, tbl: NodeId, wanted: usize) -> Result<()> {
    let grid = doc
        .find_child(tbl, &A::tblGrid())
        .ok_or_else(|| DeckError::malformed("a:tbl without a:tblGrid"))?;
    let cols: Vec<NodeId> = doc.elements_by_name(grid, &A::gridCol()).collect();
    if cols.is_empty() {
        return Err(DeckError::malformed("table has no grid columns"));
    }
    if cols.len() == wanted {
        return Ok(());
    }

    let width_attr = XName::local("w");
    let total: i64 = cols
        .iter()
        .filter_map(|&c| doc.attribute(c, &width_attr)?.parse::<i64>().ok())
        .sum();

    adjust_children(doc, grid, &A::gridCol(), wanted);
    let rows: Vec<NodeId> = doc.elements_by_name(tbl, &A::tr()).collect();
    for tr in rows {
        adjust_children(doc, tr, &A::tc(), wanted);
    }

    let cols: Vec<NodeId> = doc.elements_by_name(grid, &A::gridCol()).collect();
    let each = total / wanted as i64;
    for (i, col) in cols.iter().enumerate() {
        let width = if i + 1 == cols.len() {
            total - each * (wanted as i64 - 1)
        } else {
            each
        };
        doc.set_attribute(*col, &width_attr, &width.to_string());
    }
    Ok(())
}

/// Clones or drops trailing `name` children of `parent` until there are `wanted`.
fn adjust_children(doc: &mut XmlDocument, parent: NodeId, name: &XName, wanted: usize) {
    let mut children: Vec<NodeId> = doc.elements_by_name(parent, name).collect();
    while !children.is_empty() && children.len() < wanted {
        let Some(copy) = children.last().and_then(|&last| doc.clone_after(last)) else {
            break;
        };
        children.push(copy);
    }
    while children.len() > wanted.max(1) {
        if let Some(extra) = children.pop() {
            doc.remove(extra);
        }
    }
}

enum ImageAnchor {
    /// A text shape carrying an `{image}` token, replaced by a picture.
    Placeholder(NodeId),
    /// An existing picture whose image is swapped.
    Picture(NodeId),
}

struct MediaTarget<'a> {
    package: &'a mut Package,
    rels: &'a mut RelationshipTable,
    content_types: &'a mut ContentTypeRegistry,
    slide_part: &'a str,
}

impl MediaTarget<'_> {
    fn place_image(&mut self, doc: &mut XmlDocument, path: &Path, ordinal: usize) -> Result<bool> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let Some(mime) = mime_for_extension(&ext) else {
            warn!(path = %path.display(), "unsupported image type; skipping");
            return Ok(false);
        };
        let Some(anchor) = image_anchor(doc, ordinal) else {
            warn!(ordinal, "slide has no image placeholder; skipping");
            return Ok(false);
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), %err, "image not readable; skipping");
                return Ok(false);
            }
        };

        let part = format!("{}{}", MEDIA_DIR, content_addressed_name("img", &bytes, &ext));
        if !self.package.contains(&part) {
            self.package.write(&part, bytes)?;
        }
        if self.content_types.resolve(&part).is_none() {
            self.content_types.add_default(&ext, mime);
        }
        let rid = self
            .rels
            .allocate(relationship_types::IMAGE, &relative_target(self.slide_part, &part));

        match anchor {
            ImageAnchor::Picture(pic) => {
                if let Some(blip) = doc.find_descendant(pic, &A::blip()) {
                    doc.set_attribute(blip, &R::embed(), &rid);
                }
            }
            ImageAnchor::Placeholder(sp) => replace_with_picture(doc, sp, &rid),
        }
        debug!(part = %part, rid = %rid, "placed image");
        Ok(true)
    }
}

fn image_anchor(doc: &XmlDocument, ordinal: usize) -> Option<ImageAnchor> {
    let root = doc.root()?;
    let tokens: &[&str] = match ordinal {
        1 => &["{image}", "{image1}"],
        _ => &["{image2}"],
    };

    let placeholder = doc.descendants_named(root, &P::sp()).find(|&sp| {
        let text = paragraph_text(doc, sp);
        tokens.iter().any(|token| text.contains(token))
    });
    if let Some(sp) = placeholder {
        return Some(ImageAnchor::Placeholder(sp));
    }

    doc.descendants_named(root, &P::pic())
        .nth(ordinal - 1)
        .map(ImageAnchor::Picture)
}

fn next_shape_id(doc: &XmlDocument) -> u32 {
    let Some(root) = doc.root() else {
        return 1;
    };
    doc.descendants_named(root, &P::cNvPr())
        .filter_map(|n| doc.attribute(n, &XName::local("id"))?.parse::<u32>().ok())
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Puts a `p:pic` showing `rid` where `sp` was, keeping its geometry.
fn replace_with_picture(doc: &mut XmlDocument, sp: NodeId, rid: &str) {
    let id = next_shape_id(doc);
    let pic = doc.add_after(sp, XmlNodeData::element(P::pic()));

    let nv = doc.add_child(pic, XmlNodeData::element(P::nvPicPr()));
    let c_nv_pr = doc.add_child(nv, XmlNodeData::element(P::cNvPr()));
    doc.set_attribute(c_nv_pr, &XName::local("id"), &id.to_string());
    doc.set_attribute(c_nv_pr, &XName::local("name"), &format!("Picture {}", id));
    let c_nv_pic_pr = doc.add_child(nv, XmlNodeData::element(P::cNvPicPr()));
    let locks = doc.add_child(c_nv_pic_pr, XmlNodeData::element(A::picLocks()));
    doc.set_attribute(locks, &XName::local("noChangeAspect"), "1");
    doc.add_child(nv, XmlNodeData::element(P::nvPr()));

    let fill = doc.add_child(pic, XmlNodeData::element(P::blipFill()));
    let blip = doc.add_child(fill, XmlNodeData::element(A::blip()));
    doc.set_attribute(blip, &R::embed(), rid);
    let stretch = doc.add_child(fill, XmlNodeData::element(A::stretch()));
    doc.add_child(stretch, XmlNodeData::element(A::fillRect()));

    let copied = doc
        .find_child(sp, &P::spPr())
        .and_then(|sp_pr| doc.copy_into(sp_pr, pic));
    if copied.is_none() {
        let sp_pr = doc.add_child(pic, XmlNodeData::element(P::spPr()));
        let geom = doc.add_child(sp_pr, XmlNodeData::element(A::prstGeom()));
        doc.set_attribute(geom, &XName::local("prst"), "rect");
        doc.add_child(geom, XmlNodeData::element(A::avLst()));
    }

    doc.remove(sp);
}
