use crate::error::{DeckError, Result};
use crate::xml::{XName, XmlDocument, XmlNodeData, A};
use indextree::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    /// Paragraph texts joined with `\n`.
    pub text: String,
    pub row_span: usize,
    pub grid_span: usize,
    /// Covered by a vertical merge from above.
    pub v_merge: bool,
    /// Covered by a horizontal merge from the left.
    pub h_merge: bool,
    /// `RRGGBB` solid fill.
    pub fill: Option<String>,
}

impl TableCell {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            row_span: 1,
            grid_span: 1,
            v_merge: false,
            h_merge: false,
            fill: None,
        }
    }

    pub fn is_covered(&self) -> bool {
        self.v_merge || self.h_merge
    }

    pub fn is_merge_origin(&self) -> bool {
        self.row_span > 1 || self.grid_span > 1
    }

    /// Neither covered nor spanning.
    pub fn is_plain(&self) -> bool {
        !self.is_covered() && !self.is_merge_origin()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    pub height: Option<i64>,
}

/// Structural view of one DrawingML `a:tbl`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableGrid {
    pub rows: Vec<TableRow>,
    pub column_widths: Vec<i64>,
}

impl TableGrid {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.rows.get(row)?.cells.get(column)
    }

    pub fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut TableCell> {
        self.rows.get_mut(row)?.cells.get_mut(column)
    }

    pub fn text(&self, row: usize, column: usize) -> &str {
        self.cell(row, column).map(|c| c.text.as_str()).unwrap_or("")
    }

    pub fn set_text(&mut self, row: usize, column: usize, text: &str) {
        if let Some(cell) = self.cell_mut(row, column) {
            cell.text = text.to_string();
        }
    }

    pub fn set_fill(&mut self, row: usize, column: usize, color: &str) {
        if let Some(cell) = self.cell_mut(row, column) {
            cell.fill = Some(color.to_string());
        }
    }

    pub fn fill_row(&mut self, row: usize, color: &str) {
        if let Some(r) = self.rows.get_mut(row) {
            for cell in &mut r.cells {
                cell.fill = Some(color.to_string());
            }
        }
    }

    pub fn total_width(&self) -> i64 {
        self.column_widths.iter().sum()
    }

    /// Reads the grid of `tbl`. Every row must have one `a:tc` per grid column.
    pub fn from_table(doc: &XmlDocument, tbl: NodeId) -> Result<Self> {
        let grid = doc
            .find_child(tbl, &A::tblGrid())
            .ok_or_else(|| DeckError::malformed("a:tbl without a:tblGrid"))?;
        let column_widths = doc
            .elements_by_name(grid, &A::gridCol())
            .map(|col| int_attr(doc, col, "w").unwrap_or(0))
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for (index, tr) in doc.elements_by_name(tbl, &A::tr()).enumerate() {
            let cells: Vec<TableCell> = doc
                .elements_by_name(tr, &A::tc())
                .map(|tc| read_cell(doc, tc))
                .collect();
            if cells.len() != column_widths.len() {
                return Err(DeckError::malformed(format!(
                    "table row {} has {} cells but the grid has {} columns",
                    index,
                    cells.len(),
                    column_widths.len()
                )));
            }
            rows.push(TableRow {
                cells,
                height: int_attr(doc, tr, "h"),
            });
        }

        Ok(Self {
            rows,
            column_widths,
        })
    }

    /// Writes widths, heights, spans, fills and changed texts back into `tbl`.
    /// The XML table must still have the shape it was read with.
    pub fn flush(&self, doc: &mut XmlDocument, tbl: NodeId) -> Result<()> {
        let grid = doc
            .find_child(tbl, &A::tblGrid())
            .ok_or_else(|| DeckError::malformed("a:tbl without a:tblGrid"))?;
        let cols: Vec<NodeId> = doc.elements_by_name(grid, &A::gridCol()).collect();
        let trs: Vec<NodeId> = doc.elements_by_name(tbl, &A::tr()).collect();
        if cols.len() != self.column_widths.len() || trs.len() != self.rows.len() {
            return Err(DeckError::malformed(
                "table changed shape between read and flush",
            ));
        }

        for (col, width) in cols.into_iter().zip(&self.column_widths) {
            doc.set_attribute(col, &XName::local("w"), &width.to_string());
        }

        for (tr, row) in trs.into_iter().zip(&self.rows) {
            if let Some(height) = row.height {
                doc.set_attribute(tr, &XName::local("h"), &height.to_string());
            }
            let tcs: Vec<NodeId> = doc.elements_by_name(tr, &A::tc()).collect();
            if tcs.len() != row.cells.len() {
                return Err(DeckError::malformed(
                    "table changed shape between read and flush",
                ));
            }
            for (tc, cell) in tcs.into_iter().zip(&row.cells) {
                write_cell(doc, tc, cell);
            }
        }

        Ok(())
    }
}

fn int_attr(doc: &XmlDocument, node: NodeId, name: &str) -> Option<i64> {
    doc.attribute(node, &XName::local(name))?.parse().ok()
}

fn flag_attr(doc: &XmlDocument, node: NodeId, name: &str) -> bool {
    matches!(
        doc.attribute(node, &XName::local(name)),
        Some("1") | Some("true")
    )
}

fn read_cell(doc: &XmlDocument, tc: NodeId) -> TableCell {
    let fill = doc
        .find_child(tc, &A::tcPr())
        .and_then(|pr| doc.find_child(pr, &A::solidFill()))
        .and_then(|fill| doc.find_child(fill, &A::srgbClr()))
        .and_then(|clr| doc.attribute(clr, &XName::local("val")))
        .map(str::to_string);

    TableCell {
        text: cell_text(doc, tc),
        row_span: int_attr(doc, tc, "rowSpan").map_or(1, |v| v.max(1) as usize),
        grid_span: int_attr(doc, tc, "gridSpan").map_or(1, |v| v.max(1) as usize),
        v_merge: flag_attr(doc, tc, "vMerge"),
        h_merge: flag_attr(doc, tc, "hMerge"),
        fill,
    }
}

pub(crate) fn cell_text(doc: &XmlDocument, tc: NodeId) -> String {
    let Some(body) = doc.find_child(tc, &A::txBody()) else {
        return String::new();
    };
    doc.elements_by_name(body, &A::p())
        .map(|p| {
            doc.descendants_named(p, &A::t())
                .map(|t| doc.text_content(t))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_cell(doc: &mut XmlDocument, tc: NodeId, cell: &TableCell) {
    let span_attrs = [
        ("rowSpan", (cell.row_span > 1).then(|| cell.row_span.to_string())),
        ("gridSpan", (cell.grid_span > 1).then(|| cell.grid_span.to_string())),
        ("vMerge", cell.v_merge.then(|| "1".to_string())),
        ("hMerge", cell.h_merge.then(|| "1".to_string())),
    ];
    for (name, value) in span_attrs {
        match value {
            Some(value) => doc.set_attribute(tc, &XName::local(name), &value),
            None => doc.remove_attribute(tc, &XName::local(name)),
        }
    }

    if cell_text(doc, tc) != cell.text {
        set_cell_text(doc, tc, &cell.text);
    }
    if let Some(color) = &cell.fill {
        set_cell_fill(doc, tc, color);
    }
}

/// Replaces the text of a cell, one paragraph per line, keeping the run
/// properties of the first run.
pub(crate) fn set_cell_text(doc: &mut XmlDocument, tc: NodeId, text: &str) {
    let body = match doc.find_child(tc, &A::txBody()) {
        Some(body) => body,
        None => {
            let first = doc.element_children(tc).next();
            let body = match first {
                Some(first) => doc.add_before(first, XmlNodeData::element(A::txBody())),
                None => doc.add_child(tc, XmlNodeData::element(A::txBody())),
            };
            doc.add_child(body, XmlNodeData::element(A::bodyPr()));
            doc.add_child(body, XmlNodeData::element(A::lstStyle()));
            body
        }
    };

    let mut paragraphs: Vec<NodeId> = doc.elements_by_name(body, &A::p()).collect();
    let first = if paragraphs.is_empty() {
        doc.add_child(body, XmlNodeData::element(A::p()))
    } else {
        paragraphs.remove(0)
    };
    for extra in paragraphs {
        doc.remove(extra);
    }

    let mut lines = text.split('\n');
    set_paragraph_text(doc, first, lines.next().unwrap_or(""));

    let mut last = first;
    for line in lines {
        if let Some(copy) = doc.clone_after(last) {
            set_paragraph_text(doc, copy, line);
            last = copy;
        }
    }
}

pub(crate) fn set_paragraph_text(doc: &mut XmlDocument, p: NodeId, text: &str) {
    let runs: Vec<NodeId> = doc
        .element_children(p)
        .filter(|&n| {
            doc.name(n)
                .is_some_and(|name| matches!(name.local_name.as_str(), "r" | "br" | "fld"))
        })
        .collect();

    let run = match runs.iter().copied().find(|&r| doc.is_named(r, &A::r())) {
        Some(run) => run,
        None => {
            let run = match doc.find_child(p, &A::endParaRPr()) {
                Some(end) => doc.add_before(end, XmlNodeData::element(A::r())),
                None => doc.add_child(p, XmlNodeData::element(A::r())),
            };
            doc.add_child(run, XmlNodeData::element(A::t()));
            run
        }
    };
    for other in runs.into_iter().filter(|&r| r != run) {
        doc.remove(other);
    }

    let t = match doc.find_child(run, &A::t()) {
        Some(t) => t,
        None => doc.add_child(run, XmlNodeData::element(A::t())),
    };
    doc.set_text(t, &crate::util::make_valid_xml(text));
}

/// Fill goes before `a:headers`/`a:extLst`, which close the `a:tcPr` sequence.
pub(crate) fn set_cell_fill(doc: &mut XmlDocument, tc: NodeId, color: &str) {
    let pr = match doc.find_child(tc, &A::tcPr()) {
        Some(pr) => pr,
        None => doc.add_child(tc, XmlNodeData::element(A::tcPr())),
    };

    let fills: Vec<NodeId> = doc
        .element_children(pr)
        .filter(|&n| {
            doc.name(n).is_some_and(|name| {
                name.namespace.as_deref() == Some(A::NS)
                    && matches!(
                        name.local_name.as_str(),
                        "noFill" | "solidFill" | "gradFill" | "blipFill" | "pattFill" | "grpFill"
                    )
            })
        })
        .collect();
    for fill in fills {
        doc.remove(fill);
    }

    let trailing = doc.element_children(pr).find(|&n| {
        doc.name(n)
            .is_some_and(|name| matches!(name.local_name.as_str(), "headers" | "extLst"))
    });
    let solid = match trailing {
        Some(anchor) => doc.add_before(anchor, XmlNodeData::element(A::solidFill())),
        None => doc.add_child(pr, XmlNodeData::element(A::solidFill())),
    };
    let clr = doc.add_child(solid, XmlNodeData::element(A::srgbClr()));
    doc.set_attribute(clr, &XName::local("val"), color);
}
