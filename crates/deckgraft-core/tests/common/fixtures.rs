//! Presentations synthesized in memory: one master, one layout, one theme and
//! any number of slides with optional image, table and notes.

use deckgraft_core::Package;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const DOC_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfixture-image";

#[derive(Debug, Clone, Default)]
pub struct SlideSpec {
    shapes: String,
    image: Option<(String, Vec<u8>)>,
    notes: bool,
}

impl SlideSpec {
    pub fn titled(text: &str) -> Self {
        Self {
            shapes: text_shape(2, text),
            ..Self::default()
        }
    }

    /// A slide with the given `p:spTree` children.
    pub fn with_shapes(shapes: impl Into<String>) -> Self {
        Self {
            shapes: shapes.into(),
            ..Self::default()
        }
    }

    /// Adds a picture showing `ppt/media/{media_name}` through `rId2`.
    pub fn with_image(mut self, media_name: &str, bytes: &[u8]) -> Self {
        self.shapes.push_str(&picture_shape(10, "rId2"));
        self.image = Some((media_name.to_string(), bytes.to_vec()));
        self
    }

    pub fn with_notes(mut self) -> Self {
        self.notes = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeckFixture {
    slides: Vec<SlideSpec>,
}

impl DeckFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` slides titled "Slide 1".."Slide {count}".
    pub fn titled(count: usize) -> Self {
        (1..=count).fold(Self::new(), |deck, n| {
            deck.slide(SlideSpec::titled(&format!("Slide {}", n)))
        })
    }

    pub fn slide(mut self, slide: SlideSpec) -> Self {
        self.slides.push(slide);
        self
    }

    pub fn package(&self) -> Package {
        Package::from_bytes(&self.zip_bytes()).unwrap()
    }

    pub fn zip_bytes(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in self.parts() {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(&bytes).unwrap();
        }
        zip.finish().unwrap();
        buffer.into_inner()
    }

    fn parts(&self) -> Vec<(String, Vec<u8>)> {
        let count = self.slides.len();
        let mut parts = vec![
            ("[Content_Types].xml".to_string(), self.content_types()),
            (
                "_rels/.rels".to_string(),
                rels(&[("rId1", "officeDocument", "ppt/presentation.xml")]),
            ),
            ("ppt/presentation.xml".to_string(), self.presentation()),
        ];

        let mut presentation_rels = vec![(
            "rId1".to_string(),
            "slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        for n in 1..=count {
            presentation_rels.push((format!("rId{}", n + 1), "slide", format!("slides/slide{}.xml", n)));
        }
        presentation_rels.push((
            format!("rId{}", count + 2),
            "theme",
            "theme/theme1.xml".to_string(),
        ));
        let borrowed: Vec<(&str, &str, &str)> = presentation_rels
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
            .collect();
        parts.push(("ppt/_rels/presentation.xml.rels".to_string(), rels(&borrowed)));

        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            parts.push((format!("ppt/slides/slide{}.xml", n), slide_xml(&slide.shapes)));

            let mut slide_rels = vec![(
                "rId1".to_string(),
                "slideLayout",
                "../slideLayouts/slideLayout1.xml".to_string(),
            )];
            if let Some((media, _)) = &slide.image {
                slide_rels.push(("rId2".to_string(), "image", format!("../media/{}", media)));
            }
            if slide.notes {
                slide_rels.push((
                    "rId3".to_string(),
                    "notesSlide",
                    format!("../notesSlides/notesSlide{}.xml", n),
                ));
            }
            let borrowed: Vec<(&str, &str, &str)> = slide_rels
                .iter()
                .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
                .collect();
            parts.push((format!("ppt/slides/_rels/slide{}.xml.rels", n), rels(&borrowed)));

            if let Some((media, bytes)) = &slide.image {
                let name = format!("ppt/media/{}", media);
                if !parts.iter().any(|(existing, _)| *existing == name) {
                    parts.push((name, bytes.clone()));
                }
            }
            if slide.notes {
                parts.push((
                    format!("ppt/notesSlides/notesSlide{}.xml", n),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notes {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld></p:notes>"#,
                        NS,
                        GROUP_PROPS,
                        text_shape(2, "Speaker notes")
                    )
                    .into_bytes(),
                ));
                let target = format!("../slides/slide{}.xml", n);
                parts.push((
                    format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", n),
                    rels(&[("rId1", "slide", target.as_str())]),
                ));
            }
        }

        parts.push((
            "ppt/slideLayouts/slideLayout1.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout {}><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld></p:sldLayout>"#,
                NS, GROUP_PROPS
            )
            .into_bytes(),
        ));
        parts.push((
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        ));
        parts.push((
            "ppt/slideMasters/slideMaster1.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster {}><p:cSld><p:spTree>{}</p:spTree></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
                NS, GROUP_PROPS
            )
            .into_bytes(),
        ));
        parts.push((
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        ));
        parts.push((
            "ppt/theme/theme1.xml".to_string(),
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Fixture"><a:themeElements/></a:theme>"#.to_vec(),
        ));
        parts
    }

    fn presentation(&self) -> Vec<u8> {
        let ids: String = (0..self.slides.len())
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            NS, ids
        )
        .into_bytes()
    }

    fn content_types(&self) -> Vec<u8> {
        let mut defaults = vec![
            ("rels", "application/vnd.openxmlformats-package.relationships+xml"),
            ("xml", "application/xml"),
        ];
        for (media, _) in self.slides.iter().filter_map(|s| s.image.as_ref()) {
            if media.ends_with(".png") && !defaults.iter().any(|(e, _)| *e == "png") {
                defaults.push(("png", "image/png"));
            }
            if media.ends_with(".jpeg") && !defaults.iter().any(|(e, _)| *e == "jpeg") {
                defaults.push(("jpeg", "image/jpeg"));
            }
        }

        let mut overrides = vec![
            (
                "/ppt/presentation.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
            ),
            (
                "/ppt/slideMasters/slideMaster1.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml",
            ),
            (
                "/ppt/slideLayouts/slideLayout1.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml",
            ),
            (
                "/ppt/theme/theme1.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.theme+xml",
            ),
        ];
        for (i, slide) in self.slides.iter().enumerate() {
            overrides.push((
                format!("/ppt/slides/slide{}.xml", i + 1),
                "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
            ));
            if slide.notes {
                overrides.push((
                    format!("/ppt/notesSlides/notesSlide{}.xml", i + 1),
                    "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml",
                ));
            }
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        for (ext, content_type) in defaults {
            xml.push_str(&format!(r#"<Default Extension="{}" ContentType="{}"/>"#, ext, content_type));
        }
        for (part, content_type) in overrides {
            xml.push_str(&format!(r#"<Override PartName="{}" ContentType="{}"/>"#, part, content_type));
        }
        xml.push_str("</Types>");
        xml.into_bytes()
    }
}

const GROUP_PROPS: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

fn rels(entries: &[(&str, &str, &str)]) -> Vec<u8> {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="{}">"#,
        REL_NS
    );
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, DOC_REL, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml.into_bytes()
}

fn slide_xml(shapes: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        NS, GROUP_PROPS, shapes
    )
    .into_bytes()
}

/// A text box holding one paragraph per line of `text`.
pub fn text_shape(id: u32, text: &str) -> String {
    let paragraphs: String = text
        .split('\n')
        .map(|line| format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", line))
        .collect();
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Text {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="{y}"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
        id = id,
        y = 274638 + id * 10,
        paragraphs = paragraphs
    )
}

pub fn picture_shape(id: u32, rid: &str) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Picture {id}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="914400" cy="914400"/></a:xfrm></p:spPr></p:pic>"#,
        id = id,
        rid = rid
    )
}

/// A table frame of `columns` x `rows` cells; row 0 reads `H1..`, the rest
/// are empty.
pub fn table_frame(id: u32, columns: usize, rows: usize) -> String {
    let grid: String = (0..columns)
        .map(|_| r#"<a:gridCol w="1000000"/>"#)
        .collect();
    let body: String = (0..rows)
        .map(|r| {
            let cells: String = (0..columns)
                .map(|c| {
                    let text = if r == 0 { format!("H{}", c + 1) } else { String::new() };
                    format!(
                        r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" sz="1000"/><a:t>{}</a:t></a:r></a:p></a:txBody><a:tcPr/></a:tc>"#,
                        text
                    )
                })
                .collect();
            format!(r#"<a:tr h="370840">{}</a:tr>"#, cells)
        })
        .collect();
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="Table {id}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="457200" y="1600200"/><a:ext cx="{cx}" cy="{cy}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>{grid}</a:tblGrid>{body}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
        id = id,
        cx = columns as u64 * 1_000_000,
        cy = rows as u64 * 370_840,
        grid = grid,
        body = body
    )
}
