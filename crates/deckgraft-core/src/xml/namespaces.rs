#![allow(non_snake_case)]

use super::xname::XName;

pub mod P {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";

    pub fn presentation() -> XName { XName::new(NS, "presentation") }
    pub fn sld() -> XName { XName::new(NS, "sld") }
    pub fn sldId() -> XName { XName::new(NS, "sldId") }
    pub fn sldIdLst() -> XName { XName::new(NS, "sldIdLst") }
    pub fn sldMasterIdLst() -> XName { XName::new(NS, "sldMasterIdLst") }
    pub fn notesMasterIdLst() -> XName { XName::new(NS, "notesMasterIdLst") }
    pub fn handoutMasterIdLst() -> XName { XName::new(NS, "handoutMasterIdLst") }
    pub fn sldSz() -> XName { XName::new(NS, "sldSz") }
    pub fn notesSz() -> XName { XName::new(NS, "notesSz") }
    pub fn cSld() -> XName { XName::new(NS, "cSld") }
    pub fn spTree() -> XName { XName::new(NS, "spTree") }
    pub fn sp() -> XName { XName::new(NS, "sp") }
    pub fn nvSpPr() -> XName { XName::new(NS, "nvSpPr") }
    pub fn nvPr() -> XName { XName::new(NS, "nvPr") }
    pub fn cNvPr() -> XName { XName::new(NS, "cNvPr") }
    pub fn ph() -> XName { XName::new(NS, "ph") }
    pub fn txBody() -> XName { XName::new(NS, "txBody") }
    pub fn graphicFrame() -> XName { XName::new(NS, "graphicFrame") }
    pub fn pic() -> XName { XName::new(NS, "pic") }
    pub fn nvPicPr() -> XName { XName::new(NS, "nvPicPr") }
    pub fn cNvPicPr() -> XName { XName::new(NS, "cNvPicPr") }
    pub fn spPr() -> XName { XName::new(NS, "spPr") }
    pub fn blipFill() -> XName { XName::new(NS, "blipFill") }
    pub fn presentationPr() -> XName { XName::new(NS, "presentationPr") }
    pub fn custShowLst() -> XName { XName::new(NS, "custShowLst") }
    pub fn viewPr() -> XName { XName::new(NS, "viewPr") }
}

/// PowerPoint 2010 extensions (section lists).
pub mod P14 {
    use super::XName;
    pub const NS: &str = "http://schemas.microsoft.com/office/powerpoint/2010/main";

    pub fn sectionLst() -> XName { XName::new(NS, "sectionLst") }
    pub fn sldId() -> XName { XName::new(NS, "sldId") }
}

pub mod A {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    pub fn tbl() -> XName { XName::new(NS, "tbl") }
    pub fn tblPr() -> XName { XName::new(NS, "tblPr") }
    pub fn tblGrid() -> XName { XName::new(NS, "tblGrid") }
    pub fn gridCol() -> XName { XName::new(NS, "gridCol") }
    pub fn tr() -> XName { XName::new(NS, "tr") }
    pub fn tc() -> XName { XName::new(NS, "tc") }
    pub fn tcPr() -> XName { XName::new(NS, "tcPr") }
    pub fn txBody() -> XName { XName::new(NS, "txBody") }
    pub fn bodyPr() -> XName { XName::new(NS, "bodyPr") }
    pub fn lstStyle() -> XName { XName::new(NS, "lstStyle") }
    pub fn p() -> XName { XName::new(NS, "p") }
    pub fn r() -> XName { XName::new(NS, "r") }
    pub fn rPr() -> XName { XName::new(NS, "rPr") }
    pub fn t() -> XName { XName::new(NS, "t") }
    pub fn endParaRPr() -> XName { XName::new(NS, "endParaRPr") }
    pub fn solidFill() -> XName { XName::new(NS, "solidFill") }
    pub fn srgbClr() -> XName { XName::new(NS, "srgbClr") }
    pub fn blip() -> XName { XName::new(NS, "blip") }
    pub fn stretch() -> XName { XName::new(NS, "stretch") }
    pub fn fillRect() -> XName { XName::new(NS, "fillRect") }
    pub fn picLocks() -> XName { XName::new(NS, "picLocks") }
    pub fn xfrm() -> XName { XName::new(NS, "xfrm") }
    pub fn prstGeom() -> XName { XName::new(NS, "prstGeom") }
    pub fn avLst() -> XName { XName::new(NS, "avLst") }
    pub fn tblStyleLst() -> XName { XName::new(NS, "tblStyleLst") }
    pub fn tableStyleId() -> XName { XName::new(NS, "tableStyleId") }
}

pub mod R {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    pub fn id() -> XName { XName::new(NS, "id") }
    pub fn embed() -> XName { XName::new(NS, "embed") }
    pub fn link() -> XName { XName::new(NS, "link") }
}

/// `[Content_Types].xml`
pub mod CT {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

    pub fn Types() -> XName { XName::new(NS, "Types") }
    pub fn Default() -> XName { XName::new(NS, "Default") }
    pub fn Override() -> XName { XName::new(NS, "Override") }
}

/// Package relationships (`*.rels`).
pub mod PR {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

    pub fn Relationships() -> XName { XName::new(NS, "Relationships") }
    pub fn Relationship() -> XName { XName::new(NS, "Relationship") }
}

pub mod CP {
    use super::XName;
    pub const NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";

    pub fn coreProperties() -> XName { XName::new(NS, "coreProperties") }
    pub fn lastModifiedBy() -> XName { XName::new(NS, "lastModifiedBy") }
    pub fn revision() -> XName { XName::new(NS, "revision") }
}

pub mod DC {
    use super::XName;
    pub const NS: &str = "http://purl.org/dc/elements/1.1/";

    pub fn title() -> XName { XName::new(NS, "title") }
    pub fn creator() -> XName { XName::new(NS, "creator") }
}

pub mod DCTERMS {
    use super::XName;
    pub const NS: &str = "http://purl.org/dc/terms/";

    pub fn created() -> XName { XName::new(NS, "created") }
    pub fn modified() -> XName { XName::new(NS, "modified") }
}

pub mod XSI {
    use super::XName;
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

    pub fn type_() -> XName { XName::new(NS, "type") }
}

pub mod XMLNS {
    use super::XName;
    pub const NS: &str = "http://www.w3.org/2000/xmlns/";

    pub fn prefixed(prefix: &str) -> XName { XName::new(NS, prefix) }
}
