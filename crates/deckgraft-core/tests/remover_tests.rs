mod common;

use common::{assert_valid, part_text, slide_ids, slide_parts, DeckFixture, SlideSpec};
use deckgraft_core::{prune_to, remove_range, remove_slides, remove_slides_strict, DeckError};
use pretty_assertions::assert_eq;

#[test]
fn survivors_keep_order_and_ids() {
    let mut package = DeckFixture::titled(5).package();

    let report = remove_slides(&mut package, [1, 2, 3]).unwrap();

    assert_eq!(report.removed, vec![1, 2, 3]);
    assert!(report.ignored.is_empty());
    assert_eq!(slide_ids(&package), vec![256, 260]);
    assert_eq!(
        slide_parts(&package),
        vec!["ppt/slides/slide1.xml", "ppt/slides/slide5.xml"]
    );
    assert!(!package.contains("ppt/slides/slide2.xml"));
    assert!(!package.contains("ppt/slides/_rels/slide3.xml.rels"));
    assert_valid(&package);
}

#[test]
fn surviving_relationship_ids_are_not_renumbered() {
    let mut package = DeckFixture::titled(4).package();

    remove_slides(&mut package, [0]).unwrap();

    let rels = package.relationships("ppt/presentation.xml").unwrap();
    assert!(rels.get("rId2").is_none());
    assert_eq!(rels.get("rId5").map(|r| r.target.as_str()), Some("slides/slide4.xml"));
}

#[test]
fn overrides_of_deleted_parts_are_dropped() {
    let mut package = DeckFixture::titled(3).package();

    remove_slides(&mut package, [2]).unwrap();

    let types = part_text(&package, "[Content_Types].xml");
    assert!(!types.contains("/ppt/slides/slide3.xml"));
    assert!(types.contains("/ppt/slides/slide2.xml"));
}

#[test]
fn out_of_range_positions_are_ignored() {
    let mut package = DeckFixture::titled(3).package();

    let report = remove_slides(&mut package, [1, 7, 9]).unwrap();

    assert_eq!(report.removed, vec![1]);
    assert_eq!(report.ignored, vec![7, 9]);
    assert_eq!(slide_ids(&package).len(), 2);
}

#[test]
fn only_out_of_range_positions_change_nothing() {
    let mut package = DeckFixture::titled(2).package();
    let before = part_text(&package, "ppt/presentation.xml");

    let report = remove_slides(&mut package, [5]).unwrap();

    assert!(report.removed.is_empty());
    assert_eq!(part_text(&package, "ppt/presentation.xml"), before);
}

#[test]
fn strict_removal_rejects_before_mutating() {
    let mut package = DeckFixture::titled(3).package();

    let err = remove_slides_strict(&mut package, [0, 3]).unwrap_err();

    match err {
        DeckError::OutOfRangeRemoval { indices, slide_count } => {
            assert_eq!(indices, vec![3]);
            assert_eq!(slide_count, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(slide_ids(&package), vec![256, 257, 258]);
}

#[test]
fn notes_of_removed_slides_are_deleted() {
    let mut package = DeckFixture::new()
        .slide(SlideSpec::titled("Keep"))
        .slide(SlideSpec::titled("Drop").with_notes())
        .package();

    let report = remove_slides(&mut package, [1]).unwrap();

    assert!(report
        .deleted_parts
        .contains(&"ppt/notesSlides/notesSlide2.xml".to_string()));
    assert!(!package.contains("ppt/notesSlides/_rels/notesSlide2.xml.rels"));
    assert_valid(&package);
}

#[test]
fn range_and_prune_helpers() {
    let mut package = DeckFixture::titled(6).package();

    remove_range(&mut package, 1, 2).unwrap();
    assert_eq!(slide_ids(&package), vec![256, 259, 260, 261]);

    let report = prune_to(&mut package, 1).unwrap();
    assert_eq!(report.removed, vec![1, 2, 3]);
    assert_eq!(slide_ids(&package), vec![256]);
    assert_valid(&package);
}

#[test]
fn removing_every_slide_leaves_an_empty_list() {
    let mut package = DeckFixture::titled(2).package();

    prune_to(&mut package, 0).unwrap();

    assert!(slide_ids(&package).is_empty());
    assert_valid(&package);
}

#[test]
fn section_and_custom_show_references_are_dropped() {
    let mut package = DeckFixture::titled(3).package();
    let presentation = part_text(&package, "ppt/presentation.xml").replace(
        "</p:presentation>",
        concat!(
            r#"<p:custShowLst><p:custShow name="Short" id="0"><p:sldLst>"#,
            r#"<p:sld r:id="rId2"/><p:sld r:id="rId3"/></p:sldLst></p:custShow></p:custShowLst>"#,
            r#"<p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}">"#,
            r#"<p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main">"#,
            r#"<p14:section name="Main" id="{6A1C2B4E-0000-0000-0000-000000000001}"><p14:sldIdLst>"#,
            r#"<p14:sldId id="256"/><p14:sldId id="257"/><p14:sldId id="258"/>"#,
            r#"</p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst></p:presentation>"#,
        ),
    );
    package
        .write("ppt/presentation.xml", presentation.into_bytes())
        .unwrap();

    remove_slides(&mut package, [1]).unwrap();

    let xml = part_text(&package, "ppt/presentation.xml");
    assert!(!xml.contains(r#"id="257""#));
    assert!(xml.contains(r#"<p14:sldId id="256"/>"#));
    assert!(xml.contains(r#"<p14:sldId id="258"/>"#));
    assert!(!xml.contains(r#"r:id="rId3""#));
    assert!(xml.contains(r#"<p:sld r:id="rId2"/>"#));
    assert_valid(&package);
}
