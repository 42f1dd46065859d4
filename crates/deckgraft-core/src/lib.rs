//! PPTX package composition: slide removal, cross-package slide grafting,
//! integrity repair and DrawingML table restructuring, driven by a
//! template-based deck composer.

pub mod compose;
pub mod error;
pub mod hash;
pub mod ids;
pub mod package;
pub mod pml;
pub mod table;
pub mod util;
pub mod xml;

pub use error::{DeckError, Result};

pub use compose::{
    compose_file, order_slides, Composer, Composition, CompositionReport, ContentRenderer,
    LayoutMap, PlaceholderRenderer, SlideContent, TableContent,
};
pub use package::Package;
pub use pml::{
    graft_slide, prune_to, remove_range, remove_slides, remove_slides_strict, repair,
    ComposerSettings, PresentationDocument, RemovalReport, RepairOutcome, RepairReport,
    SlideGrafter,
};
pub use table::{restructure, RestructureSummary, RowRole, TableGrid, TableShape};
