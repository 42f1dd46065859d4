pub mod document;
pub mod grafter;
pub mod manifest;
pub mod remover;
pub mod repair;
pub mod settings;

pub use document::PresentationDocument;
pub use grafter::{graft_slide, SlideGrafter};
pub use manifest::{SlideIdEntry, SlideManifest};
pub use remover::{prune_to, remove_range, remove_slides, remove_slides_strict, RemovalReport};
pub use repair::{
    load_through_model, repair, store_through_model, PresentationModel, RepairOutcome,
    RepairReport,
};
pub use settings::ComposerSettings;
