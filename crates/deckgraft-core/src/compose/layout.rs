use super::SlideContent;
use crate::pml::ComposerSettings;
use std::collections::HashMap;

/// Template slide indices of the stock layouts.
const DEFAULT_LAYOUTS: &[(&str, usize)] = &[
    ("title", 0),
    ("content_title_text", 2),
    ("basic", 2),
    ("two_column", 3),
    ("three_column", 4),
    ("large_table", 5),
    ("two_tables", 6),
    ("gantt_chart", 7),
    ("text_small_table", 8),
    ("text_large_table", 9),
    ("permits", 9),
    ("two_tables_vertical", 10),
    ("image_left", 11),
    ("image_right", 12),
    ("large_image", 13),
    ("two_images", 14),
    ("session_title", 15),
    ("approval_request", 16),
    ("main_agreements", 17),
    ("main_agreements_lease", 18),
    ("title_subtitle_table", 19),
    ("cod_pipeline", 20),
    ("cod_pipeline_phase", 21),
    ("equipment_procurement_case", 22),
    ("bos_negotiation", 23),
];

/// Maps layout names to the template slide that renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutMap {
    entries: HashMap<String, usize>,
    fallback: usize,
}

impl LayoutMap {
    /// An empty map; every lookup yields `fallback`.
    pub fn new(fallback: usize) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
        }
    }

    pub fn with_defaults(fallback: usize) -> Self {
        let mut map = Self::new(fallback);
        for (name, index) in DEFAULT_LAYOUTS {
            map.insert(name, *index);
        }
        map
    }

    /// Stock layouts, with the settings' overrides and fallback applied.
    pub fn from_settings(settings: &ComposerSettings) -> Self {
        let mut map = Self::with_defaults(settings.default_layout_index);
        for (name, index) in &settings.layout_overrides {
            map.insert(name, *index);
        }
        map
    }

    pub fn insert(&mut self, name: &str, index: usize) {
        self.entries.insert(name.to_string(), index);
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries.get(name).copied()
    }

    pub fn fallback(&self) -> usize {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index_for_name(&self, name: &str) -> usize {
        self.get(name).unwrap_or(self.fallback)
    }

    /// The named layout, or one suggested by what the slide carries when no
    /// name is given.
    pub fn resolve(&self, content: &SlideContent) -> usize {
        match content.layout_name.trim() {
            "" => self.index_for_name(suggested_layout(content)),
            name => self.index_for_name(name),
        }
    }
}

impl Default for LayoutMap {
    fn default() -> Self {
        Self::with_defaults(ComposerSettings::default().default_layout_index)
    }
}

/// Layout for slides that do not name one.
pub fn suggested_layout(content: &SlideContent) -> &'static str {
    if content.table.is_some() {
        "large_table"
    } else if content.image_paths.len() >= 2 {
        "two_images"
    } else if !content.image_paths.is_empty() {
        "image_left"
    } else if content
        .body_text
        .as_deref()
        .is_some_and(|body| body.matches('\n').count() >= 3)
    {
        "two_column"
    } else {
        "basic"
    }
}
