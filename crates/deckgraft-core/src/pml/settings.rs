use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerSettings {
    /// Leading template slides (title pages) kept in the output.
    pub keep_leading_slides: usize,
    pub run_repair: bool,
    /// Template slide used for layout names the layout map does not know.
    pub default_layout_index: usize,
    pub layout_overrides: HashMap<String, usize>,
    pub restructure_tables: bool,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            keep_leading_slides: 1,
            run_repair: true,
            default_layout_index: 3,
            layout_overrides: HashMap::new(),
            restructure_tables: true,
        }
    }
}

impl ComposerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
