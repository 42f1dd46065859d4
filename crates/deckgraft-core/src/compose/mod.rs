//! Deck assembly: content items are rendered into copies of template slides
//! and grafted, in order, behind the kept title slide.

pub mod layout;
pub mod render;

pub use layout::{suggested_layout, LayoutMap};
pub use render::{ContentRenderer, PlaceholderRenderer, MAX_IMAGES};

use crate::error::Result;
use crate::package::Package;
use crate::pml::{prune_to, repair, ComposerSettings, PresentationDocument, RemovalReport, RepairOutcome, SlideGrafter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableContent {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Sort key of a content item; plans write it either as a number or as a
/// numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderValue {
    Number(f64),
    Text(String),
}

impl OrderValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

/// One slide of the content plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideContent {
    pub title: String,
    pub subtitle: Option<String>,
    #[serde(alias = "content")]
    pub body_text: Option<String>,
    pub table: Option<TableContent>,
    #[serde(alias = "images")]
    pub image_paths: Vec<PathBuf>,
    #[serde(alias = "layout")]
    pub layout_name: String,
    pub order: Option<OrderValue>,
}

/// Items with a numeric `order` first, ascending; the rest after them in
/// input order. The sort is stable.
pub fn order_slides(contents: Vec<SlideContent>) -> Vec<SlideContent> {
    let mut keyed: Vec<(Option<f64>, SlideContent)> = contents
        .into_iter()
        .map(|c| (c.order.as_ref().and_then(OrderValue::as_number), c))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    keyed.into_iter().map(|(_, c)| c).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraftedSlide {
    pub title: String,
    pub layout_index: usize,
    pub slide_id: u32,
}

/// A content item that named a layout the template does not have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSlide {
    pub title: String,
    pub layout_index: usize,
    pub template_slides: usize,
}

#[derive(Debug, Clone)]
pub struct CompositionReport {
    pub removal: RemovalReport,
    pub repair: Option<RepairOutcome>,
    pub grafted: Vec<GraftedSlide>,
    pub skipped: Vec<SkippedSlide>,
}

#[derive(Debug)]
pub struct Composition {
    pub package: Package,
    pub report: CompositionReport,
}

pub struct Composer<'a, R: ContentRenderer = PlaceholderRenderer> {
    template: &'a Package,
    settings: ComposerSettings,
    layouts: LayoutMap,
    renderer: R,
}

impl<'a> Composer<'a> {
    pub fn new(template: &'a Package, settings: ComposerSettings) -> Self {
        let renderer = PlaceholderRenderer::new().restructure_tables(settings.restructure_tables);
        Self::with_renderer(template, settings, renderer)
    }
}

impl<'a, R: ContentRenderer> Composer<'a, R> {
    pub fn with_renderer(template: &'a Package, settings: ComposerSettings, renderer: R) -> Self {
        Self {
            template,
            layouts: LayoutMap::from_settings(&settings),
            settings,
            renderer,
        }
    }

    pub fn layouts_mut(&mut self) -> &mut LayoutMap {
        &mut self.layouts
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    /// Builds a new deck from the template. When a leading slide is kept, the
    /// first item (after ordering) titles it; every other item becomes one
    /// grafted slide. The template itself is never modified.
    pub fn compose(&self, contents: Vec<SlideContent>) -> Result<Composition> {
        let contents = order_slides(contents);
        let template_slides = PresentationDocument::load(self.template)?.slide_count();
        info!(items = contents.len(), template_slides, "composing deck");

        let mut dest = self.template.clone();
        let title_consumed = match contents.first() {
            Some(first) if self.settings.keep_leading_slides > 0 && template_slides > 0 => {
                let title = SlideContent {
                    title: first.title.clone(),
                    subtitle: first.subtitle.clone(),
                    ..SlideContent::default()
                };
                self.renderer.render(&mut dest, 0, &title)?;
                true
            }
            _ => false,
        };

        let removal = prune_to(&mut dest, self.settings.keep_leading_slides)?;
        let repair = self.settings.run_repair.then(|| repair(&mut dest));

        let mut grafted = Vec::new();
        let mut skipped = Vec::new();
        for content in contents.iter().skip(usize::from(title_consumed)) {
            let layout_index = self.layouts.resolve(content);
            if layout_index >= template_slides {
                warn!(
                    title = %content.title,
                    layout_index,
                    template_slides,
                    "layout not in template; slide skipped"
                );
                skipped.push(SkippedSlide {
                    title: content.title.clone(),
                    layout_index,
                    template_slides,
                });
                continue;
            }

            let mut working = self.template.clone();
            self.renderer.render(&mut working, layout_index, content)?;
            let slide_id = SlideGrafter::new(&working)?.graft(&mut dest, layout_index, usize::MAX)?;
            debug!(title = %content.title, layout_index, slide_id, "slide grafted");
            grafted.push(GraftedSlide {
                title: content.title.clone(),
                layout_index,
                slide_id,
            });
        }

        info!(grafted = grafted.len(), skipped = skipped.len(), "deck composed");
        Ok(Composition {
            package: dest,
            report: CompositionReport {
                removal,
                repair,
                grafted,
                skipped,
            },
        })
    }
}

/// Opens `template`, composes `contents` with the default renderer and
/// saves the deck to `output`.
pub fn compose_file(
    template: impl AsRef<Path>,
    output: impl AsRef<Path>,
    contents: Vec<SlideContent>,
    settings: ComposerSettings,
) -> Result<CompositionReport> {
    let template = Package::open(template)?;
    let Composition {
        mut package,
        report,
    } = Composer::new(&template, settings).compose(contents)?;
    package.save(output.as_ref())?;
    info!(output = %output.as_ref().display(), "deck saved");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn titled(title: &str, order: Option<OrderValue>) -> SlideContent {
        SlideContent {
            title: title.into(),
            order,
            ..SlideContent::default()
        }
    }

    #[test]
    fn ordered_items_come_first_then_input_order() {
        let contents = vec![
            titled("a", None),
            titled("b", Some(OrderValue::Text(" 2 ".into()))),
            titled("c", Some(OrderValue::Number(1.0))),
            titled("d", Some(OrderValue::Text("later".into()))),
            titled("e", None),
        ];

        let titles: Vec<String> = order_slides(contents).into_iter().map(|c| c.title).collect();

        assert_eq!(titles, vec!["c", "b", "a", "d", "e"]);
    }

    #[test]
    fn plan_items_accept_short_field_names() {
        let json = r#"{
            "title": "Permits",
            "layout": "permits",
            "content": "line",
            "images": ["a.png"],
            "order": "3",
            "table": {"headers": ["SPV"], "rows": [["x"]]}
        }"#;

        let item: SlideContent = serde_json::from_str(json).unwrap();

        assert_eq!(item.layout_name, "permits");
        assert_eq!(item.body_text.as_deref(), Some("line"));
        assert_eq!(item.image_paths, vec![PathBuf::from("a.png")]);
        assert_eq!(item.order.and_then(|o| o.as_number()), Some(3.0));
        assert_eq!(item.table.map(|t| t.rows.len()), Some(1));
    }

    #[test]
    fn missing_fields_default() {
        let item: SlideContent = serde_json::from_str(r#"{"title": "Only"}"#).unwrap();

        assert_eq!(item.layout_name, "");
        assert!(item.table.is_none());
        assert!(item.image_paths.is_empty());
    }
}
