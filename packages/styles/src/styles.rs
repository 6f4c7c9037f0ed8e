use crate::property::{PaperSize, StyleProperty};
use crate::render_style::RenderStyle;
use crate::settings::SettingsProvider;
use crate::stylesheet::parse_stylesheet;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

pub const PAGE_SELECTOR: &str = "page";

/// Resolved style set keyed by element style name
#[derive(Debug, Clone, PartialEq)]
pub struct Styles {
    page: RenderStyle,
    styles: BTreeMap<String, RenderStyle>,
    /// Returned for names without a rule of their own
    fallback: RenderStyle,
}

impl Default for Styles {
    fn default() -> Self {
        let page = RenderStyle::default();
        Self {
            fallback: RenderStyle::derived_from_page("default", &page),
            page,
            styles: BTreeMap::new(),
        }
    }
}

impl Styles {
    /// Parse a stylesheet and resolve every rule against the page style.
    ///
    /// Redeclared selectors merge: each property keeps its last value.
    #[instrument(skip(source, settings), fields(bytes = source.len()))]
    pub fn parse(source: &str, settings: &dyn SettingsProvider) -> Self {
        let mut declared: BTreeMap<String, Vec<StyleProperty>> = BTreeMap::new();
        for rule in parse_stylesheet(source, settings) {
            for selector in &rule.selectors {
                declared
                    .entry(selector.clone())
                    .or_default()
                    .extend(rule.declarations.iter().cloned());
            }
        }

        let mut page = RenderStyle::default();
        if let Some(properties) = declared.remove(PAGE_SELECTOR) {
            for property in &properties {
                page.apply(property);
            }
        }

        let styles: BTreeMap<String, RenderStyle> = declared
            .into_iter()
            .map(|(name, properties)| {
                let mut style = RenderStyle::derived_from_page(name.clone(), &page);
                for property in &properties {
                    style.apply(property);
                }
                (name, style)
            })
            .collect();

        debug!(styles = styles.len(), "Resolved stylesheet");
        Self {
            fallback: RenderStyle::derived_from_page("default", &page),
            page,
            styles,
        }
    }

    pub fn page(&self) -> &RenderStyle {
        &self.page
    }

    pub fn get(&self, name: &str) -> Option<&RenderStyle> {
        if name == PAGE_SELECTOR {
            return Some(&self.page);
        }
        self.styles.get(name)
    }

    /// Style for `name`, or a default derived from the page style
    pub fn style_for(&self, name: &str) -> &RenderStyle {
        self.get(name).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    /// Usable page height for a paper size
    pub fn page_height(&self, paper: PaperSize) -> f64 {
        self.page.page_height_for(paper)
    }
}
