use crate::line::Line;
use crate::macros::MacroResolver;
use crate::outline::number_scenes;
use crate::parser::Parser;
use crate::title_page::TitlePage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Options applied while assembling a [`Screenplay`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenplayOptions {
    /// First automatic scene number
    pub scene_number_start: usize,
    /// Resolve `{{macros}}` into literal text
    pub resolve_macros: bool,
    /// Predefined macro variables
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Value printed by `{{date}}`; the current date when unset
    #[serde(default)]
    pub date: Option<String>,
}

impl Default for ScreenplayOptions {
    fn default() -> Self {
        Self {
            scene_number_start: 1,
            resolve_macros: true,
            variables: BTreeMap::new(),
            date: None,
        }
    }
}

/// Immutable snapshot handed to the paginator
///
/// Line indices match the parser's indices at the time of the snapshot, so
/// change indices reported by the parser can be used against it directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screenplay {
    pub title_page: TitlePage,
    pub lines: Vec<Line>,
    /// Index of the first line after the title page
    pub body_start: usize,
    /// Printed scene numbers keyed by heading line index
    pub scene_numbers: BTreeMap<usize, String>,
}

impl Screenplay {
    pub fn from_parser(parser: &Parser, options: &ScreenplayOptions) -> Self {
        Self::from_lines(parser.lines(), options)
    }

    pub fn from_lines(lines: &[Line], options: &ScreenplayOptions) -> Self {
        let mut lines = lines.to_vec();
        let (mut title_page, body_start) = TitlePage::from_lines(&lines);

        if options.resolve_macros {
            let mut resolver = MacroResolver::with_variables(options.variables.clone());
            if let Some(date) = &options.date {
                resolver = resolver.with_date(date.clone());
            }
            for field in title_page.fields_mut() {
                for value in &mut field.values {
                    *value = resolver.resolve(value);
                }
            }
            for line in &mut lines[body_start..] {
                if line.string.contains("{{") {
                    line.string = resolver.resolve(&line.string);
                }
            }
        }

        let scene_numbers = number_scenes(&lines, options.scene_number_start);
        Self { title_page, lines, body_start, scene_numbers }
    }

    /// Body lines, title page excluded
    pub fn body(&self) -> &[Line] {
        &self.lines[self.body_start.min(self.lines.len())..]
    }

    pub fn scene_number(&self, line_index: usize) -> Option<&str> {
        self.scene_numbers.get(&line_index).map(String::as_str)
    }
}
