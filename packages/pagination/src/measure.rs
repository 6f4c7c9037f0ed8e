//! # Measurement
//!
//! Elements are measured in logical units: text is wrapped greedily at the
//! style's column count and every printed line takes one `line-height`.
//!
//! ```text
//! height = margin-top + wrapped lines × line-height + margin-bottom
//! ```
//!
//! The top margin is dropped for the first element on a page and for the
//! continuation of a split paragraph.

use crate::page::{ElementKind, PageElement};
use scriptform_parser::{Line, LineType};
use scriptform_styles::{PaperSize, RenderStyle};
use std::ops::Range;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Greedy word wrap at `columns` display cells.
///
/// Words wider than a line are broken at character boundaries. Empty text
/// still occupies one line.
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let width = UnicodeWidthStr::width(word);

        if current_width > 0 && current_width + 1 + width <= columns {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + width;
            continue;
        }
        if current_width > 0 {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if width <= columns {
            current.push_str(word);
            current_width = width;
            continue;
        }

        for c in word.chars() {
            let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
            if current_width + char_width > columns && current_width > 0 {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(c);
            current_width += char_width;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Text printed for a line under a style
pub fn display_text(line: &Line, style: &RenderStyle) -> String {
    let text = match &style.content {
        Some(content) => content.clone(),
        None => line.stripped(),
    };
    if style.uppercase {
        text.to_uppercase()
    } else {
        text
    }
}

/// A measured source line, ready to be placed whole or in parts
#[derive(Debug, Clone)]
pub(crate) struct Unit<'s> {
    pub line_index: usize,
    pub line_type: LineType,
    pub style: &'s RenderStyle,
    pub text: String,
    pub wrapped: Vec<String>,
    /// Continues the paragraph of the previous line: no top margin
    pub joined: bool,
    pub scene_number: Option<String>,
}

impl<'s> Unit<'s> {
    pub fn new(line_index: usize, line: &Line, style: &'s RenderStyle, paper: PaperSize) -> Self {
        let text = display_text(line, style);
        let wrapped = wrap(&text, style.columns(paper));
        Self {
            line_index,
            line_type: line.line_type,
            style,
            text,
            wrapped,
            joined: line.paragraph_continuation,
            scene_number: None,
        }
    }

    /// Generated single-purpose unit (`(MORE)`, `(CONT'D)` cues)
    pub fn generated(
        line_index: usize,
        line_type: LineType,
        style: &'s RenderStyle,
        text: String,
        paper: PaperSize,
    ) -> Self {
        let wrapped = wrap(&text, style.columns(paper));
        Self { line_index, line_type, style, text, wrapped, joined: false, scene_number: None }
    }

    pub fn line_count(&self) -> usize {
        self.wrapped.len()
    }

    pub fn margin_top(&self, top_of_page: bool, split: bool) -> f64 {
        if top_of_page || split || self.joined {
            0.0
        } else {
            self.style.margin_top
        }
    }

    /// Height of `lines` wrapped lines of this unit
    pub fn height_of(&self, lines: usize, top_of_page: bool, split: bool) -> f64 {
        self.margin_top(top_of_page, split)
            + lines as f64 * self.style.line_height
            + self.style.margin_bottom
    }

    pub fn height(&self, top_of_page: bool) -> f64 {
        self.height_of(self.line_count(), top_of_page, false)
    }

    /// Most wrapped lines that fit in `available`
    pub fn lines_fitting(&self, available: f64, top_of_page: bool, split: bool) -> usize {
        let fixed = self.margin_top(top_of_page, split) + self.style.margin_bottom;
        if self.style.line_height <= 0.0 {
            return self.line_count();
        }
        let room = (available - fixed) / self.style.line_height + 1e-6;
        if room <= 0.0 {
            0
        } else {
            room.floor() as usize
        }
    }

    /// Page element for wrapped lines `lines`
    pub fn element(&self, lines: Range<usize>, kind: ElementKind, top_of_page: bool, split: bool) -> PageElement {
        let count = lines.len();
        PageElement {
            kind,
            line_type: self.line_type,
            style: self.style.name.clone(),
            line_index: Some(self.line_index),
            text: self.text.clone(),
            wrapped: self.wrapped[lines].to_vec(),
            y: 0.0,
            margin_top: self.margin_top(top_of_page, split),
            height: self.height_of(count, top_of_page, split),
            scene_number: self.scene_number.clone(),
            continuation: split,
        }
    }

    /// Whole unit as one element
    pub fn whole(&self, kind: ElementKind, top_of_page: bool) -> PageElement {
        self.element(0..self.line_count(), kind, top_of_page, false)
    }
}
