use scriptform_parser::LineType;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// What a page element stands for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ElementKind {
    /// A source line, or the part of a split line placed on this page
    Line,
    /// Generated `(MORE)` marker below a split dialogue block
    More,
    /// Generated cue repeated with `(CONT'D)` above the rest of a split block
    Continued,
    /// Side by side dialogue; the taller column sets the height
    DualDialogue {
        left: Vec<PageElement>,
        right: Vec<PageElement>,
    },
}

/// One laid out block on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub kind: ElementKind,
    pub line_type: LineType,
    /// Style the element was measured with
    pub style: String,
    /// Source line; for generated elements the line they belong to
    pub line_index: Option<usize>,
    /// Display text after markup removal
    pub text: String,
    /// Text broken into printed lines
    pub wrapped: Vec<String>,
    /// Offset from the top of the text area, margin included
    pub y: f64,
    /// Top margin actually applied (suppressed at the top of a page)
    pub margin_top: f64,
    /// Total vertical extent, margins included
    pub height: f64,
    /// Printed scene number of a heading
    pub scene_number: Option<String>,
    /// Continues a line split on the previous page
    pub continuation: bool,
}

impl PageElement {
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.kind, ElementKind::More | ElementKind::Continued)
    }

    /// Source line indices this element draws from
    pub fn line_span(&self) -> Option<Range<usize>> {
        match &self.kind {
            ElementKind::DualDialogue { left, right } => {
                let indices = left.iter().chain(right).filter_map(|e| e.line_index);
                let (min, max) = indices.fold((usize::MAX, 0), |(lo, hi), i| (lo.min(i), hi.max(i)));
                (min != usize::MAX).then(|| min..max + 1)
            }
            _ => self.line_index.map(|index| index..index + 1),
        }
    }
}

/// One page of laid out elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub elements: Vec<PageElement>,
    /// Usable height of the text area
    pub max_height: f64,
    pub remaining_space: f64,
    /// Printed page number
    pub page_number: usize,
    /// Represented source lines, for mapping edit positions to pages
    pub range: Range<usize>,
    /// The page opens with a fresh block rather than the rest of a split one
    pub starts_block: bool,
    /// First source line of the page, where a resumed layout starts
    pub first_line: usize,
}

impl Page {
    pub fn new(max_height: f64, page_number: usize) -> Self {
        Self {
            elements: Vec::new(),
            max_height,
            remaining_space: max_height,
            page_number,
            range: 0..0,
            starts_block: true,
            first_line: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn used_height(&self) -> f64 {
        self.max_height - self.remaining_space
    }

    /// Append an element at the current bottom of the page
    pub(crate) fn push(&mut self, mut element: PageElement) {
        if self.elements.is_empty() {
            self.starts_block = !element.continuation && element.kind != ElementKind::Continued;
            self.first_line = element.line_span().map_or(0, |span| span.start);
        }
        element.y = self.used_height();
        self.remaining_space -= element.height;
        if let Some(span) = element.line_span() {
            self.range = if self.range.is_empty() {
                span
            } else {
                self.range.start.min(span.start)..self.range.end.max(span.end)
            };
        }
        self.elements.push(element);
    }

    /// Whether `height` fits in the space left, allowing for float noise
    pub fn fits(&self, height: f64) -> bool {
        height <= self.remaining_space + 1e-6
    }

    pub fn contains_line(&self, line_index: usize) -> bool {
        self.range.contains(&line_index)
    }
}
