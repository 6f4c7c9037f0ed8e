use crate::expression::{CHARACTER_WIDTH, LINE_HEIGHT};
use crate::property::{PaperSize, StyleProperty, TextAlign};
use serde::{Deserialize, Serialize};

/// Resolved rendering rules for one element type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStyle {
    pub name: String,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_left_a4: Option<f64>,
    pub margin_left_letter: Option<f64>,
    pub width_a4: f64,
    pub width_letter: f64,
    /// Usable page height; only meaningful on the `page` style
    pub page_height_a4: f64,
    pub page_height_letter: f64,
    pub line_height: f64,
    pub font_size: f64,
    pub font: String,
    pub text_align: TextAlign,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub uppercase: bool,
    /// Literal text printed instead of (or around) the line's text
    pub content: Option<String>,
    pub color: Option<String>,
    pub indent: f64,
    pub first_line_indent: f64,
    pub unindent_fresh_paragraphs: bool,
    pub begins_page: bool,
    pub visible: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            name: "page".to_string(),
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
            margin_left_a4: None,
            margin_left_letter: None,
            width_a4: 60.0 * CHARACTER_WIDTH,
            width_letter: 61.0 * CHARACTER_WIDTH,
            page_height_a4: 58.0 * LINE_HEIGHT,
            page_height_letter: 54.0 * LINE_HEIGHT,
            line_height: LINE_HEIGHT,
            font_size: 12.0,
            font: "Courier".to_string(),
            text_align: TextAlign::Left,
            bold: false,
            italic: false,
            underline: false,
            uppercase: false,
            content: None,
            color: None,
            indent: 0.0,
            first_line_indent: 0.0,
            unindent_fresh_paragraphs: false,
            begins_page: false,
            visible: true,
        }
    }
}

impl RenderStyle {
    /// Default style for `name`, inheriting the page's text metrics
    pub fn derived_from_page(name: impl Into<String>, page: &RenderStyle) -> Self {
        Self {
            name: name.into(),
            width_a4: page.width_a4,
            width_letter: page.width_letter,
            page_height_a4: page.page_height_a4,
            page_height_letter: page.page_height_letter,
            line_height: page.line_height,
            font_size: page.font_size,
            font: page.font.clone(),
            ..Self::default()
        }
    }

    /// Apply one declaration; later declarations overwrite earlier ones
    pub fn apply(&mut self, property: &StyleProperty) {
        match property {
            StyleProperty::MarginTop(value) => self.margin_top = *value,
            StyleProperty::MarginBottom(value) => self.margin_bottom = *value,
            StyleProperty::MarginLeft(value) => self.margin_left = *value,
            StyleProperty::MarginRight(value) => self.margin_right = *value,
            StyleProperty::MarginLeftA4(value) => self.margin_left_a4 = Some(*value),
            StyleProperty::MarginLeftLetter(value) => self.margin_left_letter = Some(*value),
            StyleProperty::Width(value) => {
                self.width_a4 = *value;
                self.width_letter = *value;
            }
            StyleProperty::WidthA4(value) => self.width_a4 = *value,
            StyleProperty::WidthLetter(value) => self.width_letter = *value,
            StyleProperty::PageHeightA4(value) => self.page_height_a4 = *value,
            StyleProperty::PageHeightLetter(value) => self.page_height_letter = *value,
            StyleProperty::LineHeight(value) => self.line_height = *value,
            StyleProperty::FontSize(value) => self.font_size = *value,
            StyleProperty::Indent(value) => self.indent = *value,
            StyleProperty::FirstLineIndent(value) => self.first_line_indent = *value,
            StyleProperty::Font(value) => self.font = value.clone(),
            StyleProperty::Content(value) => self.content = Some(value.clone()),
            StyleProperty::Color(value) => self.color = Some(value.clone()),
            StyleProperty::TextAlign(value) => self.text_align = *value,
            StyleProperty::Bold(value) => self.bold = *value,
            StyleProperty::Italic(value) => self.italic = *value,
            StyleProperty::Underline(value) => self.underline = *value,
            StyleProperty::Uppercase(value) => self.uppercase = *value,
            StyleProperty::Visible(value) => self.visible = *value,
            StyleProperty::BeginsPage(value) => self.begins_page = *value,
            StyleProperty::UnindentFreshParagraphs(value) => self.unindent_fresh_paragraphs = *value,
        }
    }

    pub fn margin_left_for(&self, paper: PaperSize) -> f64 {
        let specific = match paper {
            PaperSize::A4 => self.margin_left_a4,
            PaperSize::Letter => self.margin_left_letter,
        };
        specific.unwrap_or(self.margin_left)
    }

    pub fn width_for(&self, paper: PaperSize) -> f64 {
        match paper {
            PaperSize::A4 => self.width_a4,
            PaperSize::Letter => self.width_letter,
        }
    }

    pub fn page_height_for(&self, paper: PaperSize) -> f64 {
        match paper {
            PaperSize::A4 => self.page_height_a4,
            PaperSize::Letter => self.page_height_letter,
        }
    }

    /// Number of character cells in a wrapped line, at least one
    pub fn columns(&self, paper: PaperSize) -> usize {
        let usable = self.width_for(paper) - self.indent.max(0.0);
        ((usable / CHARACTER_WIDTH + 1e-6).floor() as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_paper_values() {
        let mut style = RenderStyle::default();
        style.apply(&StyleProperty::MarginLeft(10.0));
        style.apply(&StyleProperty::MarginLeftLetter(20.0));
        style.apply(&StyleProperty::WidthA4(35.0 * CHARACTER_WIDTH));

        assert_eq!(style.margin_left_for(PaperSize::A4), 10.0);
        assert_eq!(style.margin_left_for(PaperSize::Letter), 20.0);
        assert_eq!(style.columns(PaperSize::A4), 35);
        assert_eq!(style.columns(PaperSize::Letter), 61);
    }

    #[test]
    fn test_derived_style_keeps_page_metrics_only() {
        let mut page = RenderStyle::default();
        page.apply(&StyleProperty::LineHeight(14.0));
        page.apply(&StyleProperty::MarginTop(72.0));

        let derived = RenderStyle::derived_from_page("action", &page);
        assert_eq!(derived.name, "action");
        assert_eq!(derived.line_height, 14.0);
        assert_eq!(derived.margin_top, 0.0);
    }
}
