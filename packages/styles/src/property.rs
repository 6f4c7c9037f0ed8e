//! # Style Properties
//!
//! Every known stylesheet property maps to one [`StyleProperty`] variant.
//! The property name decides how the value is read:
//!
//! | Kind    | Properties                                                   |
//! |---------|--------------------------------------------------------------|
//! | numeric | margins, widths, page heights, `line-height`, `font-size`, indents |
//! | boolean | `bold`, `italic`, `underline`, `uppercase`, `visible`, … |
//! | string  | `font`, `content`, `color`, `text-align` |

use crate::error::ValueError;
use crate::expression::evaluate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
}

impl PaperSize {
    /// Physical page size in points (width, height)
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (595.0, 842.0),
            PaperSize::Letter => (612.0, 792.0),
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperSize::A4 => f.write_str("a4"),
            PaperSize::Letter => f.write_str("letter"),
        }
    }
}

impl FromStr for PaperSize {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "letter" | "us letter" | "usletter" => Ok(PaperSize::Letter),
            other => Err(format!("unknown paper size '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// How a property's value is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Boolean,
    Numeric,
}

/// One typed declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "kebab-case")]
pub enum StyleProperty {
    MarginTop(f64),
    MarginBottom(f64),
    MarginLeft(f64),
    MarginRight(f64),
    MarginLeftA4(f64),
    MarginLeftLetter(f64),
    Width(f64),
    WidthA4(f64),
    WidthLetter(f64),
    PageHeightA4(f64),
    PageHeightLetter(f64),
    LineHeight(f64),
    FontSize(f64),
    Indent(f64),
    FirstLineIndent(f64),
    Font(String),
    Content(String),
    Color(String),
    TextAlign(TextAlign),
    Bold(bool),
    Italic(bool),
    Underline(bool),
    Uppercase(bool),
    Visible(bool),
    BeginsPage(bool),
    UnindentFreshParagraphs(bool),
}

/// Kind of a property name, `None` for unknown properties
pub fn property_kind(name: &str) -> Option<PropertyKind> {
    let kind = match name {
        "margin-top" | "margin-bottom" | "margin-left" | "margin-right" | "margin-left-a4"
        | "margin-left-letter" | "width" | "width-a4" | "width-letter" | "page-height-a4"
        | "page-height-letter" | "line-height" | "font-size" | "indent" | "first-line-indent" => {
            PropertyKind::Numeric
        }
        "bold" | "italic" | "underline" | "uppercase" | "visible" | "begins-page"
        | "unindent-fresh-paragraphs" => PropertyKind::Boolean,
        "font" | "content" | "color" | "text-align" => PropertyKind::String,
        _ => return None,
    };
    Some(kind)
}

impl StyleProperty {
    /// Decode a declaration whose macros have already been substituted
    pub fn decode(name: &str, value: &str) -> Result<Self, ValueError> {
        let kind = property_kind(name)
            .ok_or_else(|| ValueError::UnknownProperty { name: name.to_string() })?;

        match kind {
            PropertyKind::Numeric => {
                let number = evaluate(value)?;
                Ok(match name {
                    "margin-top" => StyleProperty::MarginTop(number),
                    "margin-bottom" => StyleProperty::MarginBottom(number),
                    "margin-left" => StyleProperty::MarginLeft(number),
                    "margin-right" => StyleProperty::MarginRight(number),
                    "margin-left-a4" => StyleProperty::MarginLeftA4(number),
                    "margin-left-letter" => StyleProperty::MarginLeftLetter(number),
                    "width" => StyleProperty::Width(number),
                    "width-a4" => StyleProperty::WidthA4(number),
                    "width-letter" => StyleProperty::WidthLetter(number),
                    "page-height-a4" => StyleProperty::PageHeightA4(number),
                    "page-height-letter" => StyleProperty::PageHeightLetter(number),
                    "line-height" => StyleProperty::LineHeight(number),
                    "font-size" => StyleProperty::FontSize(number),
                    "indent" => StyleProperty::Indent(number),
                    _ => StyleProperty::FirstLineIndent(number),
                })
            }
            PropertyKind::Boolean => {
                let flag = parse_bool(value)?;
                Ok(match name {
                    "bold" => StyleProperty::Bold(flag),
                    "italic" => StyleProperty::Italic(flag),
                    "underline" => StyleProperty::Underline(flag),
                    "uppercase" => StyleProperty::Uppercase(flag),
                    "visible" => StyleProperty::Visible(flag),
                    "begins-page" => StyleProperty::BeginsPage(flag),
                    _ => StyleProperty::UnindentFreshParagraphs(flag),
                })
            }
            PropertyKind::String => {
                let text = unquote(value);
                Ok(match name {
                    "font" => StyleProperty::Font(text),
                    "content" => StyleProperty::Content(text),
                    "color" => StyleProperty::Color(text),
                    _ => StyleProperty::TextAlign(parse_alignment(&text)?),
                })
            }
        }
    }
}

fn parse_bool(value: &str) -> Result<bool, ValueError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ValueError::NotBoolean { value: value.to_string() }),
    }
}

fn parse_alignment(value: &str) -> Result<TextAlign, ValueError> {
    match value.to_lowercase().as_str() {
        "left" => Ok(TextAlign::Left),
        "center" => Ok(TextAlign::Center),
        "right" => Ok(TextAlign::Right),
        _ => Err(ValueError::UnknownAlignment { value: value.to_string() }),
    }
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)) {
            return inner.to_string();
        }
    }
    value.to_string()
}
