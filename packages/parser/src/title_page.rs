use crate::classifier::title_page_key;
use crate::line::{Line, LineType};
use serde::{Deserialize, Serialize};

/// One `Key: value` group of the title page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitlePageField {
    /// Lower-cased key as written (`title`, `draft date`, …)
    pub key: String,
    pub line_type: LineType,
    pub values: Vec<String>,
}

/// Ordered title page block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitlePage {
    pub fields: Vec<TitlePageField>,
}

impl TitlePage {
    /// Collect the leading title page lines.
    ///
    /// Returns the title page and the index of the first body line.
    pub fn from_lines(lines: &[Line]) -> (Self, usize) {
        let mut fields: Vec<TitlePageField> = Vec::new();
        let mut body_start = 0;

        for (index, line) in lines.iter().enumerate() {
            if !line.line_type.is_title_page() {
                // The blank line closing the title page is skipped too
                if !fields.is_empty() && line.line_type == LineType::Empty {
                    body_start = index + 1;
                }
                break;
            }
            body_start = index + 1;

            if title_page_key(&line.string).is_some() {
                let (key, value) = line.string.split_once(':').unwrap_or((&line.string, ""));
                let mut values = Vec::new();
                if !value.trim().is_empty() {
                    values.push(value.trim().to_string());
                }
                fields.push(TitlePageField {
                    key: key.trim().to_lowercase(),
                    line_type: line.line_type,
                    values,
                });
            } else if let Some(field) = fields.last_mut() {
                let value = line.string.trim();
                if !value.is_empty() {
                    field.values.push(value.to_string());
                }
            }
        }

        (Self { fields }, body_start)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TitlePageField> {
        let key = key.to_lowercase();
        self.fields.iter().find(|field| field.key == key)
    }

    /// First value of a field
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|field| field.values.first()).map(String::as_str)
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut TitlePageField> {
        self.fields.iter_mut()
    }
}
