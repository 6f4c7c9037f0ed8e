//! # Document Settings
//!
//! Per-document settings travel inside the screenplay file as a JSON block
//! in a trailing comment, so other Fountain tools show it as a boneyard:
//!
//! ```text
//! …last line of the script
//!
//! /* If you're seeing this, you can remove the following stuff - BEAT:
//! {"paperSize":"letter","sceneNumberStart":5}
//! END_BEAT */
//! ```
//!
//! Keys this crate doesn't know are kept and written back unchanged.

use crate::errors::EditorError;
use scriptform_pagination::PaginationSettings;
use scriptform_styles::{PaperSize, SettingValue, SettingsProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const SETTINGS_START: &str = "/* If you're seeing this, you can remove the following stuff - BEAT:";
pub const SETTINGS_END: &str = "END_BEAT */";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_size: Option<PaperSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_number_start: Option<usize>,
    /// Style family name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_scene_numbers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DocumentSettings {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Split `text` into the script body and its settings block.
    ///
    /// Text without a block yields default settings. A block whose JSON
    /// doesn't parse is an error.
    pub fn extract(text: &str) -> Result<(String, Self), EditorError> {
        let Some(start) = text.rfind(SETTINGS_START) else {
            return Ok((text.to_string(), Self::default()));
        };
        let json_start = start + SETTINGS_START.len();
        let Some(json_len) = text[json_start..].find(SETTINGS_END) else {
            // An unterminated block is just a boneyard in the script
            return Ok((text.to_string(), Self::default()));
        };

        let settings = serde_json::from_str(text[json_start..json_start + json_len].trim())?;
        let body = &text[..start];
        let body = body
            .strip_suffix("\n\n")
            .or_else(|| body.strip_suffix('\n'))
            .unwrap_or(body);
        Ok((body.to_string(), settings))
    }

    /// Append the settings block to `body`; empty settings add nothing
    pub fn append(&self, body: &str) -> Result<String, EditorError> {
        if self.is_empty() {
            return Ok(body.to_string());
        }
        let json = serde_json::to_string(self)?;
        Ok(format!("{body}\n\n{SETTINGS_START}\n{json}\n{SETTINGS_END}\n"))
    }

    /// `base` with this document's overrides applied
    pub fn pagination_settings(&self, base: &PaginationSettings) -> PaginationSettings {
        let mut settings = base.clone();
        if let Some(paper_size) = self.paper_size {
            settings.paper_size = paper_size;
        }
        if let Some(print) = self.print_scene_numbers {
            settings.print_scene_numbers = print;
        }
        if self.header.is_some() {
            settings.header.clone_from(&self.header);
        }
        settings
    }
}

impl SettingsProvider for DocumentSettings {
    fn setting(&self, key: &str) -> Option<SettingValue> {
        match key {
            "paperSize" => self.paper_size.map(|paper| SettingValue::String(paper.to_string())),
            "sceneNumberStart" => self.scene_number_start.map(|start| SettingValue::Number(start as f64)),
            "stylesheet" => self.stylesheet.as_deref().map(SettingValue::from),
            "header" => self.header.as_deref().map(SettingValue::from),
            "printSceneNumbers" => self.print_scene_numbers.map(SettingValue::Bool),
            "revision" => self.revision.as_deref().map(SettingValue::from),
            _ => match self.extra.get(key)? {
                Value::Bool(value) => Some(SettingValue::Bool(*value)),
                Value::Number(value) => value.as_f64().map(SettingValue::Number),
                Value::String(value) => Some(SettingValue::String(value.clone())),
                _ => None,
            },
        }
    }
}
