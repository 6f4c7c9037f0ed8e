use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value returned for `setting(key)` / `userSetting(key)` lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{value}"),
            SettingValue::Number(value) => write!(f, "{value}"),
            SettingValue::String(value) => f.write_str(value),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

/// Lookup for settings referenced from stylesheets.
///
/// `setting(key)` reads document settings, `userSetting(key)` reads the
/// user's preferences.
pub trait SettingsProvider {
    fn setting(&self, key: &str) -> Option<SettingValue>;

    fn user_setting(&self, key: &str) -> Option<SettingValue> {
        self.setting(key)
    }
}

/// Provider with no settings at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSettings;

impl SettingsProvider for NoSettings {
    fn setting(&self, _key: &str) -> Option<SettingValue> {
        None
    }
}

/// In-memory provider with separate document and user maps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticSettings {
    #[serde(default)]
    pub document: BTreeMap<String, SettingValue>,
    #[serde(default)]
    pub user: BTreeMap<String, SettingValue>,
}

impl StaticSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.document.insert(key.into(), value.into());
        self
    }

    pub fn with_user_setting(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.user.insert(key.into(), value.into());
        self
    }
}

impl SettingsProvider for StaticSettings {
    fn setting(&self, key: &str) -> Option<SettingValue> {
        self.document.get(key).cloned()
    }

    fn user_setting(&self, key: &str) -> Option<SettingValue> {
        self.user.get(key).cloned()
    }
}

impl<T: SettingsProvider + ?Sized> SettingsProvider for &T {
    fn setting(&self, key: &str) -> Option<SettingValue> {
        (**self).setting(key)
    }

    fn user_setting(&self, key: &str) -> Option<SettingValue> {
        (**self).user_setting(key)
    }
}
