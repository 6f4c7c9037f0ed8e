use scriptform_pagination::PaginationSettings;
use scriptform_styles::{PaperSize, DEFAULT_FAMILY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "scriptform.config.json";

/// Scriptform configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Paper size used when neither the document nor a flag picks one
    #[serde(default)]
    pub paper_size: PaperSize,

    /// Style family name
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    /// Directories searched for `.beatCSS` families
    #[serde(default)]
    pub style_directories: Vec<String>,

    #[serde(default = "default_print_scene_numbers")]
    pub print_scene_numbers: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contd_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

fn default_stylesheet() -> String {
    DEFAULT_FAMILY.to_string()
}

fn default_print_scene_numbers() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Style directories resolved against `cwd`
    pub fn style_directories(&self, cwd: &Path) -> Vec<PathBuf> {
        self.style_directories.iter().map(|dir| cwd.join(dir)).collect()
    }

    /// Base pagination settings before document and flag overrides
    pub fn pagination_settings(&self) -> PaginationSettings {
        let defaults = PaginationSettings::default();
        PaginationSettings {
            paper_size: self.paper_size,
            print_scene_numbers: self.print_scene_numbers,
            more_label: self.more_label.clone().unwrap_or(defaults.more_label),
            contd_label: self.contd_label.clone().unwrap_or(defaults.contd_label),
            header: self.header.clone(),
            // Export runs when the manager settles
            live_pagination: false,
            ..defaults
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::default(),
            stylesheet: default_stylesheet(),
            style_directories: vec![],
            print_scene_numbers: default_print_scene_numbers(),
            more_label: None,
            contd_label: None,
            header: None,
        }
    }
}
