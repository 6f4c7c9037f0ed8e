//! # Style Cache
//!
//! Caller-owned cache of stylesheet families. A family named `Name` is made
//! of two files found in one of the configured directories:
//!
//! - `Name.beatCSS`: the render sheet used for export pagination
//! - `Name-editor.beatCSS`: optional editor sheet, applied on top of the
//!   render sheet
//!
//! The `Screenplay` family is built in and used when no file overrides it.

use crate::error::{StyleError, StyleResult};
use crate::settings::SettingsProvider;
use crate::styles::Styles;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_FAMILY: &str = "Screenplay";
pub const STYLESHEET_EXTENSION: &str = "beatCSS";

const BUILTIN_RENDER: &str = include_str!("../sheets/Screenplay.beatCSS");
const BUILTIN_EDITOR: &str = include_str!("../sheets/Screenplay-editor.beatCSS");

/// Render and editor styles of one family
#[derive(Debug, Clone, PartialEq)]
pub struct StyleFamily {
    pub name: String,
    pub render: Arc<Styles>,
    pub editor: Arc<Styles>,
}

impl StyleFamily {
    fn from_sources(name: &str, render: &str, editor: Option<&str>, settings: &dyn SettingsProvider) -> Self {
        let render_styles = Styles::parse(render, settings);
        let editor_styles = match editor {
            Some(editor) => Styles::parse(&format!("{render}\n{editor}"), settings),
            None => render_styles.clone(),
        };
        Self {
            name: name.to_string(),
            render: Arc::new(render_styles),
            editor: Arc::new(editor_styles),
        }
    }
}

/// Built-in screenplay family
pub fn builtin_family(settings: &dyn SettingsProvider) -> StyleFamily {
    StyleFamily::from_sources(DEFAULT_FAMILY, BUILTIN_RENDER, Some(BUILTIN_EDITOR), settings)
}

#[derive(Debug, Default)]
pub struct StyleCache {
    directories: Vec<PathBuf>,
    families: HashMap<String, Arc<StyleFamily>>,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directories(directories: impl IntoIterator<Item = PathBuf>) -> Self {
        Self { directories: directories.into_iter().collect(), families: HashMap::new() }
    }

    pub fn add_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directories.push(directory.into());
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.families.contains_key(name)
    }

    /// Cached family, loading it on first use
    pub fn family(&mut self, name: &str, settings: &dyn SettingsProvider) -> StyleResult<Arc<StyleFamily>> {
        if let Some(family) = self.families.get(name) {
            return Ok(Arc::clone(family));
        }
        let family = Arc::new(self.load(name, settings)?);
        self.families.insert(name.to_string(), Arc::clone(&family));
        Ok(family)
    }

    /// Render styles of a family
    pub fn render_styles(&mut self, name: &str, settings: &dyn SettingsProvider) -> StyleResult<Arc<Styles>> {
        self.family(name, settings).map(|family| Arc::clone(&family.render))
    }

    /// Editor styles of a family
    pub fn editor_styles(&mut self, name: &str, settings: &dyn SettingsProvider) -> StyleResult<Arc<Styles>> {
        self.family(name, settings).map(|family| Arc::clone(&family.editor))
    }

    /// Re-read a family from disk.
    ///
    /// On failure the previously cached family stays in place and the error
    /// is returned.
    pub fn reload(&mut self, name: &str, settings: &dyn SettingsProvider) -> StyleResult<Arc<StyleFamily>> {
        match self.load(name, settings) {
            Ok(family) => {
                info!(family = name, "Reloaded style family");
                let family = Arc::new(family);
                self.families.insert(name.to_string(), Arc::clone(&family));
                Ok(family)
            }
            Err(error) => {
                warn!(family = name, %error, "Keeping previous styles after failed reload");
                Err(error)
            }
        }
    }

    /// Drop every cached family
    pub fn clear(&mut self) {
        self.families.clear();
    }

    fn load(&self, name: &str, settings: &dyn SettingsProvider) -> StyleResult<StyleFamily> {
        let render_file = format!("{name}.{STYLESHEET_EXTENSION}");
        let Some(render_path) = self.find(&render_file) else {
            if name == DEFAULT_FAMILY {
                debug!("Using built-in screenplay styles");
                return Ok(builtin_family(settings));
            }
            return Err(StyleError::unknown_family(name));
        };

        let render = read(&render_path)?;
        let editor_path = render_path.with_file_name(format!("{name}-editor.{STYLESHEET_EXTENSION}"));
        let editor = if editor_path.is_file() { Some(read(&editor_path)?) } else { None };

        debug!(family = name, path = %render_path.display(), "Loaded style family");
        Ok(StyleFamily::from_sources(name, &render, editor.as_deref(), settings))
    }

    fn find(&self, file_name: &str) -> Option<PathBuf> {
        self.directories
            .iter()
            .map(|directory| directory.join(file_name))
            .find(|path| path.is_file())
    }
}

fn read(path: &Path) -> StyleResult<String> {
    std::fs::read_to_string(path).map_err(|source| StyleError::io(path, source))
}
