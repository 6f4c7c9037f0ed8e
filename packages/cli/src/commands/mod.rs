pub mod outline;
pub mod pdf;

pub use outline::{outline, OutlineArgs};
pub use pdf::{pdf, PdfArgs};

use crate::config::Config;
use anyhow::{Context, Result};
use scriptform_editor::Document;
use scriptform_pagination::PaginationSettings;
use scriptform_styles::{StyleCache, Styles};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A loaded document with the styles and settings it paginates with
pub struct Prepared {
    pub document: Document,
    pub styles: Arc<Styles>,
    pub settings: PaginationSettings,
}

/// Load `source` and resolve its style family.
///
/// Settings come from the config file, then the document's own settings
/// block; callers apply command line flags on top.
pub fn prepare(source: &Path, extra_style_dirs: &[PathBuf], cwd: &Path) -> Result<Prepared> {
    let config = Config::load(cwd)?;
    let document = Document::load(source).with_context(|| format!("Cannot open {}", source.display()))?;

    let mut directories = config.style_directories(cwd);
    directories.extend(extra_style_dirs.iter().cloned());
    let mut cache = StyleCache::with_directories(directories);
    let family = document.settings().stylesheet.as_deref().unwrap_or(&config.stylesheet);
    let styles = cache.render_styles(family, document.settings())?;

    let settings = document.settings().pagination_settings(&config.pagination_settings());
    Ok(Prepared { document, styles, settings })
}
