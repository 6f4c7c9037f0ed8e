//! # Document Handle
//!
//! A Document is one screenplay file and its editing state: the live
//! [`Parser`], the document settings and a version counter.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Edit (incremental) → Snapshot → Save
//!   ↓      ↓          ↓                  ↓        ↓
//! File   Lines    ChangeSet          Screenplay  File
//! ```

use crate::errors::EditorError;
use crate::settings::DocumentSettings;
use scriptform_parser::{ChangeSet, OutlineScene, Parser, Screenplay, ScreenplayOptions};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Where a document lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStorage {
    /// In-memory only (tests, scratch documents)
    Memory,
    /// Backed by `Document::path`
    File { dirty: bool },
}

/// What an accepted edit changed
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// Document version after the edit
    pub version: u64,
    pub changes: ChangeSet,
    /// First line whose layout may differ, for incremental pagination
    pub change_at: usize,
}

/// Editable screenplay document
#[derive(Debug)]
pub struct Document {
    /// Path to source file
    pub path: PathBuf,

    /// Current version number (increments on each accepted change)
    pub version: u64,

    parser: Parser,
    settings: DocumentSettings,
    storage: DocumentStorage,
}

impl Document {
    /// Create document from source text (memory-backed)
    pub fn from_source(path: PathBuf, source: &str) -> Result<Self, EditorError> {
        let (body, settings) = DocumentSettings::extract(source)?;
        let mut parser = Parser::parse(&body);
        if let Some(start) = settings.scene_number_start {
            parser.set_scene_number_start(start);
        }

        Ok(Self { path, version: 0, parser, settings, storage: DocumentStorage::Memory })
    }

    /// Load document from file (file-backed)
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, EditorError> {
        let path = path.into();
        let source = std::fs::read_to_string(&path)?;
        let mut document = Self::from_source(path, &source)?;
        document.storage = DocumentStorage::File { dirty: false };
        info!(path = %document.path.display(), lines = document.parser.lines().len(), "Loaded document");
        Ok(document)
    }

    pub fn storage(&self) -> DocumentStorage {
        self.storage
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        matches!(self.storage, DocumentStorage::File { dirty: true })
    }

    fn touch(&mut self) {
        self.version += 1;
        if let DocumentStorage::File { dirty } = &mut self.storage {
            *dirty = true;
        }
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Script text without the settings block
    pub fn text(&self) -> String {
        self.parser.text()
    }

    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    /// Change document settings; counts as an edit.
    ///
    /// Returns the first line to paginate again from, which is always the
    /// start: settings can renumber every scene or change the page metrics.
    pub fn update_settings(&mut self, update: impl FnOnce(&mut DocumentSettings)) -> usize {
        update(&mut self.settings);
        self.parser.set_scene_number_start(self.settings.scene_number_start.unwrap_or(1));
        self.touch();
        debug!(version = self.version, "Updated document settings");
        0
    }

    /// Replace `range` of the script text with `replacement`.
    ///
    /// Rejected edits leave the document and its version untouched.
    pub fn apply_edit(&mut self, range: Range<usize>, replacement: &str) -> Result<EditOutcome, EditorError> {
        let start = range.start;
        let changes = self.parser.apply_edit(range, replacement)?;
        self.touch();

        let edited_line = self
            .parser
            .line_index_at(start)
            .unwrap_or(self.parser.lines().len().saturating_sub(1));
        let change_at = changes.first_changed().map_or(edited_line, |line| line.min(edited_line));
        debug!(version = self.version, change_at, changed = changes.changed.len(), "Applied edit");

        Ok(EditOutcome { version: self.version, changes, change_at })
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Result<EditOutcome, EditorError> {
        self.apply_edit(offset..offset, text)
    }

    pub fn delete(&mut self, range: Range<usize>) -> Result<EditOutcome, EditorError> {
        self.apply_edit(range, "")
    }

    pub fn outline(&mut self) -> &[OutlineScene] {
        self.parser.outline()
    }

    pub fn screenplay_options(&self) -> ScreenplayOptions {
        ScreenplayOptions {
            scene_number_start: self.settings.scene_number_start.unwrap_or(1),
            ..ScreenplayOptions::default()
        }
    }

    /// Immutable snapshot for pagination and export
    pub fn screenplay(&self) -> Arc<Screenplay> {
        Arc::new(Screenplay::from_parser(&self.parser, &self.screenplay_options()))
    }

    /// Full file contents: script text plus settings block
    pub fn serialize(&self) -> Result<String, EditorError> {
        self.settings.append(&self.text())
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        match self.storage {
            DocumentStorage::File { .. } => {
                std::fs::write(&self.path, self.serialize()?)?;
                self.storage = DocumentStorage::File { dirty: false };
                info!(path = %self.path.display(), version = self.version, "Saved document");
                Ok(())
            }
            DocumentStorage::Memory => Err(EditorError::NotFileBacked),
        }
    }

    /// Write to `path` and keep the document file-backed there
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        self.path = path.as_ref().to_path_buf();
        self.storage = DocumentStorage::File { dirty: true };
        self.save()
    }
}
