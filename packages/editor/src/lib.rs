//! # Scriptform Editor
//!
//! Live screenplay documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ file: script text + trailing settings block │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + edits          │
//! │  - Load/save documents                      │
//! │  - Incremental edits through the parser     │
//! │  - Document settings (JSON block)           │
//! │  - Screenplay snapshots for pagination      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ workspace: background pagination            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scriptform_editor::Document;
//!
//! let mut doc = Document::load("pilot.fountain")?;
//! let outcome = doc.insert(0, "FADE IN:\n\n")?;
//! let snapshot = doc.screenplay();
//! doc.save()?;
//! ```

mod document;
mod errors;
mod settings;

pub use document::{Document, DocumentStorage, EditOutcome};
pub use errors::EditorError;
pub use settings::{DocumentSettings, SETTINGS_END, SETTINGS_START};
