//! # Scriptform Parser
//!
//! Incremental parser for Fountain-style screenplay text.
//!
//! ## Model
//!
//! A document is an ordered sequence of [`Line`]s. Every line records its
//! absolute byte offset, its [`LineType`] and a few flags. Offsets are
//! contiguous: each line starts where the previous one ended, counting the
//! newline it owns.
//!
//! ## Incremental parsing
//!
//! [`Parser::apply_edit`] patches the line sequence after a text edit and
//! reports the affected lines in a [`ChangeSet`]. Reclassification starts one
//! line before the edit and runs until classifications stop changing, so the
//! patched sequence is always the one a full [`Parser::parse`] would produce.

pub mod classifier;
pub mod error;
pub mod line;
pub mod macros;
pub mod outline;
pub mod parser;
pub mod screenplay;
pub mod title_page;

#[cfg(test)]
mod tests_incremental;

pub use classifier::{classify, Classification, Neighbours, ParseState, TitlePageState};
pub use error::{EditError, EditResult};
pub use line::{strip_inline_markup, Line, LineType, SceneNumberMarker};
pub use macros::MacroResolver;
pub use outline::{build_outline, number_scenes, OutlineScene};
pub use parser::{parse, ChangeSet, Parser};
pub use screenplay::{Screenplay, ScreenplayOptions};
pub use title_page::{TitlePage, TitlePageField};
