use thiserror::Error;

pub type EditResult<T> = Result<T, EditError>;

/// Rejected edits. Parsing itself never fails; these only surface caller bugs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Edit range {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Edit range {start}..{end} is inverted")]
    InvertedRange { start: usize, end: usize },

    #[error("Offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
}

impl EditError {
    pub fn out_of_bounds(start: usize, end: usize, len: usize) -> Self {
        Self::OutOfBounds { start, end, len }
    }

    pub fn inverted(start: usize, end: usize) -> Self {
        Self::InvertedRange { start, end }
    }

    pub fn not_char_boundary(offset: usize) -> Self {
        Self::NotCharBoundary { offset }
    }
}
