use std::path::PathBuf;
use thiserror::Error;

pub type StyleResult<T> = Result<T, StyleError>;

/// Failures surfaced to callers of the style cache
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Could not read stylesheet {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Style family '{name}' not found")]
    UnknownFamily { name: String },
}

impl StyleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn unknown_family(name: impl Into<String>) -> Self {
        Self::UnknownFamily { name: name.into() }
    }
}

/// Problems with a single declaration. These are logged and the declaration
/// is skipped; they never reach the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("Unknown property '{name}'")]
    UnknownProperty { name: String },

    #[error("Expected a boolean, found '{value}'")]
    NotBoolean { value: String },

    #[error("Unknown alignment '{value}'")]
    UnknownAlignment { value: String },

    #[error("Setting '{key}' is not available")]
    MissingSetting { key: String },

    #[error("Invalid expression '{expression}': {message}")]
    Expression { expression: String, message: String },
}

impl ValueError {
    pub fn expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Expression { expression: expression.into(), message: message.into() }
    }
}
