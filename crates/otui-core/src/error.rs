//! Error taxonomy for the engine.
//!
//! Only unrecoverable conditions surface as `Error`: malformed markup,
//! unreadable/unwritable files, and a missing instantiation target.
//! Resolution misses (unknown base style, unknown anchor target) and value
//! validation failures degrade in place and are logged instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed markup. `line` is 1-based.
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `instantiate_style` found no root-level node with the requested name.
    #[error("style '{0}' not found")]
    StyleNotFound(String),

    /// The instantiation target produced no widgets.
    #[error("failed to instantiate style '{0}'")]
    EmptyInstantiation(String),
}

impl Error {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            line,
            message: message.into(),
        }
    }
}
