//! Error taxonomy shared by every catpack crate

use crate::hash::ContentHash;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while locating, merging, or (de)serializing files
#[derive(Debug, Error)]
pub enum PackError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{count} files matched at \"{}\"; enable merge-all to combine them", root.display())]
    MultipleMatches { root: PathBuf, count: usize },

    #[error("Path \"{}\" does not exist or is not a directory", .0.display())]
    InvalidPath(PathBuf),

    #[error("Invalid glob pattern: {0}")]
    InvalidPattern(String),

    #[error("A non-empty separator is required to merge more than one file")]
    InvalidSeparator,

    #[error("I/O error on \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed container: {0}")]
    Decode(String),

    #[error("Hashes are not equal (file probably modified): stored {expected}, computed {actual}")]
    Integrity {
        expected: ContentHash,
        actual: ContentHash,
    },
}

/// Fieldless view of a [`PackError`], for matching on the category alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    MultipleMatches,
    InvalidPath,
    InvalidPattern,
    InvalidSeparator,
    Io,
    Decode,
    Integrity,
}

impl PackError {
    /// Wrap an I/O error with the path it occurred on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        PackError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PackError::NotFound(_) => ErrorKind::NotFound,
            PackError::MultipleMatches { .. } => ErrorKind::MultipleMatches,
            PackError::InvalidPath(_) => ErrorKind::InvalidPath,
            PackError::InvalidPattern(_) => ErrorKind::InvalidPattern,
            PackError::InvalidSeparator => ErrorKind::InvalidSeparator,
            PackError::Io { .. } => ErrorKind::Io,
            PackError::Decode(_) => ErrorKind::Decode,
            PackError::Integrity { .. } => ErrorKind::Integrity,
        }
    }
}
