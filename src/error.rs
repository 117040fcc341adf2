use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::roots::RootKey;

#[derive(Debug, Error)]
pub enum Error {
    #[error("path is empty")]
    Empty,

    #[error("path escapes the vault: {0:?}")]
    PathOutOfVault(String),

    #[error("invalid filename: {0}")]
    FilenameInvalid(String),

    #[error("name too long: {0}")]
    NameTooLong(String),

    #[error("UNC paths are not accepted")]
    UncRejected,

    #[error("path crosses a volume boundary: {0:?}")]
    CrossVolume(String),

    #[error("path is outside root '{root_key}': {path:?}")]
    OutsideRoot { root_key: RootKey, path: String },

    #[error("path segment is a symlink: {path}")]
    Symlink { path: PathBuf },

    #[error("invalid path: {0}")]
    Invalid(String),

    #[error("{op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Machine code for an [`Error`], exposed so the presentation layer can map
/// each code to one fixed user-facing message instead of parsing error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Empty,
    PathOutOfVault,
    FilenameInvalid,
    NameTooLong,
    UncRejected,
    CrossVolume,
    OutsideRoot,
    Symlink,
    Invalid,
    Io,
}

impl Error {
    pub(crate) fn io(op: &'static str, source: std::io::Error) -> Self {
        Error::Io { op, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Empty => ErrorKind::Empty,
            Error::PathOutOfVault(_) => ErrorKind::PathOutOfVault,
            Error::FilenameInvalid(_) => ErrorKind::FilenameInvalid,
            Error::NameTooLong(_) => ErrorKind::NameTooLong,
            Error::UncRejected => ErrorKind::UncRejected,
            Error::CrossVolume(_) => ErrorKind::CrossVolume,
            Error::OutsideRoot { .. } => ErrorKind::OutsideRoot,
            Error::Symlink { .. } => ErrorKind::Symlink,
            Error::Invalid(_) => ErrorKind::Invalid,
            Error::Io { .. } => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
