//! `vault-fs` is the sandboxed filesystem access layer of the household
//! vault: root-bounded file operations addressed by a logical [`RootKey`]
//! plus a caller-supplied *relative* path string.
//!
//! Every operation runs the same mandatory sequence (filename sanitization,
//! textual canonicalization against the root's base directory, a
//! segment-by-segment symlink guard walk, and only then the platform
//! filesystem primitive), so a hostile path string can never escape its
//! root, traverse through a symbolic link, cross a drive boundary, or
//! smuggle a filesystem-hostile filename.
//!
//! Canonicalization is lexical on purpose: targets frequently do not exist
//! yet, so OS-level realpath resolution is unavailable. See
//! [`guard`] for the resulting TOCTOU trade-off.

pub mod canonical;
mod error;
pub mod guard;
pub mod ops;
pub mod roots;
pub mod sanitize;

pub use error::{Error, ErrorKind, Result};

pub use canonical::{canonicalize_and_verify, CanonicalResult};
pub use guard::reject_symlinks;
pub use ops::{
    exists, mkdir, read_dir, read_text, remove, write_text, Context, DirEntryInfo, ExistsRequest,
    ExistsResponse, MkdirRequest, MkdirResponse, ReadDirRequest, ReadDirResponse, ReadTextRequest,
    ReadTextResponse, RemoveRequest, RemoveResponse, WriteTextRequest, WriteTextResponse,
};
pub use roots::{
    LinkMetadata, PathProvider, PlatformPaths, RootKey, TokioLinkMetadata, ATTACHMENTS_DIR,
};
pub use sanitize::{sanitize_relative_path, MAX_COMPONENT_BYTES, MAX_PATH_BYTES};
