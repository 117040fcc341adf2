//! Safe filesystem operations over the vault roots.
//!
//! This is the only surface the rest of the application calls. Every
//! operation runs the same mandatory sequence: fast-reject syntactically
//! absolute input, sanitize the relative path, canonicalize textually, walk
//! the symlink guard, and only then touch the filesystem with the canonical
//! path. No operation skips or reorders those steps for any input.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::roots::{LinkMetadata, RootKey};

mod context;
mod exists;
mod mkdir;
mod read_dir;
mod read_text;
mod remove;
mod write_text;

pub use exists::{exists, ExistsRequest, ExistsResponse};
pub use mkdir::{mkdir, MkdirRequest, MkdirResponse};
pub use read_dir::{read_dir, DirEntryInfo, ReadDirRequest, ReadDirResponse};
pub use read_text::{read_text, ReadTextRequest, ReadTextResponse};
pub use remove::{remove, RemoveRequest, RemoveResponse};
pub use write_text::{write_text, WriteTextRequest, WriteTextResponse};

#[cfg(test)]
mod tests;

/// Explicit, constructible context for the sandbox layer.
///
/// Holds the resolved base directory per [`RootKey`] (computed once at
/// construction) and the injected link-metadata provider used by the symlink
/// guard. There is no module-level mutable state; tests build their own
/// context with deterministic providers.
pub struct Context {
    metadata: Arc<dyn LinkMetadata>,
    app_data_base: String,
    attachments_base: String,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("app_data_base", &self.app_data_base)
            .field("attachments_base", &self.attachments_base)
            .finish_non_exhaustive()
    }
}

/// Screens raw operation input and returns the sanitized relative path.
///
/// First the cheap syntactic check: UNC-like strings are rejected as such,
/// and any other platform-absolute shape (leading slash or backslash, drive
/// letter) is an early `OutsideRoot`, since callers of this layer only ever
/// hold root-relative paths. What survives goes through the full filename
/// sanitizer, so hostile names (reserved devices, control characters,
/// trailing-whitespace segments) never reach canonicalization.
pub(crate) fn screen_input(raw: &str, root_key: RootKey) -> Result<String> {
    fast_reject_absolute(raw, root_key)?;
    crate::sanitize::sanitize_relative_path(raw)
}

pub(crate) fn fast_reject_absolute(raw: &str, root_key: RootKey) -> Result<()> {
    if crate::canonical::is_unc_like(raw) {
        return Err(Error::UncRejected);
    }
    let trimmed = raw.trim();
    if trimmed.starts_with('/')
        || trimmed.starts_with('\\')
        || crate::sanitize::has_drive_prefix(trimmed)
    {
        return Err(Error::OutsideRoot {
            root_key,
            path: trimmed.to_string(),
        });
    }
    Ok(())
}
