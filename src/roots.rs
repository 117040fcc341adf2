//! Logical storage roots and the platform collaborators they resolve through.
//!
//! A [`RootKey`] names a storage root; the absolute base directory behind it
//! comes from a [`PathProvider`]. Symlink detection during the guard walk goes
//! through [`LinkMetadata`], which normalizes the platform's link-metadata
//! query down to a single boolean. Both collaborators are traits so tests can
//! substitute deterministic implementations without touching module state.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Directory name of the attachments root, nested under the app-data base.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// Application directory name used under the OS data directory.
pub const DEFAULT_APP_DIR: &str = "homevault";

/// Closed set of logical storage roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootKey {
    AppData,
    Attachments,
}

impl RootKey {
    pub fn as_str(self) -> &'static str {
        match self {
            RootKey::AppData => "app_data",
            RootKey::Attachments => "attachments",
        }
    }
}

impl fmt::Display for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplies the OS-conventional application-data directory.
pub trait PathProvider: Send + Sync {
    fn app_data_dir(&self) -> Result<PathBuf>;
}

/// Production [`PathProvider`] backed by the platform's data directory.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    app_dir: String,
}

impl PlatformPaths {
    pub fn new(app_dir: impl Into<String>) -> Self {
        Self {
            app_dir: app_dir.into(),
        }
    }
}

impl PathProvider for PlatformPaths {
    fn app_data_dir(&self) -> Result<PathBuf> {
        let base = dirs::data_dir().ok_or_else(|| {
            Error::Invalid("platform exposes no application-data directory".to_string())
        })?;
        Ok(base.join(&self.app_dir))
    }
}

/// Normalized link-metadata query: "is this entry a symbolic link".
///
/// `Err(NotFound)` means the entry does not exist; callers decide what that
/// implies (the guard walk treats it as "nothing left to check"). All other
/// I/O errors pass through untouched.
#[async_trait]
pub trait LinkMetadata: Send + Sync {
    async fn is_symlink(&self, path: &Path) -> io::Result<bool>;
}

/// Production [`LinkMetadata`] backed by `tokio::fs::symlink_metadata`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioLinkMetadata;

#[async_trait]
impl LinkMetadata for TokioLinkMetadata {
    async fn is_symlink(&self, path: &Path) -> io::Result<bool> {
        let meta = tokio::fs::symlink_metadata(path).await?;
        Ok(meta.file_type().is_symlink())
    }
}

/// Converts a provider-supplied directory into base-string form: forward
/// slashes only, always ending in a separator.
pub(crate) fn normalize_base(path: &Path) -> Result<String> {
    let raw = path.to_str().ok_or_else(|| {
        Error::Invalid("application-data directory is not valid UTF-8".to_string())
    })?;
    if raw.is_empty() {
        return Err(Error::Invalid(
            "application-data directory is empty".to_string(),
        ));
    }
    let mut base = raw.replace('\\', "/");
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}
