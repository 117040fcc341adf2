use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::roots::RootKey;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub root: RootKey,
    pub path: String,
    /// Remove directory contents as well; without it, only empty directories
    /// can be removed.
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub path: String,
    pub was_dir: bool,
}

pub async fn remove(ctx: &Context, request: RemoveRequest) -> Result<RemoveResponse> {
    let clean = super::screen_input(&request.path, request.root)?;
    let canonical = ctx.canonicalize_and_verify(&clean, request.root)?;
    ctx.reject_symlinks(&canonical).await?;

    let meta = tokio::fs::symlink_metadata(&canonical.real_path)
        .await
        .map_err(|err| Error::io("metadata", err))?;

    let was_dir = meta.is_dir();
    let result = if was_dir {
        if request.recursive {
            tokio::fs::remove_dir_all(&canonical.real_path).await
        } else {
            tokio::fs::remove_dir(&canonical.real_path).await
        }
    } else {
        tokio::fs::remove_file(&canonical.real_path).await
    };
    result.map_err(|err| Error::io("remove", err))?;
    tracing::debug!(root = %request.root, path = %canonical.relative_path(), was_dir, "removed entry");

    Ok(RemoveResponse {
        path: canonical.relative_path().to_string(),
        was_dir,
    })
}
