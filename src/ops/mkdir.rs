use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::roots::RootKey;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MkdirRequest {
    pub root: RootKey,
    pub path: String,
    /// Create missing intermediate directories as well.
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MkdirResponse {
    pub path: String,
}

pub async fn mkdir(ctx: &Context, request: MkdirRequest) -> Result<MkdirResponse> {
    let clean = super::screen_input(&request.path, request.root)?;
    let canonical = ctx.canonicalize_and_verify(&clean, request.root)?;
    ctx.reject_symlinks(&canonical).await?;

    let result = if request.recursive {
        tokio::fs::create_dir_all(&canonical.real_path).await
    } else {
        tokio::fs::create_dir(&canonical.real_path).await
    };
    result.map_err(|err| Error::io("create_dir", err))?;
    tracing::debug!(root = %request.root, path = %canonical.relative_path(), "created directory");

    Ok(MkdirResponse {
        path: canonical.relative_path().to_string(),
    })
}
