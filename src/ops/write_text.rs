use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::roots::RootKey;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteTextRequest {
    pub root: RootKey,
    pub path: String,
    pub content: String,
    #[serde(default)]
    pub create_parents: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteTextResponse {
    pub path: String,
    pub bytes_written: u64,
    /// `false` when an existing file was overwritten.
    pub created: bool,
}

pub async fn write_text(ctx: &Context, request: WriteTextRequest) -> Result<WriteTextResponse> {
    let clean = super::screen_input(&request.path, request.root)?;
    let canonical = ctx.canonicalize_and_verify(&clean, request.root)?;
    ctx.reject_symlinks(&canonical).await?;

    let target = Path::new(&canonical.real_path);
    let created = match tokio::fs::symlink_metadata(target).await {
        Ok(_) => false,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
        Err(err) => return Err(Error::io("metadata", err)),
    };

    if request.create_parents {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| Error::io("create_dir_all", err))?;
        }
    }

    tokio::fs::write(target, request.content.as_bytes())
        .await
        .map_err(|err| Error::io("write", err))?;
    tracing::debug!(root = %request.root, path = %canonical.relative_path(), created, "wrote file");

    Ok(WriteTextResponse {
        path: canonical.relative_path().to_string(),
        bytes_written: request.content.len() as u64,
        created,
    })
}
