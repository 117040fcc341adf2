use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::roots::RootKey;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadTextRequest {
    pub root: RootKey,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadTextResponse {
    /// Normalized root-relative path of the file that was read.
    pub path: String,
    pub bytes_read: u64,
    pub content: String,
}

pub async fn read_text(ctx: &Context, request: ReadTextRequest) -> Result<ReadTextResponse> {
    let clean = super::screen_input(&request.path, request.root)?;
    let canonical = ctx.canonicalize_and_verify(&clean, request.root)?;
    ctx.reject_symlinks(&canonical).await?;

    let content = tokio::fs::read_to_string(&canonical.real_path)
        .await
        .map_err(|err| Error::io("read", err))?;
    Ok(ReadTextResponse {
        path: canonical.relative_path().to_string(),
        bytes_read: content.len() as u64,
        content,
    })
}
