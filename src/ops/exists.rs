use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::roots::RootKey;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsRequest {
    pub root: RootKey,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsResponse {
    pub path: String,
    pub exists: bool,
}

/// Like the other operations, `exists` runs the full canonicalize-and-guard
/// sequence; the only difference is that a not-found result from the final
/// metadata query becomes `exists: false` instead of an error. Any other I/O
/// failure still propagates.
pub async fn exists(ctx: &Context, request: ExistsRequest) -> Result<ExistsResponse> {
    let clean = super::screen_input(&request.path, request.root)?;
    let canonical = ctx.canonicalize_and_verify(&clean, request.root)?;
    ctx.reject_symlinks(&canonical).await?;

    let exists = match tokio::fs::symlink_metadata(&canonical.real_path).await {
        Ok(_) => true,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => false,
        Err(err) => return Err(Error::io("metadata", err)),
    };

    Ok(ExistsResponse {
        path: canonical.relative_path().to_string(),
        exists,
    })
}
