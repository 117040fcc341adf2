use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::roots::RootKey;

use super::Context;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadDirRequest {
    pub root: RootKey,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntryInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadDirResponse {
    pub path: String,
    /// Entries sorted by name.
    pub entries: Vec<DirEntryInfo>,
    pub skipped_io_errors: u64,
}

pub async fn read_dir(ctx: &Context, request: ReadDirRequest) -> Result<ReadDirResponse> {
    let clean = super::screen_input(&request.path, request.root)?;
    let canonical = ctx.canonicalize_and_verify(&clean, request.root)?;
    ctx.reject_symlinks(&canonical).await?;

    let mut reader = tokio::fs::read_dir(&canonical.real_path)
        .await
        .map_err(|err| Error::io("read_dir", err))?;

    let mut entries = Vec::<DirEntryInfo>::new();
    let mut skipped_io_errors: u64 = 0;
    while let Some(entry) = reader
        .next_entry()
        .await
        .map_err(|err| Error::io("read_dir", err))?
    {
        let file_type = match entry.file_type().await {
            Ok(value) => value,
            Err(_) => {
                skipped_io_errors += 1;
                continue;
            }
        };
        let kind = if file_type.is_file() {
            "file"
        } else if file_type.is_dir() {
            "dir"
        } else if file_type.is_symlink() {
            "symlink"
        } else {
            "other"
        };

        let mut size_bytes: u64 = 0;
        if file_type.is_file() {
            match entry.metadata().await {
                Ok(meta) => size_bytes = meta.len(),
                Err(_) => skipped_io_errors += 1,
            }
        }

        entries.push(DirEntryInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind: kind.to_string(),
            size_bytes,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(ReadDirResponse {
        path: canonical.relative_path().to_string(),
        entries,
        skipped_io_errors,
    })
}
