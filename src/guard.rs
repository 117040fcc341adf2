//! Segment-by-segment symlink rejection.
//!
//! The guard is the only place in this layer that touches real filesystem
//! metadata. It walks the canonical path from the base outward and asks the
//! injected [`LinkMetadata`] provider whether each accumulated prefix is a
//! symbolic link; a single `lstat` on the leaf would miss a symlinked
//! intermediate directory.
//!
//! IMPORTANT DESIGN NOTE:
//!
//! The walk and the filesystem primitive that follows it are not atomic. A
//! hostile, racing process could substitute a symlink between the check and
//! the use; the platform offers no general "open relative to parent, never
//! following a symlink at any ancestor" primitive to close that window. The
//! guard is defense-in-depth on top of the textual canonicalization, not an
//! OS-sandbox-equivalent guarantee.

use std::path::PathBuf;

use crate::canonical::CanonicalResult;
use crate::error::{Error, Result};
use crate::ops::Context;
use crate::roots::LinkMetadata;

/// Rejects `canonical.real_path` if any of its segments below the base is a
/// symbolic link.
///
/// Recomputes the base and re-verifies the prefix invariant first, so the
/// guard stays safe when invoked standalone. A segment that does not exist
/// ends the walk successfully: a not-yet-existing component cannot be a
/// symlink, and create-new workflows must not be blocked.
pub async fn reject_symlinks(ctx: &Context, canonical: &CanonicalResult) -> Result<()> {
    let base = ctx.base_for(canonical.root_key);
    if !canonical.real_path.starts_with(base) {
        return Err(Error::OutsideRoot {
            root_key: canonical.root_key,
            path: canonical.input.clone(),
        });
    }

    let remainder = &canonical.real_path[base.len()..];
    let mut current = base.trim_end_matches('/').to_string();
    for segment in remainder.split('/').filter(|segment| !segment.is_empty()) {
        current.push('/');
        current.push_str(segment);
        match ctx
            .link_metadata()
            .is_symlink(std::path::Path::new(&current))
            .await
        {
            Ok(true) => {
                tracing::warn!(
                    root = %canonical.root_key,
                    path = %current,
                    "rejecting path with symlinked segment"
                );
                return Err(Error::Symlink {
                    path: PathBuf::from(current),
                });
            }
            Ok(false) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(Error::io("symlink_metadata", err)),
        }
    }
    Ok(())
}
