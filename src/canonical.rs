//! Textual canonicalization of `(relative path, root key)` pairs.
//!
//! Canonicalization here is purely lexical: it never queries the filesystem,
//! because the target of an operation frequently does not exist yet (there is
//! nothing for the OS to resolve when creating a new file). The filesystem is
//! consulted exactly once, later, by the symlink guard in [`crate::guard`].
//!
//! This module resolves *location* only. Filename legality (forbidden
//! characters, reserved device names, byte caps) is the sanitizer's job and
//! is deliberately not repeated here.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::ops::Context;
use crate::roots::RootKey;

/// A canonicalized absolute path, verified to sit under its root's base.
///
/// Invariant: `real_path` starts with `base` as a literal string prefix.
/// Ephemeral: computed per call and never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalResult {
    pub input: String,
    pub root_key: RootKey,
    pub base: String,
    pub real_path: String,
}

impl CanonicalResult {
    /// Root-relative remainder of `real_path`.
    pub fn relative_path(&self) -> &str {
        self.real_path.get(self.base.len()..).unwrap_or_default()
    }
}

/// Detects literal UNC forms: a leading `\\`, or a leading `//host` as
/// opposed to a bare `//`. Checked on the raw input, before any
/// normalization, so such strings are never joined onto a base even
/// transiently.
pub(crate) fn is_unc_like(raw: &str) -> bool {
    if raw.starts_with("\\\\") {
        return true;
    }
    match raw.strip_prefix("//") {
        Some(rest) => rest.chars().next().is_some_and(|c| c != '/'),
        None => false,
    }
}

fn drive_prefix(s: &str) -> Option<u8> {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        Some(bytes[0])
    } else {
        None
    }
}

/// Canonicalizes `input` against the base directory of `root_key` and
/// verifies the result stays under that base.
///
/// Separator conversion and `.`/`..` collapse are textual (stack-based: push
/// a segment, pop on `..` unless the stack is empty or topped by `..`).
/// Absolute candidates are never joined onto the base; they must already be
/// literal-prefix matches under it or the call fails with `OutsideRoot`.
pub fn canonicalize_and_verify(
    ctx: &Context,
    input: &str,
    root_key: RootKey,
) -> Result<CanonicalResult> {
    if is_unc_like(input) {
        return Err(Error::UncRejected);
    }
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Empty);
    }

    let slashed = trimmed.replace('\\', "/");
    let (drive, rest) = match drive_prefix(&slashed) {
        Some(letter) => (Some(letter), &slashed[2..]),
        None => (None, slashed.as_str()),
    };
    let rooted = drive.is_some() || rest.starts_with('/');
    let rest = rest.trim_start_matches('/');

    let mut stack: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => match stack.last() {
                None | Some(&"..") => stack.push(".."),
                Some(_) => {
                    stack.pop();
                }
            },
            other => stack.push(other),
        }
    }
    if stack.iter().any(|segment| *segment == "..") {
        return Err(Error::PathOutOfVault(trimmed.to_string()));
    }

    let base = ctx.base_for(root_key).to_string();

    if let (Some(candidate_drive), Some(base_drive)) = (drive, drive_prefix(&base)) {
        if !candidate_drive.eq_ignore_ascii_case(&base_drive) {
            return Err(Error::CrossVolume(trimmed.to_string()));
        }
    }

    let joined = stack.join("/");
    let real_path = if rooted {
        match drive {
            Some(letter) => format!("{}:/{joined}", letter as char),
            None => format!("/{joined}"),
        }
    } else if joined.is_empty() {
        base.clone()
    } else {
        format!("{base}{joined}")
    };

    if !real_path.starts_with(&base) {
        return Err(Error::OutsideRoot {
            root_key,
            path: trimmed.to_string(),
        });
    }

    Ok(CanonicalResult {
        input: input.to_string(),
        root_key,
        base,
        real_path,
    })
}
