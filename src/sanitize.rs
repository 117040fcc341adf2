//! Pure validation of caller-supplied relative path strings.
//!
//! This module is deterministic and environment-free: no filesystem access,
//! no process state. It answers one question, whether a string is acceptable
//! as a relative path inside the vault, and returns the normalized form if so.
//! Location checks (root boundary, volume, symlinks) live in
//! [`crate::canonical`] and [`crate::guard`].

use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Per-component UTF-8 byte cap, matching common filesystem name limits.
pub const MAX_COMPONENT_BYTES: usize = 255;

/// Total-path UTF-8 byte cap across accepted components.
pub const MAX_PATH_BYTES: usize = 32 * 1024;

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '\\', '|', '?', '*'];

pub(crate) fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn is_reserved_device_name(segment: &str) -> bool {
    let upper = segment.to_ascii_uppercase();
    match upper.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => match upper.strip_prefix("COM").or_else(|| upper.strip_prefix("LPT")) {
            Some(rest) => rest.len() == 1 && matches!(rest.as_bytes()[0], b'1'..=b'9'),
            None => false,
        },
    }
}

/// Validates a relative path string and returns its normalized form.
///
/// Normalization: trim, Unicode NFC, backslashes to forward slashes, leading
/// slashes stripped, empty and `.` segments dropped, segments trimmed. Every
/// rejection is a hard error; nothing is silently repaired beyond the
/// normalization above. Idempotent on accepted inputs.
pub fn sanitize_relative_path(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Empty);
    }

    let composed: String = trimmed.nfc().collect();
    let slashed = composed.replace('\\', "/");
    let stripped = slashed.trim_start_matches('/');

    // Absolute drive paths are never acceptable as relative input.
    if has_drive_prefix(stripped) {
        return Err(Error::PathOutOfVault(trimmed.to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    let mut total_bytes = 0usize;
    for raw_segment in stripped.split('/') {
        if raw_segment.is_empty() {
            continue;
        }
        let segment = raw_segment.trim();
        if segment == "." {
            continue;
        }
        if segment == ".." {
            return Err(Error::PathOutOfVault(trimmed.to_string()));
        }
        if segment.is_empty()
            || segment
                .chars()
                .any(|c| FORBIDDEN_CHARS.contains(&c) || (c as u32) < 0x20)
        {
            return Err(Error::FilenameInvalid(format!(
                "segment contains a forbidden character: {raw_segment:?}"
            )));
        }
        if raw_segment.len() != raw_segment.trim_end().len() {
            return Err(Error::FilenameInvalid(format!(
                "segment ends in whitespace: {raw_segment:?}"
            )));
        }
        if is_reserved_device_name(segment) {
            return Err(Error::FilenameInvalid(format!(
                "reserved device name: {segment:?}"
            )));
        }
        if segment.len() > MAX_COMPONENT_BYTES {
            return Err(Error::NameTooLong(format!(
                "component is {} bytes (max {MAX_COMPONENT_BYTES})",
                segment.len()
            )));
        }
        total_bytes += segment.len();
        if total_bytes > MAX_PATH_BYTES {
            return Err(Error::NameTooLong(format!(
                "path exceeds {MAX_PATH_BYTES} bytes"
            )));
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        return Err(Error::FilenameInvalid(
            "path has no usable segments".to_string(),
        ));
    }
    Ok(segments.join("/"))
}
