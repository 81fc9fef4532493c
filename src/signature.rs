//! Content signatures for generated files.
//!
//! Every file Quartermaster writes carries two trailing marker lines: a
//! SHA-256 digest of the content and the tool version that wrote it. On later
//! runs the digest tells us whether the user has edited the file since we
//! generated it, which drives the overwrite/skip policy in the update engine.
//!
//! A file with no markers (or markers we cannot parse) is classified
//! `Legacy`: it cannot be proven unedited, so it gets the same protection as
//! a modified file. Malformed markers never raise an error.

use crate::models::FileStatus;
use sha2::{Digest, Sha256};

const SIGNATURE_PREFIX: &str = "<!-- qm-signature: ";
const VERSION_PREFIX: &str = "<!-- qm-version: ";
const MARKER_SUFFIX: &str = " -->";

/// Compute the hex-encoded SHA-256 digest of content, trimmed.
///
/// Trimming makes the digest insensitive to trailing-newline churn from
/// editors, which would otherwise flag every file as modified.
fn digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Append signature markers to content.
///
/// The returned string is the trimmed content, a blank line, the signature
/// marker, the version marker, and a trailing newline.
pub fn sign(content: &str) -> String {
    let body = content.trim();
    let hash = digest(body);
    format!(
        "{body}\n\n{SIGNATURE_PREFIX}{hash}{MARKER_SUFFIX}\n{VERSION_PREFIX}{version}{MARKER_SUFFIX}\n",
        version = env!("CARGO_PKG_VERSION"),
    )
}

/// Classify content against its embedded signature.
///
/// Returns `Legacy` when no signature marker is present or the marker cannot
/// be parsed, `Pristine` when the recomputed digest matches the embedded one,
/// and `Modified` otherwise. Never fails.
pub fn verify(content: &str) -> FileStatus {
    let Some((original, embedded)) = split_markers(content) else {
        return FileStatus::Legacy;
    };

    // A well-formed signature is exactly 64 hex characters. Anything else is
    // indistinguishable from hand-written text that happens to look like a
    // marker, so treat it as legacy content.
    if embedded.len() != 64 || !embedded.bytes().all(|b| b.is_ascii_hexdigit()) {
        return FileStatus::Legacy;
    }

    if digest(&original) == embedded {
        FileStatus::Pristine
    } else {
        FileStatus::Modified
    }
}

/// Locate the marker block and split it off, returning the content as it was
/// before signing together with the embedded digest.
///
/// A marker block is a signature line immediately followed by a version line,
/// the exact shape [`sign`] emits. A stray marker-shaped line on its own in a
/// hand-written file does not count; only the last complete pair is honored.
fn split_markers(content: &str) -> Option<(String, String)> {
    let lines: Vec<&str> = content.lines().collect();
    let (index, embedded) = lines.windows(2).enumerate().rev().find_map(|(i, pair)| {
        let hash = parse_marker(pair[0], SIGNATURE_PREFIX)?;
        parse_marker(pair[1], VERSION_PREFIX)?;
        Some((i, hash))
    })?;

    let mut kept: Vec<&str> = Vec::with_capacity(lines.len().saturating_sub(2));
    kept.extend(&lines[..index]);
    kept.extend(&lines[index + 2..]);
    Some((kept.join("\n").trim().to_string(), embedded))
}

fn parse_marker(line: &str, prefix: &str) -> Option<String> {
    line.trim()
        .strip_prefix(prefix)?
        .strip_suffix(MARKER_SUFFIX)
        .map(|value| value.trim().to_string())
}
