//! Path containment checks.
//!
//! Every filesystem path the tool touches is resolved through this module
//! first. A candidate path is joined to the project root, normalized without
//! touching the filesystem, and rejected if the result is not a descendant of
//! the root. `resolve_following_links` additionally chases an existing
//! symlink and re-validates its real target, so a link inside the project
//! cannot smuggle writes outside it.

use crate::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolve `candidate` against `root`, rejecting anything that escapes.
///
/// `candidate` may be relative (joined to `root`) or absolute. The result is
/// normalized lexically, so the target does not need to exist. Returns
/// `Error::SecurityViolation` if the normalized path is not under `root`.
pub fn resolve(candidate: &Path, root: &Path) -> Result<PathBuf> {
    let root = normalize(&absolute(root)?);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };
    let resolved = normalize(&joined);

    if resolved.strip_prefix(&root).is_err() {
        return Err(Error::SecurityViolation(candidate.to_path_buf()));
    }
    Ok(resolved)
}

/// Resolve `candidate` against `root` and, if the target exists and is a
/// symbolic link, verify the link's real destination is also under `root`.
///
/// A path that does not exist yet is not an error; files about to be written
/// pass through here before creation. The pre-link-resolution path is
/// returned either way.
pub fn resolve_following_links(candidate: &Path, root: &Path) -> Result<PathBuf> {
    let resolved = resolve(candidate, root)?;

    let Ok(meta) = fs::symlink_metadata(&resolved) else {
        return Ok(resolved);
    };
    if meta.file_type().is_symlink() {
        let real = fs::canonicalize(&resolved)?;
        // Compare against the canonicalized root so that a root which itself
        // lives behind a symlink (e.g. /tmp on macOS) still validates.
        let real_root = fs::canonicalize(root)?;
        if real.strip_prefix(&real_root).is_err() {
            return Err(Error::SecurityViolation(candidate.to_path_buf()));
        }
    }
    Ok(resolved)
}

/// Make a path absolute against the current working directory.
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Normalize `.` and `..` components without touching the filesystem.
///
/// `..` at the root is retained rather than dropped, so a traversal like
/// `/a/../../etc` cannot normalize back inside the root by accident.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    result.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    result.pop();
                } else if !result.has_root() {
                    result.push("..");
                }
            }
            _ => result.push(component),
        }
    }
    result
}
