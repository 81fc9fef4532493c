//! Classification scans over the managed files.
//!
//! The scanner reads each target file and classifies it with the signature
//! module. Scanning is read-only and deliberately forgiving: a path that
//! fails the containment check or does not exist classifies as `Missing`,
//! and a file that cannot be read as UTF-8 text classifies as `Legacy`.
//! Errors never escape a scan.

use crate::models::{FileStatus, ScanResult};
use crate::{MANAGED_DIR, Result, paths, signature};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

/// Project-relative paths scanned when no explicit target list is given:
/// the known instruction files plus the managed index.
pub fn default_targets() -> Vec<String> {
    let mut targets: Vec<String> = crate::models::Assistant::ALL
        .iter()
        .map(|a| a.file_name().to_string())
        .collect();
    targets.push(format!("{MANAGED_DIR}/backlog.md"));
    targets
}

/// Classify each target file under `project_root`.
///
/// Targets are read concurrently; the returned vector is ordered positionally
/// to match `targets` regardless of which read finishes first.
pub fn scan(project_root: &Path, targets: &[String]) -> Result<Vec<ScanResult>> {
    let results = thread::scope(|s| {
        let handles: Vec<_> = targets
            .iter()
            .map(|target| s.spawn(move || scan_one(project_root, target)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| crate::Error::Other("scan worker panicked".to_string()))
            })
            .collect::<Result<Vec<_>>>()
    })?;
    Ok(results)
}

/// Classify all default targets.
pub fn scan_default(project_root: &Path) -> Result<Vec<ScanResult>> {
    scan(project_root, &default_targets())
}

fn scan_one(project_root: &Path, rel_path: &str) -> ScanResult {
    // A containment failure on a scan input means there is nothing to report
    // at that path; scanning never mutates, so downgrade rather than surface
    // the violation.
    let path = match paths::resolve_following_links(Path::new(rel_path), project_root) {
        Ok(path) => path,
        Err(_) => {
            return ScanResult {
                path: PathBuf::from(rel_path),
                rel_path: rel_path.to_string(),
                status: FileStatus::Missing,
            };
        }
    };

    let status = if !path.exists() {
        FileStatus::Missing
    } else {
        match fs::read_to_string(&path) {
            Ok(content) => signature::verify(&content),
            // Unreadable or non-UTF-8 content cannot be proven pristine.
            Err(_) => FileStatus::Legacy,
        }
    };

    ScanResult {
        path,
        rel_path: rel_path.to_string(),
        status,
    }
}
