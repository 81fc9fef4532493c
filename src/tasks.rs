//! Task records and sequential id allocation.
//!
//! Task files live under `.quartermaster/backlog/` and are named
//! `TASK-<NNN>-<slug>.md`. Identifiers are allocated by scanning the backlog
//! for the highest number in use, then claiming the next filename with an
//! exclusive create (`O_CREAT|O_EXCL`). The exclusive create is the only
//! mutual-exclusion primitive: two concurrent allocators may race to the same
//! candidate, in which case the loser re-scans and retries with the next
//! number, up to a bounded attempt count.
//!
//! Ids are derived from the backlog directory only. A task moved to
//! `completed/` no longer contributes to the observed maximum, so its number
//! can be handed out again unless `last_issued` in a live allocator still
//! covers it. See DESIGN.md for the trade-off.

use crate::models::TaskType;
use crate::{Error, MANAGED_DIR, Result, paths, signature, templates};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Width of the zero-padded numeric id in filenames.
const ID_WIDTH: usize = 3;

/// Attempts before giving up on claiming a filename.
const MAX_ATTEMPTS: u32 = 10;

const TASK_PREFIX: &str = "TASK-";

/// A successfully claimed task file.
#[derive(Debug, serde::Serialize)]
pub struct AllocatedTask {
    /// Full identifier, e.g. "TASK-007"
    pub id: String,
    /// Numeric part of the identifier
    pub number: u32,
    /// Absolute path of the created file
    pub path: PathBuf,
    /// Path relative to the project root
    pub rel_path: String,
}

/// Hands out sequential task ids and claims their files.
///
/// `last_issued` remembers the highest number this instance has handed out,
/// which keeps rapid sequential allocations from racing each other through
/// the directory scan. It is per-instance state, not a global; independent
/// allocators coordinate only through the filesystem.
pub struct TaskIdAllocator {
    project_root: PathBuf,
    last_issued: u32,
}

impl TaskIdAllocator {
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            last_issued: 0,
        }
    }

    /// Allocate the next id and atomically create the task file with the
    /// given content.
    ///
    /// Retries on filename collision up to a bounded attempt count, then
    /// returns `Error::TaskIdExhausted`.
    pub fn allocate(
        &mut self,
        task_type: TaskType,
        title: &str,
        content: &str,
    ) -> Result<AllocatedTask> {
        let backlog = self.backlog_dir()?;
        let slug = slugify(title);

        for _ in 0..MAX_ATTEMPTS {
            let number = self.observed_max(&backlog)?.max(self.last_issued) + 1;
            let id = format!("{TASK_PREFIX}{number:0ID_WIDTH$}");
            let file_name = format!("{id}-{task_type}-{slug}.md");
            let rel_path = format!("{MANAGED_DIR}/backlog/{file_name}");
            let path = paths::resolve(Path::new(&rel_path), &self.project_root)?;

            // create_new is the atomic claim: it fails with AlreadyExists if
            // another writer got here first, with no window between check
            // and write.
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())?;
                    self.last_issued = number;
                    return Ok(AllocatedTask {
                        id,
                        number,
                        path,
                        rel_path,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    // Lost the race; advance past the contested number and
                    // re-scan.
                    self.last_issued = number;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::TaskIdExhausted(MAX_ATTEMPTS))
    }

    /// Highest task number currently visible in the backlog directory.
    fn observed_max(&self, backlog: &Path) -> Result<u32> {
        let mut max = 0;
        for entry in fs::read_dir(backlog)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(number) = parse_task_number(&name.to_string_lossy()) {
                max = max.max(number);
            }
        }
        Ok(max)
    }

    fn backlog_dir(&self) -> Result<PathBuf> {
        let rel = format!("{MANAGED_DIR}/backlog");
        let dir = paths::resolve(Path::new(&rel), &self.project_root)?;
        if !dir.is_dir() {
            return Err(Error::NotInitialized);
        }
        Ok(dir)
    }
}

/// Parse the numeric id out of a task filename, if it matches the pattern.
fn parse_task_number(file_name: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(TASK_PREFIX)?;
    let digits: &str = rest.split('-').next()?;
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Lowercase, alphanumeric, hyphen-separated slug for filenames.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "task".to_string()
    } else {
        slug.to_string()
    }
}

/// Create a new task record: allocate an id, write the task file, then
/// regenerate and re-sign the backlog index.
pub fn create_task(
    project_root: &Path,
    task_type: TaskType,
    title: &str,
) -> Result<AllocatedTask> {
    let mut allocator = TaskIdAllocator::new(project_root);
    let created = Utc::now().format("%Y-%m-%d").to_string();

    // Claim the filename first; the header is written once the id is final.
    // The file is exclusively ours after the claim, so the follow-up write
    // does not race.
    let task = allocator.allocate(task_type, title, "")?;
    let body = templates::task_body(&task.id, task_type, title, &created);
    fs::write(&task.path, body)?;

    refresh_backlog_index(project_root)?;
    Ok(task)
}

/// Rebuild `.quartermaster/backlog.md` from the backlog directory and sign it.
pub fn refresh_backlog_index(project_root: &Path) -> Result<()> {
    let entries = list_backlog(project_root)?;
    let body = templates::backlog_index_body(&entries);
    let rel = format!("{MANAGED_DIR}/backlog.md");
    let path = paths::resolve_following_links(Path::new(&rel), project_root)?;
    fs::write(&path, signature::sign(&body))?;
    Ok(())
}

/// List task records in the backlog, sorted by filename (id order).
pub fn list_backlog(project_root: &Path) -> Result<Vec<templates::IndexEntry>> {
    let rel = format!("{MANAGED_DIR}/backlog");
    let backlog = paths::resolve(Path::new(&rel), project_root)?;
    if !backlog.is_dir() {
        return Err(Error::NotInitialized);
    }

    let mut names: Vec<String> = fs::read_dir(&backlog)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| parse_task_number(name).is_some())
        .collect();
    names.sort();

    let entries = names
        .into_iter()
        .map(|file_name| {
            let number = parse_task_number(&file_name).unwrap_or(0);
            let id = format!("{TASK_PREFIX}{number:0ID_WIDTH$}");
            let title = title_from_file(&backlog.join(&file_name))
                .unwrap_or_else(|| file_name.clone());
            templates::IndexEntry {
                id,
                title,
                file_name,
            }
        })
        .collect();
    Ok(entries)
}

/// Pull the title out of a task file's front-matter header.
fn title_from_file(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    content
        .lines()
        .find_map(|line| line.strip_prefix("title: "))
        .map(|t| t.trim().to_string())
}
