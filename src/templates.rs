//! Embedded content for generated files.
//!
//! Instruction-file bodies, the task record template, and the maintenance
//! scripts installed under `.quartermaster/scripts/`. All content here is
//! unsigned; callers run it through `signature::sign` before writing.

use crate::models::{Assistant, TaskType};

/// Shared workflow section appended to every instruction file.
const WORKFLOW_GUIDELINES: &str = r#"## Working with the task backlog

Tasks live in `.quartermaster/backlog/` as markdown files named
`TASK-<NNN>-<slug>.md`. To pick up work:

1. Read `.quartermaster/backlog.md` for the current index.
2. Open the task file and read its description and acceptance criteria.
3. When a task is finished, move its file to `.quartermaster/completed/`
   (use `.quartermaster/scripts/archive-task.sh`).

Create new tasks with `qm task init <type> "<title>"` rather than writing
task files by hand, so identifiers stay unique.

## House rules

- Do not edit files under `.quartermaster/completed/`.
- Keep task titles short; put detail in the task body.
- Project documentation lives in `.quartermaster/docs/`."#;

/// Generate the unsigned instruction-file body for an assistant.
pub fn instruction_body(assistant: Assistant) -> String {
    format!(
        "# Project instructions for {name}\n\
         \n\
         This file is generated and maintained by `qm`. Re-run `qm update` to\n\
         refresh it after upgrading the tool. If you edit this file by hand,\n\
         `qm update` will detect the edit and leave your version alone.\n\
         \n\
         {workflow}\n",
        name = assistant.display_name(),
        workflow = WORKFLOW_GUIDELINES,
    )
}

/// Generate the unsigned body of a new task record.
pub fn task_body(id: &str, task_type: TaskType, title: &str, created: &str) -> String {
    format!(
        "---\n\
         id: {id}\n\
         title: {title}\n\
         type: {task_type}\n\
         status: backlog\n\
         created: {created}\n\
         ---\n\
         \n\
         ## Description\n\
         \n\
         (Describe the work here.)\n\
         \n\
         ## Acceptance criteria\n\
         \n\
         - [ ] \n"
    )
}

/// One row of the backlog index.
pub struct IndexEntry {
    pub id: String,
    pub title: String,
    pub file_name: String,
}

/// Generate the unsigned backlog index body from the given entries.
///
/// The index is rebuilt from the backlog directory listing on every write,
/// so regenerating it never loses task entries.
pub fn backlog_index_body(entries: &[IndexEntry]) -> String {
    let mut body = String::from(
        "# Backlog\n\nGenerated from `.quartermaster/backlog/`. Do not edit by hand;\nrun `qm task init` to add tasks.\n\n",
    );
    if entries.is_empty() {
        body.push_str("_No open tasks._\n");
    } else {
        for entry in entries {
            body.push_str(&format!(
                "- [{id}](backlog/{file}): {title}\n",
                id = entry.id,
                file = entry.file_name,
                title = entry.title,
            ));
        }
    }
    body
}

/// Source of `scripts/backup.sh`.
pub const BACKUP_SCRIPT: &str = r#"#!/bin/sh
# Snapshot the managed directory next to the project.
set -eu
stamp="$(date +%Y%m%d-%H%M%S)"
dest="../.quartermaster-backups/$stamp"
mkdir -p "$dest"
cp -R . "$dest/"
echo "backup written to $dest"
"#;

/// Source of `scripts/archive-task.sh`.
pub const ARCHIVE_TASK_SCRIPT: &str = r#"#!/bin/sh
# Move a finished task record from backlog/ to completed/.
set -eu
if [ $# -ne 1 ]; then
    echo "usage: archive-task.sh TASK-NNN-slug.md" >&2
    exit 2
fi
mv "backlog/$1" "completed/$1"
echo "archived $1"
"#;
