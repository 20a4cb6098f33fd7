use std::path::PathBuf;

use serde::Serialize;

use crate::io::paths::LIST_EXTENSION;
use crate::io::store::FileInfo;

// ---------------------------------------------------------------------------
// JSON output types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListEntryJson {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Serialize)]
pub struct DeletedJson {
    pub deleted: PathBuf,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Human-readable listing of task list names
pub fn format_list(names: &[String], local: bool) -> Vec<String> {
    if names.is_empty() {
        let msg = if local {
            "No local task lists found in current directory"
        } else {
            "No global task lists found"
        };
        return vec![msg.to_string()];
    }
    let mut lines = vec![format!(
        "{} task lists:",
        if local { "Local" } else { "Global" }
    )];
    for name in names {
        if local {
            lines.push(format!("  {name}.{LIST_EXTENSION}"));
        } else {
            lines.push(format!("  {name}"));
        }
    }
    lines
}

pub fn format_file_info(info: &FileInfo) -> Vec<String> {
    let when = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".into())
    };
    vec![
        format!("Path:     {}", info.path.display()),
        format!("Size:     {} bytes", info.size),
        format!("Modified: {}", when(info.modified)),
        format!(
            "Version:  {}",
            info.version.as_deref().unwrap_or("legacy")
        ),
        format!("Created:  {}", when(info.created)),
        format!(
            "Tasks:    {} ({} including subtasks)",
            info.task_count, info.total_tasks
        ),
    ]
}

/// Whether a confirmation answer means yes
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")
}
