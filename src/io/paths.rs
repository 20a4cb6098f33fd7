use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// File extension for task lists
pub const LIST_EXTENSION: &str = "dot";

/// Name used when no list name is given
pub const DEFAULT_LIST_NAME: &str = "tasks";

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error(
        "invalid task list name '{0}': names start with a letter or digit and may contain letters, digits, '.', '_' and '-'"
    )]
    InvalidName(String),
    #[error("could not determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// How a task list was located
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// `$XDG_CONFIG_HOME/dotdot/tasks/NAME.dot`
    Global,
    /// `NAME.dot` in the working directory
    Local,
    /// An explicit `--file` path
    File,
}

/// A resolved task list file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLocation {
    pub path: PathBuf,
    pub scope: ListScope,
}

impl ListLocation {
    /// List name: the file stem
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_LIST_NAME.to_string())
    }

    /// Header label: `name (global)`, `name (local)`, or `name (<dir>)` for
    /// files outside the working directory.
    pub fn display_name(&self) -> String {
        let name = self.name();
        if self.path.starts_with(global_tasks_dir()) {
            return format!("{name} (global)");
        }
        let absolute = absolutize(&self.path);
        if let Ok(cwd) = std::env::current_dir()
            && let Ok(rel) = absolute.strip_prefix(&cwd)
        {
            return match rel.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => {
                    format!("{} (local)", rel.with_extension("").display())
                }
                _ => format!("{name} (local)"),
            };
        }
        let dir = absolute
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        format!("{name} ({dir})")
    }
}

/// The dotdot config directory: `$XDG_CONFIG_HOME/dotdot`, falling back to
/// `~/.config/dotdot`.
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"));
    base.join("dotdot")
}

/// Directory holding global task lists
pub fn global_tasks_dir() -> PathBuf {
    config_dir().join("tasks")
}

/// Path to config.toml
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid name pattern"));

/// Strip a trailing `.dot` and check the name is a plain file stem.
pub fn normalize_name(name: &str) -> Result<String, PathError> {
    let trimmed = name.strip_suffix(".dot").unwrap_or(name);
    if NAME_PATTERN.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(PathError::InvalidName(name.to_string()))
    }
}

/// Resolve which file a command operates on.
///
/// `--file` wins and is taken verbatim. `--local` looks in the working
/// directory. Otherwise the list is global.
pub fn resolve_list(
    name: Option<&str>,
    local: bool,
    file: Option<&Path>,
) -> Result<ListLocation, PathError> {
    if let Some(path) = file {
        return Ok(ListLocation {
            path: path.to_path_buf(),
            scope: ListScope::File,
        });
    }
    let name = normalize_name(name.unwrap_or(DEFAULT_LIST_NAME))?;
    let file_name = format!("{name}.{LIST_EXTENSION}");
    if local {
        let cwd = std::env::current_dir().map_err(PathError::CurrentDir)?;
        Ok(ListLocation {
            path: cwd.join(file_name),
            scope: ListScope::Local,
        })
    } else {
        Ok(ListLocation {
            path: global_tasks_dir().join(file_name),
            scope: ListScope::Global,
        })
    }
}
