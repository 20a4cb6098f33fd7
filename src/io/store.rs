//! Task list persistence: the on-disk JSON format, atomic saves with a
//! `.bak` copy of the previous file, and directory listing for the CLI.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::io::lock::{ListLock, LockError, lock_path_for};
use crate::io::paths::LIST_EXTENSION;
use crate::model::task::{Task, TaskId, TaskStatus};

/// Format version written into every file
pub const CURRENT_VERSION: &str = "1.0.0";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("task '{id}' has invalid status code {code}")]
    InvalidStatus { id: String, code: i64 },
    #[error("duplicate task id '{0}'")]
    DuplicateId(String),
    #[error("task list file {0} does not exist")]
    NotFound(PathBuf),
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Where the session loads its forest from and saves it to.
pub trait Persistence {
    fn load(&mut self) -> Result<Vec<Task>, StoreError>;
    fn save(&mut self, tasks: &[Task]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct FileData {
    #[serde(default)]
    version: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    tasks: Vec<TaskRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    subtasks: Vec<TaskRecord>,
}

/// Older writers emitted `null` for an empty child list
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<TaskRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<TaskRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

fn to_records(tasks: &[Task]) -> Vec<TaskRecord> {
    tasks
        .iter()
        .map(|t| TaskRecord {
            id: t.id.to_string(),
            title: t.title.clone(),
            status: i64::from(t.status.code()),
            subtasks: to_records(&t.subtasks),
        })
        .collect()
}

fn from_records(records: Vec<TaskRecord>, seen: &mut HashSet<String>) -> Result<Vec<Task>, StoreError> {
    let mut tasks = Vec::with_capacity(records.len());
    for record in records {
        let status = TaskStatus::from_code(record.status).ok_or_else(|| StoreError::InvalidStatus {
            id: record.id.clone(),
            code: record.status,
        })?;
        let id = if record.id.is_empty() {
            TaskId::generate()
        } else {
            TaskId::from(record.id)
        };
        if !seen.insert(id.to_string()) {
            return Err(StoreError::DuplicateId(id.to_string()));
        }
        let subtasks = from_records(record.subtasks, seen)?;
        tasks.push(Task::with_id(id, record.title, status).with_subtasks(subtasks));
    }
    Ok(tasks)
}

/// Parsed file contents
struct Decoded {
    tasks: Vec<Task>,
    version: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

fn decode(path: &Path, data: &str) -> Result<Decoded, StoreError> {
    let parse_err = |source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let value: serde_json::Value = serde_json::from_str(data).map_err(parse_err)?;
    if value.is_array() {
        let records: Vec<TaskRecord> = serde_json::from_value(value).map_err(parse_err)?;
        warn!(path = %path.display(), "loaded legacy format file, will be upgraded on next save");
        return Ok(Decoded {
            tasks: from_records(records, &mut HashSet::new())?,
            version: None,
            created_at: None,
        });
    }
    let file: FileData = serde_json::from_value(value).map_err(parse_err)?;
    if file.version != CURRENT_VERSION {
        warn!(
            path = %path.display(),
            version = %file.version,
            current = CURRENT_VERSION,
            "task file version differs from current"
        );
    }
    Ok(Decoded {
        tasks: from_records(file.tasks, &mut HashSet::new())?,
        version: Some(file.version),
        created_at: file.created_at,
    })
}

fn read_file(path: &Path) -> Result<Option<Decoded>, StoreError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    if data.trim().is_empty() {
        return Ok(None);
    }
    decode(path, &data).map(Some)
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// `<file>.bak` beside the task list
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Copy the current file to `<file>.bak`. A missing file is not an error.
fn create_backup(path: &Path) -> io::Result<()> {
    match fs::copy(path, backup_path(path)) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// Task list stored as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    backup: bool,
    created_at: Option<DateTime<Utc>>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            backup: true,
            created_at: None,
        }
    }

    /// Toggle the `.bak` copy made before each save
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFileStore {
    fn load(&mut self) -> Result<Vec<Task>, StoreError> {
        let Some(decoded) = read_file(&self.path)? else {
            info!(path = %self.path.display(), "no existing task file, starting empty");
            return Ok(Vec::new());
        };
        self.created_at = decoded.created_at;
        info!(
            path = %self.path.display(),
            tasks = decoded.tasks.len(),
            "loaded task list"
        );
        Ok(decoded.tasks)
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let _lock = ListLock::acquire(&self.path)?;

        if self.backup
            && let Err(e) = create_backup(&self.path)
        {
            warn!(path = %self.path.display(), error = %e, "failed to create backup");
        }

        let now = Utc::now();
        let created_at = *self.created_at.get_or_insert(now);
        let file = FileData {
            version: CURRENT_VERSION.to_string(),
            created_at: Some(created_at),
            updated_at: Some(now),
            tasks: to_records(tasks),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|e| write_err(io::Error::other(e)))?;
        atomic_write(&self.path, &json).map_err(write_err)?;
        info!(path = %self.path.display(), "saved task list");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store that keeps the forest in memory. Used for sessions with no file
/// and by tests that need to observe saves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub tasks: Vec<Task>,
    pub saves: usize,
    /// When set, every save fails with this message
    pub fail_with: Option<String>,
}

impl MemoryStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        MemoryStore {
            tasks,
            ..Default::default()
        }
    }
}

impl Persistence for MemoryStore {
    fn load(&mut self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.clone())
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), StoreError> {
        if let Some(msg) = &self.fail_with {
            return Err(StoreError::Write {
                path: PathBuf::from("<memory>"),
                source: io::Error::other(msg.clone()),
            });
        }
        self.tasks = tasks.to_vec();
        self.saves += 1;
        Ok(())
    }
}

/// Shared handle, so a caller can keep inspecting a store it handed over
impl<P: Persistence> Persistence for Rc<RefCell<P>> {
    fn load(&mut self) -> Result<Vec<Task>, StoreError> {
        self.borrow_mut().load()
    }

    fn save(&mut self, tasks: &[Task]) -> Result<(), StoreError> {
        self.borrow_mut().save(tasks)
    }
}

// ---------------------------------------------------------------------------
// Directory operations
// ---------------------------------------------------------------------------

/// Names (without extension) of the task lists in `dir`, sorted.
/// A missing directory has no lists.
pub fn list_task_lists(dir: &Path) -> Result<Vec<String>, StoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StoreError::Read {
                path: dir.to_path_buf(),
                source: e,
            });
        }
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::Read {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file()
            && path.extension().is_some_and(|ext| ext == LIST_EXTENSION)
            && let Some(stem) = path.file_stem()
        {
            names.push(stem.to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Back up and remove a task list file, along with its lock file.
pub fn delete_task_list(path: &Path) -> Result<(), StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let _lock = ListLock::acquire(path)?;
    if let Err(e) = create_backup(path) {
        warn!(path = %path.display(), error = %e, "failed to create backup before deletion");
    }
    fs::remove_file(path).map_err(|e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    let _ = fs::remove_file(lock_path_for(path));
    info!(path = %path.display(), "deleted task list");
    Ok(())
}

/// Metadata about a task list file
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub created: Option<DateTime<Utc>>,
    /// Top-level tasks
    pub task_count: usize,
    /// All tasks including subtasks
    pub total_tasks: usize,
}

pub fn file_info(path: &Path) -> Result<FileInfo, StoreError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    let modified = meta.modified().ok().map(DateTime::<Utc>::from);
    let decoded = read_file(path)?;
    let (version, created, task_count, total_tasks) = match decoded {
        Some(d) => (
            d.version,
            d.created_at,
            d.tasks.len(),
            d.tasks.iter().map(Task::subtree_len).sum(),
        ),
        None => (None, None, 0, 0),
    };
    Ok(FileInfo {
        path: path.to_path_buf(),
        size: meta.len(),
        modified,
        version,
        created,
        task_count,
        total_tasks,
    })
}
