use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a save waits for another writer before giving up
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Exclusive advisory lock on a task list, released when dropped.
///
/// The flock is taken on a `<list>.lock` sibling. That file is left in
/// place on release: unlinking it would let a later writer lock a new
/// inode while a waiter still holds the old one.
#[derive(Debug)]
pub struct ListLock {
    _file: File,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("{path} is held by another dotdot process")]
    Busy { path: PathBuf },
}

/// `work.dot` → `work.dot.lock`
pub fn lock_path_for(list: &Path) -> PathBuf {
    let mut name = list
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("tasks"));
    name.push(".lock");
    list.with_file_name(name)
}

impl ListLock {
    pub fn acquire(list: &Path) -> Result<Self, LockError> {
        Self::acquire_within(list, DEFAULT_WAIT)
    }

    /// Poll for the lock until `wait` has passed. The list's directory
    /// must already exist.
    pub fn acquire_within(list: &Path, wait: Duration) -> Result<Self, LockError> {
        let path = lock_path_for(list);
        let open_err = |source| LockError::Open {
            path: path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_err)?;

        let deadline = Instant::now() + wait;
        loop {
            if try_flock(&file).map_err(open_err)? {
                return Ok(ListLock { _file: file });
            }
            if Instant::now() >= deadline {
                return Err(LockError::Busy { path });
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
    }
}

/// Non-blocking exclusive flock. `Ok(false)` means someone else holds it.
#[cfg(unix)]
fn try_flock(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> io::Result<bool> {
    Ok(true)
}
