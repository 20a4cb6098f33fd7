use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::model::config::LogConfig;

/// Environment variable naming a log file; overrides `[log] file`
pub const LOG_FILE_ENV: &str = "DOTDOT_LOG";

const DEFAULT_LEVEL: &str = "info";

/// Resolve the log file: `DOTDOT_LOG` first, then the config.
pub fn log_file_path(config: &LogConfig) -> Option<PathBuf> {
    std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| config.file.clone())
        .map(PathBuf::from)
}

/// Install the global tracing subscriber.
///
/// The terminal belongs to the TUI, so events only go to a file. With no
/// file configured nothing is installed and all events are dropped.
/// Returns the path being logged to.
pub fn init_logging(config: &LogConfig) -> Option<PathBuf> {
    let path = log_file_path(config)?;
    let file = match open_log_file(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("warning: could not open log file {}: {e}", path.display());
            return None;
        }
    };
    let level = config.level.as_deref().unwrap_or(DEFAULT_LEVEL);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return None;
    }
    Some(path)
}

fn open_log_file(path: &Path) -> std::io::Result<fs::File> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
