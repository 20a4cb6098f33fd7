use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::model::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read config.toml. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read config.toml, reporting problems and falling back to defaults.
///
/// Logging is not set up yet when this runs (the log file comes from the
/// config), so the warning also goes to stderr.
pub fn load_config_or_default(path: &Path) -> Config {
    match read_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("warning: {e}; using default configuration");
            warn!(error = %e, "using default configuration");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(&tmp.path().join("config.toml")).unwrap();
        assert_eq!(config.history.limit, 50);
        assert!(config.storage.autosave);
    }

    #[test]
    fn test_reads_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "[history]\nlimit = 10\n\n[storage]\nbackup = false\n\n[log]\nfile = \"/tmp/dotdot.log\"\nlevel = \"debug\"\n",
        )
        .unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.history.limit, 10);
        assert!(!config.storage.backup);
        assert!(config.storage.autosave);
        assert_eq!(config.log.file.as_deref(), Some("/tmp/dotdot.log"));
        assert_eq!(config.log.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[history\nlimit = ").unwrap();
        assert!(matches!(read_config(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(load_config_or_default(&path).history.limit, 50);
    }
}
