use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default cap for both the undo and redo stacks
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept on each of the undo and redo stacks
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Copy the previous file to `<file>.bak` before each save
    #[serde(default = "default_true")]
    pub backup: bool,
    /// Save after every mutation when a file is open
    #[serde(default = "default_true")]
    pub autosave: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backup: true,
            autosave: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log file path. Logging is disabled when unset.
    #[serde(default)]
    pub file: Option<String>,
    /// Filter directive, e.g. "info" or "dotdot=debug"
    #[serde(default)]
    pub level: Option<String>,
}

/// `[ui]` section. `colors` maps theme slots (e.g. `active`, `cursor`)
/// to `#RRGGBB` strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}
