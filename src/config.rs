// Configuration for opening a record store

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug};

pub const DEFAULT_NAMESPACE: &str = "taskflow";
const CONFIG_FILE: &str = "taskflow.yml";

/// Which storage backend persists the entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix of every storage key: `{namespace}_tasks`, `{namespace}_users`, `{namespace}_user`
    pub namespace: String,
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            backend: BackendKind::default(),
            data_dir: default_data_dir(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .level()
            .and_then(|_| crate::storage::validate_namespace(&config.namespace))
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = ?path, ?config, "Loaded config");
        Ok(config)
    }

    /// `log_level` as a tracing level (trace, debug, info, warn or error)
    pub fn level(&self) -> Result<Level> {
        self.log_level
            .parse()
            .map_err(|_| eyre!("Unknown log_level {:?} (expected trace, debug, info, warn or error)", self.log_level))
    }

    /// Path of the SQLite database used by the sqlite backend
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.db", self.namespace))
    }
}

/// `~/.config/taskflow/taskflow.yml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskflow").join(CONFIG_FILE))
}

/// `~/.local/share/taskflow` on Linux, `./.taskflow` when no data dir is known
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("taskflow"))
        .unwrap_or_else(|| PathBuf::from(".taskflow"))
}
