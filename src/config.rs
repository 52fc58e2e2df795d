//! Configuration loaded from `config.toml`.
//!
//! Every section is optional; a missing file yields the defaults.
//! CLI flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
const APP_DIR: &str = "git-ingest";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub git: GitConfig,
    pub workspace: WorkspaceConfig,
    pub tree: TreeConfig,
    pub read: ReadConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// git executable, looked up on PATH unless absolute
    pub binary: String,
    /// Clone depth; 0 clones full history
    pub depth: u32,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            depth: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Parent directory for per-call workspaces (defaults to the OS temp dir)
    pub temp_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadConfig {
    /// Files above this size are reported instead of returned; 0 disables the cap
    pub max_file_bytes: u64,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl ReadConfig {
    pub fn size_limit(&self) -> Option<u64> {
        (self.max_file_bytes > 0).then_some(self.max_file_bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// `~/.config/git-ingest/config.toml` on Linux, platform equivalent elsewhere
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file at the default location is not an error; a missing
    /// file the user asked for explicitly is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
