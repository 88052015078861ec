//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! subrel has two configuration scopes:
//! - **Global**: Operator-level settings
//! - **Repo**: Repository-level settings
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Shared repo config (`.subrel.toml` in the worktree)
//! 4. Local repo config (`.git/subrel/config.toml`)
//! 5. CLI flags (not handled here)
//!
//! # Example
//!
//! ```no_run
//! use subrel::core::config::Config;
//! use std::path::Path;
//!
//! let result = Config::load(Some(Path::new("/path/to/repo"))).unwrap();
//! let config = result.config;
//!
//! println!("Meta submodule: {}", config.meta_submodule());
//! println!("Version file: {}", config.version_file());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Every file that contributed, lowest precedence first.
    pub sources: Vec<PathBuf>,
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (shared and local merged)
    pub repo: RepoConfig,
}

impl Config {
    /// Default meta submodule path.
    pub const DEFAULT_META_SUBMODULE: &'static str = "openslides-meta";
    /// Default version file.
    pub const DEFAULT_VERSION_FILE: &'static str = "VERSION";
    /// Default development trunk.
    pub const DEFAULT_MAIN_BRANCH: &'static str = "main";

    /// Load configuration from default locations.
    ///
    /// If `repo_path` is provided, also loads repo-specific config.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load(repo_path: Option<&Path>) -> Result<ConfigLoadResult, ConfigError> {
        Self::load_from(Self::global_config_path().as_deref(), repo_path)
    }

    /// Load configuration with an explicit global config location.
    pub fn load_from(
        global_path: Option<&Path>,
        repo_path: Option<&Path>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut sources = Vec::new();

        let global = match global_path.filter(|p| p.exists()) {
            Some(path) => {
                sources.push(path.to_path_buf());
                read_toml::<GlobalConfig>(path)?
            }
            None => GlobalConfig::default(),
        };

        let mut repo = RepoConfig::default();
        if let Some(root) = repo_path {
            for path in [Self::shared_repo_config_path(root), Self::repo_config_path(root)] {
                if path.exists() {
                    repo = repo.merged_with(read_toml(&path)?);
                    sources.push(path);
                }
            }
        }

        global.validate()?;
        repo.validate()?;

        Ok(ConfigLoadResult {
            config: Config { global, repo },
            sources,
        })
    }

    /// Locate the global config file.
    ///
    /// Searched in order:
    /// 1. `$SUBREL_CONFIG` if set
    /// 2. `$XDG_CONFIG_HOME/subrel/config.toml`
    /// 3. `~/.subrel/config.toml`
    pub fn global_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SUBREL_CONFIG") {
            return Some(PathBuf::from(path));
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("subrel/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir().map(|home| home.join(".subrel/config.toml"))
    }

    /// Operator-local repo config: `.git/subrel/config.toml`.
    pub fn repo_config_path(repo_path: &Path) -> PathBuf {
        repo_path.join(".git/subrel/config.toml")
    }

    /// Shared repo config committed with the product: `.subrel.toml`.
    pub fn shared_repo_config_path(repo_path: &Path) -> PathBuf {
        repo_path.join(".subrel.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Configured remote, if any. `None` means auto-detect.
    pub fn remote(&self) -> Option<&str> {
        self.repo.remote.as_deref()
    }

    /// Development trunk of the root repository.
    pub fn main_branch(&self) -> &str {
        self.repo
            .main_branch
            .as_deref()
            .unwrap_or(Self::DEFAULT_MAIN_BRANCH)
    }

    /// Path of the nested meta submodule inside each top-level submodule.
    pub fn meta_submodule(&self) -> &str {
        self.repo
            .meta_submodule
            .as_deref()
            .unwrap_or(Self::DEFAULT_META_SUBMODULE)
    }

    /// Version file at the repository root.
    pub fn version_file(&self) -> &str {
        self.repo
            .version_file
            .as_deref()
            .unwrap_or(Self::DEFAULT_VERSION_FILE)
    }

    /// Whether prompts are enabled (defaults to true).
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Whether `fetch-all-changes` fast-forwards local branches by default.
    pub fn pull(&self) -> bool {
        self.global.pull.unwrap_or(false)
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
