//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$SUBREL_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/subrel/config.toml`
//! 3. `~/.subrel/config.toml`
//!
//! # Repo Config
//!
//! Located at `.git/subrel/config.toml` (operator-local), or `.subrel.toml`
//! committed at the root of the worktree (shared by the team).
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., the main branch must be a valid branch name).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::BranchName;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// interactive = true
/// pull = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default interactive mode
    pub interactive: Option<bool>,

    /// Fast-forward local submodule branches instead of detaching
    pub pull: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// remote = "upstream"
/// main_branch = "main"
/// meta_submodule = "openslides-meta"
/// version_file = "VERSION"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Remote to fetch from and push to (default: `upstream` if present, else `origin`)
    pub remote: Option<String>,

    /// Development trunk of the root repository
    pub main_branch: Option<String>,

    /// Path of the nested meta submodule inside each top-level submodule
    pub meta_submodule: Option<String>,

    /// Version file at the repository root
    pub version_file: Option<String>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(main) = &self.main_branch {
            BranchName::new(main).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid main branch name: {}", e))
            })?;
        }

        if let Some(remote) = &self.remote {
            if remote.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "remote cannot be empty".to_string(),
                ));
            }
        }

        for (key, value) in [
            ("meta_submodule", &self.meta_submodule),
            ("version_file", &self.version_file),
        ] {
            if let Some(path) = value {
                if path.is_empty() || path.starts_with('/') || path.split('/').any(|c| c == "..")
                {
                    return Err(ConfigError::InvalidValue(format!(
                        "{key} must be a relative path inside the repository, got '{path}'"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Overlay `other` on top of `self`, field by field.
    pub fn merged_with(self, other: RepoConfig) -> RepoConfig {
        RepoConfig {
            remote: other.remote.or(self.remote),
            main_branch: other.main_branch.or(self.main_branch),
            meta_submodule: other.meta_submodule.or(self.meta_submodule),
            version_file: other.version_file.or(self.version_file),
        }
    }
}
