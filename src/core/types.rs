//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`Oid`] - Git object identifier (SHA)
//! - [`RefName`] - Full reference name of a local or remote-tracking branch
//! - [`Version`] - `MAJOR.MINOR.PATCH` product version
//! - [`StableLine`] - A `MAJOR.MINOR.x` release line
//! - [`ReleaseBranch`] - Classification of a branch in the release flow
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use subrel::core::types::{BranchName, ReleaseBranch, Version};
//!
//! let version: Version = "4.2.7".parse().unwrap();
//! assert_eq!(version.bump_patch().unwrap().to_string(), "4.2.8");
//! assert_eq!(version.stable_branch().as_str(), "stable/4.2.x");
//!
//! let branch = BranchName::new("staging/4.2.8").unwrap();
//! assert!(matches!(ReleaseBranch::classify(&branch), ReleaseBranch::Staging(_)));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid version '{0}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion(String),

    #[error("version '{0}' has no next patch release")]
    VersionOverflow(String),
}

/// Characters git forbids anywhere in a ref name.
const INVALID_REF_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];

/// Shared refname rules (see `git check-ref-format`).
fn check_refname_rules(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".into());
    }
    if name == "@" {
        return Err("name cannot be '@' (reserved)".into());
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err("name cannot start or end with '/'".into());
    }
    if name.ends_with(".lock") {
        return Err("name cannot end with '.lock'".into());
    }
    for bad in ["..", "@{", "//"] {
        if name.contains(bad) {
            return Err(format!("name cannot contain '{bad}'"));
        }
    }
    for c in INVALID_REF_CHARS {
        if name.contains(c) {
            return Err(format!("name cannot contain '{c}'"));
        }
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return Err("name cannot contain control characters".into());
    }
    for component in name.split('/') {
        if component.starts_with('.') {
            return Err("path component cannot start with '.'".into());
        }
        if component.ends_with(".lock") {
            return Err("path component cannot end with '.lock'".into());
        }
    }
    Ok(())
}

/// A validated Git branch name.
///
/// Branch names must conform to Git's refname rules and additionally
/// cannot start with `-`.
///
/// # Example
///
/// ```
/// use subrel::core::types::BranchName;
///
/// let name = BranchName::new("stable/4.2.x").unwrap();
/// assert_eq!(name.as_str(), "stable/4.2.x");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("-main").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '-'".into(),
            ));
        }
        check_refname_rules(&name).map_err(TypeError::InvalidBranchName)?;
        Ok(Self(name))
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase for consistency.
///
/// # Example
///
/// ```
/// use subrel::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a valid hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    ///
    /// Returns the first `len` characters, or the full OID if shorter.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full reference name of a branch.
///
/// # Example
///
/// ```
/// use subrel::core::types::{BranchName, RefName};
///
/// let branch = BranchName::new("staging/4.2.8").unwrap();
/// assert_eq!(RefName::for_branch(&branch).as_str(), "refs/heads/staging/4.2.8");
/// assert_eq!(
///     RefName::for_remote_branch("origin", &branch).as_str(),
///     "refs/remotes/origin/staging/4.2.8"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefName(String);

impl RefName {
    /// Ref for a local branch (`refs/heads/<branch>`).
    pub fn for_branch(branch: &BranchName) -> Self {
        Self(format!("refs/heads/{}", branch.as_str()))
    }

    /// Ref for a remote-tracking branch (`refs/remotes/<remote>/<branch>`).
    pub fn for_remote_branch(remote: &str, branch: &BranchName) -> Self {
        Self(format!("refs/remotes/{}/{}", remote, branch.as_str()))
    }

    /// Get the ref name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A three-component product version (`MAJOR.MINOR.PATCH`).
///
/// Ordering is numeric per component, so `4.10.0 > 4.9.3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Next patch release on the same line.
    pub fn bump_patch(&self) -> Result<Self, TypeError> {
        let patch = self
            .patch
            .checked_add(1)
            .ok_or_else(|| TypeError::VersionOverflow(self.to_string()))?;
        Ok(Self { patch, ..*self })
    }

    /// The release line this version belongs to.
    pub fn stable_line(&self) -> StableLine {
        StableLine {
            major: self.major,
            minor: self.minor,
        }
    }

    /// `staging/<version>`
    pub fn staging_branch(&self) -> BranchName {
        BranchName(format!("staging/{}", self))
    }

    /// `stable/<major>.<minor>.x`
    pub fn stable_branch(&self) -> BranchName {
        self.stable_line().branch()
    }
}

impl FromStr for Version {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || TypeError::InvalidVersion(trimmed.to_string());

        let mut parts = trimmed.split('.');
        let mut next = || -> Result<u64, TypeError> {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let version = Version::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl TryFrom<String> for Version {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A stable release line, displayed as `MAJOR.MINOR.x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StableLine {
    pub major: u64,
    pub minor: u64,
}

impl StableLine {
    /// `stable/<major>.<minor>.x`
    pub fn branch(&self) -> BranchName {
        BranchName(format!("stable/{}", self))
    }
}

impl FromStr for StableLine {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = s
            .strip_suffix(".x")
            .ok_or_else(|| TypeError::InvalidVersion(s.to_string()))?;
        let version: Version = format!("{prefix}.0")
            .parse()
            .map_err(|_| TypeError::InvalidVersion(s.to_string()))?;
        Ok(version.stable_line())
    }
}

impl fmt::Display for StableLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.x", self.major, self.minor)
    }
}

/// Role a branch plays in the release flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseBranch {
    /// The development trunk.
    Main,
    /// `staging/<version>`
    Staging(Version),
    /// `stable/<major>.<minor>.x`
    Stable(StableLine),
    /// Anything else, including malformed `staging/` or `stable/` names.
    Other,
}

impl ReleaseBranch {
    /// Classify a branch name.
    pub fn classify(branch: &BranchName) -> Self {
        let name = branch.as_str();
        if name == "main" {
            ReleaseBranch::Main
        } else if let Some(rest) = name.strip_prefix("staging/") {
            rest.parse()
                .map(ReleaseBranch::Staging)
                .unwrap_or(ReleaseBranch::Other)
        } else if let Some(rest) = name.strip_prefix("stable/") {
            rest.parse()
                .map(ReleaseBranch::Stable)
                .unwrap_or(ReleaseBranch::Other)
        } else {
            ReleaseBranch::Other
        }
    }
}
