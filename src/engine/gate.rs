//! engine::gate
//!
//! Branch safety gate.
//!
//! Only release branches may be pushed to a shared remote: `staging/<name>`
//! and `stable/<name>`. Everything else (including `main`) reaches the
//! remote through review, never directly from this tool.
//!
//! # Invariants
//!
//! - The gate is evaluated for every push candidate, including under
//!   `--local`, so a misnamed branch is reported even when nothing would
//!   have been pushed

use thiserror::Error;

use crate::core::types::BranchName;

/// Branch prefixes that may be pushed.
pub const PUSHABLE_PREFIXES: [&str; 2] = ["staging/", "stable/"];

/// Errors from gating.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("refusing to push '{branch}': only staging/* and stable/* branches may be pushed")]
    NotPushable { branch: String },
}

/// Whether a branch name matches `staging/*` or `stable/*`.
///
/// # Example
///
/// ```
/// use subrel::engine::gate::is_pushable;
///
/// assert!(is_pushable("staging/4.2.8"));
/// assert!(is_pushable("stable/4.2.x"));
/// assert!(!is_pushable("main"));
/// assert!(!is_pushable("staging/"));
/// ```
pub fn is_pushable(name: &str) -> bool {
    PUSHABLE_PREFIXES.iter().any(|prefix| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty())
    })
}

/// Fail unless `branch` may be pushed.
pub fn ensure_pushable(branch: &BranchName) -> Result<(), GateError> {
    if is_pushable(branch.as_str()) {
        Ok(())
    } else {
        Err(GateError::NotPushable {
            branch: branch.to_string(),
        })
    }
}
