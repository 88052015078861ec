//! engine
//!
//! The release coordinator: drives one workflow mode against a repository
//! tree.
//!
//! # Architecture
//!
//! Every mode runs through the same checked progression (see [`state`]):
//!
//! ```text
//! Idle -> BranchVerified -> ChangesChosen -> CommitCreated -> [Pushed] -> Done
//! ```
//!
//! - [`session`] carries everything a step needs: the repository, merged
//!   configuration, remote, run flags and the answer source
//! - [`gate`] decides which branches may be pushed
//! - [`consistency`] checks the shared meta submodule across submodules
//! - [`select`] lets the operator pick submodule commits
//! - [`workflows`] implements the four modes
//!
//! # Invariants
//!
//! - No state is kept across runs; every run re-derives status from the tree
//! - Nothing is pushed without passing the gate; `--local` never pushes
//! - A failure in one submodule stops the loop over submodules
//! - Aborting performs no rollback

pub mod consistency;
pub mod gate;
pub mod select;
pub mod session;
pub mod state;
pub mod workflows;

pub use gate::{ensure_pushable, is_pushable, GateError};
pub use select::PointerChange;
pub use session::Session;
pub use state::{Progress, Stage, StageError};

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::{BranchName, Oid, Version};
use crate::core::verify::VerifyError;
use crate::git::GitError;
use crate::ui::prompts::PromptError;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags and configuration.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
    /// Fast-forward local submodule branches instead of detaching.
    pub pull: bool,
    /// Keep commits local; never push.
    pub local: bool,
}

/// The workflow to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    FetchAllChanges,
    Staging,
    Stable,
    Hotfix,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::FetchAllChanges => "fetch-all-changes",
            Mode::Staging => "staging",
            Mode::Stable => "stable",
            Mode::Hotfix => "hotfix",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that stop a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A precondition does not hold; `suggestion` is a corrective command.
    #[error("{message}{}", suggestion_hint(.suggestion))]
    Precondition {
        message: String,
        suggestion: Option<String>,
    },

    /// The operator declined to switch to the required branch.
    #[error("expected to be on '{expected}' but on {actual} (try: git checkout {expected})")]
    BranchMismatch { expected: BranchName, actual: String },

    /// Local and remote branch have both moved.
    #[error(
        "local branch '{branch}' ({local}) and {remote_ref} ({remote}) have diverged \
         (try: git reset --hard {remote_ref})"
    )]
    Diverged {
        branch: BranchName,
        remote_ref: String,
        local: String,
        remote: String,
    },

    #[error(transparent)]
    Consistency(#[from] VerifyError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Stage(#[from] StageError),
}

impl WorkflowError {
    pub fn precondition(message: impl Into<String>) -> Self {
        WorkflowError::Precondition {
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn precondition_with(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        WorkflowError::Precondition {
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (try: {s})"))
        .unwrap_or_default()
}

/// Why a workflow stopped without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// Nothing to commit.
    NoChanges,
    /// The staging branch holds nothing the stable branch lacks.
    NoStagingUpdate {
        staging: BranchName,
        stable: BranchName,
    },
    /// The operator declined at a decision point.
    Declined(String),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::NoChanges => write!(f, "no changes"),
            AbortReason::NoStagingUpdate { staging, stable } => write!(
                f,
                "no staging update found: {} is already contained in {}",
                staging, stable
            ),
            AbortReason::Declined(what) => write!(f, "declined: {}", what),
        }
    }
}

/// What a completed workflow did.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    /// Root branch that was advanced, if any.
    pub branch: Option<BranchName>,
    /// Version written, if any.
    pub version: Option<Version>,
    /// Root commit created, if any.
    pub commit: Option<Oid>,
    /// Whether the root branch was pushed.
    pub pushed: bool,
    /// Submodule pointer moves.
    pub changes: Vec<PointerChange>,
    /// Advisory findings (e.g. overridden consistency warnings).
    pub warnings: Vec<String>,
}

/// Result of a workflow run.
#[derive(Debug, Clone)]
pub enum Outcome {
    Completed(Summary),
    Aborted(AbortReason),
}

/// Run one workflow mode.
pub fn run(mode: Mode, session: &mut Session<'_>) -> Result<Outcome, WorkflowError> {
    match mode {
        Mode::FetchAllChanges => workflows::fetch::run(session),
        Mode::Staging => workflows::staging::run(session),
        Mode::Stable => workflows::stable::run(session),
        Mode::Hotfix => workflows::hotfix::run(session),
    }
}
