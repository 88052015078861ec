//! engine::state
//!
//! Workflow progression.
//!
//! ```text
//! Idle -> BranchVerified -> ChangesChosen -> CommitCreated -> Pushed -> Done
//!                                 |                 |                  ^
//!                                 +-----------------+------------------+
//! ```
//!
//! `Pushed` is optional (`--local`, or a target that is never pushed), and
//! `fetch-all-changes` finishes straight from `ChangesChosen` since it
//! creates no commit. There is no rollback: aborting keeps the side effects
//! of every stage already reached.

use std::fmt;

use thiserror::Error;
use tracing::info;

use super::Mode;

/// A workflow stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    BranchVerified,
    ChangesChosen,
    CommitCreated,
    Pushed,
    Done,
}

impl Stage {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_advance_to(self, next: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, next),
            (Idle, BranchVerified)
                | (BranchVerified, ChangesChosen)
                | (ChangesChosen, CommitCreated)
                | (ChangesChosen, Done)
                | (CommitCreated, Pushed)
                | (CommitCreated, Done)
                | (Pushed, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::BranchVerified => "branch-verified",
            Stage::ChangesChosen => "changes-chosen",
            Stage::CommitCreated => "commit-created",
            Stage::Pushed => "pushed",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from stage bookkeeping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("illegal workflow transition {from} -> {to}")]
    IllegalTransition { from: Stage, to: Stage },
}

/// Tracks the stage a running workflow has reached.
#[derive(Debug)]
pub struct Progress {
    mode: Mode,
    stage: Stage,
}

impl Progress {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            stage: Stage::Idle,
        }
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Move to `next`, refusing illegal transitions.
    pub fn advance(&mut self, next: Stage) -> Result<(), StageError> {
        if !self.stage.can_advance_to(next) {
            return Err(StageError::IllegalTransition {
                from: self.stage,
                to: next,
            });
        }
        info!(mode = %self.mode, from = %self.stage, to = %next, "workflow stage");
        self.stage = next;
        Ok(())
    }
}
