//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2` or spawns the `git` executable.
//!
//! # Responsibilities
//!
//! - Repository and submodule discovery
//! - Ref resolution and remote-tracking branch listing
//! - Ancestry queries and commit ranges
//! - Tree reads (gitlinks, files at a revision)
//! - Worktree mutations (checkout, merge, stage, commit)
//! - Network operations (fetch, push)
//!
//! # Invariants
//!
//! - Reads return strong types (Oid, BranchName), never parsed command output
//! - Every `git` invocation is logged at debug level
//! - A failed invocation is an error carrying the command, directory and stderr

mod interface;

pub use interface::{
    CommitInfo, Git, GitError, GitState, MergeOutcome, SubmoduleInfo, WorktreeStatus,
};
