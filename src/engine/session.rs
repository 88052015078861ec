//! engine::session
//!
//! The explicit context every workflow step receives.
//!
//! A [`Session`] bundles the opened root repository, merged configuration,
//! the remote to work against, the run flags and the operator's answer
//! source. It also hosts the checks and decision points shared by several
//! workflows: version confirmation, branch verification and pushing.

use std::path::Path;

use tracing::{debug, warn};

use super::gate::ensure_pushable;
use super::{Context, WorkflowError};
use crate::core::config::Config;
use crate::core::types::{BranchName, Oid, TypeError, Version};
use crate::git::{Git, SubmoduleInfo};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::Prompter;

/// Everything a workflow step needs.
pub struct Session<'p> {
    /// The root repository.
    pub git: Git,
    /// Merged configuration.
    pub config: Config,
    /// Remote of the root repository.
    pub remote: String,
    /// Run flags.
    pub ctx: Context,
    prompter: &'p mut dyn Prompter,
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("git", &self.git)
            .field("remote", &self.remote)
            .field("ctx", &self.ctx)
            .finish()
    }
}

impl<'p> Session<'p> {
    /// Build a session around the opened root repository.
    pub fn new(
        git: Git,
        ctx: Context,
        config: Config,
        prompter: &'p mut dyn Prompter,
    ) -> Result<Self, WorkflowError> {
        let remote = match config.remote() {
            Some(remote) => remote.to_string(),
            None => git.default_remote()?.ok_or_else(|| {
                WorkflowError::precondition_with(
                    "the repository has no remote",
                    "git remote add upstream <url>",
                )
            })?,
        };
        debug!(remote = %remote, "session opened");

        Ok(Self {
            git,
            config,
            remote,
            ctx,
            prompter,
        })
    }

    /// The operator's answer source.
    pub fn prompter(&mut self) -> &mut dyn Prompter {
        &mut *self.prompter
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.ctx.quiet, self.ctx.debug)
    }

    /// Tell the operator something.
    pub fn say(&self, message: impl std::fmt::Display) {
        output::print(message, self.verbosity());
    }

    /// Development trunk of the root repository.
    pub fn main_branch(&self) -> Result<BranchName, WorkflowError> {
        BranchName::new(self.config.main_branch())
            .map_err(|e| WorkflowError::precondition(e.to_string()))
    }

    // =========================================================================
    // Preconditions
    // =========================================================================

    /// Refuse to run on top of an interrupted operation or local edits.
    pub fn ensure_ready(&self) -> Result<(), WorkflowError> {
        let state = self.git.state();
        if state.is_in_progress() {
            return Err(WorkflowError::precondition_with(
                format!("a {} is in progress in the root repository", state),
                format!("git {} --abort", state),
            ));
        }

        let status = self.git.worktree_status()?;
        if !status.is_clean() {
            return Err(WorkflowError::precondition_with(
                format!(
                    "the root working tree has uncommitted changes ({} staged, {} unstaged)",
                    status.staged, status.unstaged
                ),
                "git stash",
            ));
        }
        Ok(())
    }

    /// Top-level submodules, all of which must be initialized.
    pub fn submodules(&self) -> Result<Vec<SubmoduleInfo>, WorkflowError> {
        let submodules = self.git.submodules()?;
        if let Some(sm) = submodules.iter().find(|sm| !sm.is_initialized()) {
            return Err(WorkflowError::precondition_with(
                format!("submodule '{}' is not initialized", sm.display_path()),
                "git submodule update --init",
            ));
        }
        Ok(submodules)
    }

    /// Open an initialized submodule and resolve the remote it fetches from.
    pub fn open_submodule(&self, path: &Path) -> Result<(Git, String), WorkflowError> {
        let sub = self.git.open_submodule(path)?;
        let remote = sub.default_remote()?.ok_or_else(|| {
            WorkflowError::precondition(format!(
                "submodule '{}' has no remote",
                path.display()
            ))
        })?;
        Ok((sub, remote))
    }

    // =========================================================================
    // Versions
    // =========================================================================

    /// Read the version file at a root revision.
    pub fn read_version(&self, rev: &Oid) -> Result<Version, WorkflowError> {
        let file = self.config.version_file();
        let contents = self.git.read_file_at(rev, file)?.ok_or_else(|| {
            WorkflowError::precondition(format!(
                "no {} file at {}",
                file,
                output::short(rev)
            ))
        })?;
        contents.parse().map_err(|e: TypeError| {
            WorkflowError::precondition(format!("{} at {}: {}", file, output::short(rev), e))
        })
    }

    /// Read the version file at `rev` along with its next patch release.
    pub fn next_version(&self, rev: &Oid) -> Result<(Version, Version), WorkflowError> {
        let current = self.read_version(rev)?;
        let next = current.bump_patch().map_err(|e| {
            WorkflowError::precondition(format!(
                "{} at {}: {}",
                self.config.version_file(),
                output::short(rev),
                e
            ))
        })?;
        Ok((current, next))
    }

    /// Ask the operator to confirm (or correct) a version.
    pub fn confirm_version(
        &mut self,
        label: &str,
        default: Version,
    ) -> Result<Version, WorkflowError> {
        let message = format!("Please confirm the {} version", label);
        let default_text = default.to_string();
        loop {
            let answer = self.prompter().input(&message, Some(&default_text))?;
            match answer.parse() {
                Ok(version) => return Ok(version),
                Err(e) => output::warn(e),
            }
        }
    }

    /// Write `version` into the version file and stage it, if it differs.
    ///
    /// Returns whether the file changed.
    pub fn write_version(&self, version: &Version) -> Result<bool, WorkflowError> {
        let file = self.config.version_file();
        let head = self.git.head_oid()?;
        let current = self.git.read_file_at(&head, file)?;
        if current.as_deref().map(str::trim) == Some(version.to_string().as_str()) {
            return Ok(false);
        }
        self.git.write_and_stage(file, &format!("{}\n", version))?;
        Ok(true)
    }

    // =========================================================================
    // Branches
    // =========================================================================

    /// Make `branch` the checked-out branch and bring it in line with the
    /// remote.
    ///
    /// - On another branch: offer to switch (declining is an error)
    /// - Behind the remote: offer to fast-forward (declining is an error)
    /// - Ahead of the remote: warn and continue
    /// - Diverged: error
    pub fn verify_branch(&mut self, branch: &BranchName) -> Result<(), WorkflowError> {
        let remote_tip = self.git.remote_branch(&self.remote, branch)?;
        let current = self.git.current_branch()?;

        if current.as_ref() != Some(branch) {
            let actual = current
                .map(|b| format!("'{}'", b))
                .unwrap_or_else(|| "a detached HEAD".to_string());
            let question = format!("You are on {}. Switch to '{}'?", actual, branch);
            if !self.prompter().confirm(&question, true)? {
                return Err(WorkflowError::BranchMismatch {
                    expected: branch.clone(),
                    actual,
                });
            }

            if self.git.local_branch(branch)?.is_some() {
                self.git.checkout_branch(branch)?;
            } else if let Some(tip) = &remote_tip {
                self.git.checkout_new_branch(branch, tip)?;
            } else {
                return Err(WorkflowError::precondition(format!(
                    "branch '{}' exists neither locally nor on '{}'",
                    branch, self.remote
                )));
            }
        }

        let Some(remote_tip) = remote_tip else {
            debug!(branch = %branch, "branch has no remote counterpart yet");
            return Ok(());
        };

        let local = self.git.head_oid()?;
        if local == remote_tip {
            return Ok(());
        }

        let remote_ref = format!("{}/{}", self.remote, branch);
        if self.git.is_ancestor(&local, &remote_tip)? {
            let question = format!("'{}' is behind {}. Fast-forward?", branch, remote_ref);
            if !self.prompter().confirm(&question, true)? {
                return Err(WorkflowError::precondition_with(
                    format!("'{}' is behind {}", branch, remote_ref),
                    format!("git merge --ff-only {}", remote_ref),
                ));
            }
            self.git.fast_forward(&remote_tip)?;
        } else if self.git.is_ancestor(&remote_tip, &local)? {
            warn!(branch = %branch, "local branch has unpushed commits");
            output::warn(format!("'{}' is ahead of {}", branch, remote_ref));
        } else {
            return Err(WorkflowError::Diverged {
                branch: branch.clone(),
                remote_ref,
                local: output::short(&local).to_string(),
                remote: output::short(&remote_tip).to_string(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Pushing
    // =========================================================================

    /// Push `branch` of `repo` to `remote`, after the safety gate.
    ///
    /// Returns `false` when `--local` suppressed the push.
    pub fn push(
        &self,
        repo: &Git,
        remote: &str,
        branch: &BranchName,
    ) -> Result<bool, WorkflowError> {
        ensure_pushable(branch)?;

        if self.ctx.local {
            debug!(branch = %branch, "push skipped (--local)");
            return Ok(false);
        }

        self.say(format!("Pushing {} to {}", branch, remote));
        repo.push(remote, branch)?;
        Ok(true)
    }
}
