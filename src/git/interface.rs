//! git::interface
//!
//! Git interface implementation.
//!
//! This module provides the **single doorway** to all Git operations in
//! subrel. Reads (refs, ancestry, trees, submodule pointers, commit ranges)
//! go through `git2` and return strong types. Operations that touch the
//! network or rewrite the working tree (fetch, push, checkout, merge,
//! commit) run the `git` executable so that credentials, hooks and
//! submodule-aware checkout behave exactly as the operator's own git.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::ObjectNotFound`]: Commit or blob missing locally
//! - [`GitError::CommandFailed`]: A `git` invocation exited non-zero
//!
//! # Example
//!
//! ```ignore
//! use subrel::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! for sm in git.submodules()? {
//!     println!("{} at {:?}", sm.path, sm.workdir_id);
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::core::types::{BranchName, Oid, RefName, TypeError};

/// Filemode git uses for gitlink (submodule) tree entries.
const GITLINK_MODE: i32 = 0o160000;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Blob content is not valid UTF-8.
    #[error("file '{path}' at {rev} is not valid UTF-8")]
    InvalidUtf8 {
        /// Path of the file inside the tree
        path: String,
        /// Revision the file was read from
        rev: String,
    },

    /// The `git` executable could not be started.
    #[error("failed to run git: {message}")]
    Spawn {
        /// Description of the error
        message: String,
    },

    /// A `git` invocation exited with a failure status.
    #[error("`{command}` failed in {dir}: {stderr}")]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Directory it ran in
        dir: PathBuf,
        /// Trimmed stderr of the process
        stderr: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            other => GitError::InvalidRefName {
                message: other.to_string(),
            },
        }
    }
}

/// State of in-progress Git operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitState {
    /// No operation in progress.
    Clean,
    /// Rebase in progress.
    Rebase,
    /// Merge in progress.
    Merge,
    /// Cherry-pick in progress.
    CherryPick,
    /// Revert in progress.
    Revert,
    /// Bisect in progress.
    Bisect,
    /// Apply mailbox in progress.
    ApplyMailbox,
}

impl GitState {
    /// Check if any operation is in progress.
    ///
    /// # Example
    ///
    /// ```
    /// use subrel::git::GitState;
    ///
    /// assert!(!GitState::Clean.is_in_progress());
    /// assert!(GitState::Merge.is_in_progress());
    /// ```
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, GitState::Clean)
    }

    /// Get a human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            GitState::Clean => "clean",
            GitState::Rebase => "rebase",
            GitState::Merge => "merge",
            GitState::CherryPick => "cherry-pick",
            GitState::Revert => "revert",
            GitState::Bisect => "bisect",
            GitState::ApplyMailbox => "apply-mailbox",
        }
    }
}

impl std::fmt::Display for GitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// Check if the worktree is completely clean.
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && !self.has_conflicts
    }
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
}

/// A submodule declared in `.gitmodules`.
#[derive(Debug, Clone)]
pub struct SubmoduleInfo {
    /// Logical name from `.gitmodules`
    pub name: String,
    /// Path relative to the superproject root
    pub path: PathBuf,
    /// Configured upstream branch (`submodule.<name>.branch`)
    pub branch: Option<String>,
    /// Pointer recorded in the superproject's HEAD tree
    pub head_id: Option<Oid>,
    /// Commit currently checked out in the submodule, if initialized
    pub workdir_id: Option<Oid>,
}

impl SubmoduleInfo {
    /// Whether the submodule has a checked-out working tree.
    pub fn is_initialized(&self) -> bool {
        self.workdir_id.is_some()
    }

    /// Path as a display string with forward slashes.
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

/// Result of a `git merge` that may stop on conflicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Merge completed (or stopped before committing) without conflicts.
    Clean,
    /// Merge stopped with conflicts on these paths.
    Conflicted(Vec<String>),
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. All repository
/// reads and writes flow through this interface. No other module should
/// import `git2` or spawn `git` directly.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository (or within an initialized submodule).
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo })
    }

    /// Root of the working tree.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Open an initialized submodule of this repository.
    pub fn open_submodule(&self, path: &Path) -> Result<Git, GitError> {
        let dir = self.work_dir()?.join(path);
        let repo = git2::Repository::open(&dir).map_err(|_| GitError::NotARepo { path: dir })?;
        Ok(Self { repo })
    }

    // =========================================================================
    // State Detection
    // =========================================================================

    /// Get the current Git state (rebase, merge, etc.).
    pub fn state(&self) -> GitState {
        match self.repo.state() {
            git2::RepositoryState::Clean => GitState::Clean,
            git2::RepositoryState::Rebase
            | git2::RepositoryState::RebaseInteractive
            | git2::RepositoryState::RebaseMerge => GitState::Rebase,
            git2::RepositoryState::Merge => GitState::Merge,
            git2::RepositoryState::CherryPick | git2::RepositoryState::CherryPickSequence => {
                GitState::CherryPick
            }
            git2::RepositoryState::Revert | git2::RepositoryState::RevertSequence => {
                GitState::Revert
            }
            git2::RepositoryState::Bisect => GitState::Bisect,
            git2::RepositoryState::ApplyMailbox | git2::RepositoryState::ApplyMailboxOrRebase => {
                GitState::ApplyMailbox
            }
        }
    }

    /// Paths with unresolved conflicts in the index.
    pub fn conflicted_paths(&self) -> Result<Vec<String>, GitError> {
        let mut index = self.repo.index()?;
        index.read(true)?;

        let mut paths = Vec::new();
        for conflict in index.conflicts()? {
            let conflict = conflict?;
            let entry = conflict.our.or(conflict.their).or(conflict.ancestor);
            if let Some(entry) = entry {
                paths.push(String::from_utf8_lossy(&entry.path).into_owned());
            }
        }
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    // =========================================================================
    // Working Tree Status
    // =========================================================================

    /// Get working tree status summary, ignoring untracked files and
    /// submodule pointer drift.
    pub fn worktree_status(&self) -> Result<WorktreeStatus, GitError> {
        self.repo.index()?.read(true)?;

        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);

        let statuses = self.repo.statuses(Some(&mut opts))?;

        let mut result = WorktreeStatus::default();
        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result.has_conflicts = true;
            }
            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }
            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }
        }

        Ok(result)
    }

    /// Whether the index differs from HEAD, submodule pointers included.
    pub fn has_staged_changes(&self) -> Result<bool, GitError> {
        let status = self.command(&["diff", "--cached", "--quiet"])?.status;
        Ok(!status.success())
    }

    // =========================================================================
    // Ref Resolution
    // =========================================================================

    /// Resolve a ref or revision expression to a commit OID.
    pub fn resolve(&self, spec: &str) -> Result<Oid, GitError> {
        let commit = self
            .repo
            .revparse_single(spec)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, spec))?;
        Ok(Oid::new(commit.id().to_string())?)
    }

    /// Resolve a ref, returning `None` if it does not exist.
    pub fn try_resolve(&self, spec: &str) -> Result<Option<Oid>, GitError> {
        match self.resolve(spec) {
            Ok(oid) => Ok(Some(oid)),
            Err(GitError::RefNotFound { .. }) | Err(GitError::ObjectNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// OID of HEAD.
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        self.resolve("HEAD")
    }

    /// Current branch, or `None` if HEAD is detached.
    pub fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        if self.repo.head_detached()? {
            return Ok(None);
        }
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match head.shorthand() {
            Some(name) => Ok(Some(BranchName::new(name)?)),
            None => Ok(None),
        }
    }

    /// Tip of a local branch.
    pub fn local_branch(&self, branch: &BranchName) -> Result<Option<Oid>, GitError> {
        self.try_resolve(RefName::for_branch(branch).as_str())
    }

    /// Tip of a remote-tracking branch.
    pub fn remote_branch(
        &self,
        remote: &str,
        branch: &BranchName,
    ) -> Result<Option<Oid>, GitError> {
        self.try_resolve(RefName::for_remote_branch(remote, branch).as_str())
    }

    /// Remote-tracking branches of `remote` whose name starts with `prefix`.
    ///
    /// Returned as branch names without the `refs/remotes/<remote>/` part.
    pub fn list_remote_branches(
        &self,
        remote: &str,
        prefix: &str,
    ) -> Result<Vec<BranchName>, GitError> {
        let ref_prefix = format!("refs/remotes/{}/", remote);
        let pattern = format!("{}{}*", ref_prefix, prefix);

        let mut branches = Vec::new();
        for reference in self.repo.references_glob(&pattern)? {
            let reference = reference?;
            let Some(name) = reference.name() else {
                continue;
            };
            if let Some(short) = name.strip_prefix(&ref_prefix) {
                if let Ok(branch) = BranchName::new(short) {
                    branches.push(branch);
                }
            }
        }
        branches.sort();
        Ok(branches)
    }

    /// Names of configured remotes.
    pub fn remotes(&self) -> Result<Vec<String>, GitError> {
        let remotes = self.repo.remotes()?;
        Ok(remotes.iter().flatten().map(String::from).collect())
    }

    /// Pick the remote to work against: `upstream` if configured, else `origin`.
    pub fn default_remote(&self) -> Result<Option<String>, GitError> {
        let remotes = self.remotes()?;
        for preferred in ["upstream", "origin"] {
            if remotes.iter().any(|r| r == preferred) {
                return Ok(Some(preferred.to_string()));
            }
        }
        Ok(remotes.into_iter().next())
    }

    // =========================================================================
    // Ancestry Queries
    // =========================================================================

    /// Check if `ancestor` is an ancestor of `descendant`.
    ///
    /// Returns true if ancestor == descendant (a commit is its own ancestor).
    pub fn is_ancestor(&self, ancestor: &Oid, descendant: &Oid) -> Result<bool, GitError> {
        if ancestor == descendant {
            return Ok(true);
        }
        let a = to_git2(ancestor)?;
        let d = to_git2(descendant)?;
        self.repo
            .graph_descendant_of(d, a)
            .map_err(|e| GitError::from_git2(e, descendant.as_str()))
    }

    /// Whether a commit object is present in the local object database.
    pub fn has_commit(&self, oid: &Oid) -> bool {
        to_git2(oid)
            .ok()
            .and_then(|id| self.repo.find_commit(id).ok())
            .is_some()
    }

    /// Commits reachable from `tip` but not from `base`, newest first.
    pub fn commits_between(
        &self,
        base: Option<&Oid>,
        tip: &Oid,
    ) -> Result<Vec<CommitInfo>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
        revwalk
            .push(to_git2(tip)?)
            .map_err(|e| GitError::from_git2(e, tip.as_str()))?;
        if let Some(base) = base {
            revwalk
                .hide(to_git2(base)?)
                .map_err(|e| GitError::from_git2(e, base.as_str()))?;
        }

        let mut commits = Vec::new();
        for id in revwalk {
            commits.push(self.commit_info(&Oid::new(id?.to_string())?)?);
        }
        Ok(commits)
    }

    /// Get information about a commit.
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let commit = self
            .repo
            .find_commit(to_git2(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        Ok(CommitInfo {
            oid: oid.clone(),
            summary: commit.summary().unwrap_or("").to_string(),
            author_time,
        })
    }

    // =========================================================================
    // Tree Reads
    // =========================================================================

    /// Gitlink recorded for `path` in the tree of commit `rev`.
    ///
    /// Returns `None` if the path is absent or is not a submodule entry.
    pub fn gitlink_at(&self, rev: &Oid, path: &Path) -> Result<Option<Oid>, GitError> {
        let commit = self
            .repo
            .find_commit(to_git2(rev)?)
            .map_err(|e| GitError::from_git2(e, rev.as_str()))?;
        let tree = commit.tree()?;

        match tree.get_path(path) {
            Ok(entry) if entry.filemode() == GITLINK_MODE => {
                Ok(Some(Oid::new(entry.id().to_string())?))
            }
            Ok(_) => Ok(None),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a UTF-8 file from the tree of commit `rev`.
    ///
    /// Returns `None` if the file does not exist at that revision.
    pub fn read_file_at(&self, rev: &Oid, path: &str) -> Result<Option<String>, GitError> {
        let commit = self
            .repo
            .find_commit(to_git2(rev)?)
            .map_err(|e| GitError::from_git2(e, rev.as_str()))?;
        let tree = commit.tree()?;

        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let blob = self.repo.find_blob(entry.id())?;
        String::from_utf8(blob.content().to_vec())
            .map(Some)
            .map_err(|_| GitError::InvalidUtf8 {
                path: path.to_string(),
                rev: rev.to_string(),
            })
    }

    // =========================================================================
    // Submodules
    // =========================================================================

    /// Top-level submodules declared in `.gitmodules`, in path order.
    pub fn submodules(&self) -> Result<Vec<SubmoduleInfo>, GitError> {
        let mut result = Vec::new();
        for sm in self.repo.submodules()? {
            let to_oid = |id: Option<git2::Oid>| -> Result<Option<Oid>, GitError> {
                id.map(|id| Oid::new(id.to_string())).transpose().map_err(Into::into)
            };
            result.push(SubmoduleInfo {
                name: sm.name().unwrap_or_default().to_string(),
                path: sm.path().to_path_buf(),
                branch: sm.branch().map(String::from),
                head_id: to_oid(sm.head_id())?,
                workdir_id: to_oid(sm.workdir_id())?,
            });
        }
        result.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(result)
    }

    // =========================================================================
    // Local Mutations
    // =========================================================================

    /// Create or move a local branch to `target` without touching the worktree.
    pub fn set_branch(&self, branch: &BranchName, target: &Oid) -> Result<(), GitError> {
        let commit = self
            .repo
            .find_commit(to_git2(target)?)
            .map_err(|e| GitError::from_git2(e, target.as_str()))?;
        self.repo.branch(branch.as_str(), &commit, true)?;
        debug!(branch = %branch, target = %target.short(7), "set branch");
        Ok(())
    }

    /// Check out an existing local branch.
    pub fn checkout_branch(&self, branch: &BranchName) -> Result<(), GitError> {
        self.run(&["checkout", branch.as_str()]).map(drop)
    }

    /// Create (or reset) a local branch at `start` and check it out.
    pub fn checkout_new_branch(&self, branch: &BranchName, start: &Oid) -> Result<(), GitError> {
        self.run(&["checkout", "-B", branch.as_str(), start.as_str()])
            .map(drop)
    }

    /// Check out a commit with a detached HEAD.
    pub fn checkout_detached(&self, oid: &Oid) -> Result<(), GitError> {
        self.run(&["checkout", "--detach", oid.as_str()]).map(drop)
    }

    /// Fast-forward the current branch to `target`; fails if not possible.
    pub fn fast_forward(&self, target: &Oid) -> Result<(), GitError> {
        self.run(&["merge", "--ff-only", target.as_str()]).map(drop)
    }

    /// Merge `target` into the current branch preferring its side on conflicts.
    ///
    /// With `commit == false` the merge stops before committing so the
    /// caller can adjust the index. Conflicts that `-X theirs` cannot
    /// resolve (e.g. diverging submodule pointers) are reported rather
    /// than treated as a failure.
    pub fn merge_theirs(
        &self,
        target: &Oid,
        message: &str,
        commit: bool,
    ) -> Result<MergeOutcome, GitError> {
        let mut args = vec!["merge", "--no-ff", "-X", "theirs", "-m", message];
        if !commit {
            args.push("--no-commit");
        }
        args.push(target.as_str());

        match self.run(&args) {
            Ok(_) => Ok(MergeOutcome::Clean),
            Err(err @ GitError::CommandFailed { .. }) => {
                let conflicts = self.conflicted_paths()?;
                if conflicts.is_empty() {
                    Err(err)
                } else {
                    Ok(MergeOutcome::Conflicted(conflicts))
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Stage a path (file or submodule gitlink).
    pub fn stage_path(&self, path: &Path) -> Result<(), GitError> {
        let path = path.to_string_lossy();
        self.run(&["add", "--", path.as_ref()]).map(drop)
    }

    /// Record `oid` as the gitlink for `path` in the index.
    ///
    /// Also resolves a conflicted gitlink left by a merge.
    pub fn stage_gitlink(&self, path: &Path, oid: &Oid) -> Result<(), GitError> {
        let cacheinfo = format!("160000,{},{}", oid, path.to_string_lossy());
        self.run(&["update-index", "--cacheinfo", &cacheinfo])
            .map(drop)
    }

    /// Write a file in the working tree and stage it.
    pub fn write_and_stage(&self, path: &str, contents: &str) -> Result<(), GitError> {
        let full = self.work_dir()?.join(path);
        std::fs::write(&full, contents).map_err(|e| GitError::Internal {
            message: format!("failed to write {}: {}", full.display(), e),
        })?;
        self.stage_path(Path::new(path))
    }

    /// Commit the index and return the new HEAD.
    pub fn commit(&self, message: &str) -> Result<Oid, GitError> {
        self.run(&["commit", "--quiet", "-m", message])?;
        self.head_oid()
    }

    // =========================================================================
    // Network Operations
    // =========================================================================

    /// Fetch all branches of `remote`.
    pub fn fetch(&self, remote: &str) -> Result<(), GitError> {
        self.run(&["fetch", "--quiet", "--prune", remote]).map(drop)
    }

    /// Push a local branch to `remote`, setting upstream tracking.
    pub fn push(&self, remote: &str, branch: &BranchName) -> Result<(), GitError> {
        self.run(&["push", "--quiet", "--set-upstream", remote, branch.as_str()])
            .map(drop)
    }

    // =========================================================================
    // Process plumbing
    // =========================================================================

    fn command(&self, args: &[&str]) -> Result<std::process::Output, GitError> {
        let dir = self.work_dir()?;
        debug!(dir = %dir.display(), "git {}", args.join(" "));
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| GitError::Spawn {
                message: e.to_string(),
            })
    }

    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.command(args)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                dir: self.work_dir()?.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn to_git2(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn git_state_descriptions() {
        assert_eq!(GitState::Clean.description(), "clean");
        assert_eq!(GitState::Merge.to_string(), "merge");
        assert!(GitState::Rebase.is_in_progress());
    }

    #[test]
    fn worktree_status_clean() {
        assert!(WorktreeStatus::default().is_clean());
        let dirty = WorktreeStatus {
            unstaged: 1,
            ..Default::default()
        };
        assert!(!dirty.is_clean());
    }

    #[test]
    fn type_errors_map_to_git_errors() {
        let err: GitError = TypeError::InvalidOid("x".into()).into();
        assert!(matches!(err, GitError::InvalidOid { .. }));
        let err: GitError = TypeError::InvalidBranchName("x".into()).into();
        assert!(matches!(err, GitError::InvalidRefName { .. }));
    }

    #[test]
    fn submodule_display_path() {
        let sm = SubmoduleInfo {
            name: "a".into(),
            path: PathBuf::from("services/a"),
            branch: None,
            head_id: None,
            workdir_id: None,
        };
        assert_eq!(sm.display_path(), "services/a");
        assert!(!sm.is_initialized());
    }
}
