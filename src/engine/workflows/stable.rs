//! engine::workflows::stable
//!
//! `stable`: merge a staging revision into `stable/<major>.<minor>.x`.
//!
//! Merges prefer the staging side (`-X theirs`). Submodule pointers that
//! differ between the stable branch and the chosen staging revision are
//! merged first inside each submodule on its own stable branch, and the root
//! then records those merged heads.
//!
//! # Invariants
//!
//! - A staging branch already contained in the remote stable branch ends the
//!   run before anything is changed
//! - The target revision passes the meta consistency check before any merge

use std::path::Path;

use tracing::{debug, info};

use super::{check_consistency, commit_message};
use crate::core::types::{BranchName, Oid, ReleaseBranch, Version};
use crate::engine::select::{change_summary, commit_label, PointerChange};
use crate::engine::{
    AbortReason, Mode, Outcome, Progress, Session, Stage, Summary, WorkflowError,
};
use crate::git::{Git, GitState, MergeOutcome};

/// Staging commits offered as merge targets.
const MAX_CANDIDATES: usize = 20;

pub fn run(session: &mut Session<'_>) -> Result<Outcome, WorkflowError> {
    let mut progress = Progress::new(Mode::Stable);

    session.ensure_ready()?;
    session.submodules()?;

    let remote = session.remote.clone();
    session.git.fetch(&remote)?;

    let default = latest_staging(&session.git, &remote)?.ok_or_else(|| {
        WorkflowError::precondition_with(
            format!("no staging/* branch found on '{}'", remote),
            "subrel staging",
        )
    })?;
    let version = session.confirm_version("stable", default)?;
    let staging = version.staging_branch();
    let stable = version.stable_branch();

    let staging_tip = session.git.remote_branch(&remote, &staging)?.ok_or_else(|| {
        WorkflowError::precondition(format!(
            "remote branch {}/{} not found",
            remote, staging
        ))
    })?;
    let remote_stable = session.git.remote_branch(&remote, &stable)?;

    if let Some(stable_tip) = &remote_stable {
        if session.git.is_ancestor(&staging_tip, stable_tip)? {
            session.say(format!("'{}' holds nothing new for '{}'", staging, stable));
            return Ok(Outcome::Aborted(AbortReason::NoStagingUpdate { staging, stable }));
        }
    }

    let stable_exists =
        remote_stable.is_some() || session.git.local_branch(&stable)?.is_some();
    if stable_exists {
        session.verify_branch(&stable)?;
    }
    progress.advance(Stage::BranchVerified)?;

    // Pick the staging revision to release.
    let base = if stable_exists {
        Some(session.git.head_oid()?)
    } else {
        None
    };
    let mut candidates = session.git.commits_between(base.as_ref(), &staging_tip)?;
    if candidates.is_empty() {
        session.say(format!("'{}' already contains '{}'", stable, staging));
        return Ok(Outcome::Aborted(AbortReason::NoStagingUpdate { staging, stable }));
    }
    candidates.truncate(MAX_CANDIDATES);
    let options: Vec<String> = candidates.iter().map(commit_label).collect();
    let choice = session.prompter().select(
        &format!("Revision of '{}' to merge into '{}'", staging, stable),
        &options,
        0,
    )?;
    let target = candidates
        .get(choice)
        .map(|c| c.oid.clone())
        .unwrap_or(staging_tip);
    info!(target = %target.short(10), "stable target chosen");

    let submodules = session.submodules()?;
    for sm in &submodules {
        let (sub, sub_remote) = session.open_submodule(&sm.path)?;
        sub.fetch(&sub_remote)?;
    }
    check_consistency(session, &submodules, Some(&target))?;
    progress.advance(Stage::ChangesChosen)?;

    // Submodules first: merge each differing pointer on its stable branch.
    let mut changes = Vec::new();
    let mut touched = Vec::new();
    for sm in &submodules {
        let Some(target_ptr) = session.git.gitlink_at(&target, &sm.path)? else {
            continue;
        };
        let stable_ptr = match &base {
            Some(base) => session.git.gitlink_at(base, &sm.path)?,
            None => None,
        };
        if stable_ptr.as_ref() == Some(&target_ptr) {
            continue;
        }

        let shown = sm.display_path();
        let (sub, sub_remote) = session.open_submodule(&sm.path)?;
        checkout_stable(&sub, &shown, &sub_remote, &stable, &target_ptr)?;
        merge_into_stable(&sub, &shown, &target_ptr, &stable)?;

        let head = sub.head_oid()?;
        let change = PointerChange {
            submodule: sm.name.clone(),
            path: sm.path.clone(),
            commits: sub.commits_between(stable_ptr.as_ref(), &head)?.len(),
            old: stable_ptr,
            new: head,
        };
        session.say(&change);
        changes.push(change);
        touched.push((sub, sub_remote));
    }

    // Root: merge the staging revision, then record the merged heads.
    let message = format!("Merge {} ({}) into {}", staging, target.short(10), stable);
    let conflicts = if stable_exists {
        match session.git.merge_theirs(&target, &message, false)? {
            MergeOutcome::Clean => Vec::new(),
            MergeOutcome::Conflicted(paths) => paths,
        }
    } else {
        session.git.checkout_new_branch(&stable, &target)?;
        Vec::new()
    };

    for change in &changes {
        session.git.stage_gitlink(&change.path, &change.new)?;
    }
    for path in &conflicts {
        if changes.iter().any(|c| c.display_path() == *path) {
            continue;
        }
        if let Some(ptr) = session.git.gitlink_at(&target, Path::new(path))? {
            session.git.stage_gitlink(Path::new(path), &ptr)?;
        }
    }
    let version_file = session.config.version_file().to_string();
    session
        .git
        .write_and_stage(&version_file, &format!("{}\n", version))?;

    let unresolved = session.git.conflicted_paths()?;
    if !unresolved.is_empty() {
        return Err(WorkflowError::precondition_with(
            format!("unresolved merge conflicts: {}", unresolved.join(", ")),
            "git merge --abort",
        ));
    }

    let merging = session.git.state() == GitState::Merge;
    let commit = if merging || session.git.has_staged_changes()? {
        let title = format!("Stable {}", version);
        session
            .git
            .commit(&commit_message(&title, &change_summary(&changes)))?
    } else {
        session.git.head_oid()?
    };
    session.say(format!("Committed {} on '{}'", commit.short(10), stable));
    progress.advance(Stage::CommitCreated)?;

    for (sub, sub_remote) in &touched {
        session.push(sub, sub_remote, &stable)?;
    }
    let pushed = session.push(&session.git, &remote, &stable)?;
    if pushed {
        progress.advance(Stage::Pushed)?;
    } else {
        session.say("Commits kept local (--local)");
    }
    progress.advance(Stage::Done)?;

    Ok(Outcome::Completed(Summary {
        branch: Some(stable),
        version: Some(version),
        commit: Some(commit),
        pushed,
        changes,
        warnings: Vec::new(),
    }))
}

/// Highest `staging/<version>` on `remote`.
fn latest_staging(git: &Git, remote: &str) -> Result<Option<Version>, WorkflowError> {
    let versions = git
        .list_remote_branches(remote, "staging/")?
        .iter()
        .filter_map(|b| match ReleaseBranch::classify(b) {
            ReleaseBranch::Staging(v) => Some(v),
            _ => None,
        })
        .max();
    Ok(versions)
}

/// Check out the submodule's stable branch, creating it when needed.
fn checkout_stable(
    sub: &Git,
    shown: &str,
    remote: &str,
    stable: &BranchName,
    target_ptr: &Oid,
) -> Result<(), WorkflowError> {
    let remote_tip = sub.remote_branch(remote, stable)?;

    if sub.local_branch(stable)?.is_none() {
        let start = remote_tip.as_ref().unwrap_or(target_ptr);
        debug!(submodule = shown, start = %start.short(10), "creating stable branch");
        return Ok(sub.checkout_new_branch(stable, start)?);
    }

    sub.checkout_branch(stable)?;
    let Some(remote_tip) = remote_tip else {
        return Ok(());
    };
    let head = sub.head_oid()?;
    if sub.is_ancestor(&head, &remote_tip)? {
        sub.fast_forward(&remote_tip)?;
    } else if !sub.is_ancestor(&remote_tip, &head)? {
        return Err(WorkflowError::precondition_with(
            format!(
                "{}: local '{}' has diverged from {}/{}",
                shown, stable, remote, stable
            ),
            format!("git -C {} reset --hard {}/{}", shown, remote, stable),
        ));
    }
    Ok(())
}

/// Merge `target_ptr` into the checked-out stable branch of a submodule.
fn merge_into_stable(
    sub: &Git,
    shown: &str,
    target_ptr: &Oid,
    stable: &BranchName,
) -> Result<(), WorkflowError> {
    let head = sub.head_oid()?;
    if sub.is_ancestor(target_ptr, &head)? {
        debug!(submodule = shown, "target already on stable branch");
        return Ok(());
    }

    let message = format!("Merge {} into {}", target_ptr.short(10), stable);
    if let MergeOutcome::Conflicted(paths) = sub.merge_theirs(target_ptr, &message, false)? {
        // -X theirs leaves nested gitlinks conflicted; take the target's.
        for path in &paths {
            if let Some(ptr) = sub.gitlink_at(target_ptr, Path::new(path))? {
                sub.stage_gitlink(Path::new(path), &ptr)?;
            }
        }
        let unresolved = sub.conflicted_paths()?;
        if !unresolved.is_empty() {
            return Err(WorkflowError::precondition_with(
                format!(
                    "{}: unresolved merge conflicts: {}",
                    shown,
                    unresolved.join(", ")
                ),
                format!("git -C {} merge --abort", shown),
            ));
        }
    }
    sub.commit(&message)?;
    Ok(())
}
