//! engine::workflows::fetch
//!
//! `fetch-all-changes`: bring every submodule to its upstream tip.
//!
//! By default each submodule ends on a detached HEAD at the remote-tracking
//! tip. With `--pull` the local branch is checked out and fast-forwarded
//! instead. Nothing is committed in the root.

use tracing::info;

use super::{soft_check_consistency, tracked_branch};
use crate::core::types::{BranchName, Oid};
use crate::engine::select::PointerChange;
use crate::engine::{Mode, Outcome, Progress, Session, Stage, Summary, WorkflowError};
use crate::git::{Git, SubmoduleInfo};
use crate::ui::output;

pub fn run(session: &mut Session<'_>) -> Result<Outcome, WorkflowError> {
    let mut progress = Progress::new(Mode::FetchAllChanges);

    let submodules = session.submodules()?;
    progress.advance(Stage::BranchVerified)?;

    let mut summary = Summary::default();
    for sm in &submodules {
        if let Some(change) = update_submodule(session, sm)? {
            session.say(format!(
                "{}: {}",
                change.display_path(),
                output::format_move(change.old.as_ref(), &change.new)
            ));
            summary.changes.push(change);
        }
    }
    if summary.changes.is_empty() {
        session.say("All submodules are up to date");
    }
    progress.advance(Stage::ChangesChosen)?;

    if let Err(mismatch) = soft_check_consistency(session, &submodules)? {
        output::warn(&mismatch);
        summary.warnings.push(mismatch.to_string());
    }

    progress.advance(Stage::Done)?;
    Ok(Outcome::Completed(summary))
}

/// Fetch one submodule and move it to its upstream tip.
fn update_submodule(
    session: &Session<'_>,
    sm: &SubmoduleInfo,
) -> Result<Option<PointerChange>, WorkflowError> {
    let shown = sm.display_path();
    let (sub, remote) = session.open_submodule(&sm.path)?;

    info!(submodule = %shown, remote = %remote, "fetching");
    sub.fetch(&remote)?;

    let branch = tracked_branch(sm)?;
    let tip = sub.remote_branch(&remote, &branch)?.ok_or_else(|| {
        WorkflowError::precondition(format!(
            "{}: remote branch {}/{} not found",
            shown, remote, branch
        ))
    })?;

    let old = sub.head_oid()?;
    if session.ctx.pull {
        pull_branch(&sub, &shown, &remote, &branch, &tip)?;
    } else if old != tip {
        sub.checkout_detached(&tip)?;
    }

    let new = sub.head_oid()?;
    if new == old {
        return Ok(None);
    }
    let commits = sub.commits_between(Some(&old), &new)?.len();
    Ok(Some(PointerChange {
        submodule: sm.name.clone(),
        path: sm.path.clone(),
        old: Some(old),
        new,
        commits,
    }))
}

/// Check out the local branch and fast-forward it to `tip`.
fn pull_branch(
    sub: &Git,
    shown: &str,
    remote: &str,
    branch: &BranchName,
    tip: &Oid,
) -> Result<(), WorkflowError> {
    if sub.current_branch()?.as_ref() != Some(branch) {
        if sub.local_branch(branch)?.is_some() {
            sub.checkout_branch(branch)?;
        } else {
            sub.checkout_new_branch(branch, tip)?;
        }
    }

    let head = sub.head_oid()?;
    if &head == tip {
        return Ok(());
    }
    if sub.is_ancestor(&head, tip)? {
        sub.fast_forward(tip)?;
    } else if sub.is_ancestor(tip, &head)? {
        output::warn(format!(
            "{}: '{}' is ahead of {}/{}",
            shown, branch, remote, branch
        ));
    } else {
        return Err(WorkflowError::precondition_with(
            format!(
                "{}: local branch '{}' cannot be fast-forwarded to {}/{}",
                shown, branch, remote, branch
            ),
            format!("git -C {} rebase {}/{}", shown, remote, branch),
        ));
    }
    Ok(())
}
