//! engine::workflows::hotfix
//!
//! `hotfix`: pick commits from the submodules' stable branches and release
//! them as the next patch version of a stable line.

use super::{commit_message, soft_check_consistency};
use crate::core::types::{ReleaseBranch, StableLine};
use crate::engine::select::{change_summary, select_changes, Upstream};
use crate::engine::{
    AbortReason, Mode, Outcome, Progress, Session, Stage, Summary, WorkflowError,
};
use crate::ui::output;

pub fn run(session: &mut Session<'_>) -> Result<Outcome, WorkflowError> {
    let mut progress = Progress::new(Mode::Hotfix);

    session.ensure_ready()?;
    session.submodules()?;

    let remote = session.remote.clone();
    session.git.fetch(&remote)?;

    let line = default_line(session)?;
    let stable = line.branch();
    let tip = match session.git.remote_branch(&remote, &stable)? {
        Some(tip) => tip,
        None => session.git.local_branch(&stable)?.ok_or_else(|| {
            WorkflowError::precondition(format!("branch '{}' not found", stable))
        })?,
    };

    let (current, next) = session.next_version(&tip)?;
    let version = session.confirm_version("hotfix", next)?;
    if version.stable_line() != line || version <= current {
        return Err(WorkflowError::precondition(format!(
            "hotfix version {} must be a later {} release than {}",
            version, line, current
        )));
    }

    session.verify_branch(&stable)?;
    progress.advance(Stage::BranchVerified)?;

    let submodules = session.submodules()?;
    let changes = select_changes(session, &submodules, |_| {
        Ok(Upstream::Optional(stable.clone()))
    })?;

    let mut warnings = Vec::new();
    if let Err(mismatch) = soft_check_consistency(session, &submodules)? {
        output::warn(&mismatch);
        if !session.prompter().confirm("Continue anyway?", false)? {
            return Ok(Outcome::Aborted(AbortReason::Declined(
                "meta submodule mismatch".to_string(),
            )));
        }
        warnings.push(mismatch.to_string());
    }
    progress.advance(Stage::ChangesChosen)?;

    if changes.is_empty() {
        session.say("No changes");
        return Ok(Outcome::Aborted(AbortReason::NoChanges));
    }

    session.write_version(&version)?;
    let title = format!("Hotfix {}", version);
    let commit = session
        .git
        .commit(&commit_message(&title, &change_summary(&changes)))?;
    session.say(format!("Committed {} on '{}'", commit.short(10), stable));
    progress.advance(Stage::CommitCreated)?;

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
        warnings,
    }))
}

/// The stable line to hotfix: the checked-out one, else the newest on the
/// remote.
fn default_line(session: &Session<'_>) -> Result<StableLine, WorkflowError> {
    if let Some(branch) = session.git.current_branch()? {
        if let ReleaseBranch::Stable(line) = ReleaseBranch::classify(&branch) {
            return Ok(line);
        }
    }

    session
        .git
        .list_remote_branches(&session.remote, "stable/")?
        .iter()
        .filter_map(|b| match ReleaseBranch::classify(b) {
            ReleaseBranch::Stable(line) => Some(line),
            _ => None,
        })
        .max()
        .ok_or_else(|| {
            WorkflowError::precondition_with(
                format!("no stable/* branch found on '{}'", session.remote),
                "subrel stable",
            )
        })
}
