//! engine::workflows::staging
//!
//! `staging`: pick new submodule commits and record them on
//! `staging/<version>` (or, on request, on `main`).
//!
//! Running it twice without new upstream commits is a no-op the second
//! time: the selection is empty, `VERSION` already matches and the run ends
//! with "no changes".

use super::{check_consistency, commit_message, tracked_branch};
use crate::engine::gate::is_pushable;
use crate::engine::select::{change_summary, select_changes, Upstream};
use crate::engine::{
    AbortReason, Mode, Outcome, Progress, Session, Stage, Summary, WorkflowError,
};

pub fn run(session: &mut Session<'_>) -> Result<Outcome, WorkflowError> {
    let mut progress = Progress::new(Mode::Staging);

    session.ensure_ready()?;
    session.submodules()?;

    let remote = session.remote.clone();
    session.git.fetch(&remote)?;

    let main = session.main_branch()?;
    let main_tip = session.git.remote_branch(&remote, &main)?.ok_or_else(|| {
        WorkflowError::precondition(format!("remote branch {}/{} not found", remote, main))
    })?;

    let (_, default) = session.next_version(&main_tip)?;
    let version = session.confirm_version("staging", default)?;
    let staging = version.staging_branch();

    // Choose the root branch to advance.
    let staging_exists = session.git.local_branch(&staging)?.is_some()
        || session.git.remote_branch(&remote, &staging)?.is_some();
    let target = if staging_exists {
        session.verify_branch(&staging)?;
        staging.clone()
    } else if session.prompter().confirm(
        &format!("Create '{}' from {}/{}?", staging, remote, main),
        true,
    )? {
        session.git.checkout_new_branch(&staging, &main_tip)?;
        session.say(format!("Created '{}' at {}", staging, main_tip.short(10)));
        staging.clone()
    } else if session
        .prompter()
        .confirm(&format!("Update '{}' instead?", main), false)?
    {
        session.verify_branch(&main)?;
        main.clone()
    } else {
        return Ok(Outcome::Aborted(AbortReason::Declined(format!(
            "neither '{}' nor '{}' was chosen",
            staging, main
        ))));
    };
    let to_staging = target == staging;
    progress.advance(Stage::BranchVerified)?;

    // The root HEAD may have moved; re-read the recorded pointers.
    let submodules = session.submodules()?;
    let changes = select_changes(session, &submodules, |sm| {
        tracked_branch(sm).map(Upstream::Required)
    })?;
    check_consistency(session, &submodules, None)?;
    progress.advance(Stage::ChangesChosen)?;

    if to_staging {
        session.write_version(&version)?;
        for change in &changes {
            let (sub, _) = session.open_submodule(&change.path)?;
            sub.set_branch(&staging, &change.new)?;
        }
    }

    if !session.git.has_staged_changes()? {
        session.say("No changes");
        return Ok(Outcome::Aborted(AbortReason::NoChanges));
    }

    let title = if to_staging {
        format!("Staging {}", version)
    } else {
        "Update submodules".to_string()
    };
    let commit = session
        .git
        .commit(&commit_message(&title, &change_summary(&changes)))?;
    session.say(format!("Committed {} on '{}'", commit.short(10), target));
    progress.advance(Stage::CommitCreated)?;

    let mut pushed = false;
    if is_pushable(target.as_str()) {
        for change in &changes {
            let (sub, sub_remote) = session.open_submodule(&change.path)?;
            session.push(&sub, &sub_remote, &staging)?;
        }
        pushed = session.push(&session.git, &remote, &target)?;
    } else {
        session.say(format!(
            "'{}' is not pushed by this tool; publish it through review",
            target
        ));
    }

    if pushed {
        progress.advance(Stage::Pushed)?;
    } else if session.ctx.local {
        session.say("Commits kept local (--local)");
    }
    progress.advance(Stage::Done)?;

    Ok(Outcome::Completed(Summary {
        branch: Some(target),
        version: to_staging.then_some(version),
        commit: Some(commit),
        pushed,
        changes,
        warnings: Vec::new(),
    }))
}
