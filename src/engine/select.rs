//! engine::select
//!
//! Interactive choice of submodule commits.
//!
//! For each submodule whose upstream has moved past the pointer recorded in
//! the root, the operator sees the new commits (newest first) and picks one,
//! or skips the submodule. The chosen commit is checked out detached in the
//! submodule and the gitlink is staged in the root.

use std::fmt;
use std::path::PathBuf;

use tracing::debug;

use super::{Session, WorkflowError};
use crate::core::types::{BranchName, Oid};
use crate::git::{CommitInfo, SubmoduleInfo};
use crate::ui::output;

/// A submodule pointer moved by a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerChange {
    /// Submodule name from `.gitmodules`.
    pub submodule: String,
    /// Submodule path in the root.
    pub path: PathBuf,
    /// Pointer before the move (absent for a newly added submodule).
    pub old: Option<Oid>,
    /// Pointer after the move.
    pub new: Oid,
    /// Commits between `old` and `new`.
    pub commits: usize,
}

impl PointerChange {
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }
}

impl fmt::Display for PointerChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let old = self
            .old
            .as_ref()
            .map(|o| output::short(o).to_string())
            .unwrap_or_else(|| "(none)".to_string());
        let noun = if self.commits == 1 { "commit" } else { "commits" };
        write!(
            f,
            "{}: {}..{} ({} {})",
            self.display_path(),
            old,
            output::short(&self.new),
            self.commits,
            noun
        )
    }
}

/// Label shown for one candidate commit.
pub(crate) fn commit_label(commit: &CommitInfo) -> String {
    format!(
        "{}  {}  {}",
        output::short(&commit.oid),
        commit.author_time.format("%Y-%m-%d"),
        commit.summary
    )
}

/// Where [`select_changes`] takes a submodule's new commits from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upstream {
    /// The submodule's remote must carry this branch.
    Required(BranchName),
    /// A remote without this branch leaves the submodule untouched.
    Optional(BranchName),
}

impl Upstream {
    fn branch(&self) -> &BranchName {
        match self {
            Upstream::Required(b) | Upstream::Optional(b) => b,
        }
    }
}

/// Offer new upstream commits of every submodule for selection.
///
/// `upstream` names the branch to take commits from. A missing
/// [`Upstream::Required`] branch is a precondition error; a missing
/// [`Upstream::Optional`] one is reported and the submodule skipped.
pub fn select_changes<F>(
    session: &mut Session<'_>,
    submodules: &[SubmoduleInfo],
    upstream: F,
) -> Result<Vec<PointerChange>, WorkflowError>
where
    F: Fn(&SubmoduleInfo) -> Result<Upstream, WorkflowError>,
{
    let mut changes = Vec::new();

    for sm in submodules {
        let shown = sm.display_path();
        let source = upstream(sm)?;
        let branch = source.branch();
        let (sub, remote) = session.open_submodule(&sm.path)?;
        sub.fetch(&remote)?;

        let Some(tip) = sub.remote_branch(&remote, branch)? else {
            if matches!(source, Upstream::Optional(_)) {
                session.say(format!("{}: no {}/{}, skipped", shown, remote, branch));
                continue;
            }
            return Err(WorkflowError::precondition_with(
                format!("{}: remote branch {}/{} not found", shown, remote, branch),
                format!("git -C {} ls-remote --heads {}", shown, remote),
            ));
        };

        let old = sm.head_id.clone();
        let commits = sub.commits_between(old.as_ref(), &tip)?;
        if commits.is_empty() {
            debug!(submodule = %shown, "no new commits");
            continue;
        }

        let mut options: Vec<String> = commits.iter().map(commit_label).collect();
        options.push(match &old {
            Some(old) => format!("skip (keep {})", output::short(old)),
            None => "skip".to_string(),
        });

        let message = format!(
            "{}: {} new commit(s) on {}/{}",
            shown,
            commits.len(),
            remote,
            branch
        );
        let choice = session.prompter().select(&message, &options, 0)?;

        let Some(chosen) = commits.get(choice) else {
            if let Some(old) = &old {
                sub.checkout_detached(old)?;
            }
            session.say(format!("{}: skipped", shown));
            continue;
        };

        sub.checkout_detached(&chosen.oid)?;
        session.git.stage_path(&sm.path)?;

        let change = PointerChange {
            submodule: sm.name.clone(),
            path: sm.path.clone(),
            old: old.clone(),
            new: chosen.oid.clone(),
            commits: commits.len() - choice,
        };
        session.say(&change);
        changes.push(change);
    }

    Ok(changes)
}

/// Commit message body listing every pointer change.
pub fn change_summary(changes: &[PointerChange]) -> String {
    output::format_list(changes, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(c: char) -> Oid {
        Oid::new(c.to_string().repeat(40)).unwrap()
    }

    #[test]
    fn pointer_change_display() {
        let change = PointerChange {
            submodule: "backend".into(),
            path: PathBuf::from("openslides-backend"),
            old: Some(oid('a')),
            new: oid('b'),
            commits: 3,
        };
        assert_eq!(
            change.to_string(),
            "openslides-backend: aaaaaaaaaa..bbbbbbbbbb (3 commits)"
        );
    }

    #[test]
    fn pointer_change_display_single_commit_without_old() {
        let change = PointerChange {
            submodule: "client".into(),
            path: PathBuf::from("client"),
            old: None,
            new: oid('c'),
            commits: 1,
        };
        assert_eq!(change.to_string(), "client: (none)..cccccccccc (1 commit)");
    }

    #[test]
    fn summary_has_one_line_per_change() {
        let changes = vec![
            PointerChange {
                submodule: "a".into(),
                path: PathBuf::from("a"),
                old: Some(oid('1')),
                new: oid('2'),
                commits: 2,
            },
            PointerChange {
                submodule: "b".into(),
                path: PathBuf::from("b"),
                old: Some(oid('3')),
                new: oid('4'),
                commits: 5,
            },
        ];
        let summary = change_summary(&changes);
        assert_eq!(summary.lines().count(), 2);
        assert!(summary.starts_with("a: 1111111111..2222222222"));
    }
}
