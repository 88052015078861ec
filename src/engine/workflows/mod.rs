//! engine::workflows
//!
//! The four release workflows.
//!
//! | Mode                | Root branch advanced           | Pushed            |
//! |---------------------|--------------------------------|-------------------|
//! | `fetch-all-changes` | none                           | nothing           |
//! | `staging`           | `staging/<version>` or `main`  | staging only      |
//! | `stable`            | `stable/<major>.<minor>.x`     | yes               |
//! | `hotfix`            | `stable/<major>.<minor>.x`     | yes               |

pub mod fetch;
pub mod hotfix;
pub mod stable;
pub mod staging;

use std::path::Path;

use super::{consistency, Session, WorkflowError};
use crate::core::types::{BranchName, Oid};
use crate::core::verify::{MetaConsistency, VerifyError};
use crate::git::SubmoduleInfo;

/// Upstream branch of a submodule when `.gitmodules` names none.
const DEFAULT_UPSTREAM: &str = "main";

/// Branch a submodule follows: `submodule.<name>.branch`, else `main`.
fn tracked_branch(sm: &SubmoduleInfo) -> Result<BranchName, WorkflowError> {
    let configured = sm.branch.as_deref().unwrap_or(DEFAULT_UPSTREAM);
    BranchName::new(configured).map_err(|e| {
        WorkflowError::precondition_with(
            format!(
                "{}: submodule.{}.branch '{}' is not usable: {}",
                sm.display_path(),
                sm.name,
                configured,
                e
            ),
            format!("git config -f .gitmodules submodule.{}.branch main", sm.name),
        )
    })
}

/// Run the meta consistency check for a session.
fn check_consistency(
    session: &Session<'_>,
    submodules: &[SubmoduleInfo],
    target: Option<&Oid>,
) -> Result<MetaConsistency, WorkflowError> {
    let meta = Path::new(session.config.meta_submodule());
    consistency::check_tree(&session.git, submodules, meta, target)
}

/// Like [`check_consistency`], but hand back a mismatch instead of failing.
fn soft_check_consistency(
    session: &Session<'_>,
    submodules: &[SubmoduleInfo],
) -> Result<Result<MetaConsistency, VerifyError>, WorkflowError> {
    match check_consistency(session, submodules, None) {
        Ok(ok) => Ok(Ok(ok)),
        Err(WorkflowError::Consistency(mismatch)) => Ok(Err(mismatch)),
        Err(e) => Err(e),
    }
}

/// Commit message: a title line, then one line per pointer change.
fn commit_message(title: &str, body: &str) -> String {
    if body.is_empty() {
        title.to_string()
    } else {
        format!("{}\n\n{}", title, body)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn submodule(branch: Option<&str>) -> SubmoduleInfo {
        SubmoduleInfo {
            name: "svc-a".into(),
            path: PathBuf::from("svc-a"),
            branch: branch.map(String::from),
            head_id: None,
            workdir_id: None,
        }
    }

    #[test]
    fn tracked_branch_defaults_to_main() {
        assert_eq!(tracked_branch(&submodule(None)).unwrap().as_str(), "main");
        assert_eq!(
            tracked_branch(&submodule(Some("develop"))).unwrap().as_str(),
            "develop"
        );
    }

    #[test]
    fn tracked_branch_rejects_unusable_config() {
        let err = tracked_branch(&submodule(Some("."))).unwrap_err();
        assert!(matches!(err, WorkflowError::Precondition { .. }));
        let text = err.to_string();
        assert!(text.contains("submodule.svc-a.branch '.'"));
        assert!(text.contains("git config -f .gitmodules submodule.svc-a.branch main"));
    }

    #[test]
    fn commit_message_separates_body() {
        assert_eq!(commit_message("Staging 4.2.8", ""), "Staging 4.2.8");
        assert_eq!(
            commit_message("Staging 4.2.8", "a: 1..2 (1 commit)"),
            "Staging 4.2.8\n\na: 1..2 (1 commit)"
        );
    }
}
