//! engine::consistency
//!
//! Collects meta observations from a repository tree and checks them.

use std::path::Path;

use tracing::debug;

use super::WorkflowError;
use crate::core::types::Oid;
use crate::core::verify::{check_meta_consistency, MetaConsistency, MetaObservation};
use crate::git::{Git, SubmoduleInfo};

/// Read the meta gitlink seen through every top-level submodule.
///
/// With a `target` revision the submodule pointers come from the root tree
/// at that revision; without one they come from each submodule's checked-out
/// HEAD. Submodules that do not embed the meta submodule are skipped.
pub fn observe_meta(
    git: &Git,
    submodules: &[SubmoduleInfo],
    meta_path: &Path,
    target: Option<&Oid>,
) -> Result<Vec<MetaObservation>, WorkflowError> {
    let mut observations = Vec::new();

    for sm in submodules {
        let shown = sm.display_path();
        let sub = git.open_submodule(&sm.path)?;

        let pointer = match target {
            Some(rev) => match git.gitlink_at(rev, &sm.path)? {
                Some(pointer) => pointer,
                None => {
                    debug!(submodule = %shown, "no pointer at target");
                    continue;
                }
            },
            None => sub.head_oid()?,
        };

        if !sub.has_commit(&pointer) {
            return Err(WorkflowError::precondition_with(
                format!(
                    "commit {} of submodule '{}' is not available locally",
                    pointer.short(10),
                    shown
                ),
                format!("git -C {} fetch", shown),
            ));
        }

        match sub.gitlink_at(&pointer, meta_path)? {
            Some(meta) => observations.push(MetaObservation::new(shown, meta)),
            None => debug!(submodule = %shown, "no meta submodule"),
        }
    }

    Ok(observations)
}

/// Observe and check the tree in one step.
pub fn check_tree(
    git: &Git,
    submodules: &[SubmoduleInfo],
    meta_path: &Path,
    target: Option<&Oid>,
) -> Result<MetaConsistency, WorkflowError> {
    let observations = observe_meta(git, submodules, meta_path, target)?;
    Ok(check_meta_consistency(&observations)?)
}
