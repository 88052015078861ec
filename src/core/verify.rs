//! core::verify
//!
//! Meta consistency verification.
//!
//! Every top-level submodule that embeds the shared meta submodule records
//! a gitlink for it. For a release to be coherent all of those gitlinks
//! must point at the same commit.
//!
//! # Invariants
//!
//! - Never touches the repository; callers collect observations
//! - Must be deterministic: observations are reported in input order and
//!   distinct ids in sorted order

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::types::Oid;

/// The meta gitlink seen through one top-level submodule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaObservation {
    /// Path of the top-level submodule.
    pub submodule: String,
    /// Gitlink of the nested meta submodule inside it.
    pub meta: Oid,
}

impl MetaObservation {
    pub fn new(submodule: impl Into<String>, meta: Oid) -> Self {
        Self {
            submodule: submodule.into(),
            meta,
        }
    }
}

impl fmt::Display for MetaObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.submodule, self.meta)
    }
}

/// Errors from verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error(
        "meta submodule is inconsistent across submodules ({}); distinct ids: {}",
        format_observations(.observations),
        format_ids(.distinct)
    )]
    MetaMismatch {
        /// Every observation, in the order collected.
        observations: Vec<MetaObservation>,
        /// Every distinct meta id, sorted.
        distinct: Vec<Oid>,
    },
}

fn format_observations(observations: &[MetaObservation]) -> String {
    observations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_ids(ids: &[Oid]) -> String {
    ids.iter()
        .map(Oid::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of a successful meta consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaConsistency {
    /// The shared meta id, or `None` if no submodule embeds the meta submodule.
    pub meta: Option<Oid>,
    /// Number of submodules that were compared.
    pub checked: usize,
}

/// Verify that all observed meta ids are byte-equal.
///
/// An empty observation set is trivially consistent.
///
/// # Example
///
/// ```
/// use subrel::core::types::Oid;
/// use subrel::core::verify::{check_meta_consistency, MetaObservation};
///
/// let m1 = Oid::new("1".repeat(40)).unwrap();
/// let ok = check_meta_consistency(&[
///     MetaObservation::new("A", m1.clone()),
///     MetaObservation::new("B", m1.clone()),
/// ])
/// .unwrap();
/// assert_eq!(ok.meta, Some(m1));
/// ```
pub fn check_meta_consistency(
    observations: &[MetaObservation],
) -> Result<MetaConsistency, VerifyError> {
    let distinct: BTreeSet<&Oid> = observations.iter().map(|o| &o.meta).collect();

    if distinct.len() > 1 {
        return Err(VerifyError::MetaMismatch {
            observations: observations.to_vec(),
            distinct: distinct.into_iter().cloned().collect(),
        });
    }

    Ok(MetaConsistency {
        meta: distinct.into_iter().next().cloned(),
        checked: observations.len(),
    })
}
