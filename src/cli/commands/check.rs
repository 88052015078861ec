//! check command - Verify meta submodule consistency

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use serde::Serialize;

use super::open_repo;
use crate::core::types::Oid;
use crate::core::verify::{check_meta_consistency, MetaObservation, VerifyError};
use crate::engine::consistency::observe_meta;
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};

/// Machine-readable result of `subrel check --json`.
#[derive(Debug, Serialize)]
struct CheckReport {
    /// Root revision checked, or `None` for the checked-out submodules.
    revision: Option<Oid>,
    consistent: bool,
    /// Shared meta id when consistent.
    meta: Option<Oid>,
    observations: Vec<MetaObservation>,
    /// Every distinct meta id, sorted.
    distinct: Vec<Oid>,
}

/// Check that all submodules embed the same meta submodule commit.
///
/// Fails (exit code 1) on a mismatch.
pub fn check(ctx: &Context, rev: Option<&str>, json: bool) -> Result<()> {
    let (git, config) = open_repo(ctx)?;
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);

    let submodules = git.submodules()?;
    if let Some(sm) = submodules.iter().find(|sm| !sm.is_initialized()) {
        bail!(
            "submodule '{}' is not initialized (try: git submodule update --init)",
            sm.display_path()
        );
    }

    let revision = rev
        .map(|r| git.resolve(r))
        .transpose()
        .with_context(|| format!("cannot resolve '{}'", rev.unwrap_or_default()))?;
    let meta_path = Path::new(config.meta_submodule());
    let observations = observe_meta(&git, &submodules, meta_path, revision.as_ref())?;
    let result = check_meta_consistency(&observations);

    let report = match &result {
        Ok(ok) => CheckReport {
            revision,
            consistent: true,
            meta: ok.meta.clone(),
            distinct: ok.meta.iter().cloned().collect(),
            observations,
        },
        Err(VerifyError::MetaMismatch { distinct, .. }) => CheckReport {
            revision,
            consistent: false,
            meta: None,
            distinct: distinct.clone(),
            observations,
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for observation in &report.observations {
            output::print(format!("  {}", observation), verbosity);
        }
        match &report.meta {
            Some(meta) => output::print(
                format!(
                    "{} submodule(s) agree on {} {}",
                    report.observations.len(),
                    config.meta_submodule(),
                    output::short(meta)
                ),
                verbosity,
            ),
            None if report.consistent => output::print(
                format!("no submodule embeds {}", config.meta_submodule()),
                verbosity,
            ),
            None => {}
        }
    }

    result?;
    Ok(())
}
