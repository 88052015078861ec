//! release commands - fetch-all-changes, staging, stable, hotfix

use anyhow::{Context as _, Result};

use super::open_repo;
use crate::cli::args::ModeFlags;
use crate::engine::{self, Context, Mode, Outcome, Session, Summary};
use crate::ui::output::{self, Verbosity};
use crate::ui::prompts::{DefaultPrompter, Prompter, TerminalPrompter};

/// Run one release workflow.
///
/// A clean abort (nothing to do, operator declined) is reported and counts
/// as success.
pub fn release(mode: Mode, flags: ModeFlags, mut ctx: Context) -> Result<()> {
    let (git, config) = open_repo(&ctx)?;

    ctx.interactive = ctx.interactive && config.interactive();
    ctx.pull = flags.pull || config.pull();
    ctx.local = flags.local;
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);

    let mut terminal;
    let mut defaults;
    let prompter: &mut dyn Prompter = if ctx.interactive {
        terminal = TerminalPrompter::stdio();
        &mut terminal
    } else {
        defaults = DefaultPrompter;
        &mut defaults
    };

    let mut session = Session::new(git, ctx, config, prompter)?;
    let outcome = engine::run(mode, &mut session).with_context(|| format!("{} failed", mode))?;

    match outcome {
        Outcome::Completed(summary) => report(mode, &summary, verbosity),
        Outcome::Aborted(reason) => output::print(format!("Aborted: {}", reason), verbosity),
    }
    Ok(())
}

fn report(mode: Mode, summary: &Summary, verbosity: Verbosity) {
    for warning in &summary.warnings {
        output::warn(warning);
    }

    let (Some(branch), Some(commit)) = (&summary.branch, &summary.commit) else {
        output::print(
            format!("{}: {} submodule(s) updated", mode, summary.changes.len()),
            verbosity,
        );
        return;
    };

    let version = summary
        .version
        .map(|v| format!(" ({})", v))
        .unwrap_or_default();
    let state = if summary.pushed { "pushed" } else { "local only" };
    output::print(
        format!(
            "{}: '{}' at {}{}, {}",
            mode,
            branch,
            output::short(commit),
            version,
            state
        ),
        verbosity,
    );
}
