//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository and loads its configuration
//! 2. Calls the engine to execute the command
//! 3. Formats and displays output
//!
//! Handlers do NOT perform repository mutations directly.

mod check;
mod completion;
mod release;

pub use check::check;
pub use completion::completion;
pub use release::release;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing::debug;

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::engine::{Context, Mode};
use crate::git::Git;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: Context) -> Result<()> {
    match command {
        Command::FetchAllChanges { flags } => release(Mode::FetchAllChanges, flags, ctx),
        Command::Staging { flags } => release(Mode::Staging, flags, ctx),
        Command::Stable { flags } => release(Mode::Stable, flags, ctx),
        Command::Hotfix { flags } => release(Mode::Hotfix, flags, ctx),
        Command::Check { rev, json } => check(&ctx, rev.as_deref(), json),
        Command::Completion { shell } => completion(shell),
    }
}

/// Open the root repository and load its configuration.
fn open_repo(ctx: &Context) -> Result<(Git, Config)> {
    let cwd = ctx.cwd.clone().unwrap_or_else(|| PathBuf::from("."));
    let git = Git::open(&cwd)?;
    let root = git.work_dir()?.to_path_buf();

    let loaded = Config::load(Some(&root)).context("failed to load configuration")?;
    for source in &loaded.sources {
        debug!(path = %source.display(), "config loaded");
    }
    Ok((git, loaded.config))
}
