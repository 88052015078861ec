//! cli
//!
//! Command-line interface layer for subrel.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Set up logging and load configuration
//! - Delegate to command handlers
//! - Does NOT perform repository mutations directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to the
//! [`crate::engine`] for execution. Every repository change flows through a
//! workflow.

pub mod args;
pub mod commands;
pub mod logging;

pub use args::{Cli, ModeFlags, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::engine::Context;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    logging::init(cli.debug);

    let ctx = Context {
        cwd: Some(resolve_cwd(cli.cwd.clone())?),
        debug: cli.debug,
        quiet: cli.quiet,
        interactive: cli.interactive(),
        pull: false,
        local: false,
    };

    commands::dispatch(cli.command, ctx)
}

fn resolve_cwd(cwd: Option<PathBuf>) -> Result<PathBuf> {
    match cwd {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().context("cannot determine working directory"),
    }
}
