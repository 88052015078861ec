//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--no-interactive`: Never prompt; take every default
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// subrel - coordinate releases of a repository and its submodules
#[derive(Parser, Debug)]
#[command(name = "subrel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if subrel was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Whether prompts may be shown.
    ///
    /// False with `--no-interactive` or `--quiet`, or when stdin is not a
    /// terminal.
    pub fn interactive(&self) -> bool {
        !(self.no_interactive || self.quiet) && std::io::stdin().is_terminal()
    }
}

/// Flags shared by the release workflows.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ModeFlags {
    /// Check out and fast-forward submodule branches instead of detaching
    #[arg(short, long)]
    pub pull: bool,

    /// Commit locally but never push
    #[arg(short, long)]
    pub local: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch every submodule and move it to its upstream tip
    #[command(
        name = "fetch-all-changes",
        long_about = "Fetch every submodule and move it to its upstream tip.\n\n\
            Each submodule is fetched from its remote and checked out at the tip of \
            its upstream branch (submodule.<name>.branch, default main) with a \
            detached HEAD. With --pull the local branch is checked out and \
            fast-forwarded instead. The root repository is not committed.",
        after_help = "\
EXAMPLES:
    # Detached checkout of every upstream tip
    subrel fetch-all-changes

    # Keep submodules on their local branches
    subrel fetch-all-changes --pull"
    )]
    FetchAllChanges {
        #[command(flatten)]
        flags: ModeFlags,
    },

    /// Pick submodule commits for a staging release
    #[command(
        name = "staging",
        long_about = "Pick submodule commits for a staging release.\n\n\
            Proposes the next patch version based on VERSION on the remote main \
            branch, then records the chosen submodule commits on staging/<version>. \
            Running it again without new upstream commits changes nothing.",
        after_help = "\
EXAMPLES:
    # Prepare the next staging release and push it
    subrel staging

    # Prepare it without pushing
    subrel staging --local"
    )]
    Staging {
        #[command(flatten)]
        flags: ModeFlags,
    },

    /// Merge a staging release into its stable branch
    #[command(
        name = "stable",
        long_about = "Merge a staging release into its stable branch.\n\n\
            The newest staging/<version> on the remote is proposed. Submodules are \
            merged on their own stable/<major>.<minor>.x branches first, preferring \
            the staging side on conflicts, and the root records the merged heads."
    )]
    Stable {
        #[command(flatten)]
        flags: ModeFlags,
    },

    /// Release submodule fixes as a new patch version of a stable line
    #[command(name = "hotfix")]
    Hotfix {
        #[command(flatten)]
        flags: ModeFlags,
    },

    /// Check that all submodules agree on the meta submodule
    #[command(name = "check")]
    Check {
        /// Root revision to check (default: the checked-out submodules)
        #[arg(long)]
        rev: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    #[command(name = "completion")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
