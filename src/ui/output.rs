//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Operator-facing output is formatted consistently and respects the quiet
//! flag. Diagnostics for developers go through `tracing` instead.

use std::fmt::Display;

use crate::core::types::Oid;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a warning message (always shown; warnings call for a decision).
pub fn warn(message: impl Display) {
    eprintln!("warning: {}", message);
}

/// Short commit id as shown to the operator.
pub fn short(oid: &Oid) -> &str {
    oid.short(10)
}

/// Format a pointer move `old -> new`, where `old` may be absent.
pub fn format_move(old: Option<&Oid>, new: &Oid) -> String {
    match old {
        Some(old) => format!("{} -> {}", short(old), short(new)),
        None => format!("(none) -> {}", short(new)),
    }
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}
