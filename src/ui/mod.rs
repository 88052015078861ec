//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive prompts and confirmations
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All operator output and prompts go through this module so that
//! workflows can run against a terminal, non-interactively, or from a
//! scripted answer source.

pub mod output;
pub mod prompts;
