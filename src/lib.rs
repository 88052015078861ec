//! subrel - release coordination for a superproject and its submodules
//!
//! subrel is a single-binary, single-operator tool that moves submodule
//! pointers of a root repository through the release flow
//! `main -> staging/<version> -> stable/<major>.<minor>.x`, with hotfixes on
//! top of a stable line.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Workflows, branch gate, consistency check, selection
//! - [`core`] - Domain types, configuration, meta consistency verification
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Prompts and operator output
//!
//! # Correctness Invariants
//!
//! 1. Only `staging/*` and `stable/*` branches are ever pushed
//! 2. `--local` never touches the network on the push side
//! 3. A release never records submodules that disagree on the meta submodule
//! 4. No state is kept between runs beyond the repositories themselves

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
