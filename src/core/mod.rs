//! core
//!
//! Core domain types, configuration, and verification for subrel.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, RefName, Version, etc.
//! - [`verify`] - Meta submodule consistency check
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - All verification is deterministic

pub mod config;
pub mod types;
pub mod verify;
