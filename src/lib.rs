//! Lockmend - Merge-conflict resolution for package manager lockfiles
//!
//! When branches that both touched the lockfile are merged, rebased or
//! cherry-picked, git leaves textual conflict markers behind and neither
//! side alone reflects the union of changes. This library detects the
//! conflict, parses both sides of every region (even across lockfile schema
//! generations), reconciles them deterministically and hands a valid
//! lockfile - plus refetch-avoidance hints - to the downstream resolver.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Reconciliation logic (no network I/O)
//! - [`registry`] - Package registry client and downstream resolution
//! - [`infra`] - Infrastructure layer (filesystem)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
pub mod registry;
