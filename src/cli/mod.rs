//! # CLI Module
//!
//! Command-line surface of the `edgeroute-gen` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Scan the configured source directories and rewrite the generated modules:
//!
//! ```bash
//! edgeroute-gen generate --root . --only http
//! ```
//!
//! Options:
//! - `--root <DIR>` - Project root (default: current directory)
//! - `--config <FILE>` - Configuration file (default: `<root>/edgeroute.toml`)
//! - `--only <TARGETS>` - `http`, `queue` or both (comma-separated)
//! - `--dry-run` - Print the generated code instead of writing it
//!
//! ### `check`
//!
//! Exit non-zero when a generated module differs from a fresh render. Meant for CI.
//!
//! ### `lint`
//!
//! Print extraction warnings and dispatch conflicts (`--fail-on-error`, `--errors-only`).
//!
//! ### `routes`
//!
//! List discovered routes and queue consumers, as a table or `--json`.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use edgeroute::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{map_only_to_targets, run_cli, Cli, Commands, OnlyTarget, ProjectArgs};
