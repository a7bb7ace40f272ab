//! # Generator Module
//!
//! Turns dispatch tables into TypeScript modules.
//!
//! ## Overview
//!
//! Two targets share one pipeline:
//!
//! ```text
//! source dir → scanner → tree-sitter → extractor → table → linter → askama → output file
//! ```
//!
//! - **http** renders `getRouter(container)`, registering middleware, one route per
//!   record in scan order, a health check and a catch-all 404.
//! - **queue** renders `handleMessage(container, batch, env, exec)`, a `switch` on
//!   the queue name whose arms acknowledge every message in a `finally` block.
//!
//! Each run regenerates the whole file. Output is deterministic: no timestamps,
//! files visited in name order, class imports sorted by name.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use edgeroute::config::resolve_config;
//! use edgeroute::generator::generate_all;
//! use edgeroute::table::PipelineKind;
//!
//! let root = std::path::Path::new(".");
//! let config = resolve_config(None, root)?;
//! generate_all(root, &config, &PipelineKind::ALL, false)?;
//! ```
//!
//! ## Templates
//!
//! Templates live in the `templates/` directory:
//!
//! - `router.ts.txt` - HTTP router module
//! - `queue.ts.txt` - queue dispatch module
//!
//! Every string that originates in scanned source (paths, queue names, import
//! specifiers) is passed to the templates already quoted by [`ts_string_literal`].

mod error;
mod project;
mod templates;

pub use error::GenerateError;
pub use project::*;
pub use templates::*;
