//! # edgeroute
//!
//! **edgeroute** generates the registration glue of a decorator-driven edge
//! service. It scans TypeScript sources for controller and consumer markers and
//! writes two modules: an HTTP router and a queue message dispatcher.
//!
//! ## Overview
//!
//! ```typescript
//! @Controller('/api')
//! export class ItemController {
//!   @Get('/items')
//!   list(request: IRequest) { /* ... */ }
//! }
//! ```
//!
//! becomes
//!
//! ```typescript
//! router.get('/api/items', (request: IRequest, ...args: unknown[]) =>
//!   container.resolve(ItemController).list(request, ...args),
//! );
//! ```
//!
//! Nothing in the scanned sources is executed. Marker arguments are folded from
//! the syntax tree, and anything that is not a literal string is reported.
//!
//! ## Architecture
//!
//! - **[`scanner`]** - deterministic walk of a target's source directory
//! - **[`syntax`]** - tree-sitter TypeScript/TSX parsing
//! - **[`extract`]** - marker extraction with explicit class context
//! - **[`table`]** - ordered route and queue task tables plus the import map
//! - **[`paths`]** - route path normalization and import specifiers
//! - **[`linter`]** - extraction warnings and conflict detection
//! - **[`generator`]** - askama rendering, atomic writes, per-target runs
//! - **[`config`]** - `edgeroute.toml`
//! - **[`logging`]** - tracing subscriber setup
//! - **[`cli`]** - the `edgeroute-gen` command line
//!
//! ### Generation Flow
//!
//! ```text
//! edgeroute.toml ─┐
//!                 ▼
//! source dir ─► scanner ─► syntax ─► extract ─► table ─► linter ─► generator ─► output
//! ```
//!
//! The HTTP and queue targets run the same pipeline with different markers and
//! templates. A target whose source directory is missing is skipped; a target
//! with conflicts (duplicate routes, queues or class names) is not written and
//! the run fails.
//!
//! ## Quick Start
//!
//! ```bash
//! edgeroute-gen generate            # write src/generated/{router,queue}.ts
//! edgeroute-gen routes              # list what was discovered
//! edgeroute-gen check               # CI: fail if generated files are stale
//! ```

pub mod cli;
pub mod config;
pub mod extract;
pub mod generator;
pub mod linter;
pub mod logging;
pub mod paths;
pub mod scanner;
pub mod syntax;
pub mod table;

pub use config::{resolve_config, GeneratorConfig};
pub use generator::{generate_all, GenerateError, TargetOutcome};
pub use table::{DispatchTable, HttpMethod, PipelineKind, QueueTask, RouteRecord};
