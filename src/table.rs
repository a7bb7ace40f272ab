//! # Dispatch Tables
//!
//! The table builder accumulates facts extracted from every scanned file into an
//! ordered dispatch table. Records keep scan order: directory traversal order,
//! then declaration order inside each file. That order becomes branch order in
//! the generated router, where the first matching route wins, so it is never
//! re-sorted.
//!
//! The builder is deliberately permissive. Duplicate routes, queues or class
//! names are accepted here and reported afterwards by
//! [`crate::linter::lint_table`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::extract::FileFacts;
use crate::linter::LintIssue;

/// Which generator pipeline a table feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    /// HTTP routes registered on a router.
    Http,
    /// Queue consumers dispatched by queue name.
    Queue,
}

impl PipelineKind {
    /// All pipelines in generation order.
    pub const ALL: [PipelineKind; 2] = [PipelineKind::Http, PipelineKind::Queue];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Http => "http",
            PipelineKind::Queue => "queue",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP verbs a route marker can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    All,
}

impl HttpMethod {
    /// Match a marker name case-insensitively (`Get`, `GET`, `get`).
    pub fn from_marker(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            "all" => Some(HttpMethod::All),
            _ => None,
        }
    }

    /// Lowercase name, which is also the router registration method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::All => "all",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a record was declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    /// Module file, relative to the project root when possible.
    pub file: PathBuf,
    /// 1-based line of the method declaration.
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// One route per method carrying an HTTP verb marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    pub method: HttpMethod,
    /// Normalized path: non-empty, exactly one leading `/`, no repeated `/`.
    pub path: String,
    pub handler_name: String,
    pub controller_name: String,
    pub location: SourceLocation,
}

impl RouteRecord {
    /// `Class.method` label used in diagnostics.
    pub fn site(&self) -> String {
        format!("{}.{}", self.controller_name, self.handler_name)
    }
}

/// One task per method carrying a consumer marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueTask {
    pub queue_name: String,
    pub method_name: String,
    pub class_name: String,
    pub is_batch: bool,
    pub location: SourceLocation,
}

impl QueueTask {
    /// `Class.method` label used in diagnostics.
    pub fn site(&self) -> String {
        format!("{}.{}", self.class_name, self.method_name)
    }
}

/// A class discovered with a controller or consumer marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredClass {
    pub name: String,
    /// Declaring module file, relative to the project root when possible.
    pub module: PathBuf,
    /// Declared as `export default class`, imported without braces.
    pub default_export: bool,
}

/// Two modules declaring the same class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConflict {
    pub name: String,
    pub first: PathBuf,
    pub second: PathBuf,
}

/// Mapping from class name to the class declaring it.
///
/// Kept sorted by class name so import statements come out in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    entries: BTreeMap<String, DiscoveredClass>,
    conflicts: Vec<ImportConflict>,
}

impl ImportMap {
    /// Record a class. The first declaration wins; a different module for the
    /// same name is remembered as a conflict.
    pub fn insert(&mut self, class: &DiscoveredClass) {
        match self.entries.get(&class.name) {
            Some(existing) if existing.module != class.module => {
                self.conflicts.push(ImportConflict {
                    name: class.name.clone(),
                    first: existing.module.clone(),
                    second: class.module.clone(),
                });
            }
            Some(_) => {}
            None => {
                self.entries.insert(class.name.clone(), class.clone());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&DiscoveredClass> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn conflicts(&self) -> &[ImportConflict] {
        &self.conflicts
    }
}

/// Everything one pipeline run discovered, in scan order.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    pub routes: Vec<RouteRecord>,
    pub tasks: Vec<QueueTask>,
    pub imports: ImportMap,
    /// Recoverable extraction problems (unsupported literals, malformed markers).
    pub issues: Vec<LintIssue>,
    /// Number of source files scanned.
    pub files_scanned: usize,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the facts of one file, preserving their order.
    pub fn absorb(&mut self, facts: FileFacts) {
        self.files_scanned += 1;
        for class in &facts.classes {
            self.imports.insert(class);
        }
        self.routes.extend(facts.routes);
        self.tasks.extend(facts.tasks);
        self.issues.extend(facts.issues);
    }

    /// Class names referenced by the records of `kind`, deduplicated, sorted.
    pub fn referenced_classes(&self, kind: PipelineKind) -> Vec<&str> {
        let mut names: Vec<&str> = match kind {
            PipelineKind::Http => self
                .routes
                .iter()
                .map(|r| r.controller_name.as_str())
                .collect(),
            PipelineKind::Queue => self.tasks.iter().map(|t| t.class_name.as_str()).collect(),
        };
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Number of records the given pipeline would emit.
    pub fn record_count(&self, kind: PipelineKind) -> usize {
        match kind {
            PipelineKind::Http => self.routes.len(),
            PipelineKind::Queue => self.tasks.len(),
        }
    }
}
