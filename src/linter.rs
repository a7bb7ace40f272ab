//! # Dispatch Linter Module
//!
//! Collects the diagnostics produced while scanning a source tree and checks the
//! finished dispatch table for conflicts that would make generated code wrong.
//!
//! ## Checks Performed
//!
//! 1. **Duplicate routes** - two methods registered for the same verb and path;
//!    the second could never be reached
//! 2. **Duplicate queues** - two consumers bound to the same queue name
//! 3. **Duplicate class names** - two modules exporting the same class name,
//!    which would collide in the generated imports
//! 4. **Extraction warnings** - unsupported marker arguments, unbindable
//!    method names and files with syntax errors (raised by the extractor)
//!
//! Conflicts are errors and block generation. Extraction problems are warnings:
//! the offending marker is skipped and the rest of the table is still emitted.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use edgeroute::linter::{lint_table, LintSeverity};
//!
//! let issues = lint_table(&table, PipelineKind::Http);
//! for issue in &issues {
//!     eprintln!("[{}] {}: {}", issue.severity, issue.location, issue.message);
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::table::{DispatchTable, PipelineKind};

#[cfg(test)]
mod tests;

/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Error - Will cause code generation to fail
    Error,
    /// Warning - The marker is skipped, generation continues
    Warning,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LintSeverity::Error => "error",
            LintSeverity::Warning => "warning",
        };
        f.write_str(label)
    }
}

/// A lint issue found while scanning or after building a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintIssue {
    /// Where the issue occurred (e.g., "src/controllers/user.ts:12 UserController.list")
    pub location: String,
    /// Severity of the issue
    pub severity: LintSeverity,
    /// Type of lint issue (e.g., "duplicate_route", "literal_unsupported")
    pub kind: String,
    /// Human-readable description of the problem
    pub message: String,
    /// Optional suggestion for how to fix it
    pub suggestion: Option<String>,
}

impl LintIssue {
    /// Create a new lint issue
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Shorthand for a warning-level issue
    pub fn warning(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(location, LintSeverity::Warning, kind, message)
    }

    /// Add a suggestion for fixing the issue
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == LintSeverity::Error
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.kind, self.location, self.message
        )
    }
}

/// Lint a dispatch table for the given pipeline
///
/// Returns the extraction issues recorded while scanning followed by any
/// conflicts found in the records `kind` will emit.
pub fn lint_table(table: &DispatchTable, kind: PipelineKind) -> Vec<LintIssue> {
    let mut issues = table.issues.clone();
    match kind {
        PipelineKind::Http => lint_duplicate_routes(table, &mut issues),
        PipelineKind::Queue => lint_duplicate_queues(table, &mut issues),
    }
    lint_duplicate_classes(table, kind, &mut issues);
    issues
}

fn lint_duplicate_routes(table: &DispatchTable, issues: &mut Vec<LintIssue>) {
    let mut first_seen: HashMap<(&str, &str), usize> = HashMap::new();
    for (idx, route) in table.routes.iter().enumerate() {
        let key = (route.method.as_str(), route.path.as_str());
        let Some(&first_idx) = first_seen.get(&key) else {
            first_seen.insert(key, idx);
            continue;
        };
        let first = &table.routes[first_idx];
        issues.push(
            LintIssue::new(
                format!("{} {}", route.location, route.site()),
                LintSeverity::Error,
                "duplicate_route",
                format!(
                    "{} {} is declared by both {} ({}) and {} ({}); the second handler is unreachable",
                    route.method.as_str().to_uppercase(),
                    route.path,
                    first.site(),
                    first.location,
                    route.site(),
                    route.location,
                ),
            )
            .with_suggestion("Change one of the paths or merge the handlers"),
        );
    }
}

fn lint_duplicate_queues(table: &DispatchTable, issues: &mut Vec<LintIssue>) {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (idx, task) in table.tasks.iter().enumerate() {
        let Some(&first_idx) = first_seen.get(task.queue_name.as_str()) else {
            first_seen.insert(task.queue_name.as_str(), idx);
            continue;
        };
        let first = &table.tasks[first_idx];
        issues.push(
            LintIssue::new(
                format!("{} {}", task.location, task.site()),
                LintSeverity::Error,
                "duplicate_queue",
                format!(
                    "queue '{}' is consumed by both {} ({}) and {} ({})",
                    task.queue_name,
                    first.site(),
                    first.location,
                    task.site(),
                    task.location,
                ),
            )
            .with_suggestion("Each queue must be bound to exactly one consumer method"),
        );
    }
}

fn lint_duplicate_classes(table: &DispatchTable, kind: PipelineKind, issues: &mut Vec<LintIssue>) {
    let referenced = table.referenced_classes(kind);
    for conflict in table.imports.conflicts() {
        if !referenced.contains(&conflict.name.as_str()) {
            continue;
        }
        issues.push(
            LintIssue::new(
                conflict.second.display().to_string(),
                LintSeverity::Error,
                "duplicate_class",
                format!(
                    "class {} is declared in both {} and {}; generated imports would collide",
                    conflict.name,
                    conflict.first.display(),
                    conflict.second.display(),
                ),
            )
            .with_suggestion("Rename one of the classes"),
        );
    }
}

/// Whether any issue is error-level
pub fn has_errors(issues: &[LintIssue]) -> bool {
    issues.iter().any(LintIssue::is_error)
}

/// Print lint issues in a formatted way
pub fn print_lint_issues(issues: &[LintIssue]) {
    if issues.is_empty() {
        println!("✅ No lint issues found!");
        return;
    }

    let errors: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Error)
        .collect();
    let warnings: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == LintSeverity::Warning)
        .collect();

    println!("\n📋 Lint Results:");
    println!(
        "   {} error(s), {} warning(s)\n",
        errors.len(),
        warnings.len()
    );

    print_group("❌ Errors (must fix):", &errors);
    print_group("⚠️  Warnings (should fix):", &warnings);
}

fn print_group(title: &str, issues: &[&LintIssue]) {
    if issues.is_empty() {
        return;
    }
    println!("{title}");
    for issue in issues {
        println!("   [{}] {}", issue.kind, issue.location);
        println!("      {}", issue.message);
        if let Some(suggestion) = &issue.suggestion {
            println!("      💡 Suggestion: {}", suggestion);
        }
    }
    println!();
}
