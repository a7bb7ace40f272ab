#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Unit tests for the dispatch linter

use crate::extract::extract_file;
use crate::linter::{has_errors, lint_table, LintIssue, LintSeverity};
use crate::syntax::{Dialect, SourceParser};
use crate::table::{DispatchTable, PipelineKind};
use std::path::Path;

/// Build a table from `(module, source)` pairs and lint it
fn lint_sources(kind: PipelineKind, files: &[(&str, &str)]) -> Vec<LintIssue> {
    let mut parser = SourceParser::new().unwrap();
    let mut table = DispatchTable::new();
    for (module, source) in files {
        let tree = parser.parse(source, Dialect::TypeScript).unwrap();
        table.absorb(extract_file(&tree, source, Path::new(module), kind));
    }
    lint_table(&table, kind)
}

fn of_kind<'a>(issues: &'a [LintIssue], kind: &str) -> Vec<&'a LintIssue> {
    issues.iter().filter(|i| i.kind == kind).collect()
}

#[test]
fn test_lint_clean_table() {
    let issues = lint_sources(
        PipelineKind::Http,
        &[(
            "src/controllers/item.ts",
            "@Controller('/items')\nexport class ItemController {\n  @Get('') list() {}\n  @Post('') create() {}\n}\n",
        )],
    );
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    assert!(!has_errors(&issues));
}

#[test]
fn test_lint_duplicate_route_across_files() {
    let issues = lint_sources(
        PipelineKind::Http,
        &[
            (
                "src/controllers/a.ts",
                "@Controller('/users')\nclass UserController {\n  @Get('/list') list() {}\n}\n",
            ),
            (
                "src/controllers/b.ts",
                "@Controller('/users/')\nclass LegacyController {\n  @Get('list') all() {}\n}\n",
            ),
        ],
    );
    let dupes = of_kind(&issues, "duplicate_route");
    assert_eq!(dupes.len(), 1);
    assert_eq!(dupes[0].severity, LintSeverity::Error);
    assert!(dupes[0].message.contains("UserController.list"));
    assert!(dupes[0].message.contains("LegacyController.all"));
    assert!(dupes[0].message.contains("GET /users/list"));
    assert!(has_errors(&issues));
}

#[test]
fn test_lint_same_path_different_verbs_is_fine() {
    let issues = lint_sources(
        PipelineKind::Http,
        &[(
            "src/controllers/a.ts",
            "@Controller('/a')\nclass A {\n  @Get('/x') read() {}\n  @Put('/x') write() {}\n}\n",
        )],
    );
    assert!(of_kind(&issues, "duplicate_route").is_empty());
}

#[test]
fn test_lint_duplicate_queue() {
    let issues = lint_sources(
        PipelineKind::Queue,
        &[(
            "src/consumers/orders.ts",
            r#"
@Consumer('orders')
class OrderConsumer {
  @Consumer({ channel: 'orders' })
  handle() {}
}

@Consumer('audit')
class AuditConsumer {
  @Consumer({ channel: 'orders', batch: true })
  audit() {}
}
"#,
        )],
    );
    let dupes = of_kind(&issues, "duplicate_queue");
    assert_eq!(dupes.len(), 1);
    assert!(dupes[0].message.contains("'orders'"));
    assert!(dupes[0].message.contains("OrderConsumer.handle"));
    assert!(dupes[0].message.contains("AuditConsumer.audit"));
    assert!(dupes[0].suggestion.is_some());
}

#[test]
fn test_lint_duplicate_class_name() {
    let issues = lint_sources(
        PipelineKind::Http,
        &[
            (
                "src/controllers/v1/user.ts",
                "@Controller('/v1')\nexport class UserController {\n  @Get('/me') me() {}\n}\n",
            ),
            (
                "src/controllers/v2/user.ts",
                "@Controller('/v2')\nexport class UserController {\n  @Get('/me') me() {}\n}\n",
            ),
        ],
    );
    let dupes = of_kind(&issues, "duplicate_class");
    assert_eq!(dupes.len(), 1);
    assert!(dupes[0].message.contains("src/controllers/v1/user.ts"));
    assert!(dupes[0].message.contains("src/controllers/v2/user.ts"));
    assert!(of_kind(&issues, "duplicate_route").is_empty());
}

#[test]
fn test_lint_extraction_warnings_are_not_errors() {
    let issues = lint_sources(
        PipelineKind::Http,
        &[(
            "src/controllers/a.ts",
            "@Controller(PREFIX)\nclass A {\n  @Get() x() {}\n}\n",
        )],
    );
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.severity == LintSeverity::Warning));
    assert!(!has_errors(&issues));
    assert!(issues[0].location.starts_with("src/controllers/a.ts:1"));
}

#[test]
fn test_lint_issue_display() {
    let issue = LintIssue::warning("src/a.ts:3 A.x", "marker_arguments", "no path");
    assert_eq!(
        issue.to_string(),
        "[warning] marker_arguments src/a.ts:3 A.x: no path"
    );
    assert!(issue.suggestion.is_none());
    let issue = issue.with_suggestion("add a path");
    assert_eq!(issue.suggestion.as_deref(), Some("add a path"));
}

#[test]
fn test_severity_labels() {
    assert_eq!(LintSeverity::Error.to_string(), "error");
    assert_eq!(LintSeverity::Warning.to_string(), "warning");
    assert!(LintIssue::new("a", LintSeverity::Error, "duplicate_route", "x").is_error());
}
