//! # Annotation Extractor
//!
//! Walks one parsed file and turns marker-carrying classes and methods into
//! dispatch facts. The walk is a pure read of the syntax tree: decorators are
//! never executed, and their arguments are folded by [`literal::eval_string`].
//!
//! Class context is threaded through the walk as a value. Entering a class
//! declaration builds a fresh [`ControllerInfo`] from that class's own markers
//! (or none at all), so two classes in the same file, or a class nested inside a
//! method, never see each other's prefixes.
//!
//! ## Marker placement
//!
//! ```typescript
//! @Controller('/api')
//! @BasePath('/v1')
//! export class ItemController {
//!   @Get('/items')
//!   list(request: IRequest) {}
//! }
//!
//! @Consumer('orders')
//! export class OrderConsumer {
//!   @Consumer({ channel: 'orders', batch: true })
//!   handle(messages: Message[]) {}
//! }
//! ```

pub mod literal;
pub mod marker;


use std::path::Path;
use tree_sitter::{Node, Tree};

use crate::linter::LintIssue;
use crate::paths::join_route_path;
use crate::syntax::{line_of, named_children, node_text};
use crate::table::{
    DiscoveredClass, HttpMethod, PipelineKind, QueueTask, RouteRecord, SourceLocation,
};

use literal::{eval_bool, eval_string, object_property};
use marker::{parse_marker, Marker, MarkerKind};

/// Facts extracted from a single file, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FileFacts {
    pub classes: Vec<DiscoveredClass>,
    pub routes: Vec<RouteRecord>,
    pub tasks: Vec<QueueTask>,
    pub issues: Vec<LintIssue>,
}

/// Context of the class currently being visited.
///
/// Only built for classes that carry the marker establishing `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    pub name: String,
    pub kind: PipelineKind,
    /// First argument of `@Controller`, empty for consumers.
    pub route_prefix: String,
    /// First argument of `@BasePath`, if any.
    pub base_prefix: String,
}

/// Extract the facts `kind` cares about from one parsed file.
///
/// `module` is the project-relative path of the file; it ends up in import
/// statements and diagnostics.
pub fn extract_file(tree: &Tree, source: &str, module: &Path, kind: PipelineKind) -> FileFacts {
    let mut walk = Walk {
        source,
        module,
        kind,
        facts: FileFacts::default(),
    };
    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        walk.warn(LintIssue::warning(
            format!("{}:{}", module.display(), line),
            "parse_error",
            "file contains syntax errors; markers near the error may be missed",
        ));
    }
    walk.visit(root);
    walk.facts
}

struct Walk<'a> {
    source: &'a str,
    module: &'a Path,
    kind: PipelineKind,
    facts: FileFacts,
}

impl<'a> Walk<'a> {
    fn warn(&mut self, issue: LintIssue) {
        tracing::warn!(
            kind = %issue.kind,
            location = %issue.location,
            "{}",
            issue.message
        );
        self.facts.issues.push(issue);
    }

    fn location(&self, line: usize) -> SourceLocation {
        SourceLocation {
            file: self.module.to_path_buf(),
            line,
        }
    }

    /// Visit `node` outside of any marked class.
    fn visit(&mut self, node: Node<'_>) {
        match node.kind() {
            "class_declaration" | "abstract_class_declaration" => self.visit_class(node),
            _ => {
                for child in named_children(node) {
                    self.visit(child);
                }
            }
        }
    }

    fn visit_class(&mut self, class: Node<'_>) {
        let Some(name_node) = class.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name_node, self.source).to_string();
        let markers: Vec<Marker<'_>> = class_decorators(class)
            .into_iter()
            .filter_map(|d| parse_marker(d, self.source))
            .collect();

        let context = self.class_context(&name, &markers);
        if context.is_some() {
            self.facts.classes.push(DiscoveredClass {
                name: name.clone(),
                module: self.module.to_path_buf(),
                default_export: is_default_export(class),
            });
        }
        if let Some(body) = class.child_by_field_name("body") {
            self.visit_class_body(body, context.as_ref());
        }
    }

    fn class_context(&mut self, name: &str, markers: &[Marker<'_>]) -> Option<ControllerInfo> {
        match self.kind {
            PipelineKind::Http => {
                let controller = markers.iter().find(|m| m.kind == MarkerKind::Controller)?;
                let Some(first) = controller.args.first() else {
                    self.warn(
                        LintIssue::warning(
                            format!("{}:{} {name}", self.module.display(), line_of(controller.node)),
                            "marker_arguments",
                            format!("@{} on class {name} has no path argument; class ignored", controller.name),
                        )
                        .with_suggestion("Use @Controller('') for an unprefixed controller"),
                    );
                    return None;
                };
                let route_prefix = self.fold_or_empty(*first, name);
                let base_prefix = match markers.iter().find(|m| m.kind == MarkerKind::BasePath) {
                    Some(base) => match base.args.first() {
                        Some(arg) => self.fold_or_empty(*arg, name),
                        None => {
                            self.warn(LintIssue::warning(
                                format!("{}:{} {name}", self.module.display(), line_of(base.node)),
                                "marker_arguments",
                                format!("@{} on class {name} has no path argument", base.name),
                            ));
                            String::new()
                        }
                    },
                    None => String::new(),
                };
                Some(ControllerInfo {
                    name: name.to_string(),
                    kind: PipelineKind::Http,
                    route_prefix,
                    base_prefix,
                })
            }
            PipelineKind::Queue => {
                let consumer = markers.iter().find(|m| m.kind == MarkerKind::Consumer)?;
                if consumer.args.is_empty() {
                    self.warn(
                        LintIssue::warning(
                            format!("{}:{} {name}", self.module.display(), line_of(consumer.node)),
                            "marker_arguments",
                            format!("@{} on class {name} has no argument; class ignored", consumer.name),
                        )
                        .with_suggestion("Name the consumer group, e.g. @Consumer('orders')"),
                    );
                    return None;
                }
                Some(ControllerInfo {
                    name: name.to_string(),
                    kind: PipelineKind::Queue,
                    route_prefix: String::new(),
                    base_prefix: String::new(),
                })
            }
        }
    }

    fn visit_class_body(&mut self, body: Node<'_>, context: Option<&ControllerInfo>) {
        let mut pending: Vec<Node<'_>> = Vec::new();
        for member in named_children(body) {
            match member.kind() {
                "decorator" => pending.push(member),
                "method_definition" => {
                    let mut decorators = std::mem::take(&mut pending);
                    decorators.extend(
                        named_children(member)
                            .into_iter()
                            .filter(|n| n.kind() == "decorator"),
                    );
                    if let Some(context) = context {
                        self.visit_method(member, &decorators, context);
                    }
                    // Nested classes start without context.
                    if let Some(fn_body) = member.child_by_field_name("body") {
                        self.visit(fn_body);
                    }
                }
                _ => {
                    pending.clear();
                    self.visit(member);
                }
            }
        }
    }

    fn visit_method(&mut self, method: Node<'_>, decorators: &[Node<'_>], context: &ControllerInfo) {
        let markers: Vec<Marker<'_>> = decorators
            .iter()
            .filter_map(|d| parse_marker(*d, self.source))
            .filter(|m| match (context.kind, m.kind) {
                (PipelineKind::Http, MarkerKind::Route(_)) => true,
                (PipelineKind::Queue, MarkerKind::Consumer) => true,
                _ => false,
            })
            .collect();
        if markers.is_empty() {
            return;
        }

        let Some(name_node) = method.child_by_field_name("name") else {
            return;
        };
        let line = line_of(name_node);
        let method_name = node_text(name_node, self.source).to_string();
        if name_node.kind() != "property_identifier" {
            self.warn(
                LintIssue::warning(
                    format!("{}:{line} {}.{method_name}", self.module.display(), context.name),
                    "method_name",
                    format!(
                        "method {method_name} of {} is not a plain identifier and cannot be bound; marker skipped",
                        context.name
                    ),
                )
                .with_suggestion("Rename the handler to a plain public method name"),
            );
            return;
        }
        if let Some(modifier) = unbindable_modifier(method) {
            self.warn(
                LintIssue::warning(
                    format!("{}:{line} {}.{method_name}", self.module.display(), context.name),
                    "method_kind",
                    format!(
                        "{modifier} {method_name} of {} is not an instance method and cannot be bound; marker skipped",
                        context.name
                    ),
                )
                .with_suggestion("Move the marker to a plain instance method"),
            );
            return;
        }

        for marker in &markers {
            match marker.kind {
                MarkerKind::Route(verb) => {
                    self.route_from_marker(marker, verb, &method_name, line, context)
                }
                MarkerKind::Consumer => self.task_from_marker(marker, &method_name, line, context),
                MarkerKind::Controller | MarkerKind::BasePath => {}
            }
        }
    }

    fn route_from_marker(
        &mut self,
        marker: &Marker<'_>,
        verb: HttpMethod,
        method_name: &str,
        line: usize,
        context: &ControllerInfo,
    ) {
        let site = format!("{}.{method_name}", context.name);
        let Some(first) = marker.args.first() else {
            self.warn(LintIssue::warning(
                format!("{}:{line} {site}", self.module.display()),
                "marker_arguments",
                format!("@{} on {site} has no path argument; route skipped", marker.name),
            ));
            return;
        };
        let method_path = self.fold_or_empty(*first, &site);
        let path = join_route_path(&[&context.route_prefix, &context.base_prefix, &method_path]);
        self.facts.routes.push(RouteRecord {
            method: verb,
            path,
            handler_name: method_name.to_string(),
            controller_name: context.name.clone(),
            location: self.location(line),
        });
    }

    fn task_from_marker(
        &mut self,
        marker: &Marker<'_>,
        method_name: &str,
        line: usize,
        context: &ControllerInfo,
    ) {
        let site = format!("{}.{method_name}", context.name);
        let at = format!("{}:{line} {site}", self.module.display());
        let Some(options) = marker.args.first().filter(|arg| arg.kind() == "object") else {
            self.warn(
                LintIssue::warning(
                    at,
                    "marker_arguments",
                    format!("@{} on {site} needs an object literal argument; task skipped", marker.name),
                )
                .with_suggestion("Write @Consumer({ channel: 'queue-name' })"),
            );
            return;
        };

        let Some(channel_node) = object_property(*options, "channel", self.source) else {
            self.warn(LintIssue::warning(
                at,
                "marker_arguments",
                format!("@{} on {site} has no channel; task skipped", marker.name),
            ));
            return;
        };
        let queue_name = match eval_string(channel_node, self.source) {
            Ok(name) => name,
            Err(err) => {
                self.warn(LintIssue::warning(
                    at,
                    "literal_unsupported",
                    format!("channel of {site}: {err}; task skipped"),
                ));
                return;
            }
        };
        if queue_name.is_empty() {
            self.warn(LintIssue::warning(
                at,
                "marker_arguments",
                format!("@{} on {site} has an empty channel; task skipped", marker.name),
            ));
            return;
        }

        let is_batch = match object_property(*options, "batch", self.source) {
            None => false,
            Some(value) => eval_bool(value).unwrap_or_else(|| {
                self.warn(LintIssue::warning(
                    at.clone(),
                    "marker_arguments",
                    format!(
                        "batch of {site} is `{}`, not a boolean literal; treated as false",
                        node_text(value, self.source)
                    ),
                ));
                false
            }),
        };

        self.facts.tasks.push(QueueTask {
            queue_name,
            method_name: method_name.to_string(),
            class_name: context.name.clone(),
            is_batch,
            location: self.location(line),
        });
    }

    /// Fold a path argument, falling back to `""` with a warning.
    fn fold_or_empty(&mut self, node: Node<'_>, site: &str) -> String {
        match eval_string(node, self.source) {
            Ok(value) => value,
            Err(err) => {
                self.warn(
                    LintIssue::warning(
                        format!("{}:{} {site}", self.module.display(), err.line()),
                        "literal_unsupported",
                        format!("{err}; using an empty string"),
                    )
                    .with_suggestion("Use a string literal, a static template or a `+` of those"),
                );
                String::new()
            }
        }
    }
}

/// Decorators attached to a class, including ones written before `export`.
fn class_decorators(class: Node<'_>) -> Vec<Node<'_>> {
    let mut decorators = Vec::new();
    if let Some(parent) = class.parent() {
        if parent.kind() == "export_statement" {
            decorators.extend(
                named_children(parent)
                    .into_iter()
                    .filter(|n| n.kind() == "decorator"),
            );
        }
    }
    decorators.extend(
        named_children(class)
            .into_iter()
            .filter(|n| n.kind() == "decorator"),
    );
    decorators
}

/// Whether `class` is written as `export default class`.
fn is_default_export(class: Node<'_>) -> bool {
    let Some(parent) = class.parent().filter(|p| p.kind() == "export_statement") else {
        return false;
    };
    let mut cursor = parent.walk();
    let found = parent
        .children(&mut cursor)
        .any(|n| !n.is_named() && n.kind() == "default");
    found
}

/// `static`, `get` or `set` keyword on a method definition.
fn unbindable_modifier(method: Node<'_>) -> Option<&'static str> {
    let mut cursor = method.walk();
    let found = method
        .children(&mut cursor)
        .filter(|n| !n.is_named())
        .find_map(|n| match n.kind() {
            kind if kind.starts_with("static") => Some("static method"),
            "get" => Some("getter"),
            "set" => Some("setter"),
            _ => None,
        });
    found
}

fn first_error_line(node: Node<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(line_of(node));
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error_line)
}
