//! The closed set of markers the extractor understands.

use tree_sitter::Node;

use crate::syntax::{named_children, node_text};
use crate::table::HttpMethod;

/// Recognized decorator names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `@Controller(path)` on a class.
    Controller,
    /// `@BasePath(path)` on a class.
    BasePath,
    /// `@Get(path)`, `@Post(path)`, ... on a method.
    Route(HttpMethod),
    /// `@Consumer({ channel, batch })` on a method, or bare on a class.
    Consumer,
}

impl MarkerKind {
    /// `Controller`, `BasePath` and `Consumer` match exactly; verbs match in any case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Controller" => Some(MarkerKind::Controller),
            "BasePath" => Some(MarkerKind::BasePath),
            "Consumer" => Some(MarkerKind::Consumer),
            other => HttpMethod::from_marker(other).map(MarkerKind::Route),
        }
    }
}

/// A decorator resolved to a known marker.
#[derive(Debug, Clone)]
pub struct Marker<'t> {
    pub kind: MarkerKind,
    /// Written name, kept for diagnostics (`GET`, `Get`, ...).
    pub name: String,
    /// Call arguments; empty for a bare `@Consumer`.
    pub args: Vec<Node<'t>>,
    pub node: Node<'t>,
}

/// Resolve a `decorator` node.
///
/// Returns `None` for decorators outside the marker set, which are ignored.
pub fn parse_marker<'t>(decorator: Node<'t>, source: &str) -> Option<Marker<'t>> {
    let (name, args) = decorator_name_and_args(decorator, source)?;
    match MarkerKind::from_name(&name) {
        Some(kind) => Some(Marker {
            kind,
            name,
            args,
            node: decorator,
        }),
        None => {
            tracing::trace!(decorator = %name, "Ignoring unknown decorator");
            None
        }
    }
}

fn decorator_name_and_args<'t>(decorator: Node<'t>, source: &str) -> Option<(String, Vec<Node<'t>>)> {
    let expr = named_children(decorator).into_iter().next()?;
    match expr.kind() {
        "call_expression" => {
            let function = expr.child_by_field_name("function")?;
            let name = callee_name(function, source)?;
            let args = expr
                .child_by_field_name("arguments")
                .map(named_children)
                .unwrap_or_default();
            Some((name, args))
        }
        _ => Some((callee_name(expr, source)?, Vec::new())),
    }
}

/// Last segment of an identifier or member expression (`http.Get` -> `Get`).
fn callee_name(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source).to_string()),
        "member_expression" => node
            .child_by_field_name("property")
            .map(|property| node_text(property, source).to_string()),
        _ => None,
    }
}
