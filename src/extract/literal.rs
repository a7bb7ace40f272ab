//! Constant folding for marker arguments.
//!
//! Marker arguments are evaluated strictly from the syntax tree. Only string
//! literals, templates without substitutions, parenthesized expressions and `+`
//! chains built from those fold to a value. Identifiers, calls, member access and
//! everything else are rejected with a [`LiteralError`]; no source text is ever
//! executed.

use std::fmt;
use tree_sitter::Node;

use crate::syntax::{line_of, named_children, node_text};

/// Why an argument could not be folded to a constant string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    /// The expression kind is outside the supported literal subset.
    Unsupported { kind: String, text: String, line: usize },
    /// A template literal contains `${...}` substitutions.
    Interpolated { text: String, line: usize },
    /// A `+` expression whose operator or operands cannot be folded.
    BadConcatenation { text: String, line: usize },
}

impl LiteralError {
    pub fn line(&self) -> usize {
        match self {
            LiteralError::Unsupported { line, .. }
            | LiteralError::Interpolated { line, .. }
            | LiteralError::BadConcatenation { line, .. } => *line,
        }
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralError::Unsupported { kind, text, .. } => {
                write!(f, "`{text}` ({kind}) is not a string literal")
            }
            LiteralError::Interpolated { text, .. } => {
                write!(f, "template `{text}` contains substitutions")
            }
            LiteralError::BadConcatenation { text, .. } => {
                write!(f, "`{text}` is not a concatenation of string literals")
            }
        }
    }
}

impl std::error::Error for LiteralError {}

/// Fold `node` to a constant string.
pub fn eval_string(node: Node<'_>, source: &str) -> Result<String, LiteralError> {
    match node.kind() {
        "string" => Ok(unescape(strip_delimiters(node_text(node, source)))),
        "template_string" => {
            if named_children(node)
                .iter()
                .any(|child| child.kind() == "template_substitution")
            {
                return Err(LiteralError::Interpolated {
                    text: node_text(node, source).to_string(),
                    line: line_of(node),
                });
            }
            Ok(unescape(strip_delimiters(node_text(node, source))))
        }
        "parenthesized_expression" => match named_children(node).as_slice() {
            [inner] => eval_string(*inner, source),
            _ => Err(unsupported(node, source)),
        },
        "binary_expression" => {
            let is_plus = node
                .child_by_field_name("operator")
                .map(|op| op.kind() == "+")
                .unwrap_or(false);
            let (Some(left), Some(right)) = (
                node.child_by_field_name("left"),
                node.child_by_field_name("right"),
            ) else {
                return Err(unsupported(node, source));
            };
            if !is_plus {
                return Err(LiteralError::BadConcatenation {
                    text: node_text(node, source).to_string(),
                    line: line_of(node),
                });
            }
            let lhs = eval_string(left, source).map_err(|_| LiteralError::BadConcatenation {
                text: node_text(node, source).to_string(),
                line: line_of(node),
            })?;
            let rhs = eval_string(right, source).map_err(|_| LiteralError::BadConcatenation {
                text: node_text(node, source).to_string(),
                line: line_of(node),
            })?;
            Ok(lhs + &rhs)
        }
        _ => Err(unsupported(node, source)),
    }
}

/// Read a boolean literal (`true` / `false`).
pub fn eval_bool(node: Node<'_>) -> Option<bool> {
    match node.kind() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Find the value node of property `key` in an object literal.
///
/// Keys may be written bare (`channel:`) or quoted (`'channel':`).
pub fn object_property<'t>(object: Node<'t>, key: &str, source: &str) -> Option<Node<'t>> {
    for child in named_children(object) {
        if child.kind() != "pair" {
            continue;
        }
        let Some(key_node) = child.child_by_field_name("key") else {
            continue;
        };
        let key_text = match key_node.kind() {
            "string" => strip_delimiters(node_text(key_node, source)),
            _ => node_text(key_node, source),
        };
        if key_text == key {
            return child.child_by_field_name("value");
        }
    }
    None
}

fn unsupported(node: Node<'_>, source: &str) -> LiteralError {
    LiteralError::Unsupported {
        kind: node.kind().to_string(),
        text: node_text(node, source).to_string(),
        line: line_of(node),
    }
}

/// Drop the surrounding quote or backtick pair.
fn strip_delimiters(raw: &str) -> &str {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && matches!(first, '"' | '\'' | '`') => {
            &trimmed[1..trimmed.len() - 1]
        }
        _ => trimmed,
    }
}

/// Decode JavaScript escape sequences.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            // line continuation
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &hex, "\\x");
            }
            'u' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let hex: String = chars.by_ref().take_while(|c| *c != '}').collect();
                    push_code_point(&mut out, &hex, "\\u");
                } else {
                    let hex: String = chars.by_ref().take(4).collect();
                    push_code_point(&mut out, &hex, "\\u");
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn push_code_point(out: &mut String, hex: &str, prefix: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(ch) => out.push(ch),
        None => {
            out.push_str(prefix);
            out.push_str(hex);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::syntax::{Dialect, SourceParser};

    /// Parse `const x = <expr>;` and evaluate the initializer.
    fn eval(expr: &str) -> Result<String, LiteralError> {
        let source = format!("const x = {expr};\n");
        let mut parser = SourceParser::new().unwrap();
        let tree = parser.parse(&source, Dialect::TypeScript).unwrap();
        let decl = named_children(tree.root_node())[0];
        let declarator = named_children(decl)[0];
        let value = declarator.child_by_field_name("value").unwrap();
        eval_string(value, &source)
    }

    #[test]
    fn test_plain_strings() {
        assert_eq!(eval("'/users'").unwrap(), "/users");
        assert_eq!(eval("\"/users\"").unwrap(), "/users");
        assert_eq!(eval("''").unwrap(), "");
    }

    #[test]
    fn test_escape_sequences() {
        assert_eq!(eval(r"'it\'s'").unwrap(), "it's");
        assert_eq!(eval(r#""a\"b""#).unwrap(), "a\"b");
        assert_eq!(eval(r"'A\x42\u{43}'").unwrap(), "ABC");
        assert_eq!(eval(r"'a\\b'").unwrap(), "a\\b");
    }

    #[test]
    fn test_static_template() {
        assert_eq!(eval("`/items`").unwrap(), "/items");
    }

    #[test]
    fn test_interpolated_template_rejected() {
        let err = eval("`/items/${id}`").unwrap_err();
        assert!(matches!(err, LiteralError::Interpolated { .. }));
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(eval("'/api' + '/v1'").unwrap(), "/api/v1");
        assert_eq!(eval("'/a' + `/b` + ('/c' + '/d')").unwrap(), "/a/b/c/d");
    }

    #[test]
    fn test_non_literals_rejected() {
        assert!(matches!(eval("PREFIX").unwrap_err(), LiteralError::Unsupported { .. }));
        assert!(matches!(
            eval("'/a' + PREFIX").unwrap_err(),
            LiteralError::BadConcatenation { .. }
        ));
        assert!(matches!(
            eval("'/a' - '/b'").unwrap_err(),
            LiteralError::BadConcatenation { .. }
        ));
        assert!(matches!(eval("compute()").unwrap_err(), LiteralError::Unsupported { .. }));
        assert!(matches!(eval("42").unwrap_err(), LiteralError::Unsupported { .. }));
    }

    #[test]
    fn test_object_property_and_bool() {
        let source = "const x = { channel: 'orders', 'batch': true, other: 1 };\n";
        let mut parser = SourceParser::new().unwrap();
        let tree = parser.parse(source, Dialect::TypeScript).unwrap();
        let decl = named_children(tree.root_node())[0];
        let declarator = named_children(decl)[0];
        let object = declarator.child_by_field_name("value").unwrap();
        assert_eq!(object.kind(), "object");

        let channel = object_property(object, "channel", source).unwrap();
        assert_eq!(eval_string(channel, source).unwrap(), "orders");
        let batch = object_property(object, "batch", source).unwrap();
        assert_eq!(eval_bool(batch), Some(true));
        let other = object_property(object, "other", source).unwrap();
        assert_eq!(eval_bool(other), None);
        assert!(object_property(object, "missing", source).is_none());
    }
}
