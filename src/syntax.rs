//! TypeScript front end.
//!
//! Wraps a tree-sitter parser configured for TypeScript, or TSX for `.tsx`
//! files. Trees are immutable once parsed; the extractor only reads them.

use anyhow::Context;
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Grammar used for a given file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("tsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }
}

/// Reusable parser holding one tree-sitter parser per dialect.
pub struct SourceParser {
    typescript: Parser,
    tsx: Parser,
}

impl SourceParser {
    pub fn new() -> anyhow::Result<Self> {
        let mut typescript = Parser::new();
        typescript
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .context("Failed to load the TypeScript grammar")?;
        let mut tsx = Parser::new();
        tsx.set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
            .context("Failed to load the TSX grammar")?;
        Ok(Self { typescript, tsx })
    }

    /// Parse `source` with the grammar for `dialect`.
    pub fn parse(&mut self, source: &str, dialect: Dialect) -> anyhow::Result<Tree> {
        let parser = match dialect {
            Dialect::TypeScript => &mut self.typescript,
            Dialect::Tsx => &mut self.tsx,
        };
        parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("tree-sitter returned no tree"))
    }
}

/// Source text covered by `node`.
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// 1-based line on which `node` starts.
pub fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Named children, with comments filtered out.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}
