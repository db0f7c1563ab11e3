//! Shared helpers for parser tests.
#![allow(dead_code, unused_imports)]

pub use gml_syntax::parser::parse;
pub use gml_syntax::syntax::{SyntaxKind, SyntaxNode};

/// Formats a parse result as an indented tree, followed by any errors.
pub fn snapshot_parse(source: &str) -> String {
    let parsed = parse(source);
    let syntax = parsed.syntax();

    let mut output = String::new();
    format_node(&syntax, &mut output, 0);

    if !parsed.ok() {
        output.push_str("---\nErrors:\n");
        for err in parsed.errors() {
            output.push_str(&format!("  - {err}\n"));
        }
    }

    output
}

fn format_node(node: &SyntaxNode, out: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{}{:?}@{:?}\n", indent, node.kind(), node.text_range()));

    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => format_node(&n, out, depth + 1),
            rowan::NodeOrToken::Token(t) => {
                if !t.kind().is_trivia() {
                    out.push_str(&format!(
                        "{}{:?}@{:?} {:?}\n",
                        "  ".repeat(depth + 1),
                        t.kind(),
                        t.text_range(),
                        t.text()
                    ));
                }
            }
        }
    }
}

/// Parses `source`, asserting that it produced no errors.
pub fn parse_ok(source: &str) -> SyntaxNode {
    let parsed = parse(source);
    assert!(parsed.ok(), "errors for {source:?}: {:?}", parsed.errors());
    parsed.syntax()
}

/// Node kinds of the tree in preorder, root excluded.
pub fn node_kinds(source: &str) -> Vec<SyntaxKind> {
    parse(source)
        .syntax()
        .descendants()
        .skip(1)
        .map(|node| node.kind())
        .collect()
}

/// The first recorded error message, if any.
pub fn first_error(source: &str) -> Option<String> {
    parse(source).first_error().map(|err| err.message.clone())
}
