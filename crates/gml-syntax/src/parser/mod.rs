//! Parser for GameMaker Language.
//!
//! A hand-written recursive descent parser that builds a lossless concrete
//! syntax tree (CST) using the `rowan` library.
//!
//! # Architecture
//!
//! 1. **Lexing**: Tokenize source text (see `lexer` module)
//! 2. **Parsing**: Build a flat stream of events (start node, add token, finish node)
//! 3. **Tree Building**: Convert events into a `rowan` green tree
//!
//! The whole document is re-parsed on every edit; there is no incremental
//! reparsing.

#![allow(clippy::module_inception)]

pub mod event;
mod grammar;
mod parser;
mod sink;
mod source;

pub use parser::parse;
pub(crate) use parser::{CompletedMarker, Parser};

use crate::syntax::SyntaxNode;

/// Result of parsing source text.
///
/// Holds the green tree rather than a `SyntaxNode` so it can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct Parse {
    green_node: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Returns the root syntax node.
    #[must_use]
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green_node.clone())
    }

    /// Returns the underlying green tree.
    #[must_use]
    pub fn green(&self) -> &rowan::GreenNode {
        &self.green_node
    }

    /// Returns the parsing errors in the order they were recorded.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Returns the first recorded error, the point where matching failed.
    #[must_use]
    pub fn first_error(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    /// Returns `true` if parsing produced no errors.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message, e.g. `expected expression`.
    pub message: String,
    /// The byte range of the offending token, empty at end of input.
    pub range: text_size::TextRange,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}

impl std::error::Error for ParseError {}
