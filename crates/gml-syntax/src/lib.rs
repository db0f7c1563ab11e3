//! `gml-syntax` - Lexer, parser, and concrete syntax tree for GameMaker Language.
//!
//! - **Lexer**: Tokenizes source text into a stream of tokens
//! - **Parser**: Builds a concrete syntax tree (CST) from tokens
//! - **Syntax Tree**: Lossless representation of the source code
//!
//! The tree is a `rowan` tree in the style of `rust-analyzer`. Parsing is
//! error-tolerant: it always produces a tree, and any recorded errors
//! point at the token where matching failed.
//!
//! # Example
//!
//! ```
//! use gml_syntax::lexer::{lex, TokenKind};
//!
//! let tokens = lex("hp -= 1;");
//! let meaningful: Vec<_> = tokens.iter().filter(|t| !t.kind.is_trivia()).collect();
//!
//! assert_eq!(meaningful[0].kind, TokenKind::Ident);
//! assert_eq!(meaningful[1].kind, TokenKind::MinusAssign);
//! assert_eq!(meaningful[2].kind, TokenKind::RealLiteral);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod lexer;
pub mod parser;
pub mod syntax;
mod token_kinds;

pub use lexer::{lex, Lexer, Token, TokenKind};
pub use parser::{parse, Parse, ParseError};
pub use syntax::{GmlLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
pub use text_size::{TextRange, TextSize};
