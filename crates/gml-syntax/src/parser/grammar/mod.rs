//! Grammar rules for GameMaker Language.
//!
//! - `statements.rs` - Statements, declarations and `#macro` lines
//! - `expressions.rs` - Expression parsing (Pratt parser)

mod expressions;
mod statements;
