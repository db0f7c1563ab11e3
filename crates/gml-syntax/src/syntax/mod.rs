//! Syntax tree types for GameMaker Language.
//!
//! This module provides the `rowan`-based syntax tree implementation,
//! including the `SyntaxKind` enum that covers both tokens and composite nodes.

use crate::lexer::TokenKind;
use crate::token_kinds::for_each_token_kind;

macro_rules! define_syntax_kind {
    ($($token:ident),* $(,)?) => {
        /// All syntax node and token kinds in GameMaker Language.
        ///
        /// This enum includes both token kinds (from the lexer) and composite
        /// node kinds (produced by the parser).
        // Variants mirror lexer/token names; documenting each would be noisy.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            // =========================================================================
            // TOKEN KINDS (mirrors TokenKind)
            // =========================================================================
            $($token,)*

            // COMPOSITE NODE KINDS (produced by parser)
            // =========================================================================
            /// Root node of a source file
            SourceFile,

            /// `#macro NAME value`
            MacroDecl,

            /// `var a = 1, b;`
            VarStmt,

            /// One `name [= init]` entry of a `var` statement
            VarDeclarator,

            /// `globalvar a, b;`
            GlobalVarStmt,

            /// `enum E { A, B = 2 }`
            EnumDecl,

            /// One member of an enum
            EnumMember,

            IfStmt,

            ElseBranch,

            WhileStmt,

            /// `do ... until cond`
            DoStmt,

            ForStmt,

            /// `repeat (n) ...`
            RepeatStmt,

            /// `with (target) ...`
            WithStmt,

            SwitchStmt,

            /// `case e: ...`
            CaseClause,

            /// `default: ...`
            DefaultClause,

            BreakStmt,

            ContinueStmt,

            ExitStmt,

            ReturnStmt,

            /// `{ ... }`
            Block,

            /// A lone `;`
            EmptyStmt,

            /// Call or increment used as a statement
            ExprStmt,

            /// `target op value` with `=`, `:=` or a compound operator
            AssignStmt,

            /// A declared name
            Name,

            /// A name used in an expression
            NameRef,

            Literal,

            ParenExpr,

            /// `[a, b]`
            ArrayLiteral,

            BinaryExpr,

            /// Prefix operator expression
            UnaryExpr,

            /// Postfix `++` or `--`
            PostfixExpr,

            /// `cond ? a : b`
            TernaryExpr,

            CallExpr,

            /// Argument list in call
            ArgList,

            /// `target.name`
            FieldExpr,

            /// `target[i]`, `target[| i]`, `target[? key]`, `target[# x, y]`, `target[@ i]`
            IndexExpr,

            /// `function name(a, b) { ... }`
            FunctionDecl,

            /// `function (a) { ... }` in expression position
            FunctionExpr,

            /// Parameter list of a function
            ParamList,
        }
    };
}

for_each_token_kind!(define_syntax_kind);

impl SyntaxKind {
    /// Returns `true` if this is a trivia kind.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace
                | Self::LineComment
                | Self::DocComment
                | Self::BlockComment
                | Self::Region
        )
    }

    /// Returns `true` if this is a token kind (not a composite node).
    #[must_use]
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::Eof as u16)
    }

    /// Returns `true` if this is a composite node kind.
    #[must_use]
    pub fn is_node(self) -> bool {
        !self.is_token()
    }
}

macro_rules! map_token_kinds {
    ($($name:ident),* $(,)?) => {
        impl From<TokenKind> for SyntaxKind {
            fn from(kind: TokenKind) -> Self {
                match kind {
                    $(TokenKind::$name => SyntaxKind::$name,)*
                }
            }
        }
    };
}

for_each_token_kind!(map_token_kinds);

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// The language type for GML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GmlLanguage {}

macro_rules! define_syntax_kinds {
    ($($token:ident),* $(,)?) => {
        const SYNTAX_KINDS: &[SyntaxKind] = &[
            $(SyntaxKind::$token,)*
            SyntaxKind::SourceFile,
            SyntaxKind::MacroDecl,
            SyntaxKind::VarStmt,
            SyntaxKind::VarDeclarator,
            SyntaxKind::GlobalVarStmt,
            SyntaxKind::EnumDecl,
            SyntaxKind::EnumMember,
            SyntaxKind::IfStmt,
            SyntaxKind::ElseBranch,
            SyntaxKind::WhileStmt,
            SyntaxKind::DoStmt,
            SyntaxKind::ForStmt,
            SyntaxKind::RepeatStmt,
            SyntaxKind::WithStmt,
            SyntaxKind::SwitchStmt,
            SyntaxKind::CaseClause,
            SyntaxKind::DefaultClause,
            SyntaxKind::BreakStmt,
            SyntaxKind::ContinueStmt,
            SyntaxKind::ExitStmt,
            SyntaxKind::ReturnStmt,
            SyntaxKind::Block,
            SyntaxKind::EmptyStmt,
            SyntaxKind::ExprStmt,
            SyntaxKind::AssignStmt,
            SyntaxKind::Name,
            SyntaxKind::NameRef,
            SyntaxKind::Literal,
            SyntaxKind::ParenExpr,
            SyntaxKind::ArrayLiteral,
            SyntaxKind::BinaryExpr,
            SyntaxKind::UnaryExpr,
            SyntaxKind::PostfixExpr,
            SyntaxKind::TernaryExpr,
            SyntaxKind::CallExpr,
            SyntaxKind::ArgList,
            SyntaxKind::FieldExpr,
            SyntaxKind::IndexExpr,
            SyntaxKind::FunctionDecl,
            SyntaxKind::FunctionExpr,
            SyntaxKind::ParamList,
        ];
    };
}

for_each_token_kind!(define_syntax_kinds);

impl rowan::Language for GmlLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SYNTAX_KINDS
            .get(raw.0 as usize)
            .copied()
            .unwrap_or(SyntaxKind::Error)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// A syntax node in the GML syntax tree.
pub type SyntaxNode = rowan::SyntaxNode<GmlLanguage>;

/// A syntax token in the GML syntax tree.
pub type SyntaxToken = rowan::SyntaxToken<GmlLanguage>;

/// A syntax element (either node or token) in the GML syntax tree.
pub type SyntaxElement = rowan::SyntaxElement<GmlLanguage>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowan::Language;

    #[test]
    fn test_token_kind_to_syntax_kind() {
        assert_eq!(SyntaxKind::from(TokenKind::KwWith), SyntaxKind::KwWith);
        assert_eq!(SyntaxKind::from(TokenKind::Ident), SyntaxKind::Ident);
        assert_eq!(SyntaxKind::from(TokenKind::Eof), SyntaxKind::Eof);
    }

    #[test]
    fn test_is_trivia() {
        assert!(SyntaxKind::Whitespace.is_trivia());
        assert!(SyntaxKind::DocComment.is_trivia());
        assert!(SyntaxKind::Region.is_trivia());
        assert!(!SyntaxKind::MacroLine.is_trivia());
        assert!(!SyntaxKind::Ident.is_trivia());
    }

    #[test]
    fn test_is_token_vs_node() {
        assert!(SyntaxKind::Ident.is_token());
        assert!(SyntaxKind::KwIf.is_token());
        assert!(!SyntaxKind::IfStmt.is_token());
        assert!(SyntaxKind::IndexExpr.is_node());
    }

    #[test]
    fn test_raw_round_trip_covers_every_kind() {
        for (index, kind) in SYNTAX_KINDS.iter().enumerate() {
            assert_eq!(*kind as usize, index);
            assert_eq!(GmlLanguage::kind_from_raw(GmlLanguage::kind_to_raw(*kind)), *kind);
        }
        assert_eq!(SYNTAX_KINDS.last(), Some(&SyntaxKind::ParamList));
    }
}
