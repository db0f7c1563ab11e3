//! Token definitions for GameMaker Language.
//!
//! The token kinds are shared with `SyntaxKind` through the
//! `for_each_token_kind!` list, so the two enums stay in lockstep.

use logos::Logos;

fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(remainder.len());
            false
        }
    }
}

/// All token kinds in GameMaker Language.
///
/// Keywords are case-sensitive, as in the GameMaker compiler.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u16)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    /// Whitespace (spaces, tabs, newlines)
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    /// Single-line comment: `// ...`
    #[regex(r"//[^\r\n]*", allow_greedy = true)]
    LineComment,

    /// Documentation comment: `/// ...`
    #[regex(r"///[^\r\n]*", priority = 10, allow_greedy = true)]
    DocComment,

    /// Block comment: `/* ... */`
    #[token("/*", lex_block_comment)]
    BlockComment,

    /// Editor folding markers: `#region ...` and `#endregion ...`
    #[regex(r"#region[^\r\n]*", allow_greedy = true)]
    #[regex(r"#endregion[^\r\n]*", allow_greedy = true)]
    Region,

    /// A whole `#macro NAME value` line.
    #[regex(r"#macro[^\r\n]*", allow_greedy = true)]
    MacroLine,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token(";")]
    Semicolon,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("?")]
    Question,

    /// List accessor `[|`
    #[token("[|")]
    LBracketPipe,

    /// Map accessor `[?`
    #[token("[?")]
    LBracketQuestion,

    /// Grid accessor `[#`
    #[token("[#")]
    LBracketHash,

    /// Array reference accessor `[@`
    #[token("[@")]
    LBracketAt,

    // =========================================================================
    // ASSIGNMENT
    // =========================================================================
    /// `=`: assignment in statement position, equality in expressions
    #[token("=")]
    Assign,

    #[token(":=")]
    ColonAssign,

    #[token("+=")]
    PlusAssign,

    #[token("-=")]
    MinusAssign,

    #[token("*=")]
    StarAssign,

    #[token("/=")]
    SlashAssign,

    #[token("|=")]
    PipeAssign,

    #[token("&=")]
    AmpAssign,

    #[token("^=")]
    CaretAssign,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    #[token("==")]
    EqEq,

    #[token("!=")]
    #[token("<>")]
    Neq,

    #[token("<")]
    Lt,

    #[token("<=")]
    LtEq,

    #[token(">")]
    Gt,

    #[token(">=")]
    GtEq,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("++")]
    PlusPlus,

    #[token("--")]
    MinusMinus,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    #[token("^^")]
    CaretCaret,

    #[token("!")]
    Bang,

    #[token("~")]
    Tilde,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("^")]
    Caret,

    #[token("<<")]
    Shl,

    #[token(">>")]
    Shr,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("var")]
    KwVar,

    #[token("globalvar")]
    KwGlobalvar,

    #[token("if")]
    KwIf,

    #[token("then")]
    KwThen,

    #[token("else")]
    KwElse,

    #[token("while")]
    KwWhile,

    #[token("do")]
    KwDo,

    #[token("until")]
    KwUntil,

    #[token("for")]
    KwFor,

    #[token("repeat")]
    KwRepeat,

    #[token("with")]
    KwWith,

    #[token("switch")]
    KwSwitch,

    #[token("case")]
    KwCase,

    #[token("default")]
    KwDefault,

    #[token("break")]
    KwBreak,

    #[token("continue")]
    KwContinue,

    #[token("exit")]
    KwExit,

    #[token("return")]
    KwReturn,

    #[token("enum")]
    KwEnum,

    #[token("function")]
    KwFunction,

    #[token("and")]
    KwAnd,

    #[token("or")]
    KwOr,

    #[token("xor")]
    KwXor,

    #[token("not")]
    KwNot,

    #[token("div")]
    KwDiv,

    #[token("mod")]
    KwMod,

    #[token("true")]
    KwTrue,

    #[token("false")]
    KwFalse,

    #[token("self")]
    KwSelf,

    #[token("other")]
    KwOther,

    #[token("all")]
    KwAll,

    #[token("noone")]
    KwNoone,

    #[token("global")]
    KwGlobal,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Real literal: `42`, `3.14`, `.5`
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    #[regex(r"\.[0-9]+")]
    RealLiteral,

    /// Hexadecimal literal: `$FF` or `0xFF`
    #[regex(r"\$[0-9A-Fa-f]+")]
    #[regex(r"0[xX][0-9A-Fa-f]+")]
    HexLiteral,

    /// String literal in double or single quotes
    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'[^']*'")]
    StringLiteral,

    // =========================================================================
    // IDENTIFIERS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // =========================================================================
    // SPECIAL TOKENS
    // =========================================================================
    /// Lexer error - unrecognized character
    #[default]
    Error,

    /// End of file marker (not produced by lexer, added by parser)
    Eof,
}

impl TokenKind {
    /// Returns `true` if this token is trivia (whitespace, comment, region marker).
    #[inline]
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

    /// Returns `true` if this token is a keyword.
    #[must_use]
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::KwVar as u16) && (self as u16) <= (Self::KwGlobal as u16)
    }

    /// Returns `true` for `=`, `:=` and the compound assignment operators.
    #[must_use]
    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::ColonAssign
                | Self::PlusAssign
                | Self::MinusAssign
                | Self::StarAssign
                | Self::SlashAssign
                | Self::PipeAssign
                | Self::AmpAssign
                | Self::CaretAssign
        )
    }

    /// Returns `true` for `[` and the data-structure accessors.
    #[must_use]
    pub fn is_index_open(self) -> bool {
        matches!(
            self,
            Self::LBracket
                | Self::LBracketPipe
                | Self::LBracketQuestion
                | Self::LBracketHash
                | Self::LBracketAt
        )
    }

    /// Returns `true` if this token can start an expression.
    #[must_use]
    pub fn can_start_expr(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::RealLiteral
                | Self::HexLiteral
                | Self::StringLiteral
                | Self::KwTrue
                | Self::KwFalse
                | Self::KwSelf
                | Self::KwOther
                | Self::KwAll
                | Self::KwNoone
                | Self::KwGlobal
                | Self::KwFunction
                | Self::KwNot
                | Self::LParen
                | Self::LBracket
                | Self::Minus
                | Self::Plus
                | Self::Bang
                | Self::Tilde
                | Self::PlusPlus
                | Self::MinusMinus
        )
    }

    /// Returns `true` if this token can start a statement.
    #[must_use]
    pub fn can_start_statement(self) -> bool {
        self.can_start_expr()
            || matches!(
                self,
                Self::KwVar
                    | Self::KwGlobalvar
                    | Self::KwIf
                    | Self::KwWhile
                    | Self::KwDo
                    | Self::KwFor
                    | Self::KwRepeat
                    | Self::KwWith
                    | Self::KwSwitch
                    | Self::KwBreak
                    | Self::KwContinue
                    | Self::KwExit
                    | Self::KwReturn
                    | Self::KwEnum
                    | Self::KwFunction
                    | Self::LBrace
                    | Self::MacroLine
                    | Self::Semicolon
            )
    }

    /// Returns the binding power for Pratt parsing (left, right).
    /// Returns None if not an infix operator.
    ///
    /// `=` binds as equality here; statement parsing claims it first when
    /// it stands in assignment position.
    #[must_use]
    pub fn infix_binding_power(self) -> Option<(u8, u8)> {
        Some(match self {
            Self::PipePipe | Self::KwOr => (1, 2),
            Self::CaretCaret | Self::KwXor => (3, 4),
            Self::AmpAmp | Self::KwAnd => (5, 6),
            Self::EqEq
            | Self::Assign
            | Self::Neq
            | Self::Lt
            | Self::LtEq
            | Self::Gt
            | Self::GtEq => (7, 8),
            Self::Pipe => (9, 10),
            Self::Caret => (11, 12),
            Self::Amp => (13, 14),
            Self::Shl | Self::Shr => (15, 16),
            Self::Plus | Self::Minus => (17, 18),
            Self::Star | Self::Slash | Self::Percent | Self::KwDiv | Self::KwMod => (19, 20),
            _ => return None,
        })
    }

    /// Returns the binding power for prefix operators.
    #[must_use]
    pub fn prefix_binding_power(self) -> Option<u8> {
        Some(match self {
            Self::Bang
            | Self::KwNot
            | Self::Plus
            | Self::Minus
            | Self::Tilde
            | Self::PlusPlus
            | Self::MinusMinus => PREFIX_BP,
            _ => return None,
        })
    }
}

/// Binding power of prefix operators; binds tighter than any infix operator.
pub const PREFIX_BP: u8 = 21;

impl From<TokenKind> for rowan::SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        Self(kind as u16)
    }
}
