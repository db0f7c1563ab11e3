//! Single list of token kinds shared by `TokenKind` and `SyntaxKind`.
//!
//! The order here must match the declaration order of `TokenKind`, and
//! `Eof` must stay last.

macro_rules! for_each_token_kind {
    ($callback:ident) => {
        $callback! {
            Whitespace,
            LineComment,
            DocComment,
            BlockComment,
            Region,
            MacroLine,
            Semicolon,
            Colon,
            Comma,
            Dot,
            LParen,
            RParen,
            LBracket,
            RBracket,
            LBrace,
            RBrace,
            Question,
            LBracketPipe,
            LBracketQuestion,
            LBracketHash,
            LBracketAt,
            Assign,
            ColonAssign,
            PlusAssign,
            MinusAssign,
            StarAssign,
            SlashAssign,
            PipeAssign,
            AmpAssign,
            CaretAssign,
            EqEq,
            Neq,
            Lt,
            LtEq,
            Gt,
            GtEq,
            Plus,
            Minus,
            Star,
            Slash,
            Percent,
            PlusPlus,
            MinusMinus,
            AmpAmp,
            PipePipe,
            CaretCaret,
            Bang,
            Tilde,
            Amp,
            Pipe,
            Caret,
            Shl,
            Shr,
            KwVar,
            KwGlobalvar,
            KwIf,
            KwThen,
            KwElse,
            KwWhile,
            KwDo,
            KwUntil,
            KwFor,
            KwRepeat,
            KwWith,
            KwSwitch,
            KwCase,
            KwDefault,
            KwBreak,
            KwContinue,
            KwExit,
            KwReturn,
            KwEnum,
            KwFunction,
            KwAnd,
            KwOr,
            KwXor,
            KwNot,
            KwDiv,
            KwMod,
            KwTrue,
            KwFalse,
            KwSelf,
            KwOther,
            KwAll,
            KwNoone,
            KwGlobal,
            RealLiteral,
            HexLiteral,
            StringLiteral,
            Ident,
            Error,
            Eof,
        }
    };
}

pub(crate) use for_each_token_kind;
