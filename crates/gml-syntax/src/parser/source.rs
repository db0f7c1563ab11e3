//! Token source for the parser.
//!
//! Wraps the token stream and provides trivia-skipping lookahead.

use crate::lexer::{Token, TokenKind};
use text_size::{TextRange, TextSize};

pub struct Source<'t, 'src> {
    tokens: &'t [Token],
    source: &'src str,
    cursor: usize,
}

impl<'t, 'src> Source<'t, 'src> {
    pub fn new(tokens: &'t [Token], source: &'src str) -> Self {
        Self {
            tokens,
            source,
            cursor: 0,
        }
    }

    /// Returns the current non-trivia token kind, or `Eof` if at end.
    pub fn current(&self) -> TokenKind {
        self.peek_kind_n(0)
    }

    /// Returns the current non-trivia token, or `None` if at end.
    pub fn current_token(&self) -> Option<&Token> {
        self.peek_token_n(0)
    }

    /// Range of the current token, or an empty range at the end of input.
    pub fn current_range(&self) -> TextRange {
        self.current_token().map_or_else(
            || {
                #[allow(clippy::cast_possible_truncation)]
                let end = TextSize::from(self.source.len() as u32);
                TextRange::empty(end)
            },
            |token| token.range,
        )
    }

    /// Source text of the current token, empty at the end of input.
    pub fn current_text(&self) -> &'src str {
        let source: &'src str = self.source;
        let range = self.current_range();
        source
            .get(usize::from(range.start())..usize::from(range.end()))
            .unwrap_or_default()
    }

    /// Peeks at the nth non-trivia token ahead (0 = current).
    pub fn peek_kind_n(&self, n: usize) -> TokenKind {
        self.peek_token_n(n).map_or(TokenKind::Eof, |token| token.kind)
    }

    pub fn peek_token_n(&self, n: usize) -> Option<&Token> {
        self.tokens
            .get(self.cursor..)?
            .iter()
            .filter(|token| !token.kind.is_trivia())
            .nth(n)
    }

    /// Advances past the current non-trivia token.
    pub fn bump(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor) {
            self.cursor += 1;
            if !token.kind.is_trivia() {
                break;
            }
        }
    }

    pub fn at_end(&self) -> bool {
        self.current() == TokenKind::Eof
    }
}
