//! Expression parsing using Pratt parsing.
//!
//! Operator precedence (low to high):
//! - `?:` (only at the outermost level)
//! - `||`, `or` (1-2)
//! - `^^`, `xor` (3-4)
//! - `&&`, `and` (5-6)
//! - `==`, `=`, `!=`, `<>`, `<`, `<=`, `>`, `>=` (7-8)
//! - `|` (9-10), `^` (11-12), `&` (13-14)
//! - `<<`, `>>` (15-16)
//! - `+`, `-` (17-18)
//! - `*`, `/`, `%`, `div`, `mod` (19-20)
//! - prefix `!`, `not`, `-`, `+`, `~`, `++`, `--` (21)
//! - postfix: field access, calls, indexing, `++`, `--`

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;

use super::super::CompletedMarker;
use super::super::Parser;

impl Parser<'_, '_> {
    /// Parse an expression using Pratt parsing.
    pub(crate) fn parse_expression(&mut self) -> CompletedMarker {
        self.parse_expr_bp(0)
    }

    /// Parse expression with minimum binding power.
    pub(crate) fn parse_expr_bp(&mut self, min_bp: u8) -> CompletedMarker {
        let mut lhs = if let Some(bp) = self.current().prefix_binding_power() {
            let marker = self.start();
            self.bump();
            self.parse_expr_bp(bp);
            marker.complete(self, SyntaxKind::UnaryExpr)
        } else {
            self.parse_primary_expr()
        };

        loop {
            if let Some(next) = self.parse_postfix_expr(lhs) {
                lhs = next;
                continue;
            }

            let op = self.current();
            if let Some((l_bp, r_bp)) = op.infix_binding_power() {
                if l_bp < min_bp {
                    break;
                }

                let marker = lhs.precede(self);
                self.bump(); // operator
                self.parse_expr_bp(r_bp);
                lhs = marker.complete(self, SyntaxKind::BinaryExpr);
                continue;
            }

            if op == TokenKind::Question && min_bp == 0 {
                let marker = lhs.precede(self);
                self.bump();
                self.parse_expression();
                self.expect(TokenKind::Colon, "':' in conditional expression");
                self.parse_expression();
                lhs = marker.complete(self, SyntaxKind::TernaryExpr);
                continue;
            }

            break;
        }

        lhs
    }

    /// Parse postfix expressions (field access, calls, indexing, `++`/`--`).
    pub(crate) fn parse_postfix_expr(&mut self, lhs: CompletedMarker) -> Option<CompletedMarker> {
        match self.current() {
            TokenKind::Dot => {
                let marker = lhs.precede(self);
                self.bump();
                if self.at(TokenKind::Ident) {
                    self.parse_name();
                } else {
                    self.error("expected field name");
                }
                Some(marker.complete(self, SyntaxKind::FieldExpr))
            }
            TokenKind::LParen => {
                let marker = lhs.precede(self);
                self.parse_arg_list();
                Some(marker.complete(self, SyntaxKind::CallExpr))
            }
            kind if kind.is_index_open() => {
                let marker = lhs.precede(self);
                self.bump();
                self.parse_expression();
                while self.eat(TokenKind::Comma) {
                    self.parse_expression();
                }
                self.expect(TokenKind::RBracket, "']'");
                Some(marker.complete(self, SyntaxKind::IndexExpr))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let marker = lhs.precede(self);
                self.bump();
                Some(marker.complete(self, SyntaxKind::PostfixExpr))
            }
            _ => None,
        }
    }

    /// Parse primary expressions (literals, names, parentheses, arrays,
    /// function literals).
    pub(crate) fn parse_primary_expr(&mut self) -> CompletedMarker {
        match self.current() {
            TokenKind::RealLiteral
            | TokenKind::HexLiteral
            | TokenKind::StringLiteral
            | TokenKind::KwTrue
            | TokenKind::KwFalse => {
                let marker = self.start();
                self.bump();
                marker.complete(self, SyntaxKind::Literal)
            }
            TokenKind::Ident
            | TokenKind::KwSelf
            | TokenKind::KwOther
            | TokenKind::KwAll
            | TokenKind::KwNoone
            | TokenKind::KwGlobal => {
                let marker = self.start();
                self.bump();
                marker.complete(self, SyntaxKind::NameRef)
            }
            TokenKind::KwFunction => self.parse_function(SyntaxKind::FunctionExpr),
            TokenKind::LParen => {
                let marker = self.start();
                self.bump();
                self.parse_expression();
                self.expect(TokenKind::RParen, "')'");
                marker.complete(self, SyntaxKind::ParenExpr)
            }
            TokenKind::LBracket => {
                let marker = self.start();
                self.bump();
                while !self.at(TokenKind::RBracket) && !self.at_end() {
                    self.parse_expression();
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket, "']'");
                marker.complete(self, SyntaxKind::ArrayLiteral)
            }
            _ => {
                let marker = self.start();
                self.error("expected expression");
                // Closers stay for the enclosing construct to consume.
                if !matches!(
                    self.current(),
                    TokenKind::Eof
                        | TokenKind::RParen
                        | TokenKind::RBracket
                        | TokenKind::RBrace
                        | TokenKind::Semicolon
                ) {
                    self.bump();
                }
                marker.complete(self, SyntaxKind::Error)
            }
        }
    }

    /// Parse argument list for function calls.
    pub(crate) fn parse_arg_list(&mut self) {
        self.start_node(SyntaxKind::ArgList);
        self.bump(); // (

        while !self.at(TokenKind::RParen) && !self.at_end() {
            self.parse_expression();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RParen, "')'");
        self.finish_node();
    }

    /// Parse a declared name.
    pub(crate) fn parse_name(&mut self) {
        self.start_node(SyntaxKind::Name);
        self.bump();
        self.finish_node();
    }
}
