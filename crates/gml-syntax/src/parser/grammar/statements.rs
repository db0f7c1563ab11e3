//! Statement parsing for GameMaker Language.
//!
//! Supported statements:
//! - Declarations: `var`, `globalvar`, `enum`, `#macro`, `function`
//! - Assignment: `x = e`, `x := e`, compound `x += e` and friends
//! - Expression statement: calls and `++`/`--`
//! - `if`/`else`, `while`, `do`/`until`, `for`, `repeat`, `with`, `switch`
//! - `break`, `continue`, `exit`, `return`
//! - Blocks and empty statements
//!
//! Semicolons are optional after every statement.

use crate::lexer::{TokenKind, PREFIX_BP};
use crate::syntax::SyntaxKind;

use super::super::{CompletedMarker, Parser};

impl Parser<'_, '_> {
    /// Parse a single statement.
    ///
    /// Always consumes at least one token unless positioned at `}` or at
    /// the end of input, which enclosing constructs handle.
    pub(crate) fn parse_statement(&mut self) {
        match self.current() {
            TokenKind::Semicolon => {
                self.start_node(SyntaxKind::EmptyStmt);
                self.bump();
                self.finish_node();
            }
            TokenKind::LBrace => self.parse_block(),
            TokenKind::MacroLine => {
                self.start_node(SyntaxKind::MacroDecl);
                self.bump();
                self.finish_node();
            }
            TokenKind::KwVar => self.parse_var_stmt(true),
            TokenKind::KwGlobalvar => self.parse_globalvar_stmt(),
            TokenKind::KwEnum => self.parse_enum_decl(),
            TokenKind::KwFunction => {
                self.parse_function(SyntaxKind::FunctionDecl);
            }
            TokenKind::KwIf => self.parse_if_stmt(),
            TokenKind::KwWhile => self.parse_while_stmt(),
            TokenKind::KwDo => self.parse_do_stmt(),
            TokenKind::KwFor => self.parse_for_stmt(),
            TokenKind::KwRepeat => self.parse_header_stmt(SyntaxKind::RepeatStmt),
            TokenKind::KwWith => self.parse_header_stmt(SyntaxKind::WithStmt),
            TokenKind::KwSwitch => self.parse_switch_stmt(),
            TokenKind::KwBreak => self.parse_keyword_stmt(SyntaxKind::BreakStmt),
            TokenKind::KwContinue => self.parse_keyword_stmt(SyntaxKind::ContinueStmt),
            TokenKind::KwExit => self.parse_keyword_stmt(SyntaxKind::ExitStmt),
            TokenKind::KwReturn => self.parse_return_stmt(),
            TokenKind::RBrace => self.error("expected statement"),
            kind if kind.can_start_expr() => self.parse_expr_stmt(true),
            _ => self.error_and_bump("expected statement"),
        }
    }

    /// Parse a top-level statement; a stray `}` is consumed as an error.
    pub(crate) fn parse_top_level_statement(&mut self) {
        if self.at(TokenKind::RBrace) {
            self.error_and_bump("unexpected '}'");
        } else {
            self.parse_statement();
        }
    }

    /// `function [name](a, b = 1) [constructor] { ... }`, as a declaration
    /// or an expression depending on `kind`.
    pub(crate) fn parse_function(&mut self, kind: SyntaxKind) -> CompletedMarker {
        let marker = self.start();
        self.bump(); // function
        if self.at(TokenKind::Ident) {
            self.parse_name();
        }
        if self.at(TokenKind::LParen) {
            self.parse_param_list();
        } else {
            self.error("expected '('");
        }
        // `constructor` is a contextual keyword.
        if self.at(TokenKind::Ident) && self.current_text() == "constructor" {
            self.bump();
        }
        if self.at(TokenKind::LBrace) {
            self.parse_block();
        } else {
            self.error("expected function body");
        }
        marker.complete(self, kind)
    }

    fn parse_param_list(&mut self) {
        self.start_node(SyntaxKind::ParamList);
        self.bump(); // (
        while !self.at(TokenKind::RParen) && !self.at_end() {
            if !self.at(TokenKind::Ident) {
                self.error("expected parameter name");
                break;
            }
            self.parse_name();
            if self.eat(TokenKind::Assign) {
                self.parse_expression();
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'");
        self.finish_node();
    }

    fn parse_block(&mut self) {
        self.start_node(SyntaxKind::Block);
        self.bump(); // {
        while !self.at(TokenKind::RBrace) && !self.at_end() {
            self.parse_statement();
        }
        self.expect(TokenKind::RBrace, "'}'");
        self.finish_node();
    }

    /// `var a = 1, b`. The trailing `;` is only consumed when `terminate`.
    fn parse_var_stmt(&mut self, terminate: bool) {
        self.start_node(SyntaxKind::VarStmt);
        self.bump(); // var
        loop {
            if !self.at(TokenKind::Ident) {
                self.error("expected variable name");
                break;
            }
            self.start_node(SyntaxKind::VarDeclarator);
            self.parse_name();
            if self.eat(TokenKind::Assign) || self.eat(TokenKind::ColonAssign) {
                self.parse_expression();
            }
            self.finish_node();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if terminate {
            self.eat(TokenKind::Semicolon);
        }
        self.finish_node();
    }

    fn parse_globalvar_stmt(&mut self) {
        self.start_node(SyntaxKind::GlobalVarStmt);
        self.bump(); // globalvar
        loop {
            if !self.at(TokenKind::Ident) {
                self.error("expected variable name");
                break;
            }
            self.parse_name();
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.eat(TokenKind::Semicolon);
        self.finish_node();
    }

    fn parse_enum_decl(&mut self) {
        self.start_node(SyntaxKind::EnumDecl);
        self.bump(); // enum
        if self.at(TokenKind::Ident) {
            self.parse_name();
        } else {
            self.error("expected enum name");
        }
        if self.expect(TokenKind::LBrace, "'{'") {
            while !self.at(TokenKind::RBrace) && !self.at_end() {
                if !self.at(TokenKind::Ident) {
                    self.error_and_bump("expected enum member");
                    continue;
                }
                self.start_node(SyntaxKind::EnumMember);
                self.parse_name();
                if self.eat(TokenKind::Assign) {
                    self.parse_expression();
                }
                self.finish_node();
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace, "'}'");
        }
        self.eat(TokenKind::Semicolon);
        self.finish_node();
    }

    fn parse_if_stmt(&mut self) {
        self.start_node(SyntaxKind::IfStmt);
        self.bump(); // if
        self.parse_expression();
        self.eat(TokenKind::KwThen);
        self.parse_statement();
        if self.at(TokenKind::KwElse) {
            self.start_node(SyntaxKind::ElseBranch);
            self.bump();
            self.parse_statement();
            self.finish_node();
        }
        self.finish_node();
    }

    fn parse_while_stmt(&mut self) {
        self.start_node(SyntaxKind::WhileStmt);
        self.bump(); // while
        self.parse_expression();
        self.eat(TokenKind::KwDo);
        self.parse_statement();
        self.finish_node();
    }

    fn parse_do_stmt(&mut self) {
        self.start_node(SyntaxKind::DoStmt);
        self.bump(); // do
        self.parse_statement();
        if self.expect(TokenKind::KwUntil, "'until'") {
            self.parse_expression();
        }
        self.eat(TokenKind::Semicolon);
        self.finish_node();
    }

    fn parse_for_stmt(&mut self) {
        self.start_node(SyntaxKind::ForStmt);
        self.bump(); // for
        if self.expect(TokenKind::LParen, "'('") {
            if self.at(TokenKind::KwVar) {
                self.parse_var_stmt(false);
            } else if !self.at(TokenKind::Semicolon) {
                self.parse_expr_stmt(false);
            }
            self.expect(TokenKind::Semicolon, "';'");
            if !self.at(TokenKind::Semicolon) {
                self.parse_expression();
            }
            self.expect(TokenKind::Semicolon, "';'");
            if !self.at(TokenKind::RParen) {
                self.parse_expr_stmt(false);
            }
            self.expect(TokenKind::RParen, "')'");
        }
        self.parse_statement();
        self.finish_node();
    }

    /// `repeat (n) body` and `with (target) body` share one shape.
    fn parse_header_stmt(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump(); // repeat / with
        self.parse_expression();
        self.parse_statement();
        self.finish_node();
    }

    fn parse_switch_stmt(&mut self) {
        self.start_node(SyntaxKind::SwitchStmt);
        self.bump(); // switch
        self.parse_expression();
        if self.expect(TokenKind::LBrace, "'{'") {
            while !self.at(TokenKind::RBrace) && !self.at_end() {
                match self.current() {
                    TokenKind::KwCase => {
                        self.start_node(SyntaxKind::CaseClause);
                        self.bump();
                        self.parse_expression();
                        self.expect(TokenKind::Colon, "':'");
                        self.parse_clause_body();
                        self.finish_node();
                    }
                    TokenKind::KwDefault => {
                        self.start_node(SyntaxKind::DefaultClause);
                        self.bump();
                        self.expect(TokenKind::Colon, "':'");
                        self.parse_clause_body();
                        self.finish_node();
                    }
                    _ => {
                        self.error("expected 'case' or 'default'");
                        self.parse_statement();
                    }
                }
            }
            self.expect(TokenKind::RBrace, "'}'");
        }
        self.finish_node();
    }

    fn parse_clause_body(&mut self) {
        while !matches!(
            self.current(),
            TokenKind::KwCase | TokenKind::KwDefault | TokenKind::RBrace | TokenKind::Eof
        ) {
            self.parse_statement();
        }
    }

    fn parse_keyword_stmt(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.eat(TokenKind::Semicolon);
        self.finish_node();
    }

    fn parse_return_stmt(&mut self) {
        self.start_node(SyntaxKind::ReturnStmt);
        self.bump(); // return
        if self.current().can_start_expr() {
            self.parse_expression();
        }
        self.eat(TokenKind::Semicolon);
        self.finish_node();
    }

    /// Assignment or expression statement.
    ///
    /// The target is parsed above every infix binding power so that `=`
    /// is left for the assignment rather than read as equality.
    fn parse_expr_stmt(&mut self, terminate: bool) {
        let marker = self.start();
        let first = self.current();
        let target = self.parse_expr_bp(PREFIX_BP);

        let kind = if self.current().is_assign_op() {
            self.bump();
            self.parse_expression();
            SyntaxKind::AssignStmt
        } else {
            let is_effect = match target.kind {
                SyntaxKind::CallExpr | SyntaxKind::PostfixExpr => true,
                SyntaxKind::UnaryExpr => {
                    matches!(first, TokenKind::PlusPlus | TokenKind::MinusMinus)
                }
                _ => false,
            };
            if !is_effect {
                self.error("expected assignment or call");
            }
            SyntaxKind::ExprStmt
        };

        if terminate {
            self.eat(TokenKind::Semicolon);
        }
        marker.complete(self, kind);
    }
}
