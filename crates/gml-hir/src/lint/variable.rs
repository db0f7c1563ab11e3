//! Declaration and use collection.
//!
//! Produces the document's [`Contribution`]: variable declaration sites,
//! `#macro` definitions and every identifier use.
//!
//! Scoping:
//! - `var` names are local to the document.
//! - `globalvar x` and `global.x = ...` declare globals.
//! - In an object event, a plain `x = ...` to a name that is not local
//!   declares an instance variable, unless it sits inside a `with` block
//!   where it would target another instance.
//! - `function name(...)` declares a global function in a script and a
//!   method in an object event. Parameters are locals.

use gml_syntax::{SyntaxKind, SyntaxNode, SyntaxToken};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::symbols::{Contribution, MacroRecord, ScopeKind, SymbolUse, UseKind, VariableRecord};

use super::{first_token, name_ref_ident, PassContext};

/// A `#macro` line split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroLine<'a> {
    pub name: &'a str,
    /// Range of the name relative to the start of the line.
    pub name_range: TextRange,
    pub value: &'a str,
}

/// Splits `#macro [config:]NAME value`. Returns `None` without a name.
#[must_use]
pub fn parse_macro_line(line: &str) -> Option<MacroLine<'_>> {
    let body = line.strip_prefix("#macro")?;
    let body_start = line.len() - body.len();
    let trimmed = body.trim_start();
    let mut offset = body_start + (body.len() - trimmed.len());

    let word_end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let mut word = &trimmed[..word_end];
    if let Some((_config, name)) = word.split_once(':') {
        offset += word.len() - name.len();
        word = name;
    }
    if word.is_empty() {
        return None;
    }
    let value = trimmed[word_end..].trim();
    Some(MacroLine {
        name: word,
        name_range: TextRange::at(to_size(offset), to_size(word.len())),
        value,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn to_size(value: usize) -> TextSize {
    TextSize::from(value as u32)
}

/// Collects the contribution of one document.
pub struct VariablePass<'c, 'a> {
    ctx: &'c PassContext<'a>,
    in_object_event: bool,
    with_depth: usize,
    locals: FxHashSet<SmolStr>,
    declared: FxHashSet<(ScopeKind, SmolStr)>,
    contribution: Contribution,
}

impl<'c, 'a> VariablePass<'c, 'a> {
    #[must_use]
    pub fn new(ctx: &'c PassContext<'a>) -> Self {
        Self {
            ctx,
            in_object_event: ctx.kind.is_object_event(),
            with_depth: 0,
            locals: FxHashSet::default(),
            declared: FxHashSet::default(),
            contribution: Contribution::default(),
        }
    }

    #[must_use]
    pub fn run(mut self) -> Contribution {
        let root = self.ctx.root.clone();
        self.visit(&root);
        self.contribution
    }

    fn visit(&mut self, node: &SyntaxNode) {
        match node.kind() {
            SyntaxKind::VarStmt => self.visit_var_stmt(node),
            SyntaxKind::GlobalVarStmt => {
                for name in node.children().filter(|c| c.kind() == SyntaxKind::Name) {
                    if let Some(token) = first_token(&name, SyntaxKind::Ident) {
                        self.declare(&token, ScopeKind::Global);
                    }
                }
            }
            SyntaxKind::MacroDecl => self.visit_macro(node),
            SyntaxKind::FunctionDecl | SyntaxKind::FunctionExpr => self.visit_function(node),
            SyntaxKind::AssignStmt => self.visit_assignment(node),
            SyntaxKind::WithStmt => {
                let mut children = node.children();
                if let Some(target) = children.next() {
                    self.visit(&target);
                }
                self.with_depth += 1;
                for child in children {
                    self.visit(&child);
                }
                self.with_depth -= 1;
            }
            SyntaxKind::NameRef => {
                if let Some(token) = name_ref_ident(node) {
                    let is_callee = node.parent().is_some_and(|parent| {
                        parent.kind() == SyntaxKind::CallExpr
                            && parent.first_child().as_ref() == Some(node)
                    });
                    let kind = if is_callee {
                        UseKind::Call
                    } else {
                        UseKind::Read
                    };
                    self.record_use(&token, kind);
                }
            }
            _ => {
                for child in node.children() {
                    self.visit(&child);
                }
            }
        }
    }

    fn visit_var_stmt(&mut self, node: &SyntaxNode) {
        for declarator in node.children() {
            let Some(name) = declarator
                .children()
                .find(|c| c.kind() == SyntaxKind::Name)
            else {
                continue;
            };
            // The initializer cannot see the name it initializes.
            for init in declarator.children().filter(|c| c.kind() != SyntaxKind::Name) {
                self.visit(&init);
            }
            if let Some(token) = first_token(&name, SyntaxKind::Ident) {
                self.locals.insert(SmolStr::new(token.text()));
                self.declare(&token, ScopeKind::Local);
            }
        }
    }

    fn visit_function(&mut self, node: &SyntaxNode) {
        for child in node.children() {
            match child.kind() {
                SyntaxKind::Name if node.kind() == SyntaxKind::FunctionDecl => {
                    if let Some(token) = first_token(&child, SyntaxKind::Ident) {
                        let scope = if self.in_object_event {
                            ScopeKind::Instance
                        } else {
                            ScopeKind::Global
                        };
                        self.declare(&token, scope);
                    }
                }
                SyntaxKind::ParamList => {
                    for param in child.children() {
                        if param.kind() != SyntaxKind::Name {
                            self.visit(&param);
                            continue;
                        }
                        if let Some(token) = first_token(&param, SyntaxKind::Ident) {
                            self.locals.insert(SmolStr::new(token.text()));
                            self.declare(&token, ScopeKind::Local);
                        }
                    }
                }
                _ => self.visit(&child),
            }
        }
    }

    fn visit_macro(&mut self, node: &SyntaxNode) {
        let Some(token) = first_token(node, SyntaxKind::MacroLine) else {
            return;
        };
        let Some(line) = parse_macro_line(token.text()) else {
            return;
        };
        let range = line.name_range + token.text_range().start();
        self.contribution.macros.push(MacroRecord {
            name: SmolStr::new(line.name),
            value: line.value.to_string(),
            location: self.ctx.location(range),
        });
        self.contribution.uses.push(SymbolUse {
            name: SmolStr::new(line.name),
            kind: UseKind::Declaration,
            location: self.ctx.location(range),
        });
    }

    fn visit_assignment(&mut self, node: &SyntaxNode) {
        let mut children = node.children();
        let Some(target) = children.next() else {
            return;
        };
        let plain = node.children_with_tokens().any(|element| {
            matches!(
                element.kind(),
                SyntaxKind::Assign | SyntaxKind::ColonAssign
            )
        });

        match target.kind() {
            SyntaxKind::NameRef => {
                if let Some(token) = name_ref_ident(&target) {
                    let is_local = self.locals.contains(token.text());
                    if plain && !is_local && self.in_object_event && self.with_depth == 0 {
                        self.declare(&token, ScopeKind::Instance);
                    } else {
                        self.record_use(&token, UseKind::Write);
                    }
                }
            }
            SyntaxKind::FieldExpr => match (field_base(&target), field_name(&target)) {
                (Some(SyntaxKind::KwGlobal), Some(field)) if plain => {
                    self.declare(&field, ScopeKind::Global);
                }
                (Some(SyntaxKind::KwSelf), Some(field))
                    if plain && self.in_object_event && self.with_depth == 0 =>
                {
                    self.declare(&field, ScopeKind::Instance);
                }
                (Some(SyntaxKind::KwGlobal | SyntaxKind::KwSelf), Some(field)) => {
                    self.record_use(&field, UseKind::Write);
                }
                _ => self.visit(&target),
            },
            _ => self.visit(&target),
        }

        for value in children {
            self.visit(&value);
        }
    }

    /// Records a declaration site once per scope and name; later sites
    /// count as writes.
    fn declare(&mut self, token: &SyntaxToken, scope: ScopeKind) {
        let name = SmolStr::new(token.text());
        if !self.declared.insert((scope, name.clone())) {
            self.record_use(token, UseKind::Write);
            return;
        }
        let location = self.ctx.location(token.text_range());
        self.contribution.variables.push(VariableRecord {
            name: name.clone(),
            scope,
            location: location.clone(),
        });
        self.contribution.uses.push(SymbolUse {
            name,
            kind: UseKind::Declaration,
            location,
        });
    }

    fn record_use(&mut self, token: &SyntaxToken, kind: UseKind) {
        self.contribution.uses.push(SymbolUse {
            name: SmolStr::new(token.text()),
            kind,
            location: self.ctx.location(token.text_range()),
        });
    }
}

/// Keyword kind of the base of `global.x` or `self.x`.
fn field_base(node: &SyntaxNode) -> Option<SyntaxKind> {
    let base = node.first_child()?;
    if base.kind() != SyntaxKind::NameRef {
        return None;
    }
    base.first_token()
        .map(|token| token.kind())
        .filter(|kind| matches!(kind, SyntaxKind::KwGlobal | SyntaxKind::KwSelf))
}

fn field_name(node: &SyntaxNode) -> Option<SyntaxToken> {
    node.children()
        .find(|c| c.kind() == SyntaxKind::Name)
        .and_then(|name| first_token(&name, SyntaxKind::Ident))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_macro_line() {
        let line = parse_macro_line("#macro SPEED 4").unwrap();
        assert_eq!(line.name, "SPEED");
        assert_eq!(line.value, "4");
        assert_eq!(line.name_range, TextRange::new(7.into(), 12.into()));

        let line = parse_macro_line("#macro  Desktop:WIDTH   1280 ").unwrap();
        assert_eq!(line.name, "WIDTH");
        assert_eq!(line.value, "1280");
        assert_eq!(line.name_range, TextRange::new(16.into(), 21.into()));

        assert!(parse_macro_line("#macro").is_none());
        assert!(parse_macro_line("#macro   ").is_none());
    }
}
