//! Call resolution and arity checks.

use gml_syntax::{SyntaxKind, SyntaxNode};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::reference::Reference;
use crate::symbols::Signature;

use super::options::{LintMode, LintSettings};
use super::variable::parse_macro_line;
use super::{first_token, name_ref_ident, PassContext};

/// Checks every `name(...)` call against the index.
pub struct FunctionPass<'r> {
    reference: &'r Reference,
    mode: LintMode,
    settings: LintSettings,
}

impl<'r> FunctionPass<'r> {
    #[must_use]
    pub fn new(reference: &'r Reference, mode: LintMode, settings: LintSettings) -> Self {
        Self {
            reference,
            mode,
            settings,
        }
    }

    pub fn run(&self, ctx: &PassContext<'_>, diagnostics: &mut DiagnosticBuilder) {
        let declared_here = declared_names(&ctx.root);

        for call in ctx
            .root
            .descendants()
            .filter(|node| node.kind() == SyntaxKind::CallExpr)
        {
            let Some(callee) = call.first_child() else {
                continue;
            };
            let Some(token) = name_ref_ident(&callee) else {
                continue;
            };
            let name = token.text();
            let argument_count = call
                .children()
                .find(|child| child.kind() == SyntaxKind::ArgList)
                .map_or(0, |args| args.children().count());

            match self.signature_of(name) {
                Resolution::Known(Some(signature)) => {
                    if self.settings.warn_arity && !signature.accepts(argument_count) {
                        diagnostics.report(
                            DiagnosticCode::WrongArgumentCount,
                            token.text_range(),
                            format!(
                                "'{name}' expects {} argument(s), found {argument_count}",
                                signature.arity_label()
                            ),
                        );
                    }
                }
                Resolution::Known(None) => {}
                Resolution::Unknown if declared_here.contains(name) => {}
                Resolution::Unknown => {
                    if self.mode == LintMode::Full && self.settings.warn_unresolved {
                        diagnostics.report(
                            DiagnosticCode::UnresolvedFunction,
                            token.text_range(),
                            format!("unresolved function or script '{name}'"),
                        );
                    }
                }
            }
        }
    }

    fn signature_of(&self, name: &str) -> Resolution {
        if let Some(function) = self.reference.builtin_function(name) {
            return Resolution::Known(Some(function.signature()));
        }
        if let Some(script) = self.reference.script_get_package(name) {
            // Scripts without documentation accept any argument count.
            return Resolution::Known(script.signature.clone());
        }
        let callable_variable = self.reference.variable_sites(name).iter().any(|site| {
            site.scope != crate::symbols::ScopeKind::Local
        });
        if self.reference.macro_get(name).is_some() || callable_variable {
            return Resolution::Known(None);
        }
        Resolution::Unknown
    }
}

enum Resolution {
    /// Resolved; the signature is present when the arity is known.
    Known(Option<Signature>),
    Unknown,
}

/// Names this document declares itself, which calls may target before the
/// document's own contribution reaches the index.
fn declared_names(root: &SyntaxNode) -> FxHashSet<SmolStr> {
    let mut names = FxHashSet::default();
    for node in root.descendants() {
        match node.kind() {
            SyntaxKind::Name => {
                if let Some(token) = first_token(&node, SyntaxKind::Ident) {
                    names.insert(SmolStr::new(token.text()));
                }
            }
            SyntaxKind::MacroDecl => {
                if let Some(line) = first_token(&node, SyntaxKind::MacroLine)
                    .as_ref()
                    .and_then(|token| parse_macro_line(token.text()).map(|l| SmolStr::new(l.name)))
                {
                    names.insert(line);
                }
            }
            SyntaxKind::AssignStmt => {
                if let Some(token) = node.first_child().as_ref().and_then(name_ref_ident) {
                    names.insert(SmolStr::new(token.text()));
                }
            }
            _ => {}
        }
    }
    names
}
