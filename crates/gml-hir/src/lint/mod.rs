//! Document analysis.
//!
//! A lint cycle parses the document, reports a failed match as a single
//! syntax diagnostic, and otherwise runs the semantic passes in order:
//!
//! 1. [`function`]: call resolution and arity
//! 2. [`variable`]: declarations, macros and uses
//! 3. [`jsdoc`]: script signatures, for scripts only
//!
//! Pass results are installed in the [`SymbolIndex`] in one commit, and
//! the cycle's diagnostics are returned grouped by pass.

pub mod function;
pub mod handler;
pub mod jsdoc;
pub mod options;
pub mod package;
pub mod variable;

use gml_syntax::{SyntaxKind, SyntaxNode, SyntaxToken};
use text_size::TextRange;
use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::index::{CommitOutcome, CommitRequest, CycleTicket, JsDocUpdate, SymbolIndex};
use crate::line_index::LineIndex;
use crate::project::DocumentKind;
use crate::snapshot::content_hash;
use crate::symbols::{Location, Uri};

use handler::DiagnosticHandler;
use options::{LintMode, SemanticsOption};
use package::LintPackage;

/// What a pass sees of the document.
pub struct PassContext<'a> {
    pub uri: &'a Uri,
    pub kind: &'a DocumentKind,
    pub root: SyntaxNode,
    pub line_index: &'a LineIndex,
}

impl PassContext<'_> {
    #[must_use]
    pub fn location(&self, range: TextRange) -> Location {
        let (start, end) = self.line_index.range(range);
        Location::new(self.uri.clone(), start, end)
    }
}

/// First direct child token of `kind`.
pub(crate) fn first_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(rowan::NodeOrToken::into_token)
        .find(|token| token.kind() == kind)
}

/// The identifier of a `NameRef`, skipping keyword references like `self`.
pub(crate) fn name_ref_ident(node: &SyntaxNode) -> Option<SyntaxToken> {
    if node.kind() != SyntaxKind::NameRef {
        return None;
    }
    first_token(node, SyntaxKind::Ident)
}

/// Result of one lint cycle.
#[derive(Debug)]
pub struct LintOutcome {
    /// Syntax, function, variable and doc diagnostics, in that order.
    pub diagnostics: Vec<Diagnostic>,
    /// The text matched the grammar.
    pub matched: bool,
    /// A newer cycle for the same document won; these diagnostics describe
    /// outdated text and should not be published.
    pub stale: bool,
}

/// Runs one full lint cycle for the handler's current text.
pub fn run_lint_cycle(
    handler: &mut DiagnosticHandler,
    index: &SymbolIndex,
    ticket: &CycleTicket,
    options: SemanticsOption,
    mode: LintMode,
) -> LintOutcome {
    let mut package = LintPackage::new();
    let matched = handler.match_text();
    handler.primary_syntax_lint(&mut package);

    if !matched {
        // Keep the previous contribution; only block older cycles.
        let stale = !index.acknowledge(ticket);
        debug!(uri = %ticket.uri, "document did not match the grammar");
        return LintOutcome {
            diagnostics: package.into_diagnostics(),
            matched,
            stale,
        };
    }

    if options.contains(SemanticsOption::FUNCTION) {
        let reference = index.read();
        handler.run_function_pass(&reference, mode);
    }
    let contribution = if options.contains(SemanticsOption::VARIABLE) {
        handler.run_variable_pass()
    } else {
        None
    };
    let jsdoc = if options.contains(SemanticsOption::JAVA_DOC) {
        handler.run_jsdoc_pass()
    } else {
        JsDocUpdate::Unchanged
    };

    let request = CommitRequest {
        content_hash: contribution
            .is_some()
            .then(|| content_hash(handler.input())),
        contribution,
        jsdoc,
    };
    let stale = match index.commit(ticket, request) {
        CommitOutcome::Applied { conflicts } => {
            handler.report_macro_conflicts(&conflicts);
            false
        }
        CommitOutcome::Stale => true,
    };

    package.extend(handler.pop_semantic_diagnostics());
    LintOutcome {
        diagnostics: package.into_diagnostics(),
        matched,
        stale,
    }
}
