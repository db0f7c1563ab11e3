//! Per-document analysis state.

use std::sync::Arc;

use gml_syntax::{Parse, SyntaxNode};
use text_size::TextRange;

use crate::diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode, DiagnosticSource};
use crate::index::JsDocUpdate;
use crate::line_index::LineIndex;
use crate::project::DocumentKind;
use crate::reference::{MacroConflict, Reference};
use crate::symbols::{Contribution, Uri};

use super::function::FunctionPass;
use super::jsdoc::JsDocPass;
use super::options::{LintMode, LintSettings};
use super::package::LintPackage;
use super::variable::VariablePass;
use super::PassContext;

/// A parse of one version of a document.
#[derive(Debug)]
pub struct ParseResult {
    parse: Parse,
    line_index: LineIndex,
}

impl ParseResult {
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            parse: gml_syntax::parse(text),
            line_index: LineIndex::new(text),
        }
    }

    /// True if the text matched the grammar without errors.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.parse.ok()
    }

    #[must_use]
    pub fn syntax(&self) -> SyntaxNode {
        self.parse.syntax()
    }

    #[must_use]
    pub fn parse(&self) -> &Parse {
        &self.parse
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }
}

/// Holds a document's text, its latest parse and the semantic diagnostics
/// queued during the current lint cycle.
#[derive(Debug)]
pub struct DiagnosticHandler {
    uri: Uri,
    kind: DocumentKind,
    text: String,
    settings: LintSettings,
    parse: Option<Arc<ParseResult>>,
    pending: Vec<Diagnostic>,
}

impl DiagnosticHandler {
    #[must_use]
    pub fn new(uri: Uri, kind: DocumentKind) -> Self {
        Self {
            uri,
            kind,
            text: String::new(),
            settings: LintSettings::default(),
            parse: None,
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    #[must_use]
    pub fn kind(&self) -> &DocumentKind {
        &self.kind
    }

    pub fn set_settings(&mut self, settings: LintSettings) {
        self.settings = settings;
    }

    /// Replaces the text. The previous parse is dropped.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.parse = None;
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.text
    }

    /// Parses the current text. Returns true on a clean match.
    pub fn match_text(&mut self) -> bool {
        let result = Arc::new(ParseResult::new(&self.text));
        let ok = result.succeeded();
        self.parse = Some(result);
        ok
    }

    /// The parse of the current text, if `match_text` ran.
    #[must_use]
    pub fn parse_result(&self) -> Option<Arc<ParseResult>> {
        self.parse.clone()
    }

    /// Reports a failed match as one diagnostic at the first error, or
    /// hands a successful parse to the package.
    pub fn primary_syntax_lint(&self, package: &mut LintPackage) {
        let Some(result) = &self.parse else {
            return;
        };
        if result.succeeded() {
            package.set_parse(Arc::clone(result));
            return;
        }
        if let Some(error) = result.parse().first_error() {
            package.push(Diagnostic::new(
                DiagnosticCode::SyntaxError,
                DiagnosticSource::Syntax,
                error.range,
                error.message.clone(),
            ));
        }
    }

    pub fn run_function_pass(&mut self, reference: &Reference, mode: LintMode) {
        let Some(result) = self.successful_parse() else {
            return;
        };
        let ctx = self.context(&result);
        let mut builder = DiagnosticBuilder::new(DiagnosticSource::Function);
        FunctionPass::new(reference, mode, self.settings).run(&ctx, &mut builder);
        self.pending.extend(builder.finish());
    }

    /// Collects this document's declarations and uses.
    pub fn run_variable_pass(&mut self) -> Option<Contribution> {
        let result = self.successful_parse()?;
        let ctx = self.context(&result);
        Some(VariablePass::new(&ctx).run())
    }

    /// Reads a script's header documentation. Other documents are left alone.
    pub fn run_jsdoc_pass(&mut self) -> JsDocUpdate {
        if !self.kind.is_script() {
            return JsDocUpdate::Unchanged;
        }
        let Some(result) = self.successful_parse() else {
            return JsDocUpdate::Unchanged;
        };
        let ctx = self.context(&result);
        let mut builder = DiagnosticBuilder::new(DiagnosticSource::JsDoc);
        let outcome = JsDocPass::run(&ctx, &mut builder);
        self.pending.extend(builder.finish());
        match outcome.jsdoc {
            Some(jsdoc) => JsDocUpdate::Set(jsdoc),
            None => JsDocUpdate::Clear,
        }
    }

    /// Reports macros the index refused to install.
    pub fn report_macro_conflicts(&mut self, conflicts: &[MacroConflict]) {
        let Some(result) = self.successful_parse() else {
            return;
        };
        let line_index = result.line_index();
        for conflict in conflicts {
            let record = &conflict.record;
            let range = line_index
                .offset(record.location.start)
                .zip(line_index.offset(record.location.end))
                .map_or_else(TextRange::default, |(start, end)| TextRange::new(start, end));
            let message = match &conflict.owner {
                Some(owner) if owner == &self.uri => {
                    format!("macro '{}' is already defined in this file", record.name)
                }
                Some(owner) => format!("macro '{}' is already defined in {owner}", record.name),
                None => format!("macro '{}' collides with a resource name", record.name),
            };
            self.pending.push(Diagnostic::new(
                DiagnosticCode::MacroCollision,
                DiagnosticSource::Variable,
                range,
                message,
            ));
        }
    }

    /// Drains the semantic diagnostics queued since the last call.
    pub fn pop_semantic_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.pending)
    }

    fn successful_parse(&self) -> Option<Arc<ParseResult>> {
        self.parse.as_ref().filter(|r| r.succeeded()).cloned()
    }

    fn context<'a>(&'a self, result: &'a ParseResult) -> PassContext<'a> {
        PassContext {
            uri: &self.uri,
            kind: &self.kind,
            root: result.syntax(),
            line_index: result.line_index(),
        }
    }
}
