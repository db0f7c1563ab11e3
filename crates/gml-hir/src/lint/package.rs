//! Per-cycle accumulator.

use std::sync::Arc;

use crate::diagnostics::Diagnostic;

use super::handler::ParseResult;

/// Raw diagnostics of one lint cycle plus the parse they refer to.
#[derive(Debug, Default)]
pub struct LintPackage {
    diagnostics: Vec<Diagnostic>,
    parse: Option<Arc<ParseResult>>,
}

impl LintPackage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn set_parse(&mut self, parse: Arc<ParseResult>) {
        self.parse = Some(parse);
    }

    /// The successful parse this cycle analyzed, if any.
    #[must_use]
    pub fn parse(&self) -> Option<&Arc<ParseResult>> {
        self.parse.as_ref()
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics ordered by producing pass, stable within a pass.
    #[must_use]
    pub fn into_diagnostics(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by_key(|diagnostic| diagnostic.source);
        self.diagnostics
    }
}
