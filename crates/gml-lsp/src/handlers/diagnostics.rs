//! Lint cycles and diagnostic publishing.

use tower_lsp::lsp_types::{self as lsp, Url};
use tower_lsp::Client;
use tracing::debug;

use gml_hir::lint::options::{LintMode, SemanticsOption};
use gml_hir::lint::run_lint_cycle;

use crate::state::{to_index_uri, ServerState};

use super::lsp_utils::diagnostic_to_lsp;

/// Result of one lint cycle, converted for the client.
#[derive(Debug)]
pub(crate) struct LintReport {
    pub diagnostics: Vec<lsp::Diagnostic>,
    /// A newer cycle for the same document already committed.
    pub stale: bool,
}

/// Runs a lint cycle over `content` for a known document.
///
/// The cycle is stamped before waiting on the document's handler, so cycles
/// queue and commit in the order their edits arrived.
pub(crate) async fn lint_document(
    state: &ServerState,
    uri: &Url,
    content: String,
    mode: LintMode,
) -> Option<LintReport> {
    let doc = state.get_document(uri)?;
    let ticket = state.index().begin_cycle(&to_index_uri(uri));

    let (report, parse) = {
        let mut handler = doc.handler.lock().await;
        handler.set_settings(state.lint_settings());
        handler.set_input(content.as_str());
        let outcome = run_lint_cycle(
            &mut handler,
            state.index(),
            &ticket,
            SemanticsOption::ALL,
            mode,
        );
        let parse = handler.parse_result();
        let diagnostics = parse
            .as_ref()
            .map(|parse| {
                outcome
                    .diagnostics
                    .iter()
                    .map(|diagnostic| diagnostic_to_lsp(parse.line_index(), diagnostic))
                    .collect()
            })
            .unwrap_or_default();
        (
            LintReport {
                diagnostics,
                stale: outcome.stale,
            },
            parse,
        )
    };

    if report.stale {
        debug!(uri = %uri, sequence = ticket.sequence, "lint cycle superseded");
    } else {
        state.record_lint(uri, &content, parse);
    }
    Some(report)
}

/// Lints and publishes, unless a newer cycle superseded this one.
pub(crate) async fn publish_diagnostics(
    client: &Client,
    state: &ServerState,
    uri: &Url,
    version: Option<i32>,
    content: String,
) {
    let Some(report) = lint_document(state, uri, content, LintMode::Full).await else {
        return;
    };
    if report.stale {
        return;
    }
    client
        .publish_diagnostics(uri.clone(), report.diagnostics, version)
        .await;
}
