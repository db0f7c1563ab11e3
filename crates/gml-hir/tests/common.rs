//! Shared helpers for lint cycle and index tests.
#![allow(dead_code, unused_imports)]

pub use gml_hir::diagnostics::{DiagnosticCode, DiagnosticSource};
pub use gml_hir::index::{CommitOutcome, CommitRequest, IndexQuery, SymbolIndex, WorkspaceIndexState};
pub use gml_hir::lint::handler::DiagnosticHandler;
pub use gml_hir::lint::options::{LintMode, SemanticsOption};
pub use gml_hir::lint::{run_lint_cycle, LintOutcome};
pub use gml_hir::manual::Manual;
pub use gml_hir::project::DocumentKind;
pub use gml_hir::symbols::{ScopeKind, Uri};

pub const MANUAL: &str = "\
# show_debug_message(str)
Shows a message in the debug console.

# instance_create(x, y, obj)
Creates an instance.

# irandom(n)
Returns a random integer.

# room_speed
Steps per second.
";

pub fn script_uri(name: &str) -> Uri {
    Uri::new(format!("file:///game/scripts/{name}/{name}.gml"))
}

pub fn event_uri(object: &str, event: &str) -> Uri {
    Uri::new(format!("file:///game/objects/{object}/{event}.gml"))
}

pub fn script_handler(name: &str) -> DiagnosticHandler {
    DiagnosticHandler::new(script_uri(name), DocumentKind::Script { name: name.into() })
}

pub fn event_handler(object: &str, event: &str) -> DiagnosticHandler {
    DiagnosticHandler::new(
        event_uri(object, event),
        DocumentKind::ObjectEvent {
            object: object.into(),
            event: event.into(),
        },
    )
}

/// An index seeded with the test manual, in the given state.
pub fn index_in(state: WorkspaceIndexState) -> SymbolIndex {
    let index = SymbolIndex::default();
    index
        .write()
        .seed_builtins(Manual::from_markdown(MANUAL).unwrap());
    index.advance(state);
    index
}

/// Sets the text and runs a full cycle with every pass.
pub fn lint(
    index: &SymbolIndex,
    handler: &mut DiagnosticHandler,
    text: &str,
    mode: LintMode,
) -> LintOutcome {
    handler.set_input(text);
    let ticket = index.begin_cycle(handler.uri());
    run_lint_cycle(handler, index, &ticket, SemanticsOption::ALL, mode)
}

pub fn codes(outcome: &LintOutcome) -> Vec<&'static str> {
    outcome.diagnostics.iter().map(|d| d.code.code()).collect()
}
