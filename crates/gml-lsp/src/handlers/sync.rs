//! Document synchronization handlers.
//!
//! Edits arriving before the workspace index is ready only update the
//! stored text; the documents are analyzed once indexing finishes.

use tower_lsp::lsp_types::*;
use tower_lsp::Client;
use tracing::{debug, info, warn};

use gml_hir::lint::options::LintMode;

use crate::indexer::register_document_resource;
use crate::state::{to_index_uri, ServerState};

use super::diagnostics::{lint_document, publish_diagnostics};
use super::lsp_utils::position_to_offset;

pub async fn did_open(client: &Client, state: &ServerState, params: DidOpenTextDocumentParams) {
    let uri = params.text_document.uri;
    let version = params.text_document.version;
    let content = params.text_document.text;

    info!("Document opened: {}", uri);

    let doc = state.open_document(uri.clone(), version, content.clone());
    if state.defer_until_ready(&uri) {
        debug!(uri = %uri, "index not ready, deferring analysis");
        return;
    }

    {
        let mut reference = state.index().write();
        if let Err(err) = register_document_resource(&mut reference, &to_index_uri(&uri), &doc.kind)
        {
            debug!(uri = %uri, "document not registered as a resource: {err}");
        }
    }
    publish_diagnostics(client, state, &uri, Some(version), content).await;
}

pub async fn did_change(client: &Client, state: &ServerState, params: DidChangeTextDocumentParams) {
    let uri = params.text_document.uri;
    let version = params.text_document.version;

    debug!("Document changed: {}", uri);

    if params.content_changes.is_empty() {
        return;
    }

    let Some(doc) = state.get_document(&uri) else {
        warn!("Received change for unknown document: {}", uri);
        return;
    };

    let Some(updated) = apply_content_changes(&doc.content, &params.content_changes) else {
        warn!("Failed to apply incremental changes for {}", uri);
        return;
    };

    state.update_document(&uri, version, updated.clone());
    if state.defer_until_ready(&uri) {
        return;
    }
    publish_diagnostics(client, state, &uri, Some(version), updated).await;
}

pub(crate) fn apply_content_changes(
    content: &str,
    changes: &[TextDocumentContentChangeEvent],
) -> Option<String> {
    let mut updated = content.to_string();
    for change in changes {
        if let Some(range) = change.range {
            let start = position_to_offset(&updated, range.start)? as usize;
            let end = position_to_offset(&updated, range.end)? as usize;
            if start > end || end > updated.len() {
                return None;
            }
            let mut next = String::with_capacity(
                updated.len().saturating_sub(end.saturating_sub(start)) + change.text.len(),
            );
            next.push_str(&updated[..start]);
            next.push_str(&change.text);
            next.push_str(&updated[end..]);
            updated = next;
        } else {
            updated = change.text.clone();
        }
    }
    Some(updated)
}

pub async fn did_save(client: &Client, state: &ServerState, params: DidSaveTextDocumentParams) {
    let uri = params.text_document.uri;
    info!("Document saved: {}", uri);

    let Some(doc) = state.get_document(&uri) else {
        return;
    };
    let content = params.text.unwrap_or_else(|| doc.content.clone());
    if !doc.dirty && doc.content == content {
        return;
    }
    if state.defer_until_ready(&uri) {
        return;
    }
    publish_diagnostics(client, state, &uri, Some(doc.version), content).await;
}

/// Closing drops the editor's unsaved text: the index falls back to the
/// file on disk.
pub async fn did_close(client: &Client, state: &ServerState, params: DidCloseTextDocumentParams) {
    let uri = params.text_document.uri;
    info!("Document closed: {}", uri);

    let Some(doc) = state.close_document(&uri) else {
        return;
    };
    client.publish_diagnostics(doc.uri.clone(), vec![], None).await;

    let Ok(path) = uri.to_file_path() else {
        return;
    };
    let Ok(on_disk) = tokio::fs::read_to_string(&path).await else {
        return;
    };
    if on_disk == doc.content {
        return;
    }
    state.update_document(&uri, 0, on_disk.clone());
    if state.defer_until_ready(&uri) {
        return;
    }
    lint_document(state, &uri, on_disk, LintMode::Full).await;
}
