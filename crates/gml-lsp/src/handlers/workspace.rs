//! Workspace-level handlers: indexing, settings and the shutdown snapshot.

use std::sync::Arc;
use tower_lsp::lsp_types::DidChangeConfigurationParams;
use tower_lsp::Client;
use tracing::{debug, info, warn};

use crate::config::documentation_sentences_from_settings;
use crate::index_cache::save_snapshot;
use crate::indexer::index_workspace;
use crate::state::ServerState;

/// Indexes the workspace without blocking the request loop.
pub fn index_workspace_background(client: Client, state: Arc<ServerState>) {
    tokio::spawn(async move {
        let summary = index_workspace(&client, &state).await;
        debug!(?summary, "workspace indexing finished");
    });
}

pub fn did_change_configuration(state: &ServerState, params: DidChangeConfigurationParams) {
    let Some(sentences) = documentation_sentences_from_settings(&params.settings) else {
        debug!("configuration change without hover settings");
        return;
    };
    state.set_documentation_sentences(sentences);
    info!(sentences, "Updated workspace configuration");
}

/// Persists the index for the next session when the project enables it.
pub async fn save_index_snapshot(state: &ServerState) {
    let Some(config) = state.project_config() else {
        return;
    };
    if !config.indexing.cache_enabled || !state.index().is_ready() {
        return;
    }
    let snapshot = state.index().read().snapshot_for_shutdown();
    let files = snapshot.files.len();
    match save_snapshot(&config.indexing.cache_dir, &snapshot).await {
        Ok(()) => info!(files, scripts = snapshot.scripts.len(), "Saved index snapshot"),
        Err(err) => warn!("Failed to save index snapshot: {err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::index_cache::load_snapshot;
    use crate::test_support::temp_dir;
    use gml_hir::Uri;
    use serde_json::json;

    #[test]
    fn configuration_updates_documentation_sentences() {
        let state = ServerState::new();
        did_change_configuration(
            &state,
            DidChangeConfigurationParams {
                settings: json!({ "gml-tools": { "numberOfDocumentationSentences": 3 } }),
            },
        );
        assert_eq!(state.documentation_sentences(), 3);

        did_change_configuration(
            &state,
            DidChangeConfigurationParams {
                settings: json!({ "other": true }),
            },
        );
        assert_eq!(state.documentation_sentences(), 3);
    }

    #[tokio::test]
    async fn snapshot_is_written_only_when_ready() {
        let root = temp_dir("gml-lsp-shutdown");
        let state = ServerState::new();
        let mut config = ProjectConfig::from_contents(&root, None, "");
        config.indexing.cache_dir = root.join("cache");
        state.set_project_config(config);
        state
            .index()
            .write()
            .create_script("scr_a", Uri::new("file:///game/scripts/scr_a/scr_a.gml"))
            .unwrap();

        save_index_snapshot(&state).await;
        assert!(load_snapshot(&root.join("cache")).await.is_none());

        state.finish_indexing();
        save_index_snapshot(&state).await;
        let snapshot = load_snapshot(&root.join("cache")).await.expect("snapshot");
        assert_eq!(snapshot.scripts.len(), 1);
        std::fs::remove_dir_all(root).ok();
    }
}
