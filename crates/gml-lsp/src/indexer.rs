//! Workspace bootstrap.
//!
//! Indexing runs once after `initialized`:
//!
//! 1. the manual is loaded and, when enabled, the previous session's
//!    snapshot is restored
//! 2. resources are registered in manifest order
//! 3. every file is analyzed in that order in [`LintMode::Bootstrap`],
//!    skipping files whose content matches the snapshot
//! 4. the index is marked ready and documents edited meanwhile are
//!    analyzed in the order their edits arrived

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use std::path::{Path, PathBuf};
use tower_lsp::lsp_types::{MessageType, Url};
use tower_lsp::Client;
use tracing::{debug, info, warn};

use gml_hir::lint::options::LintMode;
use gml_hir::project::ResourceKind;
use gml_hir::snapshot::content_hash;
use gml_hir::{
    DocumentKind, IndexError, ProjectManifest, Reference, Uri, WorkspaceIndexState,
};

use crate::config::ProjectConfig;
use crate::handlers::diagnostics::{lint_document, publish_diagnostics};
use crate::handlers::progress::IndexProgress;
use crate::index_cache::load_snapshot;
use crate::manual_cache::{bundled_manual, load_manual};
use crate::state::{to_index_uri, ServerState};

/// A source file found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DiscoveredFile {
    pub path: PathBuf,
    pub uri: Url,
    pub kind: DocumentKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct IndexSummary {
    /// Files analyzed.
    pub indexed: usize,
    /// Files whose snapshot entry was still current.
    pub restored: usize,
    /// Files that could not be read.
    pub skipped: usize,
    /// The `max_files` budget cut the file list.
    pub truncated: bool,
}

pub(crate) async fn index_workspace(client: &Client, state: &ServerState) -> IndexSummary {
    state.index().advance(WorkspaceIndexState::Indexing);

    let Some(root) = state.workspace_root() else {
        info!("No workspace folder; serving built-in documentation only");
        state.index().write().seed_builtins(bundled_manual());
        let deferred = state.finish_indexing();
        replay_deferred(client, state, deferred).await;
        return IndexSummary::default();
    };

    let config = ProjectConfig::load(&root);
    state.set_project_config(config.clone());

    let manual = load_manual(&config.manual).await;
    let snapshot = if config.indexing.cache_enabled {
        load_snapshot(&config.indexing.cache_dir).await
    } else {
        None
    };
    let (mut reference, restored) = match snapshot.map(Reference::from_snapshot) {
        Some(Ok(reference)) => (reference, true),
        Some(Err(err)) => {
            warn!("Discarding index snapshot: {err}");
            (Reference::new(), false)
        }
        None => (Reference::new(), false),
    };
    reference.seed_builtins(manual);
    state.index().replace_reference(reference);

    let mut summary = IndexSummary::default();
    let mut files = discover_project(&root).await;
    if let Some(max_files) = config.indexing.max_files {
        if files.len() > max_files {
            files.truncate(max_files);
            summary.truncated = true;
        }
    }

    {
        let mut reference = state.index().write();
        if restored {
            prune_restored(&mut reference, &files);
        }
        for file in &files {
            if let Err(err) =
                register_document_resource(&mut reference, &to_index_uri(&file.uri), &file.kind)
            {
                warn!("Failed to register {}: {err}", file.path.display());
            }
        }
    }

    let title = root
        .file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| "Indexing workspace".to_string(), |name| format!("Indexing {name}"));
    let mut progress =
        IndexProgress::start(client, state.work_done_progress(), title, files.len()).await;

    for (processed, file) in files.iter().enumerate() {
        index_file(client, state, file, restored, &mut summary).await;
        progress.report(client, processed + 1).await;
    }

    let deferred = state.finish_indexing();

    let mut message = format!(
        "Indexed {} GML files (restored={}, skipped={})",
        summary.indexed, summary.restored, summary.skipped
    );
    if summary.truncated {
        message.push_str(" (max_files limit reached)");
    }
    info!("{message}");
    client.log_message(MessageType::INFO, message.clone()).await;
    progress.end(client, message).await;

    replay_deferred(client, state, deferred).await;
    summary
}

async fn index_file(
    client: &Client,
    state: &ServerState,
    file: &DiscoveredFile,
    restored: bool,
    summary: &mut IndexSummary,
) {
    let content = match tokio::fs::read_to_string(&file.path).await {
        Ok(content) => content,
        Err(err) => {
            warn!("Failed to read {}: {err}", file.path.display());
            summary.skipped += 1;
            return;
        }
    };

    let hash = content_hash(&content);
    let unchanged =
        restored && state.index().read().content_hash(&to_index_uri(&file.uri)) == Some(hash);
    if state
        .index_document(file.uri.clone(), file.kind.clone(), content.clone())
        .is_none()
    {
        // Open in the editor; analyzed after indexing with the editor's text.
        debug!(uri = %file.uri, "skipping open document during bootstrap");
        return;
    }
    if unchanged {
        summary.restored += 1;
        return;
    }

    if let Some(report) = lint_document(state, &file.uri, content, LintMode::Bootstrap).await {
        if !report.stale && !report.diagnostics.is_empty() {
            client
                .publish_diagnostics(file.uri.clone(), report.diagnostics, None)
                .await;
        }
    }
    summary.indexed += 1;
}

async fn replay_deferred(client: &Client, state: &ServerState, uris: Vec<Url>) {
    for uri in uris {
        let Some(doc) = state.get_document(&uri) else {
            continue;
        };
        {
            let mut reference = state.index().write();
            if let Err(err) = register_document_resource(&mut reference, &to_index_uri(&uri), &doc.kind)
            {
                debug!(uri = %uri, "document not registered as a resource: {err}");
            }
        }
        if doc.is_open {
            publish_diagnostics(client, state, &uri, Some(doc.version), doc.content).await;
        } else {
            lint_document(state, &uri, doc.content, LintMode::Full).await;
        }
    }
}

/// Registers the script or object event a document belongs to.
/// Registering the same document twice is a no-op.
pub(crate) fn register_document_resource(
    reference: &mut Reference,
    uri: &Uri,
    kind: &DocumentKind,
) -> Result<(), IndexError> {
    match kind {
        DocumentKind::Script { name } => match reference.script_get_package(name) {
            Some(script) if &script.uri == uri => Ok(()),
            Some(_) => Err(IndexError::AlreadyExists { name: name.clone() }),
            None => reference.create_script(name, uri.clone()),
        },
        DocumentKind::ObjectEvent { object, .. } => {
            if reference.object_get(object).is_none() {
                reference.create_object(object)?;
            }
            reference.object_add_event(object, uri.clone())
        }
        DocumentKind::Other => Ok(()),
    }
}

/// Drops restored records whose documents are no longer part of the project.
fn prune_restored(reference: &mut Reference, files: &[DiscoveredFile]) {
    let discovered: FxHashSet<Uri> = files.iter().map(|file| to_index_uri(&file.uri)).collect();
    let objects: FxHashSet<&SmolStr> = files
        .iter()
        .filter_map(|file| match &file.kind {
            DocumentKind::ObjectEvent { object, .. } => Some(object),
            _ => None,
        })
        .collect();

    let stale_scripts: Vec<SmolStr> = reference
        .script_names()
        .filter(|name| {
            reference
                .script_get_package(name)
                .is_some_and(|script| !discovered.contains(&script.uri))
        })
        .cloned()
        .collect();
    for name in stale_scripts {
        if let Err(err) = reference.delete_script(&name) {
            debug!(script = %name, "failed to drop stale script: {err}");
        }
    }

    let stale_objects: Vec<SmolStr> = reference
        .object_names()
        .filter(|name| !objects.contains(name))
        .cloned()
        .collect();
    for name in stale_objects {
        if let Err(err) = reference.delete_object(&name) {
            debug!(object = %name, "failed to drop stale object: {err}");
        }
    }

    let stale_events: Vec<Uri> = reference
        .object_names()
        .filter_map(|name| reference.object_get(name))
        .flat_map(|object| object.event_uris.iter())
        .chain(reference.known_documents().iter())
        .filter(|uri| !discovered.contains(*uri))
        .cloned()
        .collect();
    for uri in stale_events {
        reference.delete_record_at_uri(&uri);
    }
}

// =========================================================================
// Discovery
// =========================================================================

/// Lists the project's source files in manifest order, or every `.gml`
/// file in path order when there is no readable manifest.
pub(crate) async fn discover_project(root: &Path) -> Vec<DiscoveredFile> {
    if let Some(manifest_path) = find_manifest(root).await {
        match tokio::fs::read_to_string(&manifest_path).await {
            Ok(contents) => match ProjectManifest::parse(&contents) {
                Ok(manifest) => return manifest_files(root, &manifest).await,
                Err(err) => warn!(
                    "Failed to parse project manifest {}: {err}",
                    manifest_path.display()
                ),
            },
            Err(err) => warn!(
                "Failed to read project manifest {}: {err}",
                manifest_path.display()
            ),
        }
    }
    glob_files(root)
}

async fn find_manifest(root: &Path) -> Option<PathBuf> {
    let mut entries = tokio::fs::read_dir(root).await.ok()?;
    let mut manifests = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("yyp") {
            manifests.push(path);
        }
    }
    manifests.sort();
    manifests.into_iter().next()
}

async fn manifest_files(root: &Path, manifest: &ProjectManifest) -> Vec<DiscoveredFile> {
    let mut files = Vec::new();
    for resource in &manifest.resources {
        match resource.kind {
            ResourceKind::Script => {
                let path = root.join(resource.script_file());
                if tokio::fs::metadata(&path).await.is_err() {
                    warn!("Script {} has no source at {}", resource.name, path.display());
                    continue;
                }
                push_file(
                    &mut files,
                    path,
                    DocumentKind::Script {
                        name: resource.name.clone(),
                    },
                );
            }
            ResourceKind::Object => {
                for path in gml_files_in(&root.join(resource.directory())).await {
                    let Some(event) = path.file_stem().and_then(|stem| stem.to_str()) else {
                        continue;
                    };
                    let kind = DocumentKind::ObjectEvent {
                        object: resource.name.clone(),
                        event: event.into(),
                    };
                    push_file(&mut files, path, kind);
                }
            }
            ResourceKind::Other => {}
        }
    }
    files
}

async fn gml_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return Vec::new();
    };
    let mut paths = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("gml") {
            paths.push(path);
        }
    }
    paths.sort();
    paths
}

fn glob_files(root: &Path) -> Vec<DiscoveredFile> {
    let pattern = root.join("**").join("*.gml");
    let Some(pattern) = pattern.to_str() else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = match glob::glob(pattern) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(err) => {
            warn!("Invalid workspace glob {pattern}: {err}");
            return Vec::new();
        }
    };
    paths.sort();

    let mut files = Vec::new();
    for path in paths {
        let kind = DocumentKind::from_path(&path);
        push_file(&mut files, path, kind);
    }
    files
}

fn push_file(files: &mut Vec<DiscoveredFile>, path: PathBuf, kind: DocumentKind) {
    match Url::from_file_path(&path) {
        Ok(uri) => files.push(DiscoveredFile { path, uri, kind }),
        Err(()) => warn!("Cannot address {} as a file URI", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_client, write_project};

    const MANIFEST: &str = r#"{
  "resources": [
    {"id": {"name": "scr_b", "path": "scripts/scr_b/scr_b.yy",}, "order": 1,},
    {"id": {"name": "obj_player", "path": "objects/obj_player/obj_player.yy",},},
    {"id": {"name": "scr_a", "path": "scripts/scr_a/scr_a.yy",}, "order": 0,},
    {"id": {"name": "rm_start", "path": "rooms/rm_start/rm_start.yy",},},
  ],
}"#;

    fn names(files: &[DiscoveredFile]) -> Vec<String> {
        files
            .iter()
            .map(|file| match &file.kind {
                DocumentKind::Script { name } => name.to_string(),
                DocumentKind::ObjectEvent { object, event } => format!("{object}/{event}"),
                DocumentKind::Other => file.path.display().to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn manifest_order_drives_discovery() {
        let root = write_project(
            "gml-lsp-discover-manifest",
            &[
                ("game.yyp", MANIFEST),
                ("scripts/scr_a/scr_a.gml", "a = 1;"),
                ("scripts/scr_b/scr_b.gml", "b = 1;"),
                ("objects/obj_player/Step_0.gml", "x += 1;"),
                ("objects/obj_player/Create_0.gml", "hp = 3;"),
                ("scripts/scr_unlisted/scr_unlisted.gml", "c = 1;"),
            ],
        );
        let files = discover_project(&root).await;
        assert_eq!(
            names(&files),
            vec![
                "scr_b",
                "obj_player/Create_0",
                "obj_player/Step_0",
                "scr_a"
            ]
        );
        std::fs::remove_dir_all(root).ok();
    }

    #[tokio::test]
    async fn missing_manifest_falls_back_to_glob() {
        let root = write_project(
            "gml-lsp-discover-glob",
            &[
                ("scripts/scr_b/scr_b.gml", "b = 1;"),
                ("objects/obj_a/Create_0.gml", "hp = 3;"),
                ("scripts/scr_a/scr_a.gml", "a = 1;"),
            ],
        );
        let files = discover_project(&root).await;
        assert_eq!(names(&files), vec!["obj_a/Create_0", "scr_a", "scr_b"]);
        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn restored_records_without_sources_are_pruned() {
        let mut files = Vec::new();
        push_file(
            &mut files,
            std::env::temp_dir().join("gml-lsp-prune/scripts/scr_a/scr_a.gml"),
            DocumentKind::Script {
                name: "scr_a".into(),
            },
        );
        let kept = to_index_uri(&files[0].uri);

        let mut reference = Reference::new();
        reference.create_script("scr_a", kept).unwrap();
        reference
            .create_script("scr_old", Uri::new("file:///gone/scripts/scr_old/scr_old.gml"))
            .unwrap();
        reference.create_object("obj_gone").unwrap();

        prune_restored(&mut reference, &files);
        assert!(reference.script_get_package("scr_a").is_some());
        assert!(reference.script_get_package("scr_old").is_none());
        assert!(reference.object_get("obj_gone").is_none());
    }

    #[test]
    fn registering_a_document_twice_is_a_no_op() {
        let mut reference = Reference::new();
        let uri = Uri::new("file:///p/scripts/scr_a/scr_a.gml");
        let kind = DocumentKind::Script {
            name: "scr_a".into(),
        };
        register_document_resource(&mut reference, &uri, &kind).unwrap();
        register_document_resource(&mut reference, &uri, &kind).unwrap();

        let other = Uri::new("file:///p/elsewhere/scr_a.gml");
        assert!(matches!(
            register_document_resource(&mut reference, &other, &kind),
            Err(IndexError::AlreadyExists { .. })
        ));

        let event = Uri::new("file:///p/objects/obj_a/Create_0.gml");
        let event_kind = DocumentKind::ObjectEvent {
            object: "obj_a".into(),
            event: "Create_0".into(),
        };
        register_document_resource(&mut reference, &event, &event_kind).unwrap();
        register_document_resource(&mut reference, &event, &event_kind).unwrap();
        assert_eq!(reference.object_get("obj_a").unwrap().event_uris.len(), 1);
    }

    #[tokio::test]
    async fn bootstrap_resolves_forward_references_once_ready() {
        let root = write_project(
            "gml-lsp-bootstrap",
            &[
                (
                    "game.yyp",
                    r#"{"resources": [
                        {"id": {"name": "scr_a", "path": "scripts/scr_a/scr_a.yy"}},
                        {"id": {"name": "scr_b", "path": "scripts/scr_b/scr_b.yy"}}
                    ]}"#,
                ),
                ("scripts/scr_a/scr_a.gml", "scr_b(1);\n"),
                ("scripts/scr_b/scr_b.gml", "/// @param amount\nglobal.total = argument0;\n"),
                ("gml-tools.toml", "[indexing]\ncache_enabled = false\n"),
            ],
        );
        let state = ServerState::new();
        state.set_workspace_folders(vec![Url::from_file_path(&root).unwrap()]);
        let client = test_client();

        let summary = index_workspace(&client, &state).await;
        assert_eq!(summary.indexed, 2);
        assert_eq!(summary.skipped, 0);
        assert!(state.index().is_ready());
        assert!(state.index().exists("scr_b").ready().unwrap());
        assert!(state.index().exists("show_debug_message").ready().unwrap());

        let uri = Url::from_file_path(root.join("scripts/scr_a/scr_a.gml")).unwrap();
        let report = lint_document(&state, &uri, "scr_b(1);\n".into(), LintMode::Full)
            .await
            .unwrap();
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);

        let report = lint_document(&state, &uri, "scr_b();\nscr_c();\n".into(), LintMode::Full)
            .await
            .unwrap();
        let codes: Vec<_> = report
            .diagnostics
            .iter()
            .filter_map(|diagnostic| diagnostic.code.clone())
            .collect();
        assert_eq!(
            codes,
            vec![
                tower_lsp::lsp_types::NumberOrString::String("W102".into()),
                tower_lsp::lsp_types::NumberOrString::String("W101".into()),
            ]
        );
        std::fs::remove_dir_all(root).ok();
    }
}
