//! Server state management.
//!
//! This module manages the state of the language server: known documents,
//! each with its own [`DiagnosticHandler`], and the shared [`SymbolIndex`].

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tower_lsp::lsp_types::Url;

use gml_hir::lint::handler::{DiagnosticHandler, ParseResult};
use gml_hir::lint::options::LintSettings;
use gml_hir::{DocumentKind, SymbolIndex, Uri, WorkspaceIndexState};

use crate::config::ProjectConfig;

/// A document managed by the server.
#[derive(Debug, Clone)]
pub struct Document {
    /// The document URI.
    pub uri: Url,
    /// The document version. Zero for documents read from disk.
    pub version: i32,
    /// The document content.
    pub content: String,
    pub kind: DocumentKind,
    /// Whether the document is currently open in the editor.
    pub is_open: bool,
    /// Content changed since the last completed lint cycle.
    pub dirty: bool,
    /// Parse of the most recently linted content.
    pub parse: Option<Arc<ParseResult>>,
    /// Lint cycles for this document queue on this lock in arrival order.
    pub handler: Arc<tokio::sync::Mutex<DiagnosticHandler>>,
}

impl Document {
    fn new(uri: Url, version: i32, content: String, kind: DocumentKind, is_open: bool) -> Self {
        let handler = DiagnosticHandler::new(to_index_uri(&uri), kind.clone());
        Self {
            uri,
            version,
            content,
            kind,
            is_open,
            dirty: true,
            parse: None,
            handler: Arc::new(tokio::sync::Mutex::new(handler)),
        }
    }
}

/// The server state.
pub struct ServerState {
    /// Known documents (open + indexed).
    documents: RwLock<FxHashMap<Url, Document>>,
    index: SymbolIndex,
    /// Documents edited before the index was ready, in arrival order.
    /// `None` once the index is ready.
    pending: Mutex<Option<Vec<Url>>>,
    /// Workspace folders.
    workspace_folders: RwLock<Vec<Url>>,
    /// Configuration of the indexed workspace root.
    project_config: RwLock<Option<ProjectConfig>>,
    documentation_sentences: AtomicUsize,
    lint_settings: RwLock<LintSettings>,
    /// Whether work-done progress is supported by the client.
    work_done_progress: AtomicBool,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// Creates a new server state.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(FxHashMap::default()),
            index: SymbolIndex::default(),
            pending: Mutex::new(Some(Vec::new())),
            workspace_folders: RwLock::new(Vec::new()),
            project_config: RwLock::new(None),
            documentation_sentences: AtomicUsize::new(1),
            lint_settings: RwLock::new(LintSettings::default()),
            work_done_progress: AtomicBool::new(false),
        }
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    /// Stores the workspace folders.
    pub fn set_workspace_folders(&self, folders: Vec<Url>) {
        *self.workspace_folders.write() = folders;
    }

    /// The indexed root: the first workspace folder that is a local path.
    pub fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_folders
            .read()
            .iter()
            .find_map(|folder| folder.to_file_path().ok())
    }

    /// Records whether the client supports work-done progress.
    pub fn set_work_done_progress(&self, supported: bool) {
        self.work_done_progress.store(supported, Ordering::Relaxed);
    }

    /// Returns true if the client supports work-done progress.
    pub fn work_done_progress(&self) -> bool {
        self.work_done_progress.load(Ordering::Relaxed)
    }

    /// Applies a loaded project configuration.
    pub fn set_project_config(&self, config: ProjectConfig) {
        self.set_documentation_sentences(config.hover.documentation_sentences);
        *self.lint_settings.write() = config.diagnostics;
        *self.project_config.write() = Some(config);
    }

    pub fn project_config(&self) -> Option<ProjectConfig> {
        self.project_config.read().clone()
    }

    pub fn documentation_sentences(&self) -> usize {
        self.documentation_sentences.load(Ordering::Relaxed)
    }

    pub fn set_documentation_sentences(&self, sentences: usize) {
        self.documentation_sentences
            .store(sentences, Ordering::Relaxed);
    }

    pub fn lint_settings(&self) -> LintSettings {
        *self.lint_settings.read()
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Opens a document, or takes over one already known from indexing.
    pub fn open_document(&self, uri: Url, version: i32, content: String) -> Document {
        let mut documents = self.documents.write();
        let doc = documents.entry(uri.clone()).or_insert_with(|| {
            let kind = document_kind(&uri);
            Document::new(uri, version, String::new(), kind, true)
        });
        doc.version = version;
        doc.content = content;
        doc.is_open = true;
        doc.dirty = true;
        doc.clone()
    }

    /// Records a document read from disk during indexing. A document the
    /// editor already opened keeps its content; returns `None` then.
    pub fn index_document(&self, uri: Url, kind: DocumentKind, content: String) -> Option<Document> {
        let mut documents = self.documents.write();
        if documents.get(&uri).is_some_and(|doc| doc.is_open) {
            return None;
        }
        let doc = Document::new(uri.clone(), 0, content, kind, false);
        documents.insert(uri, doc.clone());
        Some(doc)
    }

    pub fn update_document(&self, uri: &Url, version: i32, content: String) -> Option<Document> {
        let mut documents = self.documents.write();
        let doc = documents.get_mut(uri)?;
        doc.version = version;
        doc.content = content;
        doc.dirty = true;
        Some(doc.clone())
    }

    /// Marks a document closed. It stays known so the index keeps its symbols.
    pub fn close_document(&self, uri: &Url) -> Option<Document> {
        let mut documents = self.documents.write();
        let doc = documents.get_mut(uri)?;
        doc.is_open = false;
        Some(doc.clone())
    }

    pub fn get_document(&self, uri: &Url) -> Option<Document> {
        self.documents.read().get(uri).cloned()
    }

    /// Stores the parse of a finished lint cycle. The document is clean
    /// again if nothing changed while the cycle ran.
    pub fn record_lint(&self, uri: &Url, content: &str, parse: Option<Arc<ParseResult>>) {
        let mut documents = self.documents.write();
        let Some(doc) = documents.get_mut(uri) else {
            return;
        };
        doc.parse = parse;
        if doc.content == content {
            doc.dirty = false;
        }
    }

    // =========================================================================
    // Readiness
    // =========================================================================

    /// Queues `uri` for analysis once the index is ready. Returns false if
    /// the index is already ready and the caller should analyze now.
    pub fn defer_until_ready(&self, uri: &Url) -> bool {
        let mut pending = self.pending.lock();
        let Some(queue) = pending.as_mut() else {
            return false;
        };
        if !queue.contains(uri) {
            queue.push(uri.clone());
        }
        true
    }

    /// Marks the index ready and hands back the deferred documents in
    /// arrival order. Later edits are analyzed directly.
    pub fn finish_indexing(&self) -> Vec<Url> {
        let mut pending = self.pending.lock();
        self.index.advance(WorkspaceIndexState::Ready);
        pending.take().unwrap_or_default()
    }
}

/// Index key for an LSP URI.
pub(crate) fn to_index_uri(uri: &Url) -> Uri {
    Uri::new(uri.as_str())
}

pub(crate) fn from_index_uri(uri: &Uri) -> Option<Url> {
    Url::parse(uri.as_str()).ok()
}

/// Classifies a document by its path layout.
pub(crate) fn document_kind(uri: &Url) -> DocumentKind {
    match uri.to_file_path() {
        Ok(path) => DocumentKind::from_path(&path),
        Err(()) => DocumentKind::from_path(Path::new(uri.path())),
    }
}
