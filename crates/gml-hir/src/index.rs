//! Shared, thread-safe access to the [`Reference`].
//!
//! Lint cycles for a document are stamped with a [`CycleTicket`] when they
//! start. A commit is accepted only if its sequence is newer than the last
//! one accepted for the same document, so a slow cycle for stale text can
//! never overwrite the result of a newer one.
//!
//! Interactive queries go through methods returning [`IndexQuery`], which
//! answer [`IndexQuery::NotReady`] until the workspace has been indexed.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::lint::jsdoc::JsDoc;
use crate::reference::{MacroConflict, Reference};
use crate::symbols::{CompletionEntry, Contribution, Location, Signature, Uri};

/// Workspace indexing progress. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum WorkspaceIndexState {
    NotStarted = 0,
    Indexing = 1,
    Ready = 2,
}

impl WorkspaceIndexState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Indexing,
            _ => Self::Ready,
        }
    }
}

/// Answer to an interactive query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexQuery<T> {
    /// The workspace is still being indexed.
    NotReady,
    Ready(T),
}

impl<T> IndexQuery<T> {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The answer, or `None` while not ready.
    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::NotReady => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> IndexQuery<U> {
        match self {
            Self::Ready(value) => IndexQuery::Ready(f(value)),
            Self::NotReady => IndexQuery::NotReady,
        }
    }
}

/// Identifies one lint cycle of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CycleTicket {
    pub uri: Uri,
    pub sequence: u64,
}

/// What happens to a script's signature on commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JsDocUpdate {
    /// The documentation pass did not run.
    #[default]
    Unchanged,
    /// The script has no leading doc comment.
    Clear,
    Set(JsDoc),
}

/// Results of one lint cycle, installed together.
#[derive(Debug, Clone, Default)]
pub struct CommitRequest {
    /// Replaces the document's contribution when present.
    pub contribution: Option<Contribution>,
    pub jsdoc: JsDocUpdate,
    pub content_hash: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied { conflicts: Vec<MacroConflict> },
    /// A newer cycle for the document was already accepted.
    Stale,
}

/// The symbol index shared between lint cycles and request handlers.
#[derive(Debug)]
pub struct SymbolIndex {
    reference: RwLock<Reference>,
    state: AtomicU8,
    next_sequence: AtomicU64,
    /// Last accepted sequence per document. Locked only while holding the
    /// reference write lock, or on its own.
    accepted: Mutex<FxHashMap<Uri, u64>>,
}

impl Default for SymbolIndex {
    fn default() -> Self {
        Self::new(Reference::new())
    }
}

impl SymbolIndex {
    #[must_use]
    pub fn new(reference: Reference) -> Self {
        Self {
            reference: RwLock::new(reference),
            state: AtomicU8::new(WorkspaceIndexState::NotStarted as u8),
            next_sequence: AtomicU64::new(1),
            accepted: Mutex::new(FxHashMap::default()),
        }
    }

    // =========================================================================
    // Readiness
    // =========================================================================

    #[must_use]
    pub fn state(&self) -> WorkspaceIndexState {
        WorkspaceIndexState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == WorkspaceIndexState::Ready
    }

    /// Moves the state forward. Returns false if `to` is not ahead of the
    /// current state.
    pub fn advance(&self, to: WorkspaceIndexState) -> bool {
        let previous = self.state.fetch_max(to as u8, Ordering::AcqRel);
        let moved = previous < to as u8;
        if moved {
            debug!(state = ?to, "workspace index state advanced");
        }
        moved
    }

    // =========================================================================
    // Lint cycle sequencing
    // =========================================================================

    /// Stamps a new cycle for `uri`. Sequences increase across all documents.
    pub fn begin_cycle(&self, uri: &Uri) -> CycleTicket {
        CycleTicket {
            uri: uri.clone(),
            sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Installs the results of a cycle unless a newer one was accepted.
    pub fn commit(&self, ticket: &CycleTicket, request: CommitRequest) -> CommitOutcome {
        let mut reference = self.reference.write();
        if !self.accept(ticket) {
            debug!(uri = %ticket.uri, sequence = ticket.sequence, "discarding stale lint result");
            return CommitOutcome::Stale;
        }

        let uri = &ticket.uri;
        let conflicts = match request.contribution {
            Some(contribution) => reference.replace_contribution(uri, contribution),
            None => Vec::new(),
        };

        let script = reference.script_at_uri(uri).map(|script| script.name.clone());
        match (request.jsdoc, script) {
            (JsDocUpdate::Set(jsdoc), Some(name)) => {
                if let Err(error) = reference.script_add_jsdoc(&name, &jsdoc) {
                    warn!(%error, "failed to attach script documentation");
                }
            }
            (JsDocUpdate::Clear, Some(name)) => reference.script_clear_jsdoc(&name),
            _ => {}
        }

        if let Some(hash) = request.content_hash {
            reference.set_content_hash(uri, hash);
        }
        CommitOutcome::Applied { conflicts }
    }

    /// Records a cycle that produced nothing to install, such as a failed
    /// parse, so older cycles still running are discarded. Returns false if
    /// the ticket itself is stale.
    pub fn acknowledge(&self, ticket: &CycleTicket) -> bool {
        self.accept(ticket)
    }

    fn accept(&self, ticket: &CycleTicket) -> bool {
        let mut accepted = self.accepted.lock();
        let last = accepted.entry(ticket.uri.clone()).or_insert(0);
        if ticket.sequence <= *last {
            return false;
        }
        *last = ticket.sequence;
        true
    }

    // =========================================================================
    // Raw access
    // =========================================================================

    /// Read access for lint passes and bootstrap, regardless of readiness.
    pub fn read(&self) -> RwLockReadGuard<'_, Reference> {
        self.reference.read()
    }

    /// Write access for resource registration.
    pub fn write(&self) -> RwLockWriteGuard<'_, Reference> {
        self.reference.write()
    }

    /// Swaps in a whole reference, e.g. one restored from a snapshot.
    pub fn replace_reference(&self, reference: Reference) {
        *self.reference.write() = reference;
    }

    // =========================================================================
    // Interactive queries
    // =========================================================================

    /// Runs `f` against the reference once the index is ready.
    pub fn query<T>(&self, f: impl FnOnce(&Reference) -> T) -> IndexQuery<T> {
        if !self.is_ready() {
            return IndexQuery::NotReady;
        }
        IndexQuery::Ready(f(&self.reference.read()))
    }

    pub fn exists(&self, name: &str) -> IndexQuery<bool> {
        self.query(|reference| reference.exists(name))
    }

    pub fn resolve_definition(&self, name: &str) -> IndexQuery<Vec<Location>> {
        self.query(|reference| reference.resolve_definition(name))
    }

    pub fn resolve_signature(&self, name: &str) -> IndexQuery<Option<Signature>> {
        self.query(|reference| reference.resolve_signature(name))
    }

    pub fn list_references(&self, name: &str) -> IndexQuery<Vec<Location>> {
        self.query(|reference| reference.list_references(name))
    }

    pub fn hover_text(&self, name: &str, sentences: usize) -> IndexQuery<Option<String>> {
        self.query(|reference| reference.hover_text(name, sentences))
    }

    pub fn completions(&self, prefix: &str) -> IndexQuery<Vec<CompletionEntry>> {
        self.query(|reference| reference.completions(prefix))
    }
}
