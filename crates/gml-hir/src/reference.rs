//! The cross-file symbol store.
//!
//! Resources (scripts and objects) are registered from the project
//! manifest. Everything else is a per-document [`Contribution`] that is
//! replaced wholesale each time the document is analyzed, so removing a
//! declaration from the text removes it from the index on the next cycle.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::debug;

use crate::error::{IndexError, SnapshotError};
use crate::ident::{is_reserved_keyword, is_valid_resource_name};
use crate::lint::jsdoc::JsDoc;
use crate::manual::{first_sentences, BuiltinFunction, BuiltinVariable, Manual};
use crate::snapshot::{hasher_id, SerializedFile, SerializedIndex, SNAPSHOT_VERSION};
use crate::symbols::{
    CompletionEntry, CompletionKind, Contribution, Location, MacroRecord, ObjectRecord,
    ScopeKind, ScriptRecord, Signature, SymbolRecord, Uri, VariableRecord,
};

/// Why a macro from a contribution was not installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroConflict {
    pub record: MacroRecord,
    /// Document that already owns the name, when it is another macro.
    pub owner: Option<Uri>,
}

/// Symbol index state. See the module docs.
#[derive(Debug, Default)]
pub struct Reference {
    scripts: IndexMap<SmolStr, ScriptRecord>,
    script_by_uri: FxHashMap<Uri, SmolStr>,
    objects: IndexMap<SmolStr, ObjectRecord>,
    object_by_event: FxHashMap<Uri, SmolStr>,
    /// Every definer of a macro name, owner first.
    macros: FxHashMap<SmolStr, Vec<MacroRecord>>,
    variables: FxHashMap<SmolStr, Vec<VariableRecord>>,
    uses_by_name: FxHashMap<SmolStr, FxHashSet<Uri>>,
    contributions: FxHashMap<Uri, Contribution>,
    content_hashes: FxHashMap<Uri, u64>,
    builtin_functions: FxHashMap<SmolStr, BuiltinFunction>,
    builtin_variables: FxHashMap<SmolStr, BuiltinVariable>,
}

impl Reference {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the built-in manual, replacing any previous one.
    pub fn seed_builtins(&mut self, manual: Manual) {
        self.builtin_functions = manual
            .functions
            .into_iter()
            .map(|function| (function.name.clone(), function))
            .collect();
        self.builtin_variables = manual
            .variables
            .into_iter()
            .map(|variable| (variable.name.clone(), variable))
            .collect();
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// Registers a script. The name must be valid and unused.
    pub fn create_script(&mut self, name: &str, uri: Uri) -> Result<(), IndexError> {
        self.check_new_resource(name)?;
        let name = SmolStr::new(name);
        self.script_by_uri.insert(uri.clone(), name.clone());
        self.scripts.insert(
            name.clone(),
            ScriptRecord {
                name,
                uri,
                signature: None,
                doc: None,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn script_get_package(&self, name: &str) -> Option<&ScriptRecord> {
        self.scripts.get(name)
    }

    /// The script whose source document is `uri`.
    #[must_use]
    pub fn script_at_uri(&self, uri: &Uri) -> Option<&ScriptRecord> {
        self.script_by_uri
            .get(uri)
            .and_then(|name| self.scripts.get(name))
    }

    /// Attaches the signature read from a script's leading doc comment.
    pub fn script_add_jsdoc(&mut self, name: &str, jsdoc: &JsDoc) -> Result<(), IndexError> {
        let script = self
            .scripts
            .get_mut(name)
            .ok_or_else(|| IndexError::UnknownScript { name: name.into() })?;
        script.signature = Some(jsdoc.signature(name));
        script.doc = jsdoc.description.clone();
        Ok(())
    }

    /// Drops a script's signature, leaving it callable with any arity.
    pub fn script_clear_jsdoc(&mut self, name: &str) {
        if let Some(script) = self.scripts.get_mut(name) {
            script.signature = None;
            script.doc = None;
        }
    }

    /// Removes a script and everything its document contributed.
    pub fn delete_script(&mut self, name: &str) -> Result<ScriptRecord, IndexError> {
        let script = self
            .scripts
            .shift_remove(name)
            .ok_or_else(|| IndexError::UnknownScript { name: name.into() })?;
        self.script_by_uri.remove(&script.uri);
        self.remove_document(&script.uri);
        Ok(script)
    }

    pub fn create_object(&mut self, name: &str) -> Result<(), IndexError> {
        self.check_new_resource(name)?;
        let name = SmolStr::new(name);
        self.objects.insert(
            name.clone(),
            ObjectRecord {
                name,
                event_uris: IndexSet::new(),
            },
        );
        Ok(())
    }

    /// Links an event document to an object. Linking twice is a no-op.
    pub fn object_add_event(&mut self, name: &str, uri: Uri) -> Result<(), IndexError> {
        let object = self
            .objects
            .get_mut(name)
            .ok_or_else(|| IndexError::UnknownObject { name: name.into() })?;
        object.event_uris.insert(uri.clone());
        self.object_by_event.insert(uri, object.name.clone());
        Ok(())
    }

    #[must_use]
    pub fn object_get(&self, name: &str) -> Option<&ObjectRecord> {
        self.objects.get(name)
    }

    /// Removes an object and the contributions of all of its events.
    pub fn delete_object(&mut self, name: &str) -> Result<ObjectRecord, IndexError> {
        let object = self
            .objects
            .shift_remove(name)
            .ok_or_else(|| IndexError::UnknownObject { name: name.into() })?;
        for uri in &object.event_uris {
            self.object_by_event.remove(uri);
            self.remove_document(uri);
        }
        Ok(object)
    }

    /// Removes one declaration site: the document's contribution and, for
    /// an object event, its link to the object.
    pub fn delete_record_at_uri(&mut self, uri: &Uri) {
        if let Some(object) = self.object_by_event.remove(uri) {
            if let Some(record) = self.objects.get_mut(&object) {
                record.event_uris.shift_remove(uri);
            }
        }
        self.remove_document(uri);
    }

    /// Names of registered scripts, in registration order.
    pub fn script_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.scripts.keys()
    }

    /// Names of registered objects, in registration order.
    pub fn object_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.objects.keys()
    }

    fn check_new_resource(&self, name: &str) -> Result<(), IndexError> {
        if !is_valid_resource_name(name) || is_reserved_keyword(name) {
            return Err(IndexError::InvalidName { name: name.into() });
        }
        if self.exists(name) {
            return Err(IndexError::AlreadyExists { name: name.into() });
        }
        Ok(())
    }

    // =========================================================================
    // Contributions
    // =========================================================================

    /// Drops every symbol `uri` contributed, including its script signature.
    pub fn clear_contribution(&mut self, uri: &Uri) {
        self.detach_contribution(uri);
        if let Some(name) = self.script_by_uri.get(uri).cloned() {
            self.script_clear_jsdoc(&name);
        }
    }

    /// Replaces the contribution of `uri` in one step. The script signature
    /// is left alone.
    ///
    /// Every macro stays in the stored contribution. The first definer of a
    /// name owns it; the others are returned as conflicts and take over, in
    /// order, once the owner stops defining the name.
    pub fn replace_contribution(
        &mut self,
        uri: &Uri,
        contribution: Contribution,
    ) -> Vec<MacroConflict> {
        let slots = self.detach_contribution(uri);

        let mut inserted: FxHashMap<SmolStr, usize> = FxHashMap::default();
        for record in &contribution.macros {
            let definers = self.macros.entry(record.name.clone()).or_default();
            let slot = match inserted.get(&record.name) {
                Some(previous) => previous + 1,
                None => slots
                    .get(&record.name)
                    .copied()
                    .unwrap_or(definers.len())
                    .min(definers.len()),
            };
            definers.insert(slot, record.clone());
            inserted.insert(record.name.clone(), slot);
        }

        for variable in &contribution.variables {
            self.variables
                .entry(variable.name.clone())
                .or_default()
                .push(variable.clone());
        }
        for symbol_use in &contribution.uses {
            self.uses_by_name
                .entry(symbol_use.name.clone())
                .or_default()
                .insert(uri.clone());
        }

        let conflicts = self.macro_conflicts(&contribution);
        if !contribution.is_empty() {
            self.contributions.insert(uri.clone(), contribution);
        }
        if !conflicts.is_empty() {
            debug!(uri = %uri, count = conflicts.len(), "macros shadowed by earlier definitions");
        }
        conflicts
    }

    /// Macros of `contribution` that are not the visible definition of
    /// their name.
    fn macro_conflicts(&self, contribution: &Contribution) -> Vec<MacroConflict> {
        contribution
            .macros
            .iter()
            .filter_map(|record| {
                let taken_by_resource = self.scripts.contains_key(&record.name)
                    || self.objects.contains_key(&record.name);
                if taken_by_resource {
                    return Some(MacroConflict {
                        record: record.clone(),
                        owner: None,
                    });
                }
                let owner = self.macros.get(&record.name)?.first()?;
                (owner != record).then(|| MacroConflict {
                    record: record.clone(),
                    owner: Some(owner.uri().clone()),
                })
            })
            .collect()
    }

    /// Removes the symbols of `uri` without touching its script record.
    /// Returns where each of its macros sat among that name's definers.
    fn detach_contribution(&mut self, uri: &Uri) -> FxHashMap<SmolStr, usize> {
        let mut slots = FxHashMap::default();
        let Some(contribution) = self.contributions.remove(uri) else {
            return slots;
        };
        for variable in &contribution.variables {
            if let Some(sites) = self.variables.get_mut(&variable.name) {
                sites.retain(|site| site.uri() != uri);
                if sites.is_empty() {
                    self.variables.remove(&variable.name);
                }
            }
        }
        for record in &contribution.macros {
            if let Some(definers) = self.macros.get_mut(&record.name) {
                if let Some(slot) = definers.iter().position(|definer| definer.uri() == uri) {
                    slots.insert(record.name.clone(), slot);
                }
                definers.retain(|definer| definer.uri() != uri);
                if definers.is_empty() {
                    self.macros.remove(&record.name);
                }
            }
        }
        for symbol_use in &contribution.uses {
            if let Some(uris) = self.uses_by_name.get_mut(&symbol_use.name) {
                uris.remove(uri);
                if uris.is_empty() {
                    self.uses_by_name.remove(&symbol_use.name);
                }
            }
        }
        slots
    }

    /// What `uri` currently contributes.
    #[must_use]
    pub fn contribution(&self, uri: &Uri) -> Option<&Contribution> {
        self.contributions.get(uri)
    }

    pub fn set_content_hash(&mut self, uri: &Uri, hash: u64) {
        self.content_hashes.insert(uri.clone(), hash);
    }

    #[must_use]
    pub fn content_hash(&self, uri: &Uri) -> Option<u64> {
        self.content_hashes.get(uri).copied()
    }

    /// Documents known through a contribution or content hash.
    #[must_use]
    pub fn known_documents(&self) -> Vec<Uri> {
        let mut uris: Vec<Uri> = self
            .contributions
            .keys()
            .chain(self.content_hashes.keys())
            .cloned()
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        uris.sort();
        uris
    }

    fn remove_document(&mut self, uri: &Uri) {
        self.clear_contribution(uri);
        self.content_hashes.remove(uri);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// True if any namespace, including built-ins, holds `name`.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
            || self.objects.contains_key(name)
            || self.macros.contains_key(name)
            || self.builtin_functions.contains_key(name)
            || self.builtin_variables.contains_key(name)
            || self.variables.get(name).is_some_and(|sites| {
                sites.iter().any(|site| site.scope == ScopeKind::Global)
            })
    }

    /// The record a name resolves to, searching resources, macros,
    /// built-ins and finally non-local variables.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<SymbolRecord<'_>> {
        if let Some(script) = self.scripts.get(name) {
            return Some(SymbolRecord::Script(script));
        }
        if let Some(object) = self.objects.get(name) {
            return Some(SymbolRecord::Object(object));
        }
        if let Some(record) = self.macro_get(name) {
            return Some(SymbolRecord::Macro(record));
        }
        if let Some(function) = self.builtin_functions.get(name) {
            return Some(SymbolRecord::BuiltinFunction(function));
        }
        if let Some(variable) = self.builtin_variables.get(name) {
            return Some(SymbolRecord::BuiltinVariable(variable));
        }
        self.variables
            .get(name)
            .and_then(|sites| sites.iter().find(|site| site.scope != ScopeKind::Local))
            .map(SymbolRecord::Variable)
    }

    #[must_use]
    pub fn builtin_function(&self, name: &str) -> Option<&BuiltinFunction> {
        self.builtin_functions.get(name)
    }

    #[must_use]
    /// The visible definition of a macro.
    pub fn macro_get(&self, name: &str) -> Option<&MacroRecord> {
        self.macros.get(name).and_then(|definers| definers.first())
    }

    /// Every declaration site of `name`.
    #[must_use]
    pub fn variable_sites(&self, name: &str) -> &[VariableRecord] {
        self.variables.get(name).map_or(&[], Vec::as_slice)
    }

    /// Definition sites of `name` visible from any document.
    ///
    /// Local variables are excluded; see [`Reference::resolve_local`].
    #[must_use]
    pub fn resolve_definition(&self, name: &str) -> Vec<Location> {
        if let Some(script) = self.scripts.get(name) {
            return vec![Location::file_start(script.uri.clone())];
        }
        if let Some(object) = self.objects.get(name) {
            return object
                .event_uris
                .iter()
                .cloned()
                .map(Location::file_start)
                .collect();
        }
        if let Some(record) = self.macro_get(name) {
            return vec![record.location.clone()];
        }
        let mut sites: Vec<Location> = self
            .variable_sites(name)
            .iter()
            .filter(|site| site.scope != ScopeKind::Local)
            .map(|site| site.location.clone())
            .collect();
        sites.sort();
        sites
    }

    /// Local declaration sites of `name` inside `uri`.
    #[must_use]
    pub fn resolve_local(&self, uri: &Uri, name: &str) -> Vec<Location> {
        self.variable_sites(name)
            .iter()
            .filter(|site| site.scope == ScopeKind::Local && site.uri() == uri)
            .map(|site| site.location.clone())
            .collect()
    }

    /// Signature for a script or built-in function.
    #[must_use]
    pub fn resolve_signature(&self, name: &str) -> Option<Signature> {
        if let Some(script) = self.scripts.get(name) {
            return script.signature.clone();
        }
        self.builtin_functions
            .get(name)
            .map(BuiltinFunction::signature)
    }

    /// Every recorded use of `name`, ordered by document and position.
    #[must_use]
    pub fn list_references(&self, name: &str) -> Vec<Location> {
        let Some(uris) = self.uses_by_name.get(name) else {
            return Vec::new();
        };
        let mut locations: Vec<Location> = uris
            .iter()
            .filter_map(|uri| self.contributions.get(uri))
            .flat_map(|contribution| contribution.uses.iter())
            .filter(|symbol_use| symbol_use.name == name)
            .map(|symbol_use| symbol_use.location.clone())
            .collect();
        locations.sort();
        locations
    }

    /// Markdown hover text. Built-in descriptions are cut to `sentences`
    /// sentences; zero keeps the full text.
    #[must_use]
    pub fn hover_text(&self, name: &str, sentences: usize) -> Option<String> {
        let text = match self.lookup(name)? {
            SymbolRecord::Script(script) => {
                let label = script
                    .signature
                    .as_ref()
                    .map_or_else(|| format!("{}()", script.name), |s| s.label.clone());
                with_doc(format!("```gml\n{label}\n```\nscript"), script.doc.as_deref())
            }
            SymbolRecord::Object(object) => format!(
                "```gml\n{}\n```\nobject with {} event(s)",
                object.name,
                object.event_uris.len()
            ),
            SymbolRecord::Macro(record) => {
                format!("```gml\n#macro {} {}\n```", record.name, record.value)
            }
            SymbolRecord::BuiltinFunction(function) => {
                let signature = function.signature();
                let mut text = format!("```gml\n{}\n```", signature.label);
                if let Some(returns) = &function.returns {
                    text.push_str(&format!("\nReturns: {returns}"));
                }
                let summary = first_sentences(&function.description, sentences);
                with_doc(text, Some(summary.as_str()))
            }
            SymbolRecord::BuiltinVariable(variable) => {
                let summary = first_sentences(&variable.description, sentences);
                with_doc(
                    format!("```gml\n{}\n```\nbuilt-in variable", variable.name),
                    Some(summary.as_str()),
                )
            }
            SymbolRecord::Variable(variable) => format!(
                "```gml\n{}\n```\n{} variable",
                variable.name,
                variable.scope.label()
            ),
        };
        Some(text)
    }

    /// Names starting with `prefix`, sorted by label. Local variables are
    /// left to the caller since they depend on the current document.
    #[must_use]
    pub fn completions(&self, prefix: &str) -> Vec<CompletionEntry> {
        let mut entries: Vec<CompletionEntry> = Vec::new();
        let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
        let mut push = |label: &SmolStr, kind: CompletionKind, detail: Option<String>| {
            if label.starts_with(prefix) && seen.insert(label.clone()) {
                entries.push(CompletionEntry {
                    label: label.clone(),
                    kind,
                    detail,
                });
            }
        };

        for script in self.scripts.values() {
            let detail = script.signature.as_ref().map(|s| s.label.clone());
            push(&script.name, CompletionKind::Script, detail);
        }
        for object in self.objects.values() {
            push(&object.name, CompletionKind::Object, None);
        }
        for record in self.macros.values().filter_map(|definers| definers.first()) {
            push(&record.name, CompletionKind::Macro, Some(record.value.clone()));
        }
        for function in self.builtin_functions.values() {
            push(
                &function.name,
                CompletionKind::Function,
                Some(function.signature().label),
            );
        }
        for variable in self.builtin_variables.values() {
            push(&variable.name, CompletionKind::BuiltinVariable, None);
        }
        for (name, sites) in &self.variables {
            if let Some(site) = sites.iter().find(|site| site.scope != ScopeKind::Local) {
                push(
                    name,
                    CompletionKind::Variable,
                    Some(format!("{} variable", site.scope.label())),
                );
            }
        }

        entries.sort_by(|a, b| a.label.cmp(&b.label));
        entries
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Serializable copy of everything except the built-ins.
    #[must_use]
    pub fn snapshot_for_shutdown(&self) -> SerializedIndex {
        let files = self
            .known_documents()
            .into_iter()
            .map(|uri| SerializedFile {
                content_hash: self.content_hashes.get(&uri).copied(),
                contribution: self.contributions.get(&uri).cloned().unwrap_or_default(),
                uri,
            })
            .collect();
        SerializedIndex {
            version: SNAPSHOT_VERSION,
            hasher: hasher_id(),
            scripts: self.scripts.values().cloned().collect(),
            objects: self.objects.values().cloned().collect(),
            files,
        }
    }

    /// Rebuilds an index from a snapshot. Built-ins must be seeded again.
    pub fn from_snapshot(snapshot: SerializedIndex) -> Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let hashes_usable = snapshot.hasher == hasher_id();
        if !hashes_usable {
            debug!(hasher = %snapshot.hasher, "snapshot content hashes ignored");
        }
        let mut reference = Self::new();
        for file in snapshot.files {
            reference.replace_contribution(&file.uri, file.contribution);
            if let Some(hash) = file.content_hash.filter(|_| hashes_usable) {
                reference.content_hashes.insert(file.uri, hash);
            }
        }
        for script in snapshot.scripts {
            reference
                .script_by_uri
                .insert(script.uri.clone(), script.name.clone());
            reference.scripts.insert(script.name.clone(), script);
        }
        for object in snapshot.objects {
            for uri in &object.event_uris {
                reference
                    .object_by_event
                    .insert(uri.clone(), object.name.clone());
            }
            reference.objects.insert(object.name.clone(), object);
        }
        Ok(reference)
    }
}

fn with_doc(mut text: String, doc: Option<&str>) -> String {
    if let Some(doc) = doc.filter(|doc| !doc.is_empty()) {
        text.push_str("\n\n");
        text.push_str(doc);
    }
    text
}
