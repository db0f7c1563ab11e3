//! Symbol records stored in the cross-file index.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::line_index::LineCol;

/// Document identifier, the client's URI string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(SmolStr);

impl Uri {
    #[must_use]
    pub fn new(uri: impl AsRef<str>) -> Self {
        Self(SmolStr::new(uri))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Uri {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A span inside a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub uri: Uri,
    pub start: LineCol,
    pub end: LineCol,
}

impl Location {
    #[must_use]
    pub fn new(uri: Uri, start: LineCol, end: LineCol) -> Self {
        Self { uri, start, end }
    }

    /// The first character of a document.
    #[must_use]
    pub fn file_start(uri: Uri) -> Self {
        Self::new(uri, LineCol::default(), LineCol::default())
    }
}

/// Where a variable lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// `var` declarations, visible in the declaring document only.
    Local,
    /// Assigned in an object event outside any `with` block.
    Instance,
    /// `globalvar` or `global.name`.
    Global,
}

impl ScopeKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Instance => "instance",
            Self::Global => "global",
        }
    }
}

/// One declaration site of a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRecord {
    pub name: SmolStr,
    pub scope: ScopeKind,
    pub location: Location,
}

impl VariableRecord {
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.location.uri
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.location.start.line
    }
}

/// A `#macro` definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroRecord {
    pub name: SmolStr,
    pub value: String,
    /// Location of the macro name.
    pub location: Location,
}

impl MacroRecord {
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.location.uri
    }
}

/// How a name is used at a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseKind {
    Declaration,
    Read,
    Write,
    Call,
}

/// One occurrence of an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolUse {
    pub name: SmolStr,
    pub kind: UseKind,
    pub location: Location,
}

/// One parameter of a callable signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub label: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

/// A callable signature with its accepted argument range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Rendered form, e.g. `scr_move(x, y, [speed])`.
    pub label: String,
    pub parameters: Vec<ParameterInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    pub min_args: usize,
    /// `None` when the callable is variadic.
    pub max_args: Option<usize>,
}

impl Signature {
    /// Builds a signature from parameters, rendering optional ones in brackets.
    #[must_use]
    pub fn from_parameters(
        name: &str,
        parameters: Vec<ParameterInfo>,
        variadic: bool,
    ) -> Self {
        let mut rendered: Vec<String> = parameters
            .iter()
            .map(|param| {
                if param.optional {
                    format!("[{}]", param.label)
                } else {
                    param.label.to_string()
                }
            })
            .collect();
        if variadic {
            rendered.push("...".to_string());
        }
        let min_args = parameters.iter().take_while(|param| !param.optional).count();
        let max_args = (!variadic).then_some(parameters.len());
        Self {
            label: format!("{name}({})", rendered.join(", ")),
            parameters,
            documentation: None,
            returns: None,
            min_args,
            max_args,
        }
    }

    /// Returns true if a call with `count` arguments is accepted.
    #[must_use]
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }

    /// Human-readable accepted range, e.g. `2`, `1 to 3`, `at least 1`.
    #[must_use]
    pub fn arity_label(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{} to {max}", self.min_args),
            None => format!("at least {}", self.min_args),
        }
    }
}

/// A script resource. Its signature comes from the leading doc comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub name: SmolStr,
    pub uri: Uri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// An object resource and the documents of its events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub name: SmolStr,
    pub event_uris: IndexSet<Uri>,
}

/// Any record the index can resolve a name to.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolRecord<'a> {
    Script(&'a ScriptRecord),
    Object(&'a ObjectRecord),
    Macro(&'a MacroRecord),
    Variable(&'a VariableRecord),
    BuiltinFunction(&'a crate::manual::BuiltinFunction),
    BuiltinVariable(&'a crate::manual::BuiltinVariable),
}

/// Everything one document contributes to the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    #[serde(default)]
    pub variables: Vec<VariableRecord>,
    #[serde(default)]
    pub macros: Vec<MacroRecord>,
    #[serde(default)]
    pub uses: Vec<SymbolUse>,
}

impl Contribution {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.macros.is_empty() && self.uses.is_empty()
    }
}

/// Completion category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Function,
    Script,
    Object,
    Macro,
    Variable,
    BuiltinVariable,
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEntry {
    pub label: SmolStr,
    pub kind: CompletionKind,
    pub detail: Option<String>,
}
