//! Diagnostic types for syntax and semantic findings.
//!
//! Every diagnostic carries the pass that produced it so a lint cycle can
//! report them grouped in a stable order.

use text_size::TextRange;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    /// Error - the document or declaration is unusable.
    Error,
    /// Warning - potential issue.
    Warning,
    /// Information - informational message.
    Info,
    /// Hint - style suggestion.
    Hint,
}

/// A diagnostic code identifying the type of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// The document does not match the grammar.
    SyntaxError,
    /// A call names no built-in, script, macro or known variable.
    UnresolvedFunction,
    /// A call passes a number of arguments outside the accepted range.
    WrongArgumentCount,
    /// A `///` documentation tag could not be read.
    MalformedDocTag,
    /// A `#macro` name is already owned by another document or resource.
    MacroCollision,
}

impl DiagnosticCode {
    /// Returns the string code (e.g., "W101").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SyntaxError => "E001",
            Self::UnresolvedFunction => "W101",
            Self::WrongArgumentCount => "W102",
            Self::MalformedDocTag => "W103",
            Self::MacroCollision => "E104",
        }
    }

    /// Returns the default severity for this diagnostic code.
    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        match self {
            Self::SyntaxError | Self::MacroCollision => DiagnosticSeverity::Error,
            Self::UnresolvedFunction | Self::WrongArgumentCount | Self::MalformedDocTag => {
                DiagnosticSeverity::Warning
            }
        }
    }
}

/// The pass that produced a diagnostic.
///
/// The declaration order is the order diagnostics are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSource {
    Syntax,
    Function,
    Variable,
    JsDoc,
}

impl DiagnosticSource {
    /// Label shown to clients next to the message.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "gml-syntax",
            Self::Function => "gml-function",
            Self::Variable => "gml-variable",
            Self::JsDoc => "gml-jsdoc",
        }
    }
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: DiagnosticSeverity,
    /// The source range where the diagnostic applies.
    pub range: TextRange,
    /// The diagnostic message.
    pub message: String,
    /// The pass that reported it.
    pub source: DiagnosticSource,
}

impl Diagnostic {
    /// Creates a new diagnostic with the code's default severity.
    pub fn new(
        code: DiagnosticCode,
        source: DiagnosticSource,
        range: TextRange,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: code.severity(),
            code,
            range,
            message: message.into(),
            source,
        }
    }

    /// Returns true if this is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
            DiagnosticSeverity::Hint => "hint",
        };
        write!(
            f,
            "{severity}[{}]: {} (at {}..{})",
            self.code.code(),
            self.message,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}

/// Collects diagnostics for one pass, stamping each with the pass source.
#[derive(Debug)]
pub struct DiagnosticBuilder {
    source: DiagnosticSource,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBuilder {
    /// Creates a new diagnostic builder for `source`.
    #[must_use]
    pub fn new(source: DiagnosticSource) -> Self {
        Self {
            source,
            diagnostics: Vec::new(),
        }
    }

    /// Adds a diagnostic with the code's default severity.
    pub fn report(&mut self, code: DiagnosticCode, range: TextRange, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::new(code, self.source, range, message));
    }

    /// Returns true if any errors were reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the collected diagnostics.
    #[must_use]
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
