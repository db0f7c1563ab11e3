//! Lint cycle configuration.

use bitflags::bitflags;

bitflags! {
    /// Which semantic passes a lint cycle runs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SemanticsOption: u8 {
        const FUNCTION = 1;
        const VARIABLE = 1 << 1;
        const JAVA_DOC = 1 << 2;
        const ALL = Self::FUNCTION.bits() | Self::VARIABLE.bits() | Self::JAVA_DOC.bits();
    }
}

impl Default for SemanticsOption {
    fn default() -> Self {
        Self::ALL
    }
}

/// Whether the workspace is still being indexed.
///
/// During bootstrap, documents are analyzed in manifest order, so a call
/// may name a script that simply has not been registered yet. Unresolved
/// calls are therefore not reported until the index is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LintMode {
    Bootstrap,
    #[default]
    Full,
}

/// User-tunable warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LintSettings {
    pub warn_unresolved: bool,
    pub warn_arity: bool,
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            warn_unresolved: true,
            warn_arity: true,
        }
    }
}
