//! Error types for index mutations, manual loading and snapshots.

use smol_str::SmolStr;
use thiserror::Error;

/// Rejected mutation of the symbol index. Nothing is changed when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// A resource, macro, global or built-in already uses the name.
    #[error("resource '{name}' already exists")]
    AlreadyExists { name: SmolStr },
    /// Resource names must match `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid resource name '{name}'")]
    InvalidName { name: SmolStr },
    #[error("unknown script '{name}'")]
    UnknownScript { name: SmolStr },
    #[error("unknown object '{name}'")]
    UnknownObject { name: SmolStr },
}

/// Failure to load the built-in function manual.
#[derive(Debug, Error)]
pub enum ManualError {
    #[error("failed to read manual: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode manual: {0}")]
    Json(#[from] serde_json::Error),
    /// The manual decoded but lists no functions.
    #[error("manual contains no entries")]
    Empty,
}

/// Failure to read or write a persisted index snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot version {found} does not match expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}
