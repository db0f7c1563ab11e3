//! Serialized form of the symbol index, written at shutdown and restored
//! on the next start.

use std::hash::Hasher;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::symbols::{Contribution, ObjectRecord, ScriptRecord, Uri};

/// Bumped whenever the serialized layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedIndex {
    pub version: u32,
    /// [`hasher_id`] of the process that wrote the content hashes.
    #[serde(default)]
    pub hasher: String,
    pub scripts: Vec<ScriptRecord>,
    pub objects: Vec<ObjectRecord>,
    pub files: Vec<SerializedFile>,
}

/// One document's contribution and the hash of the text it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedFile {
    pub uri: Uri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<u64>,
    #[serde(default)]
    pub contribution: Contribution,
}

impl SerializedIndex {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a snapshot, rejecting other layout versions.
    pub fn from_json(contents: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(contents)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Stored hash for `uri`, if the snapshot has one this process can
    /// reproduce.
    #[must_use]
    pub fn content_hash(&self, uri: &Uri) -> Option<u64> {
        if self.hasher != hasher_id() {
            return None;
        }
        self.files
            .iter()
            .find(|file| &file.uri == uri)
            .and_then(|file| file.content_hash)
    }
}

/// Names the hash function behind [`content_hash`]. `FxHasher` output
/// differs between word sizes and may change between releases, so hashes
/// written under another id are ignored and those documents re-analyzed.
#[must_use]
pub fn hasher_id() -> String {
    format!("fx-{}-{}", env!("CARGO_PKG_VERSION"), usize::BITS)
}

/// Hash of document text, compared against snapshot entries written with
/// the same [`hasher_id`].
#[must_use]
pub fn content_hash(text: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(text.as_bytes());
    hasher.write_u8(0xff);
    hasher.finish()
}
