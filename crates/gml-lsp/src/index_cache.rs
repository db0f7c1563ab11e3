//! Persistent symbol index snapshot.

use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use gml_hir::snapshot::SerializedIndex;

const CACHE_FILE: &str = "index.json";

pub(crate) fn cache_file(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILE)
}

/// Reads the snapshot in `dir`. Anything unusable is logged and ignored so
/// the caller falls back to a full bootstrap.
pub(crate) async fn load_snapshot(dir: &Path) -> Option<SerializedIndex> {
    let path = cache_file(dir);
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return None,
        Err(err) => {
            warn!("Failed to read index cache at {}: {err}", path.display());
            return None;
        }
    };
    match SerializedIndex::from_json(&contents) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!("Ignoring index cache at {}: {err}", path.display());
            None
        }
    }
}

pub(crate) async fn save_snapshot(dir: &Path, snapshot: &SerializedIndex) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;
    let path = cache_file(dir);
    tokio::fs::write(&path, snapshot.to_json()?)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
