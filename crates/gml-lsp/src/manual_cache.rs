//! Loading the built-in function manual.
//!
//! The parsed manual is cached as JSON. A missing or unreadable cache is
//! regenerated once from markdown, either the configured source or the
//! manual bundled with the server. If that also fails the server runs with
//! an empty manual.

use anyhow::Context;
use std::path::Path;
use tracing::{debug, info, warn};

use gml_hir::Manual;

use crate::config::ManualConfig;

const BUNDLED_MANUAL: &str = include_str!("../assets/manual.md");

pub(crate) async fn load_manual(config: &ManualConfig) -> Manual {
    match read_cached(&config.cache_path).await {
        Ok(manual) => {
            debug!(
                functions = manual.functions.len(),
                variables = manual.variables.len(),
                "loaded cached manual"
            );
            return manual;
        }
        Err(err) => {
            info!("Regenerating manual cache: {err:#}");
        }
    }

    match regenerate(config).await {
        Ok(manual) => {
            if let Err(err) = write_cache(&config.cache_path, &manual).await {
                warn!("Failed to write manual cache: {err:#}");
            }
            manual
        }
        Err(err) => {
            warn!("Continuing without built-in documentation: {err:#}");
            Manual::default()
        }
    }
}

/// The manual shipped with the server.
pub(crate) fn bundled_manual() -> Manual {
    Manual::from_markdown(BUNDLED_MANUAL).unwrap_or_default()
}

async fn read_cached(path: &Path) -> anyhow::Result<Manual> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Manual::from_json(&contents).with_context(|| format!("decoding {}", path.display()))
}

async fn regenerate(config: &ManualConfig) -> anyhow::Result<Manual> {
    let source = match &config.source_path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading manual source {}", path.display()))?,
        None => BUNDLED_MANUAL.to_string(),
    };
    Manual::from_markdown(&source).context("parsing manual source")
}

async fn write_cache(path: &Path, manual: &Manual) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, manual.to_json()?).await?;
    Ok(())
}
