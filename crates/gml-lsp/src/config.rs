//! Workspace configuration for gml-lsp.

use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

use gml_hir::lint::options::LintSettings;

pub(crate) const CONFIG_FILES: &[&str] = &["gml-tools.toml", ".gml-tools.toml"];

/// Client settings section read on `workspace/didChangeConfiguration`.
pub(crate) const CLIENT_SECTION: &str = "gml-tools";

const DATA_DIR: &str = ".gml-tools";
const MANUAL_CACHE_FILE: &str = "gmlDocs.json";
const INDEX_CACHE_DIR: &str = "index-cache";

/// Project configuration loaded from `gml-tools.toml`.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Root directory for the workspace.
    pub root: PathBuf,
    /// Config file path (if found).
    pub config_path: Option<PathBuf>,
    pub manual: ManualConfig,
    pub indexing: IndexingConfig,
    pub hover: HoverConfig,
    pub diagnostics: LintSettings,
}

/// Where the built-in manual is cached and regenerated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualConfig {
    /// JSON cache of the parsed manual.
    pub cache_path: PathBuf,
    /// Markdown manual to regenerate from. The bundled manual is used when unset.
    pub source_path: Option<PathBuf>,
}

/// Bootstrap indexing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingConfig {
    /// Whether the index snapshot is persisted between sessions.
    pub cache_enabled: bool,
    pub cache_dir: PathBuf,
    /// Optional maximum number of files to index.
    pub max_files: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverConfig {
    /// Sentences of manual text shown on hover. Zero shows everything.
    pub documentation_sentences: usize,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            documentation_sentences: 1,
        }
    }
}

impl ProjectConfig {
    /// Load configuration for a workspace root.
    pub fn load(root: &Path) -> Self {
        let config_path = find_config_file(root);
        let Some(path) = config_path.clone() else {
            return ProjectConfig::base(root, None);
        };
        let Ok(contents) = std::fs::read_to_string(&path) else {
            warn!("Failed to read gml-tools config at {}", path.display());
            return ProjectConfig::base(root, config_path);
        };
        ProjectConfig::from_contents(root, config_path, &contents)
    }

    pub fn from_contents(root: &Path, config_path: Option<PathBuf>, contents: &str) -> Self {
        let mut config = ProjectConfig::base(root, config_path);
        let parsed: ConfigFile = match toml::from_str(contents) {
            Ok(parsed) => parsed,
            Err(err) => {
                if let Some(path) = &config.config_path {
                    warn!(
                        "Failed to parse gml-tools config at {}: {err}",
                        path.display()
                    );
                } else {
                    warn!("Failed to parse gml-tools config: {err}");
                }
                return config;
            }
        };

        if let Some(cache_path) = parsed.manual.cache_path {
            config.manual.cache_path = resolve_path(root, &cache_path);
        }
        config.manual.source_path = parsed
            .manual
            .source_path
            .map(|path| resolve_path(root, &path));

        let indexing = parsed.indexing;
        config.indexing.cache_enabled = indexing.cache_enabled.unwrap_or(true);
        if let Some(dir) = indexing.cache_dir {
            config.indexing.cache_dir = resolve_path(root, &dir);
        }
        config.indexing.max_files = indexing.max_files;

        if let Some(sentences) = parsed.hover.documentation_sentences {
            config.hover.documentation_sentences = sentences;
        }

        let defaults = LintSettings::default();
        config.diagnostics = LintSettings {
            warn_unresolved: parsed
                .diagnostics
                .warn_unresolved
                .unwrap_or(defaults.warn_unresolved),
            warn_arity: parsed.diagnostics.warn_arity.unwrap_or(defaults.warn_arity),
        };
        config
    }

    fn base(root: &Path, config_path: Option<PathBuf>) -> Self {
        let data_dir = root.join(DATA_DIR);
        ProjectConfig {
            root: root.to_path_buf(),
            config_path,
            manual: ManualConfig {
                cache_path: data_dir.join(MANUAL_CACHE_FILE),
                source_path: None,
            },
            indexing: IndexingConfig {
                cache_enabled: true,
                cache_dir: data_dir.join(INDEX_CACHE_DIR),
                max_files: None,
            },
            hover: HoverConfig::default(),
            diagnostics: LintSettings::default(),
        }
    }
}

/// Reads `numberOfDocumentationSentences` from client settings. Accepts
/// both the whole settings object and the bare section.
pub(crate) fn documentation_sentences_from_settings(settings: &Value) -> Option<usize> {
    let section = settings.get(CLIENT_SECTION).unwrap_or(settings);
    let parsed: ClientSettings = serde_json::from_value(section.clone()).ok()?;
    parsed.number_of_documentation_sentences
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientSettings {
    number_of_documentation_sentences: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    manual: ManualSection,
    #[serde(default)]
    indexing: IndexingSection,
    #[serde(default)]
    hover: HoverSection,
    #[serde(default)]
    diagnostics: DiagnosticSection,
}

#[derive(Debug, Default, Deserialize)]
struct ManualSection {
    cache_path: Option<String>,
    source_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IndexingSection {
    cache_enabled: Option<bool>,
    cache_dir: Option<String>,
    max_files: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct HoverSection {
    documentation_sentences: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct DiagnosticSection {
    warn_unresolved: Option<bool>,
    warn_arity: Option<bool>,
}

pub(crate) fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

fn resolve_path(root: &Path, entry: &str) -> PathBuf {
    let path = PathBuf::from(entry);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
