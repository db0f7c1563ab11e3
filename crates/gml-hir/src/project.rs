//! Project manifest (`.yyp`) reading and document classification.
//!
//! Two manifest layouts are understood:
//!
//! - 2.2: `resources[].Value { resourcePath, resourceType }`
//! - 2.3: `resources[].id { name, path }`
//!
//! 2.3 manifests carry trailing commas, which are stripped before decoding.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use smol_str::SmolStr;

/// What a `.gml` document is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// `scripts/<name>/<name>.gml`
    Script { name: SmolStr },
    /// `objects/<object>/<event>.gml`
    ObjectEvent { object: SmolStr, event: SmolStr },
    Other,
}

impl DocumentKind {
    /// Classifies a path by its last three components.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        if path.extension().and_then(|ext| ext.to_str()) != Some("gml") {
            return Self::Other;
        }
        let parts: Vec<&str> = path
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect();
        let [.., category, resource, file] = parts.as_slice() else {
            return Self::Other;
        };
        let Some(stem) = file.strip_suffix(".gml") else {
            return Self::Other;
        };
        match *category {
            "scripts" if stem == *resource => Self::Script {
                name: (*resource).into(),
            },
            "objects" => Self::ObjectEvent {
                object: (*resource).into(),
                event: stem.into(),
            },
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script { .. })
    }

    #[must_use]
    pub fn is_object_event(&self) -> bool {
        matches!(self, Self::ObjectEvent { .. })
    }
}

/// Resource category listed in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Script,
    Object,
    Other,
}

/// One resource entry, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestResource {
    pub name: SmolStr,
    pub kind: ResourceKind,
    /// Path of the resource's `.yy` file relative to the project root.
    pub path: PathBuf,
}

impl ManifestResource {
    /// Directory holding the resource files, relative to the project root.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        self.path
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf)
    }

    /// The `.gml` file of a script resource.
    #[must_use]
    pub fn script_file(&self) -> PathBuf {
        self.directory().join(format!("{}.gml", self.name))
    }
}

/// Decoded project manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectManifest {
    pub resources: Vec<ManifestResource>,
}

impl ProjectManifest {
    /// Decodes a `.yyp` file of either layout.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let raw: RawManifest = serde_json::from_str(&strip_trailing_commas(contents))?;
        let resources = raw
            .resources
            .into_iter()
            .filter_map(RawResource::into_resource)
            .collect();
        Ok(Self { resources })
    }

    pub fn scripts(&self) -> impl Iterator<Item = &ManifestResource> {
        self.resources
            .iter()
            .filter(|resource| resource.kind == ResourceKind::Script)
    }

    pub fn objects(&self) -> impl Iterator<Item = &ManifestResource> {
        self.resources
            .iter()
            .filter(|resource| resource.kind == ResourceKind::Object)
    }
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    resources: Vec<RawResource>,
}

#[derive(Deserialize)]
struct RawResource {
    #[serde(rename = "Value")]
    value: Option<LegacyValue>,
    id: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyValue {
    resource_path: String,
    resource_type: String,
}

#[derive(Deserialize)]
struct ResourceId {
    name: String,
    path: String,
}

impl RawResource {
    fn into_resource(self) -> Option<ManifestResource> {
        if let Some(value) = self.value {
            let path = normalize_separators(&value.resource_path);
            let name = path.file_stem()?.to_str()?.into();
            let kind = match value.resource_type.as_str() {
                "GMScript" => ResourceKind::Script,
                "GMObject" => ResourceKind::Object,
                _ => ResourceKind::Other,
            };
            return Some(ManifestResource { name, kind, path });
        }
        // 2.2 manifests also carry a string `id`; only the object form is a resource id.
        let id: ResourceId = serde_json::from_value(self.id?).ok()?;
        let path = normalize_separators(&id.path);
        let kind = match path.components().next() {
            Some(Component::Normal(first)) if first == "scripts" => ResourceKind::Script,
            Some(Component::Normal(first)) if first == "objects" => ResourceKind::Object,
            _ => ResourceKind::Other,
        };
        Some(ManifestResource {
            name: id.name.into(),
            kind,
            path,
        })
    }
}

fn normalize_separators(path: &str) -> PathBuf {
    path.split(['\\', '/'])
        .filter(|part| !part.is_empty())
        .collect()
}

/// Removes commas that directly precede `}` or `]`, ignoring string contents.
fn strip_trailing_commas(contents: &str) -> String {
    let mut out = String::with_capacity(contents.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut pending_comma: Option<usize> = None;

    for ch in contents.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                pending_comma = None;
                in_string = true;
                out.push(ch);
            }
            ',' => {
                pending_comma = Some(out.len());
                out.push(ch);
            }
            '}' | ']' => {
                if let Some(at) = pending_comma.take() {
                    out.remove(at);
                }
                out.push(ch);
            }
            ch if ch.is_whitespace() => out.push(ch),
            _ => {
                pending_comma = None;
                out.push(ch);
            }
        }
    }
    out
}
