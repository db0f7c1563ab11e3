//! Built-in function and variable documentation.
//!
//! The manual is stored as JSON. When the cached JSON is missing it can be
//! regenerated from a markdown source where every `#` heading starts an
//! entry:
//!
//! ```text
//! # draw_sprite(sprite, subimg, x, y)
//! Draws a sprite at a position.
//! - sprite: The sprite index.
//! Returns: N/A
//!
//! # room_speed
//! The speed of the current room in steps per second.
//! ```
//!
//! Headings with a parameter list become functions, bare headings become
//! variables. `[name]` marks an optional parameter and `...` makes the
//! function variadic.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ManualError;
use crate::symbols::{ParameterInfo, Signature};

/// A built-in function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinFunction {
    pub name: SmolStr,
    pub parameters: Vec<ParameterInfo>,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
}

impl BuiltinFunction {
    /// Signature with arity derived from the parameter list.
    #[must_use]
    pub fn signature(&self) -> Signature {
        let mut signature =
            Signature::from_parameters(&self.name, self.parameters.clone(), self.variadic);
        if !self.description.is_empty() {
            signature.documentation = Some(self.description.clone());
        }
        signature.returns.clone_from(&self.returns);
        signature
    }
}

/// A built-in variable such as `room_speed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinVariable {
    pub name: SmolStr,
    #[serde(default)]
    pub description: String,
}

/// The whole manual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manual {
    #[serde(default)]
    pub functions: Vec<BuiltinFunction>,
    #[serde(default)]
    pub variables: Vec<BuiltinVariable>,
}

impl Manual {
    /// Decodes the cached JSON form. An empty manual is an error so that a
    /// truncated cache triggers regeneration.
    pub fn from_json(contents: &str) -> Result<Self, ManualError> {
        let manual: Self = serde_json::from_str(contents)?;
        if manual.is_empty() {
            return Err(ManualError::Empty);
        }
        Ok(manual)
    }

    pub fn to_json(&self) -> Result<String, ManualError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Regenerates the manual from its markdown source.
    pub fn from_markdown(contents: &str) -> Result<Self, ManualError> {
        let mut manual = Self::default();
        let mut current: Option<Entry> = None;

        for line in contents.lines() {
            let trimmed = line.trim();
            if let Some(heading) = trimmed.strip_prefix('#') {
                if let Some(entry) = current.take() {
                    entry.finish(&mut manual);
                }
                current = Entry::from_heading(heading.trim_start_matches('#').trim());
            } else if let Some(entry) = current.as_mut() {
                entry.push_line(trimmed);
            }
        }
        if let Some(entry) = current.take() {
            entry.finish(&mut manual);
        }

        if manual.is_empty() {
            return Err(ManualError::Empty);
        }
        Ok(manual)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.variables.is_empty()
    }
}

/// Returns the first `count` sentences of `text`. Zero keeps everything.
#[must_use]
pub fn first_sentences(text: &str, count: usize) -> String {
    let text = text.trim();
    if count == 0 {
        return text.to_string();
    }
    let mut seen = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                seen += 1;
                if seen == count {
                    return text[..offset + ch.len_utf8()].to_string();
                }
            }
        }
    }
    text.to_string()
}

struct Entry {
    name: SmolStr,
    parameters: Option<(Vec<ParameterInfo>, bool)>,
    description: Vec<String>,
    returns: Option<String>,
}

impl Entry {
    fn from_heading(heading: &str) -> Option<Self> {
        let (name, parameters) = match heading.split_once('(') {
            Some((name, rest)) => {
                let inner = rest.trim_end().strip_suffix(')')?;
                (name.trim(), Some(parse_parameter_list(inner)))
            }
            None => (heading, None),
        };
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some(Self {
            name: name.into(),
            parameters,
            description: Vec::new(),
            returns: None,
        })
    }

    fn push_line(&mut self, line: &str) {
        if let Some(returns) = line.strip_prefix("Returns:") {
            let returns = returns.trim();
            if !returns.is_empty() && returns != "N/A" {
                self.returns = Some(returns.to_string());
            }
            return;
        }
        if let Some(item) = line.strip_prefix("- ") {
            if let (Some((params, _)), Some((label, doc))) =
                (self.parameters.as_mut(), item.split_once(':'))
            {
                let label = label.trim();
                if let Some(param) = params.iter_mut().find(|param| param.label == label) {
                    param.documentation = Some(doc.trim().to_string());
                    return;
                }
            }
        }
        if !line.is_empty() {
            self.description.push(line.to_string());
        }
    }

    fn finish(self, manual: &mut Manual) {
        let description = self.description.join(" ");
        match self.parameters {
            Some((parameters, variadic)) => manual.functions.push(BuiltinFunction {
                name: self.name,
                parameters,
                variadic,
                description,
                returns: self.returns,
            }),
            None => manual.variables.push(BuiltinVariable {
                name: self.name,
                description,
            }),
        }
    }
}

/// Parses `a, [b], ...` into parameters and a variadic flag.
pub(crate) fn parse_parameter_list(inner: &str) -> (Vec<ParameterInfo>, bool) {
    let mut parameters = Vec::new();
    let mut variadic = false;
    for part in inner.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        if part == "..." {
            variadic = true;
            continue;
        }
        let (label, optional) = match part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
            Some(label) => (label.trim(), true),
            None => (part, false),
        };
        parameters.push(ParameterInfo {
            label: label.into(),
            type_name: None,
            documentation: None,
            optional,
        });
    }
    (parameters, variadic)
}
