//! Script signatures from leading `///` comments.
//!
//! Both documentation styles are read:
//!
//! ```text
//! /// scr_move(x, y, [speed])
//! /// Moves the caller.
//! ```
//!
//! ```text
//! /// @description Moves the caller.
//! /// @param {real} x
//! /// @param {real} y
//! /// @param {real} [speed] Pixels per step.
//! /// @returns {bool}
//! ```

use gml_syntax::{SyntaxKind, SyntaxToken};
use smol_str::SmolStr;
use text_size::TextRange;

use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::manual::parse_parameter_list;
use crate::symbols::{ParameterInfo, Signature};

use super::PassContext;

/// Documentation read from a script header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsDoc {
    pub description: Option<String>,
    pub params: Vec<ParameterInfo>,
    pub variadic: bool,
    pub returns: Option<String>,
}

impl JsDoc {
    #[must_use]
    pub fn signature(&self, script: &str) -> Signature {
        let mut signature = Signature::from_parameters(script, self.params.clone(), self.variadic);
        signature.documentation.clone_from(&self.description);
        signature.returns.clone_from(&self.returns);
        signature
    }

    /// Parses comment lines with their `///` already removed.
    ///
    /// Each malformed tag is reported with the range of its line and
    /// otherwise skipped.
    pub fn parse<'a>(
        lines: impl IntoIterator<Item = (&'a str, TextRange)>,
    ) -> (Self, Vec<(TextRange, String)>) {
        let mut doc = Self::default();
        let mut description: Vec<&str> = Vec::new();
        let mut errors = Vec::new();

        for (index, (line, range)) in lines.into_iter().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some(tagged) = line.strip_prefix('@') else {
                if index == 0 {
                    if let Some((params, variadic)) = signature_line(line) {
                        doc.merge_params(params);
                        doc.variadic |= variadic;
                        continue;
                    }
                }
                description.push(line);
                continue;
            };

            let (tag, rest) = tagged
                .split_once(char::is_whitespace)
                .map_or((tagged, ""), |(tag, rest)| (tag, rest.trim()));
            let result = match tag {
                "description" | "desc" => {
                    if !rest.is_empty() {
                        description.push(rest);
                    }
                    Ok(())
                }
                "param" | "arg" | "argument" => doc.read_param(rest),
                "return" | "returns" => doc.read_return(rest),
                "function" | "func" => {
                    if let Some((params, variadic)) = signature_line(rest) {
                        doc.merge_params(params);
                        doc.variadic |= variadic;
                    }
                    Ok(())
                }
                _ => Ok(()),
            };
            if let Err(message) = result {
                errors.push((range, message));
            }
        }

        if !description.is_empty() {
            doc.description = Some(description.join(" "));
        }
        (doc, errors)
    }

    fn read_param(&mut self, rest: &str) -> Result<(), String> {
        let (type_name, rest) = split_type(rest, "@param")?;
        let (name, description) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, doc)| (name, doc.trim()));
        if name.is_empty() {
            return Err("@param is missing a parameter name".to_string());
        }
        if name == "..." {
            self.variadic = true;
            return Ok(());
        }
        let (label, optional) = if let Some(inner) = name.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| format!("unclosed '[' in @param '{name}'"))?;
            // `[speed=4]` carries a default value.
            let label = inner.split_once('=').map_or(inner, |(label, _)| label).trim();
            (label, true)
        } else {
            (name, false)
        };
        if label.is_empty() {
            return Err("@param is missing a parameter name".to_string());
        }

        let param = ParameterInfo {
            label: SmolStr::new(label),
            type_name,
            documentation: (!description.is_empty()).then(|| description.to_string()),
            optional,
        };
        match self.params.iter_mut().find(|p| p.label == param.label) {
            Some(existing) => *existing = param,
            None => self.params.push(param),
        }
        Ok(())
    }

    fn read_return(&mut self, rest: &str) -> Result<(), String> {
        let (type_name, rest) = split_type(rest, "@returns")?;
        self.returns = type_name
            .map(|ty| ty.to_string())
            .or_else(|| (!rest.is_empty()).then(|| rest.to_string()));
        Ok(())
    }

    fn merge_params(&mut self, params: Vec<ParameterInfo>) {
        for param in params {
            if !self.params.iter().any(|p| p.label == param.label) {
                self.params.push(param);
            }
        }
    }
}

/// Splits a leading `{type}` off a tag body.
fn split_type<'a>(rest: &'a str, tag: &str) -> Result<(Option<SmolStr>, &'a str), String> {
    let Some(after) = rest.strip_prefix('{') else {
        return Ok((None, rest));
    };
    let (type_name, rest) = after
        .split_once('}')
        .ok_or_else(|| format!("unclosed '{{' in {tag} type"))?;
    let type_name = type_name.trim();
    Ok((
        (!type_name.is_empty()).then(|| SmolStr::new(type_name)),
        rest.trim(),
    ))
}

/// Reads `name(a, [b])`. The name must be an identifier.
fn signature_line(line: &str) -> Option<(Vec<ParameterInfo>, bool)> {
    let (name, rest) = line.split_once('(')?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let inner = rest.trim_end().strip_suffix(')')?;
    Some(parse_parameter_list(inner))
}

/// Result of the documentation pass over one script.
#[derive(Debug, Default)]
pub struct JsDocOutcome {
    /// `None` when the script has no leading doc comment.
    pub jsdoc: Option<JsDoc>,
}

/// Reads the leading doc comment block of a script.
pub struct JsDocPass;

impl JsDocPass {
    pub fn run(ctx: &PassContext<'_>, diagnostics: &mut DiagnosticBuilder) -> JsDocOutcome {
        let comments: Vec<SyntaxToken> = ctx
            .root
            .descendants_with_tokens()
            .filter_map(rowan::NodeOrToken::into_token)
            .take_while(|token| token.kind().is_trivia())
            .filter(|token| token.kind() == SyntaxKind::DocComment)
            .collect();
        if comments.is_empty() {
            return JsDocOutcome::default();
        }

        let lines = comments.iter().map(|token| {
            let text = token.text();
            (text.strip_prefix("///").unwrap_or(text), token.text_range())
        });
        let (jsdoc, errors) = JsDoc::parse(lines);
        for (range, message) in errors {
            diagnostics.report(DiagnosticCode::MalformedDocTag, range, message);
        }
        JsDocOutcome { jsdoc: Some(jsdoc) }
    }
}
