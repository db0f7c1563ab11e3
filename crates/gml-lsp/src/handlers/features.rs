//! Interactive features backed by the symbol index.
//!
//! Every provider answers `None` while the workspace is still being indexed.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use text_size::TextSize;
use tower_lsp::lsp_types::*;

use gml_hir::symbols::CompletionKind;
use gml_hir::ScopeKind;
use gml_syntax::{SyntaxElement, SyntaxKind, SyntaxNode};

use crate::state::{to_index_uri, ServerState};

use super::lsp_utils::{
    completion_kind_to_lsp, identifier_at, identifier_prefix, location_to_lsp, offset_to_position,
    position_to_offset,
};

pub fn hover(state: &ServerState, params: HoverParams) -> Option<Hover> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    let doc = state.get_document(uri)?;
    let offset = position_to_offset(&doc.content, position)?;
    let (name, range) = identifier_at(&doc.content, offset as usize)?;

    let value = state
        .index()
        .hover_text(name, state.documentation_sentences())
        .ready()??;

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(Range {
            start: offset_to_position(&doc.content, range.start().into()),
            end: offset_to_position(&doc.content, range.end().into()),
        }),
    })
}

/// Locals declared in the current document shadow everything else.
pub fn goto_definition(
    state: &ServerState,
    params: GotoDefinitionParams,
) -> Option<GotoDefinitionResponse> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    let doc = state.get_document(uri)?;
    let offset = position_to_offset(&doc.content, position)?;
    let (name, _) = identifier_at(&doc.content, offset as usize)?;

    let index_uri = to_index_uri(uri);
    let found = state
        .index()
        .query(|reference| {
            let locals = reference.resolve_local(&index_uri, name);
            if locals.is_empty() {
                reference.resolve_definition(name)
            } else {
                locals
            }
        })
        .ready()?;

    let mut locations: Vec<Location> = found.iter().filter_map(location_to_lsp).collect();
    match locations.len() {
        0 => None,
        1 => locations.pop().map(GotoDefinitionResponse::Scalar),
        _ => Some(GotoDefinitionResponse::Array(locations)),
    }
}

pub fn references(state: &ServerState, params: ReferenceParams) -> Option<Vec<Location>> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;

    let doc = state.get_document(uri)?;
    let offset = position_to_offset(&doc.content, position)?;
    let (name, _) = identifier_at(&doc.content, offset as usize)?;

    let include_declaration = params.context.include_declaration;
    let found = state
        .index()
        .query(|reference| {
            let mut uses = reference.list_references(name);
            if !include_declaration {
                let definitions = reference.resolve_definition(name);
                uses.retain(|location| !definitions.contains(location));
            }
            uses
        })
        .ready()?;

    Some(found.iter().filter_map(location_to_lsp).collect())
}

pub fn completion(state: &ServerState, params: CompletionParams) -> Option<CompletionResponse> {
    let uri = &params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;

    let doc = state.get_document(uri)?;
    let offset = position_to_offset(&doc.content, position)?;
    let prefix = identifier_prefix(&doc.content, offset as usize);

    let index_uri = to_index_uri(uri);
    let (entries, locals) = state
        .index()
        .query(|reference| {
            let locals: Vec<SmolStr> = reference
                .contribution(&index_uri)
                .map(|contribution| {
                    contribution
                        .variables
                        .iter()
                        .filter(|site| site.scope == ScopeKind::Local)
                        .filter(|site| site.name.starts_with(prefix))
                        .map(|site| site.name.clone())
                        .collect()
                })
                .unwrap_or_default();
            (reference.completions(prefix), locals)
        })
        .ready()?;

    let mut seen: FxHashSet<SmolStr> = FxHashSet::default();
    let mut items = Vec::with_capacity(entries.len() + locals.len());
    for name in locals {
        if seen.insert(name.clone()) {
            items.push(CompletionItem {
                label: name.to_string(),
                kind: Some(CompletionItemKind::VARIABLE),
                detail: Some("local variable".to_string()),
                ..Default::default()
            });
        }
    }
    for entry in entries {
        if !seen.insert(entry.label.clone()) {
            continue;
        }
        items.push(CompletionItem {
            label: entry.label.to_string(),
            kind: Some(completion_kind_to_lsp(entry.kind)),
            detail: entry.detail,
            sort_text: matches!(
                entry.kind,
                CompletionKind::Function | CompletionKind::BuiltinVariable
            )
            .then(|| format!("1{}", entry.label)),
            ..Default::default()
        });
    }

    Some(CompletionResponse::Array(items))
}

pub fn signature_help(state: &ServerState, params: SignatureHelpParams) -> Option<SignatureHelp> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;

    let doc = state.get_document(uri)?;
    let offset = TextSize::from(position_to_offset(&doc.content, position)?);

    // The stored parse lags behind while an edit is being linted.
    let root = match doc.parse.as_ref().filter(|_| !doc.dirty) {
        Some(parse) => parse.syntax(),
        None => gml_syntax::parse(&doc.content).syntax(),
    };
    let (callee, active_parameter) = enclosing_call(&root, offset)?;

    let signature = state.index().resolve_signature(&callee).ready()??;
    let parameters = signature
        .parameters
        .iter()
        .map(|param| ParameterInformation {
            label: ParameterLabel::Simple(param.label.to_string()),
            documentation: param.documentation.clone().map(Documentation::String),
        })
        .collect::<Vec<_>>();

    let information = SignatureInformation {
        label: signature.label,
        documentation: signature.documentation.map(|value| {
            Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            })
        }),
        parameters: (!parameters.is_empty()).then_some(parameters),
        active_parameter: Some(active_parameter),
    };

    Some(SignatureHelp {
        signatures: vec![information],
        active_signature: Some(0),
        active_parameter: Some(active_parameter),
    })
}

/// Name of the innermost called function whose argument list holds
/// `offset`, and the index of the argument under the cursor.
fn enclosing_call(root: &SyntaxNode, offset: TextSize) -> Option<(String, u32)> {
    let arg_list = root
        .descendants()
        .filter(|node| node.kind() == SyntaxKind::ArgList && arg_list_holds(node, offset))
        .max_by_key(|node| node.text_range().start())?;

    let call = arg_list
        .parent()
        .filter(|node| node.kind() == SyntaxKind::CallExpr)?;
    let callee = call
        .first_child()
        .filter(|node| node.kind() == SyntaxKind::NameRef)?;
    let name = callee
        .children_with_tokens()
        .filter_map(SyntaxElement::into_token)
        .find(|token| token.kind() == SyntaxKind::Ident)?;

    let commas = arg_list
        .children_with_tokens()
        .filter_map(SyntaxElement::into_token)
        .filter(|token| token.kind() == SyntaxKind::Comma && token.text_range().end() <= offset)
        .count();

    Some((name.text().to_string(), u32::try_from(commas).ok()?))
}

/// Unclosed lists extend to the end of the document.
fn arg_list_holds(arg_list: &SyntaxNode, offset: TextSize) -> bool {
    let mut tokens = arg_list
        .children_with_tokens()
        .filter_map(SyntaxElement::into_token);
    let Some(lparen) = tokens.find(|token| token.kind() == SyntaxKind::LParen) else {
        return false;
    };
    if offset < lparen.text_range().end() {
        return false;
    }
    match tokens.find(|token| token.kind() == SyntaxKind::RParen) {
        Some(rparen) => offset <= rparen.text_range().start(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_at(source: &str, marker: &str) -> Option<(String, u32)> {
        let offset = source.find(marker).expect("marker") as u32;
        let root = gml_syntax::parse(source).syntax();
        enclosing_call(&root, TextSize::from(offset))
    }

    #[test]
    fn active_parameter_counts_commas_before_cursor() {
        let source = "draw(1, 2, 3);\n";
        assert_eq!(call_at(source, "1,"), Some(("draw".to_string(), 0)));
        assert_eq!(call_at(source, " 3"), Some(("draw".to_string(), 2)));
    }

    #[test]
    fn nested_call_wins() {
        let source = "outer(1, inner(2, 3));\n";
        assert_eq!(call_at(source, "3)"), Some(("inner".to_string(), 1)));
        assert_eq!(call_at(source, ");\n"), Some(("outer".to_string(), 1)));
    }

    #[test]
    fn cursor_outside_parentheses_has_no_call() {
        let source = "draw(1);\nx = 2;\n";
        assert_eq!(call_at(source, "x ="), None);
        assert_eq!(call_at(source, "draw"), None);
    }
}
