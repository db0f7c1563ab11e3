//! LSP conversion helpers.

use text_size::TextRange;
use tower_lsp::lsp_types::{
    self as lsp, CompletionItemKind, DiagnosticSeverity, NumberOrString, Position, Range,
};

use gml_hir::symbols::CompletionKind;
use gml_hir::{Diagnostic, LineCol, LineIndex, Location};

use crate::state::from_index_uri;

pub(crate) fn offset_to_position(content: &str, offset: u32) -> Position {
    let (line, col) = offset_to_line_col(content, offset);
    Position {
        line,
        character: col,
    }
}

pub(crate) fn offset_to_line_col(content: &str, offset: u32) -> (u32, u32) {
    let offset = offset as usize;
    let mut line = 0u32;
    let mut col = 0u32;

    for (i, c) in content.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }

    (line, col)
}

pub(crate) fn position_to_offset(content: &str, position: Position) -> Option<u32> {
    let mut line = 0u32;
    let mut col = 0u32;

    for (i, c) in content.char_indices() {
        if line == position.line && col == position.character {
            return u32::try_from(i).ok();
        }
        if c == '\n' {
            if line == position.line {
                // Past the end of the line
                return u32::try_from(i).ok();
            }
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }

    if line == position.line {
        u32::try_from(content.len()).ok()
    } else {
        None
    }
}

fn to_position(line_col: LineCol) -> Position {
    Position {
        line: line_col.line,
        character: line_col.col,
    }
}

pub(crate) fn text_range_to_lsp(line_index: &LineIndex, range: TextRange) -> Range {
    let (start, end) = line_index.range(range);
    Range {
        start: to_position(start),
        end: to_position(end),
    }
}

pub(crate) fn location_to_lsp(location: &Location) -> Option<lsp::Location> {
    Some(lsp::Location {
        uri: from_index_uri(&location.uri)?,
        range: Range {
            start: to_position(location.start),
            end: to_position(location.end),
        },
    })
}

pub(crate) fn diagnostic_to_lsp(line_index: &LineIndex, diagnostic: &Diagnostic) -> lsp::Diagnostic {
    let severity = match diagnostic.severity {
        gml_hir::DiagnosticSeverity::Error => DiagnosticSeverity::ERROR,
        gml_hir::DiagnosticSeverity::Warning => DiagnosticSeverity::WARNING,
        gml_hir::DiagnosticSeverity::Info => DiagnosticSeverity::INFORMATION,
        gml_hir::DiagnosticSeverity::Hint => DiagnosticSeverity::HINT,
    };
    lsp::Diagnostic {
        range: text_range_to_lsp(line_index, diagnostic.range),
        severity: Some(severity),
        code: Some(NumberOrString::String(diagnostic.code.code().to_string())),
        source: Some(diagnostic.source.as_str().to_string()),
        message: diagnostic.message.clone(),
        ..Default::default()
    }
}

pub(crate) fn completion_kind_to_lsp(kind: CompletionKind) -> CompletionItemKind {
    match kind {
        CompletionKind::Function | CompletionKind::Script => CompletionItemKind::FUNCTION,
        CompletionKind::Object => CompletionItemKind::CLASS,
        CompletionKind::Macro => CompletionItemKind::CONSTANT,
        CompletionKind::Variable | CompletionKind::BuiltinVariable => CompletionItemKind::VARIABLE,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The identifier touching `offset`, with its byte range.
pub(crate) fn identifier_at(content: &str, offset: usize) -> Option<(&str, TextRange)> {
    let offset = offset.min(content.len());
    if !content.is_char_boundary(offset) {
        return None;
    }
    let start = content[..offset]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map_or(offset, |(i, _)| i);
    let end = content[offset..]
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map_or(content.len(), |(i, _)| offset + i);
    let word = &content[start..end];
    if word.is_empty() || word.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let range = TextRange::new(
        u32::try_from(start).ok()?.into(),
        u32::try_from(end).ok()?.into(),
    );
    Some((word, range))
}

/// The identifier characters typed immediately before `offset`.
pub(crate) fn identifier_prefix(content: &str, offset: usize) -> &str {
    let offset = offset.min(content.len());
    if !content.is_char_boundary(offset) {
        return "";
    }
    let start = content[..offset]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map_or(offset, |(i, _)| i);
    &content[start..offset]
}
