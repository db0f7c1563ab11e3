//! Main parser implementation.

use crate::lexer::{lex, Token, TokenKind};
use crate::parser::event::Event;
use crate::parser::sink::Sink;
use crate::parser::source::Source;
use crate::parser::{Parse, ParseError};
use crate::syntax::SyntaxKind;
use drop_bomb::DropBomb;

/// Parses source text into a syntax tree.
///
/// Parsing never fails: malformed input yields a tree containing `Error`
/// nodes plus the list of recorded errors.
#[must_use]
pub fn parse(source: &str) -> Parse {
    let tokens = lex(source);
    let parser = Parser::new(&tokens, source);
    let (events, errors) = parser.parse();

    let green_node = Sink::new(&tokens, source, events).finish();

    Parse { green_node, errors }
}

/// The parser state.
pub(crate) struct Parser<'t, 'src> {
    pub(crate) source: Source<'t, 'src>,
    pub(crate) events: Vec<Event>,
    errors: Vec<ParseError>,
}

pub(crate) struct Marker {
    pos: usize,
    bomb: DropBomb,
}

impl Marker {
    pub(crate) fn complete(
        mut self,
        parser: &mut Parser<'_, '_>,
        kind: SyntaxKind,
    ) -> CompletedMarker {
        self.bomb.defuse();
        match parser.events.get_mut(self.pos) {
            Some(event @ Event::Placeholder) => {
                *event = Event::Start {
                    kind,
                    forward_parent: None,
                };
            }
            Some(Event::Start {
                kind: existing_kind,
                ..
            }) => {
                *existing_kind = kind;
            }
            _ => {}
        }
        parser.events.push(Event::Finish);
        CompletedMarker {
            pos: self.pos,
            kind,
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct CompletedMarker {
    pub(crate) pos: usize,
    pub(crate) kind: SyntaxKind,
}

impl CompletedMarker {
    pub(crate) fn precede(self, parser: &mut Parser<'_, '_>) -> Marker {
        let new_pos = parser.events.len();
        parser.events.push(Event::Placeholder);
        set_forward_parent(&mut parser.events, self.pos, new_pos);
        Marker {
            pos: new_pos,
            bomb: DropBomb::new("uncompleted marker"),
        }
    }
}

fn set_forward_parent(events: &mut [Event], from: usize, to: usize) {
    let mut current = from;
    loop {
        match &mut events[current] {
            Event::Start {
                forward_parent: Some(fp),
                ..
            } => {
                current += *fp as usize;
            }
            Event::Start { forward_parent, .. } => {
                #[allow(clippy::cast_possible_truncation)]
                let distance = (to - current) as u32;
                *forward_parent = Some(distance);
                break;
            }
            _ => break,
        }
    }
}

impl<'t, 'src> Parser<'t, 'src> {
    fn new(tokens: &'t [Token], source: &'src str) -> Self {
        Self {
            source: Source::new(tokens, source),
            events: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> (Vec<Event>, Vec<ParseError>) {
        self.start_node(SyntaxKind::SourceFile);

        while !self.at_end() {
            self.parse_top_level_statement();
        }

        self.finish_node();

        (self.events, self.errors)
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    pub(crate) fn current(&self) -> TokenKind {
        self.source.current()
    }

    pub(crate) fn current_text(&self) -> &'src str {
        self.source.current_text()
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.source.current() == kind
    }

    pub(crate) fn at_end(&self) -> bool {
        self.source.at_end()
    }

    pub(crate) fn bump(&mut self) {
        let kind = self.source.current();
        if kind == TokenKind::Eof {
            return;
        }
        self.events.push(Event::token(SyntaxKind::from(kind)));
        self.source.bump();
    }

    /// Bumps `kind` if it is the current token.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Bumps `kind` or records `expected <what>` at the current token.
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(&format!("expected {what}"));
        false
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            bomb: DropBomb::new("uncompleted marker"),
        }
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        self.events.push(Event::start(kind));
    }

    pub(crate) fn finish_node(&mut self) {
        self.events.push(Event::Finish);
    }

    pub(crate) fn error(&mut self, message: &str) {
        let range = self.source.current_range();
        self.errors.push(ParseError {
            message: message.to_string(),
            range,
        });
    }

    /// Wraps the current token in an `Error` node so the parser always
    /// makes progress after a failed expectation.
    pub(crate) fn error_and_bump(&mut self, message: &str) {
        self.error(message);
        if !self.at_end() {
            self.start_node(SyntaxKind::Error);
            self.bump();
            self.finish_node();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let parse = parse("");
        assert!(parse.ok());
        assert_eq!(parse.syntax().kind(), SyntaxKind::SourceFile);
    }

    #[test]
    fn test_parse_is_lossless() {
        let source = "/// @desc hi\nvar a = 1 // tail\n#region\nfoo(a)\n";
        let parse = parse(source);
        assert!(parse.ok(), "errors: {:?}", parse.errors());
        assert_eq!(parse.syntax().to_string(), source);
    }

    #[test]
    fn test_error_at_end_of_input_points_past_last_byte() {
        let source = "if (x ==";
        let parse = parse(source);
        assert!(!parse.ok());
        let first = &parse.errors()[0];
        assert_eq!(first.message, "expected expression");
        assert_eq!(u32::from(first.range.start()), 8);
        assert!(first.range.is_empty());
    }

    #[test]
    fn test_garbage_always_terminates() {
        let parse = parse(") ] } : , ? @@ else until case");
        assert!(!parse.ok());
        assert_eq!(
            parse.syntax().to_string(),
            ") ] } : , ? @@ else until case"
        );
    }

    #[test]
    fn test_missing_semicolons_are_accepted() {
        let parse = parse("a = 1\nb = 2\nshow_debug_message(a + b)");
        assert!(parse.ok(), "errors: {:?}", parse.errors());
    }
}
