//! Sink for converting parser events into a syntax tree.

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::syntax::SyntaxKind;

/// Builds a `rowan` green tree from parser events, re-inserting trivia.
pub struct Sink<'t, 'src> {
    tokens: &'t [Token],
    source: &'src str,
    events: Vec<Event>,
    cursor: usize,
    builder: rowan::GreenNodeBuilder<'static>,
}

impl<'t, 'src> Sink<'t, 'src> {
    pub fn new(tokens: &'t [Token], source: &'src str, events: Vec<Event>) -> Self {
        Self {
            tokens,
            source,
            events,
            cursor: 0,
            builder: rowan::GreenNodeBuilder::new(),
        }
    }

    /// Trivia is attached outside node boundaries: it is flushed before a
    /// node starts and before a token, but a finishing node leaves trailing
    /// trivia to its parent. The root takes whatever remains.
    pub fn finish(mut self) -> rowan::GreenNode {
        let last = self.events.len().saturating_sub(1);
        for i in 0..self.events.len() {
            match std::mem::replace(&mut self.events[i], Event::Placeholder) {
                Event::Start {
                    kind,
                    forward_parent,
                } => {
                    let mut kinds = vec![kind];
                    let mut idx = i;
                    let mut fp = forward_parent;

                    while let Some(fp_idx) = fp {
                        idx += fp_idx as usize;
                        if let Event::Start {
                            kind,
                            forward_parent,
                        } = std::mem::replace(&mut self.events[idx], Event::Placeholder)
                        {
                            kinds.push(kind);
                            fp = forward_parent;
                        } else {
                            break;
                        }
                    }

                    if i > 0 {
                        self.eat_trivia();
                    }
                    for kind in kinds.into_iter().rev() {
                        self.builder.start_node(kind.into());
                    }
                }
                Event::Token { kind } => {
                    self.eat_trivia();
                    self.token(kind);
                }
                Event::Finish => {
                    if i == last {
                        self.eat_trivia();
                    }
                    self.builder.finish_node();
                }
                Event::Placeholder => {}
            }
        }

        self.builder.finish()
    }

    fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor) {
            if !token.kind.is_trivia() {
                break;
            }
            self.token(SyntaxKind::from(token.kind));
        }
    }

    fn token(&mut self, kind: SyntaxKind) {
        if let Some(token) = self.tokens.get(self.cursor) {
            self.builder.token(kind.into(), &self.source[token.range]);
            self.cursor += 1;
        }
    }
}
