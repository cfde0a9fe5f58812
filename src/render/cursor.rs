use crate::markup::{Token, Tokenizer};
use crate::types::span::Span;

/// A forward-only source of tokens shared by the tag processors.
///
/// A processor borrows the cursor for the duration of its call and returns
/// with it positioned on the token after its own closing tag.
pub trait Cursor {
    fn next(&mut self) -> (Token, Span);
}

impl Cursor for Tokenizer<'_> {
    fn next(&mut self) -> (Token, Span) {
        Tokenizer::next(self)
    }
}

/// Replays a buffered slice of tokens.
///
/// Yields [`Token::Done`] forever once the buffer is exhausted.
#[derive(Debug)]
pub struct Replay<'a> {
    tokens: &'a [(Token, Span)],
    i: usize,
}

impl<'a> Replay<'a> {
    pub fn new(tokens: &'a [(Token, Span)]) -> Self {
        Self { tokens, i: 0 }
    }
}

impl Cursor for Replay<'_> {
    fn next(&mut self) -> (Token, Span) {
        match self.tokens.get(self.i) {
            Some(t) => {
                self.i += 1;
                t.clone()
            }
            None => {
                let span = self.tokens.last().map(|(_, s)| *s).unwrap_or_default();
                (Token::Done, span)
            }
        }
    }
}
