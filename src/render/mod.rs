//! Renders a template by pulling tokens from a [`Cursor`] and interpreting the
//! control tags as they are encountered.
//!
//! There is no intermediate representation, the tag processors are mutually
//! recursive and share a single forward-only cursor. Each processor takes an
//! `emit` flag, when it is `false` the content is still fully validated but
//! nothing is evaluated and no output is produced.

mod choice;
mod condition;
mod cursor;
pub(crate) mod fmt;
mod foreach;
mod stack;
mod tag;
mod vars;

use std::cell::RefCell;

use indexmap::IndexSet;

use crate::expr::Env;
use crate::markup::{Token, Tokenizer};
use crate::render::cursor::Cursor;
use crate::render::stack::{Resolved, Stack};
use crate::render::tag::Tag;
use crate::types::span::Span;
use crate::value::{Key, ValueCow};
use crate::{Engine, Error, ErrorKind, Result, Value};

/// What a tag processor does after consuming its own closing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Until {
    /// Return to the caller.
    OwnClose,
    /// Keep rendering the rest of the stream as top-level content.
    End,
}

/// The state of a single render.
pub(crate) struct Renderer<'render> {
    engine: &'render Engine<'render>,

    /// The template source, used for error spans.
    source: &'render str,

    /// The variables currently in scope.
    stack: Stack<'render>,

    /// Missing parameter paths recorded in collect mode, in order of first
    /// occurrence.
    missing: RefCell<IndexSet<String>>,

    /// The number of control tags currently open.
    depth: usize,
}

impl<'render> Renderer<'render> {
    pub fn new(engine: &'render Engine<'render>, source: &'render str, globals: &'render Value) -> Self {
        Self {
            engine,
            source,
            stack: Stack::new(globals),
            missing: RefCell::new(IndexSet::new()),
            depth: 0,
        }
    }

    /// Renders the entire template.
    pub fn render(mut self) -> Result<String> {
        let engine = self.engine;
        let options = &engine.options;
        let mut tokens = Tokenizer::new(self.source, &options.html_entities);
        let mut buf = String::with_capacity(self.source.len());
        self.render_rest(&mut tokens, &mut buf, true)?;

        let missing = self.missing.into_inner();
        if !missing.is_empty() {
            return Err(Error::missing(missing.into_iter().collect()));
        }

        if options.trim {
            let trimmed = buf.trim();
            if trimmed.len() != buf.len() {
                buf = trimmed.to_owned();
            }
        }
        Ok(buf)
    }

    /// Renders top-level content until the end of the stream.
    fn render_rest(&mut self, cursor: &mut dyn Cursor, buf: &mut String, emit: bool) -> Result<()> {
        loop {
            let (token, span) = cursor.next();
            match token {
                Token::Start => {}
                Token::Text { content } => {
                    if emit {
                        self.render_text(buf, &content, span)?;
                    }
                }
                Token::Comment { text } => {
                    if emit {
                        self.render_comment(buf, &text);
                    }
                }
                Token::OpeningTagStart { name } => {
                    self.render_tag(cursor, buf, emit, &name, span, Until::OwnClose)?;
                }
                Token::ClosingTag { name } => {
                    return Err(Error::syntax(
                        format!("unexpected closing tag </{name}>"),
                        self.source,
                        span,
                    ));
                }
                Token::Done => return Ok(()),
                tk => return Err(self.err_unexpected_token(&tk, span)),
            }
        }
    }

    /// Renders the content of a tag up to and including its closing tag.
    ///
    /// `open` is the span of the opening tag, used to report an unbalanced tag.
    fn render_body(
        &mut self,
        cursor: &mut dyn Cursor,
        buf: &mut String,
        emit: bool,
        tag: Tag,
        open: Span,
    ) -> Result<()> {
        loop {
            let (token, span) = cursor.next();
            match token {
                Token::Start => {}
                Token::Text { content } => {
                    if emit {
                        self.render_text(buf, &content, span)?;
                    }
                }
                Token::Comment { text } => {
                    if emit {
                        self.render_comment(buf, &text);
                    }
                }
                Token::OpeningTagStart { name } => {
                    self.render_tag(cursor, buf, emit, &name, span, Until::OwnClose)?;
                }
                Token::ClosingTag { name } if name == tag.name() => return Ok(()),
                Token::ClosingTag { name } => {
                    return Err(self.err_closing_tag(name, tag, span));
                }
                Token::Done => {
                    let tag = tag.name().to_owned();
                    return Err(Error::spanned(ErrorKind::UnbalancedTag { tag }, self.source, open));
                }
                tk => return Err(self.err_unexpected_token(&tk, span)),
            }
        }
    }

    fn render_comment(&self, buf: &mut String, text: &str) {
        if self.engine.options.preserve_comments {
            buf.push_str("<!--");
            buf.push_str(text);
            buf.push_str("-->");
        }
    }

    /// Applies the missing value policy to an absent path.
    fn record_missing(&self, path: String) -> Result<()> {
        let options = &self.engine.options;
        if options.throw_on_missing_params {
            return Err(Error::missing(vec![path]));
        }
        if options.collect_missing_params {
            tracing::debug!(path = %path, "recording missing parameter");
            self.missing.borrow_mut().insert(path);
        }
        Ok(())
    }

    fn err_closing_tag(&self, found: String, tag: Tag, span: Span) -> Error {
        let expected = tag.name().to_owned();
        Error::spanned(
            ErrorKind::UnexpectedClosingTag { found, expected },
            self.source,
            span,
        )
    }

    fn err_unexpected_token(&self, tk: &Token, span: Span) -> Error {
        Error::syntax(format!("unexpected {}", tk.human()), self.source, span)
    }
}

impl Env for Renderer<'_> {
    fn lookup(&self, name: &str, path: &[Key<'_>]) -> Result<Option<ValueCow<'_>>> {
        match self.stack.resolve(name, path) {
            Resolved::Found(value) => Ok(Some(value)),
            Resolved::Absent(path) => {
                self.record_missing(path)?;
                Ok(None)
            }
        }
    }

    fn call(&self, name: &str, args: Vec<Value>) -> Option<Result<Value>> {
        let f = self.engine.functions.get(name)?;
        Some(f(args))
    }
}
