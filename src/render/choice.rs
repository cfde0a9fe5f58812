use crate::markup::Token;
use crate::render::cursor::Cursor;
use crate::render::tag::Tag;
use crate::render::Renderer;
use crate::types::span::Span;
use crate::{Error, ErrorKind, Result};

impl Renderer<'_> {
    /// Renders a `<choose>` tag.
    ///
    /// Only `<when>` and `<otherwise>` tags and whitespace may appear directly
    /// inside. The first `<when>` with a truthy test is rendered, if there is
    /// none the `<otherwise>` is rendered. Every branch is consumed and
    /// validated regardless.
    pub(super) fn render_choose(
        &mut self,
        cursor: &mut dyn Cursor,
        buf: &mut String,
        emit: bool,
        open: Span,
    ) -> Result<()> {
        self.read_attrs(cursor, Tag::Choose, open)?;

        let mut whens = 0;
        let mut otherwise = false;
        let mut satisfied = false;

        loop {
            let (token, span) = cursor.next();
            match token {
                Token::Start => {}

                Token::Text { content } => {
                    if !content.trim().is_empty() {
                        return Err(Error::syntax(
                            format!("unexpected text `{}` inside <choose> tag", content.trim()),
                            self.source,
                            span,
                        ));
                    }
                    if emit {
                        buf.push_str(&content);
                    }
                }

                Token::Comment { .. } => {
                    return Err(Error::syntax(
                        "unexpected comment inside <choose> tag",
                        self.source,
                        span,
                    ));
                }

                Token::OpeningTagStart { name } => match Tag::from_name(&name) {
                    Some(Tag::When) => {
                        if otherwise {
                            return Err(Error::syntax(
                                "<when> tags must be declared before the <otherwise> tag",
                                self.source,
                                span,
                            ));
                        }
                        whens += 1;
                        let attrs = self.read_attrs(cursor, Tag::When, span)?;
                        let test = attrs.require("test", self.source)?;
                        let cond = emit && !satisfied && self.eval_test(test)?;
                        satisfied |= cond;
                        tracing::trace!(branch = whens, cond, "evaluated <when> tag");
                        self.render_body(cursor, buf, cond, Tag::When, span)?;
                    }
                    Some(Tag::Otherwise) => {
                        if otherwise {
                            return Err(Error::syntax(
                                "a <choose> tag can have only one <otherwise> tag",
                                self.source,
                                span,
                            ));
                        }
                        if whens == 0 {
                            return Err(Error::syntax(
                                "<otherwise> tag found with no previous <when> tags",
                                self.source,
                                span,
                            ));
                        }
                        otherwise = true;
                        self.read_attrs(cursor, Tag::Otherwise, span)?;
                        self.render_body(cursor, buf, emit && !satisfied, Tag::Otherwise, span)?;
                    }
                    _ => {
                        return Err(Error::spanned(
                            ErrorKind::UnexpectedTag {
                                tag: name,
                                parent: Tag::Choose.name().to_owned(),
                                negative: true,
                            },
                            self.source,
                            span,
                        ));
                    }
                },

                Token::ClosingTag { name } if name == Tag::Choose.name() => {
                    if whens == 0 {
                        return Err(Error::syntax(
                            "a <choose> tag must have at least one <when> tag",
                            self.source,
                            span,
                        ));
                    }
                    return Ok(());
                }

                Token::ClosingTag { name } => {
                    return Err(self.err_closing_tag(name, Tag::Choose, span));
                }

                Token::Done => {
                    return Err(Error::spanned(
                        ErrorKind::UnbalancedTag {
                            tag: Tag::Choose.name().to_owned(),
                        },
                        self.source,
                        open,
                    ));
                }

                tk => return Err(self.err_unexpected_token(&tk, span)),
            }
        }
    }
}
