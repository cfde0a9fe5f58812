use indexmap::IndexMap;

use crate::markup::Token;
use crate::render::cursor::Cursor;
use crate::render::{Renderer, Until};
use crate::types::span::Span;
use crate::{Error, ErrorKind, Result};

/// The control tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    If,
    Choose,
    Foreach,
    /// Only valid directly inside a `<choose>`.
    When,
    /// Only valid directly inside a `<choose>`.
    Otherwise,
}

const FOREACH_ATTRIBUTES: &[&str] = &[
    "collection",
    "item",
    "index",
    "open",
    "close",
    "separator",
    "trim",
];

impl Tag {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "if" => Some(Self::If),
            "choose" => Some(Self::Choose),
            "foreach" => Some(Self::Foreach),
            "when" => Some(Self::When),
            "otherwise" => Some(Self::Otherwise),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Choose => "choose",
            Self::Foreach => "foreach",
            Self::When => "when",
            Self::Otherwise => "otherwise",
        }
    }

    /// The attributes the tag accepts.
    fn known_attributes(self) -> &'static [&'static str] {
        match self {
            Self::If | Self::When => &["test"],
            Self::Choose | Self::Otherwise => &[],
            Self::Foreach => FOREACH_ATTRIBUTES,
        }
    }
}

/// The attributes of an opening tag.
#[derive(Debug)]
pub struct Attrs {
    tag: Tag,
    open: Span,
    map: IndexMap<String, Attr>,
}

#[derive(Debug)]
pub struct Attr {
    pub value: String,
    pub span: Span,
}

impl Attrs {
    pub fn get(&self, name: &str) -> Option<&Attr> {
        self.map.get(name)
    }

    /// Returns the attribute or fails with a missing attribute error.
    pub fn require(&self, name: &str, source: &str) -> Result<&Attr> {
        self.map.get(name).ok_or_else(|| {
            Error::spanned(
                ErrorKind::MissingAttribute {
                    tag: self.tag.name().to_owned(),
                    attribute: name.to_owned(),
                },
                source,
                self.open,
            )
        })
    }
}

impl Renderer<'_> {
    /// Routes an opening tag to the matching processor.
    pub(crate) fn render_tag(
        &mut self,
        cursor: &mut dyn Cursor,
        buf: &mut String,
        emit: bool,
        name: &str,
        span: Span,
        until: Until,
    ) -> Result<()> {
        tracing::trace!(tag = name, emit, depth = self.depth, "dispatching tag");
        let max = self.engine.max_nesting_depth;
        if self.depth >= max {
            return Err(Error::spanned(ErrorKind::MaxNestingDepth { max }, self.source, span));
        }
        self.depth += 1;
        let result = match Tag::from_name(name) {
            Some(Tag::If) => self.render_if(cursor, buf, emit, span),
            Some(Tag::Choose) => self.render_choose(cursor, buf, emit, span),
            Some(Tag::Foreach) => self.render_foreach(cursor, buf, emit, span),
            Some(Tag::When | Tag::Otherwise) => Err(Error::spanned(
                ErrorKind::UnexpectedTag {
                    tag: name.to_owned(),
                    parent: Tag::Choose.name().to_owned(),
                    negative: false,
                },
                self.source,
                span,
            )),
            None => Err(Error::spanned(
                ErrorKind::UnknownTag {
                    tag: name.to_owned(),
                },
                self.source,
                span,
            )),
        };
        self.depth -= 1;
        result?;
        match until {
            Until::OwnClose => Ok(()),
            Until::End => self.render_rest(cursor, buf, emit),
        }
    }

    /// Reads the attributes of an opening tag up to and including its end.
    ///
    /// Unknown and blank attributes are rejected as they are encountered, a
    /// repeated attribute overrides the previous value.
    pub(crate) fn read_attrs(&self, cursor: &mut dyn Cursor, tag: Tag, open: Span) -> Result<Attrs> {
        let known = tag.known_attributes();
        let mut map = IndexMap::new();
        loop {
            let (token, span) = cursor.next();
            match token {
                Token::Attribute { name, value } => {
                    if known.is_empty() {
                        return Err(Error::spanned(
                            ErrorKind::UnexpectedAttribute {
                                tag: tag.name().to_owned(),
                            },
                            self.source,
                            span,
                        ));
                    }
                    if !known.contains(&name.as_str()) {
                        return Err(Error::spanned(
                            ErrorKind::UnknownAttribute {
                                tag: tag.name().to_owned(),
                                attribute: name,
                            },
                            self.source,
                            span,
                        ));
                    }
                    if value.trim().is_empty() {
                        return Err(self.err_attr_value(tag, name, None, span));
                    }
                    map.insert(name, Attr { value, span });
                }
                Token::OpeningTagEnd { self_closing: true } => {
                    return Err(Error::spanned(
                        ErrorKind::UnexpectedSelfClosingTag {
                            tag: tag.name().to_owned(),
                        },
                        self.source,
                        span,
                    ));
                }
                Token::OpeningTagEnd {
                    self_closing: false,
                } => return Ok(Attrs { tag, open, map }),
                Token::Done => {
                    return Err(Error::spanned(
                        ErrorKind::UnclosedTag {
                            tag: tag.name().to_owned(),
                        },
                        self.source,
                        open,
                    ));
                }
                tk => return Err(self.err_unexpected_token(&tk, span)),
            }
        }
    }

    /// Evaluates a `test` attribute.
    pub(crate) fn eval_test(&self, attr: &Attr) -> Result<bool> {
        let value = crate::expr::evaluate(&attr.value, self)
            .map_err(|err| err.with_span(self.source, attr.span))?;
        Ok(value.truthy())
    }

    pub(crate) fn err_attr_value(
        &self,
        tag: Tag,
        attribute: String,
        expected: Option<&'static str>,
        span: Span,
    ) -> Error {
        Error::spanned(
            ErrorKind::InvalidAttributeValue {
                tag: tag.name().to_owned(),
                attribute,
                expected,
            },
            self.source,
            span,
        )
    }
}
