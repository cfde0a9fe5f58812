use std::cmp::max;
use std::fmt;

use crate::types::span::Span;

/// An error that can occur during template rendering.
///
/// Every failure aborts the render, no partial output is ever returned. The
/// [`kind`][Error::kind] method can be used to programmatically inspect the
/// failure.
///
/// The [`Display`][std::fmt::Display] implementation prints a single line
/// message. When the error is associated with a region of the template and
/// the alternate flag is used (`{:#}`) a pretty message pointing at the
/// offending source is printed instead.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    span: Option<(String, Span)>,
}

/// The kind of an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A structural violation not covered by a more specific kind, for example
    /// an empty `<choose>` or a `<when>` following an `<otherwise>`.
    Syntax { reason: String },

    /// A tag that is not one of the control tags.
    UnknownTag { tag: String },

    /// A control tag used in a context where it is not allowed.
    ///
    /// When `negative` is `false` the tag must be used inside `parent`,
    /// otherwise it must *not* be used inside `parent`.
    UnexpectedTag {
        tag: String,
        parent: String,
        negative: bool,
    },

    /// A control tag written as `<tag />`.
    UnexpectedSelfClosingTag { tag: String },

    /// The template ended before the opening tag was finished.
    UnclosedTag { tag: String },

    /// The template ended before the closing tag was found.
    UnbalancedTag { tag: String },

    /// A closing tag that does not match the open tag.
    UnexpectedClosingTag { found: String, expected: String },

    /// A required attribute was not given.
    MissingAttribute { tag: String, attribute: String },

    /// An attribute that the tag does not know about.
    UnknownAttribute { tag: String, attribute: String },

    /// Attributes given to a tag that accepts none.
    UnexpectedAttribute { tag: String },

    /// A blank or wrongly shaped attribute value.
    InvalidAttributeValue {
        tag: String,
        attribute: String,
        expected: Option<&'static str>,
    },

    /// Malformed interpolation syntax, e.g. `#{ not a path }`, or a loop
    /// collection that does not reference a parameter.
    InvalidParameterReference { reference: String },

    /// One or more parameters referenced by the template do not exist.
    MissingParameterReference { paths: Vec<String> },

    /// The expression could not be parsed or evaluated.
    Expression { expression: String, reason: String },

    /// The render parameters could not be converted to a [`Value`][crate::Value].
    Parameters { reason: String },

    /// Tags are nested deeper than the engine allows.
    MaxNestingDepth { max: usize },

    /// A message returned from a registered function.
    Custom { reason: String },
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind, span: None }
    }

    pub(crate) fn spanned(kind: ErrorKind, source: &str, span: impl Into<Span>) -> Self {
        Self::new(kind).with_span(source, span)
    }

    pub(crate) fn syntax(reason: impl Into<String>, source: &str, span: impl Into<Span>) -> Self {
        let reason = reason.into();
        Self::spanned(ErrorKind::Syntax { reason }, source, span)
    }

    pub(crate) fn expression(expression: &str, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Expression {
            expression: expression.to_owned(),
            reason: reason.into(),
        })
    }

    pub(crate) fn missing(paths: Vec<String>) -> Self {
        Self::new(ErrorKind::MissingParameterReference { paths })
    }

    /// Attaches the template source and span, unless a span is already set.
    pub(crate) fn with_span(mut self, source: &str, span: impl Into<Span>) -> Self {
        if self.span.is_none() && !source.is_empty() {
            self.span = Some((source.to_owned(), span.into()));
        }
        self
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the missing parameter paths if this is a
    /// [`MissingParameterReference`][ErrorKind::MissingParameterReference]
    /// error.
    pub fn missing_params(&self) -> Option<&[String]> {
        match &self.kind {
            ErrorKind::MissingParameterReference { paths } => Some(paths),
            _ => None,
        }
    }

    pub(crate) fn is_missing(&self) -> bool {
        matches!(self.kind, ErrorKind::MissingParameterReference { .. })
    }
}

impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Self::new(ErrorKind::Parameters {
            reason: msg.to_string(),
        })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Parameters {
            reason: err.to_string(),
        })
    }
}

impl From<String> for Error {
    fn from(reason: String) -> Self {
        Self::new(ErrorKind::Custom { reason })
    }
}

impl From<&str> for Error {
    fn from(reason: &str) -> Self {
        Self::from(reason.to_owned())
    }
}

impl std::error::Error for Error {}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { reason } => write!(f, "{reason}"),
            Self::UnknownTag { tag } => write!(f, "unknown tag <{tag}>"),
            Self::UnexpectedTag {
                tag,
                parent,
                negative,
            } => {
                let not = if *negative { "not " } else { "" };
                write!(
                    f,
                    "unexpected tag <{tag}>, must {not}be used inside a <{parent}> tag"
                )
            }
            Self::UnexpectedSelfClosingTag { tag } => {
                write!(f, "unexpected self-closing <{tag}> tag")
            }
            Self::UnclosedTag { tag } => write!(f, "unclosed tag <{tag}>"),
            Self::UnbalancedTag { tag } => write!(f, "unbalanced tag <{tag}>"),
            Self::UnexpectedClosingTag { found, expected } => {
                write!(f, "unexpected closing tag </{found}>, expected </{expected}>")
            }
            Self::MissingAttribute { tag, attribute } => {
                write!(f, "the `{attribute}` attribute is mandatory for the <{tag}> tag")
            }
            Self::UnknownAttribute { tag, attribute } => {
                write!(f, "unknown attribute `{attribute}` on <{tag}> tag")
            }
            Self::UnexpectedAttribute { tag } => {
                write!(f, "attributes are not expected on a <{tag}> tag")
            }
            Self::InvalidAttributeValue {
                tag,
                attribute,
                expected,
            } => {
                write!(f, "invalid value on attribute `{attribute}` of tag <{tag}>")?;
                if let Some(expected) = expected {
                    write!(f, ", expected {expected}")?;
                }
                Ok(())
            }
            Self::InvalidParameterReference { reference } => {
                write!(f, "invalid parameter reference `{reference}`")
            }
            Self::MissingParameterReference { paths } => {
                let s = if paths.len() == 1 { "" } else { "s" };
                write!(f, "missing parameter reference{s} ")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "`{path}`")?;
                }
                Ok(())
            }
            Self::Expression { expression, reason } => {
                write!(f, "failed to evaluate expression `{expression}`: {reason}")
            }
            Self::Parameters { reason } => write!(f, "invalid parameters: {reason}"),
            Self::MaxNestingDepth { max } => write!(f, "reached maximum nesting depth ({max})"),
            Self::Custom { reason } => write!(f, "{reason}"),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => fmt_pretty(&self.kind, source, *span, f),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => {
                if f.alternate() {
                    fmt_pretty(&self.kind, source, *span, f)
                } else {
                    write!(f, "{} between bytes {} and {}", self.kind, span.m, span.n)
                }
            }
            None => write!(f, "{}", self.kind),
        }
    }
}

fn fmt_pretty(
    msg: &dyn fmt::Display,
    source: &str,
    span: Span,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let lines: Vec<_> = source.split_terminator('\n').collect();
    let (line, col) = to_line_col(&lines, span.m);
    let width = max(1, width(&source[span]));
    let code = lines
        .get(line)
        .or_else(|| lines.last())
        .copied()
        .unwrap_or_default();

    let num = (line + 1).to_string();
    let pad = num.len();
    let pipe = "|";
    let underline = "^".repeat(width);

    write!(
        f,
        "\n \
        {0:pad$} {pipe}\n \
        {num:>} {pipe} {code}\n \
        {0:pad$} {pipe} {underline:>width$} {msg}\n",
        "",
        pad = pad,
        pipe = pipe,
        num = num,
        code = code,
        underline = underline,
        width = col + width,
        msg = msg
    )
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, width(&line[..offset - n]));
        }
        n += len;
    }
    let last = lines.len().saturating_sub(1);
    (last, lines.last().map(|l| width(l)).unwrap_or(0))
}

#[cfg(feature = "unicode")]
fn width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(not(feature = "unicode"))]
fn width(s: &str) -> usize {
    s.chars().count()
}
