use crate::types::span::Span;
use crate::{Error, Result};

/// A lexer that tokenizes an expression.
///
/// The lexer is implemented as a fallible iterator, the parser should
/// repeatedly call [`.next()?`][Lexer::next] to get the next non-whitespace
/// token until [`None`] is returned.
pub struct Lexer<'source> {
    /// The expression source.
    pub source: &'source str,

    /// A cursor over the expression source.
    cursor: usize,
}

/// The unit yielded by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `!`
    Bang,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `==` or `===`
    EqEq,
    /// `!=` or `!==`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// An identifier or a keyword like `true` or `null`
    Ident,
    /// An integer or float literal, e.g. `19` or `0.5`.
    Number,
    /// A single or double quoted string literal, e.g. `'foo'`.
    String,
}

impl<'source> Lexer<'source> {
    /// Construct a new lexer.
    pub fn new(source: &'source str) -> Self {
        Self { source, cursor: 0 }
    }

    /// Returns the next non-whitespace token and its span.
    pub fn next(&mut self) -> Result<Option<(Token, Span)>> {
        let rest = &self.source[self.cursor..];
        let i = self.cursor + (rest.len() - rest.trim_start().len());
        self.cursor = i;

        let mut iter = self.source[i..].chars();
        let Some(c) = iter.next() else {
            return Ok(None);
        };
        let next = iter.next();

        let (tk, j) = match (c, next) {
            ('&', Some('&')) => (Token::AndAnd, i + 2),
            ('|', Some('|')) => (Token::OrOr, i + 2),
            ('=', Some('=')) => (Token::EqEq, self.eat_eq(i + 2)),
            ('!', Some('=')) => (Token::NotEq, self.eat_eq(i + 2)),
            ('<', Some('=')) => (Token::Le, i + 2),
            ('>', Some('=')) => (Token::Ge, i + 2),

            ('.', _) => (Token::Dot, i + 1),
            (',', _) => (Token::Comma, i + 1),
            ('(', _) => (Token::OpenParen, i + 1),
            (')', _) => (Token::CloseParen, i + 1),
            ('[', _) => (Token::OpenBracket, i + 1),
            (']', _) => (Token::CloseBracket, i + 1),
            ('!', _) => (Token::Bang, i + 1),
            ('+', _) => (Token::Plus, i + 1),
            ('-', _) => (Token::Minus, i + 1),
            ('*', _) => (Token::Star, i + 1),
            ('/', _) => (Token::Slash, i + 1),
            ('%', _) => (Token::Percent, i + 1),
            ('<', _) => (Token::Lt, i + 1),
            ('>', _) => (Token::Gt, i + 1),

            (q @ ('"' | '\''), _) => self.lex_string(q, i)?,
            (c, _) if c.is_ascii_digit() => self.lex_number(i),
            (c, _) if is_ident_start(c) => (Token::Ident, self.lex_while(i, is_ident)),

            (c, _) => {
                return Err(self.err_unexpected_character(c, i));
            }
        };

        self.cursor = j;
        Ok(Some((tk, Span::from(i..j))))
    }

    /// Accepts the third `=` of `===` and `!==`.
    fn eat_eq(&self, j: usize) -> usize {
        match self.source[j..].starts_with('=') {
            true => j + 1,
            false => j,
        }
    }

    fn lex_string(&self, quote: char, i: usize) -> Result<(Token, usize)> {
        let mut escaped = false;
        for (d, c) in self.source[i + 1..].char_indices() {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                c if c == quote => return Ok((Token::String, i + 1 + d + 1)),
                _ => {}
            }
        }
        Err(Error::expression(self.source, "undelimited string"))
    }

    fn lex_number(&self, i: usize) -> (Token, usize) {
        let j = self.lex_while(i, |c| c.is_ascii_digit() || c == '_');
        let j = match self.source[j..].strip_prefix('.') {
            Some(frac) if frac.starts_with(|c: char| c.is_ascii_digit()) => {
                self.lex_while(j + 1, |c| c.is_ascii_digit() || c == '_')
            }
            _ => j,
        };
        let j = match self.source[j..].strip_prefix(['e', 'E']) {
            Some(exp) => {
                let sign = usize::from(exp.starts_with(['+', '-']));
                match exp[sign..].starts_with(|c: char| c.is_ascii_digit()) {
                    true => self.lex_while(j + 1 + sign, |c| c.is_ascii_digit()),
                    false => j,
                }
            }
            None => j,
        };
        (Token::Number, j)
    }

    fn lex_while<P>(&self, i: usize, pred: P) -> usize
    where
        P: Fn(char) -> bool,
    {
        self.source[i..]
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map_or(self.source.len(), |(d, _)| i + d)
    }

    fn err_unexpected_character(&self, c: char, i: usize) -> Error {
        Error::expression(
            self.source,
            format!("unexpected character `{c}` at offset {i}"),
        )
    }
}

impl Token {
    pub fn human(&self) -> &'static str {
        match self {
            Self::Dot => "member access operator",
            Self::Comma => "comma",
            Self::OpenParen => "open parenthesis",
            Self::CloseParen => "close parenthesis",
            Self::OpenBracket => "open bracket",
            Self::CloseBracket => "close bracket",
            Self::Bang => "not operator",
            Self::Plus => "plus",
            Self::Minus => "minus",
            Self::Star => "multiplication operator",
            Self::Slash => "division operator",
            Self::Percent => "remainder operator",
            Self::AndAnd => "and operator",
            Self::OrOr => "or operator",
            Self::EqEq => "equality operator",
            Self::NotEq => "inequality operator",
            Self::Lt | Self::Le | Self::Gt | Self::Ge => "comparison operator",
            Self::Ident => "identifier",
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

#[cfg(feature = "unicode")]
fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || unicode_ident::is_xid_start(c)
}

#[cfg(feature = "unicode")]
fn is_ident(c: char) -> bool {
    c == '$' || unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
fn is_ident_start(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'a'..='z' | '_' | '$')
}

#[cfg(not(feature = "unicode"))]
fn is_ident(c: char) -> bool {
    matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '_' | '$')
}
