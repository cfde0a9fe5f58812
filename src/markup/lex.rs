use std::collections::BTreeMap;

use crate::markup::{decode, Token};
use crate::types::span::Span;

/// A tokenizer that splits the template source into text, comments and tags.
///
/// The tokenizer is a single forward pass over the source. Call
/// [`.next()`][Tokenizer::next] repeatedly, the first token is always
/// [`Token::Start`] and once the source is exhausted [`Token::Done`] is
/// returned forever.
///
/// Tokenization never fails. Anything that does not look like markup is
/// treated as text and an opening tag that is never finished simply ends the
/// stream without an [`Token::OpeningTagEnd`].
#[derive(Debug)]
pub struct Tokenizer<'a> {
    /// The original template source.
    source: &'a str,

    /// Additional named entities.
    entities: &'a BTreeMap<String, String>,

    /// A cursor over the template source.
    cursor: usize,

    /// The current state of the tokenizer.
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the start token has been emitted.
    Start,
    /// Within text.
    Content,
    /// Between the name of an opening tag and its end.
    Tag,
}

impl<'a> Tokenizer<'a> {
    /// Construct a new tokenizer.
    pub fn new(source: &'a str, entities: &'a BTreeMap<String, String>) -> Self {
        Self {
            source,
            entities,
            cursor: 0,
            state: State::Start,
        }
    }

    /// Returns the next token and its span.
    pub fn next(&mut self) -> (Token, Span) {
        let i = self.cursor;
        match self.state {
            State::Start => {
                self.state = State::Content;
                (Token::Start, Span::from(0..0))
            }
            _ if i >= self.source.len() => (Token::Done, Span::from(i..i)),
            State::Content => self.lex_content(i),
            State::Tag => self.lex_tag(i),
        }
    }

    fn lex_content(&mut self, i: usize) -> (Token, Span) {
        let rest = &self.source[i..];

        if let Some(body) = rest.strip_prefix("<!--") {
            // An unterminated comment runs to the end of the source.
            let (text, n) = match body.find("-->") {
                Some(j) => (&body[..j], i + 4 + j + 3),
                None => (body, self.source.len()),
            };
            self.cursor = n;
            let tk = Token::Comment {
                text: text.to_owned(),
            };
            return (tk, Span::from(i..n));
        }

        if let Some(body) = rest.strip_prefix("</") {
            if body.starts_with(is_name_start) {
                let name_len = body.find(|c| !is_name(c)).unwrap_or(body.len());
                let name = &body[..name_len];
                let after = &body[name_len..];
                let ws = after.len() - after.trim_start().len();
                let mut n = i + 2 + name_len + ws;
                if self.source[n..].starts_with('>') {
                    n += 1;
                }
                self.cursor = n;
                let tk = Token::ClosingTag {
                    name: name.to_owned(),
                };
                return (tk, Span::from(i..n));
            }
        }

        if let Some(body) = rest.strip_prefix('<') {
            if body.starts_with(is_name_start) {
                let name_len = body.find(|c| !is_name(c)).unwrap_or(body.len());
                let n = i + 1 + name_len;
                self.cursor = n;
                self.state = State::Tag;
                let tk = Token::OpeningTagStart {
                    name: body[..name_len].to_owned(),
                };
                return (tk, Span::from(i..n));
            }
        }

        // Plain text up to the next piece of markup, a `<` that does not start
        // markup is part of the text.
        let mut j = i + rest.chars().next().map_or(0, char::len_utf8);
        while j < self.source.len() {
            match self.source[j..].find('<') {
                Some(d) if is_markup(&self.source[j + d..]) => {
                    j += d;
                    break;
                }
                Some(d) => j += d + 1,
                None => j = self.source.len(),
            }
        }
        self.cursor = j;
        let tk = Token::Text {
            content: decode(&self.source[i..j], self.entities).into_owned(),
        };
        (tk, Span::from(i..j))
    }

    fn lex_tag(&mut self, i: usize) -> (Token, Span) {
        let rest = &self.source[i..];
        let ws = rest.len() - rest.trim_start().len();
        let i = i + ws;
        let rest = &rest[ws..];

        if rest.is_empty() {
            self.cursor = i;
            return (Token::Done, Span::from(i..i));
        }

        if rest.starts_with('>') {
            self.cursor = i + 1;
            self.state = State::Content;
            let tk = Token::OpeningTagEnd {
                self_closing: false,
            };
            return (tk, Span::from(i..i + 1));
        }

        if rest.starts_with("/>") {
            self.cursor = i + 2;
            self.state = State::Content;
            let tk = Token::OpeningTagEnd { self_closing: true };
            return (tk, Span::from(i..i + 2));
        }

        if rest.starts_with('/') {
            // A stray slash inside a tag is ignored.
            self.cursor = i + 1;
            return self.lex_tag(i + 1);
        }

        self.lex_attribute(i)
    }

    fn lex_attribute(&mut self, i: usize) -> (Token, Span) {
        // The following diagram helps describe the variable naming.
        //
        // name = "value"
        // ^   ^  ^      ^
        // i   j  k      n

        let rest = &self.source[i..];
        let name_len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '=' | '>' | '/'))
            .unwrap_or(rest.len())
            // Always make progress, even on something like `"`.
            .max(rest.chars().next().map_or(0, char::len_utf8));
        let j = i + name_len;
        let name = self.source[i..j].to_owned();

        let after = &self.source[j..];
        let trimmed = after.trim_start();
        let Some(value_part) = trimmed.strip_prefix('=') else {
            // An attribute without a value.
            self.cursor = j;
            let tk = Token::Attribute {
                name,
                value: String::new(),
            };
            return (tk, Span::from(i..j));
        };

        let ws = value_part.len() - value_part.trim_start().len();
        let k = self.source.len() - value_part.len() + ws;
        let value_part = &self.source[k..];

        let (raw, n) = match value_part.chars().next() {
            Some(q @ ('"' | '\'')) => match value_part[1..].find(q) {
                Some(d) => (&value_part[1..1 + d], k + 1 + d + 1),
                None => (&value_part[1..], self.source.len()),
            },
            Some(_) => {
                let d = value_part
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(value_part.len());
                (&value_part[..d], k + d)
            }
            None => ("", k),
        };

        self.cursor = n;
        let tk = Token::Attribute {
            name,
            value: decode(raw, self.entities).into_owned(),
        };
        (tk, Span::from(i..n))
    }
}

/// Whether `s` starts with a comment, an opening tag, or a closing tag.
fn is_markup(s: &str) -> bool {
    if s.starts_with("<!--") {
        return true;
    }
    let rest = s.strip_prefix("</").or_else(|| s.strip_prefix('<'));
    matches!(rest, Some(r) if r.starts_with(is_name_start))
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_name(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_empty() {
        let tokens = lex("");
        assert_eq!(tokens, []);
    }

    #[test]
    fn lex_text() {
        let tokens = lex("SELECT * FROM users WHERE a < 3");
        assert_eq!(
            tokens,
            [(text("SELECT * FROM users WHERE a < 3"), "SELECT * FROM users WHERE a < 3")]
        );
    }

    #[test]
    fn lex_comment() {
        let tokens = lex("a<!-- b -->c");
        assert_eq!(
            tokens,
            [
                (text("a"), "a"),
                (comment(" b "), "<!-- b -->"),
                (text("c"), "c"),
            ]
        );
    }

    #[test]
    fn lex_comment_eof() {
        let tokens = lex("a<!-- b");
        assert_eq!(tokens, [(text("a"), "a"), (comment(" b"), "<!-- b")]);
    }

    #[test]
    fn lex_tags() {
        let tokens = lex(r#"<if test="a &gt; 1">yes</if >"#);
        assert_eq!(
            tokens,
            [
                (open("if"), "<if"),
                (attr("test", "a > 1"), r#"test="a &gt; 1""#),
                (end(false), ">"),
                (text("yes"), "yes"),
                (close("if"), "</if >"),
            ]
        );
    }

    #[test]
    fn lex_attribute_forms() {
        let tokens = lex(r#"<foreach a='x' b = "y" c=z d />"#);
        assert_eq!(
            tokens,
            [
                (open("foreach"), "<foreach"),
                (attr("a", "x"), "a='x'"),
                (attr("b", "y"), r#"b = "y""#),
                (attr("c", "z"), "c=z"),
                (attr("d", ""), "d"),
                (end(true), "/>"),
            ]
        );
    }

    #[test]
    fn lex_unclosed_opening_tag() {
        let tokens = lex(r#"<if test="a""#);
        assert_eq!(
            tokens,
            [(open("if"), "<if"), (attr("test", "a"), r#"test="a""#)]
        );
    }

    #[test]
    fn lex_unterminated_attribute_value() {
        let tokens = lex(r#"<if test="a>b"#);
        assert_eq!(
            tokens,
            [(open("if"), "<if"), (attr("test", "a>b"), r#"test="a>b"#)]
        );
    }

    #[test]
    fn lex_not_markup() {
        let tokens = lex("a <= b < c </ d <1");
        assert_eq!(tokens, [(text("a <= b < c </ d <1"), "a <= b < c </ d <1")]);
    }

    #[test]
    fn lex_custom_entity() {
        let entities = BTreeMap::from([("le".to_owned(), "<=".to_owned())]);
        let mut tokenizer = Tokenizer::new("a &le; b", &entities);
        assert_eq!(tokenizer.next().0, Token::Start);
        assert_eq!(tokenizer.next().0, text("a <= b"));
    }

    #[test]
    fn lex_done_forever() {
        let entities = BTreeMap::new();
        let mut tokenizer = Tokenizer::new("<choose", &entities);
        assert_eq!(tokenizer.next().0, Token::Start);
        assert_eq!(tokenizer.next().0, open("choose"));
        for _ in 0..3 {
            assert_eq!(tokenizer.next().0, Token::Done);
        }
    }

    fn text(s: &str) -> Token {
        Token::Text {
            content: s.to_owned(),
        }
    }

    fn comment(s: &str) -> Token {
        Token::Comment { text: s.to_owned() }
    }

    fn open(s: &str) -> Token {
        Token::OpeningTagStart { name: s.to_owned() }
    }

    fn close(s: &str) -> Token {
        Token::ClosingTag { name: s.to_owned() }
    }

    fn attr(name: &str, value: &str) -> Token {
        Token::Attribute {
            name: name.to_owned(),
            value: value.to_owned(),
        }
    }

    fn end(self_closing: bool) -> Token {
        Token::OpeningTagEnd { self_closing }
    }

    #[track_caller]
    fn lex(source: &str) -> Vec<(Token, &str)> {
        let entities = BTreeMap::new();
        let mut tokenizer = Tokenizer::new(source, &entities);
        assert_eq!(tokenizer.next().0, Token::Start);
        let mut tokens = Vec::new();
        loop {
            match tokenizer.next() {
                (Token::Done, _) => break,
                (tk, sp) => tokens.push((tk, &source[sp])),
            }
        }
        for _ in 0..3 {
            assert_eq!(tokenizer.next().0, Token::Done);
        }
        tokens
    }
}
