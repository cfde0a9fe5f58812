//! Variable substitution in text.
//!
//! Text may contain `#{path}` markers, formatted according to the output
//! mode, and `${path}` markers which are always formatted raw. The content of
//! a marker must be a parameter path like `user.roles[0]`.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::expr;
use crate::render::{fmt, Renderer};
use crate::types::span::Span;
use crate::value::Key;
use crate::{Error, ErrorKind, Result};

/// An interpolation marker found in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker<'a> {
    /// The entire marker, e.g. `#{user.name}`.
    text: &'a str,
    /// The content between the braces, e.g. `user.name`.
    path: &'a str,
    /// Whether this is a `${..}` marker.
    raw: bool,
    /// The byte offset of the marker in the text.
    offset: usize,
}

impl Renderer<'_> {
    /// Substitutes all markers in a text token and appends the result.
    ///
    /// Each distinct marker is only evaluated once.
    pub(super) fn render_text(&self, buf: &mut String, text: &str, span: Span) -> Result<()> {
        let markers = scan(text);
        if markers.is_empty() {
            buf.push_str(text);
            return Ok(());
        }

        let mut resolved = BTreeMap::new();
        for m in &markers {
            if resolved.contains_key(m.text) {
                continue;
            }
            if parse_path(m.path).is_none() {
                return Err(Error::spanned(
                    ErrorKind::InvalidParameterReference {
                        reference: m.text.to_owned(),
                    },
                    self.source,
                    span,
                ));
            }
            let value =
                expr::evaluate(m.path, self).map_err(|err| err.with_span(self.source, span))?;
            let mut s = String::new();
            fmt::format(&mut s, self.engine.options.mode, m.raw, &value)?;
            resolved.insert(m.text, s);
        }

        let mut i = 0;
        for m in &markers {
            buf.push_str(&text[i..m.offset]);
            if let Some(s) = resolved.get(m.text) {
                buf.push_str(s);
            }
            i = m.offset + m.text.len();
        }
        buf.push_str(&text[i..]);
        Ok(())
    }
}

/// Finds all `#{..}` and `${..}` markers, in order.
fn scan(text: &str) -> Vec<Marker<'_>> {
    let bytes = text.as_bytes();
    let mut markers = Vec::new();
    let mut i = 0;
    while i + 1 < bytes.len() {
        let raw = match bytes[i] {
            b'#' => false,
            b'$' => true,
            _ => {
                i += 1;
                continue;
            }
        };
        if bytes[i + 1] != b'{' {
            i += 1;
            continue;
        }
        // Without a closing brace there can be no more markers.
        let Some(j) = text[i + 2..].find('}') else {
            break;
        };
        let end = i + 2 + j + 1;
        markers.push(Marker {
            text: &text[i..end],
            path: &text[i + 2..end - 1],
            raw,
            offset: i,
        });
        i = end;
    }
    markers
}

/// Parses a parameter path like `user.roles[0]`.
///
/// The path is a letter followed by letters, digits or underscores, followed
/// by any number of `.segment` or `[segment]` accessors where a segment is
/// one or more letters, digits or underscores. Segments consisting only of
/// digits are list indexes.
pub(super) fn parse_path(s: &str) -> Option<(&str, Vec<Key<'_>>)> {
    let is_segment = |c: char| c.is_ascii_alphanumeric() || c == '_';

    if !s.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let n = s.find(|c: char| !is_segment(c)).unwrap_or(s.len());
    let (name, mut rest) = s.split_at(n);

    let mut path = Vec::new();
    while !rest.is_empty() {
        let (segment, tail) = if let Some(r) = rest.strip_prefix('.') {
            let n = r.find(|c: char| !is_segment(c)).unwrap_or(r.len());
            r.split_at(n)
        } else if let Some(r) = rest.strip_prefix('[') {
            let n = r.find(']')?;
            (&r[..n], &r[n + 1..])
        } else {
            return None;
        };
        if segment.is_empty() || !segment.chars().all(is_segment) {
            return None;
        }
        let key = match segment.parse() {
            Ok(i) if segment.bytes().all(|b| b.is_ascii_digit()) => Key::Index(i),
            _ => Key::Name(Cow::Borrowed(segment)),
        };
        path.push(key);
        rest = tail;
    }
    Some((name, path))
}
