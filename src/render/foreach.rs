use crate::markup::Token;
use crate::render::cursor::{Cursor, Replay};
use crate::render::stack::Resolved;
use crate::render::tag::{Attr, Attrs, Tag};
use crate::render::{vars, Renderer};
use crate::types::span::Span;
use crate::value::ValueCow;
use crate::{Error, ErrorKind, Result, Value};

/// The validated attributes of a `<foreach>` tag.
struct Loop<'a> {
    collection: &'a Attr,
    item: &'a str,
    index: &'a str,
    open: &'a str,
    close: &'a str,
    separator: &'a str,
    trim: bool,
}

impl<'render> Renderer<'render> {
    /// Renders a `<foreach collection="..">` tag.
    ///
    /// The body is buffered up to and including the matching closing tag and
    /// then replayed once per item with the item and index bound in scope.
    pub(super) fn render_foreach(
        &mut self,
        cursor: &mut dyn Cursor,
        buf: &mut String,
        emit: bool,
        open: Span,
    ) -> Result<()> {
        let attrs = self.read_attrs(cursor, Tag::Foreach, open)?;
        let lp = self.loop_attrs(&attrs)?;
        let body = buffer_body(cursor);

        let items = if emit {
            self.loop_items(lp.collection)?
        } else {
            Vec::new()
        };

        // Validate the body once even if there is nothing to render.
        if items.is_empty() {
            let mut replay = Replay::new(&body);
            self.render_body(&mut replay, &mut String::new(), false, Tag::Foreach, open)?;
            if emit {
                buf.push_str(lp.open);
                buf.push_str(lp.close);
            }
            return Ok(());
        }

        buf.push_str(lp.open);
        for (i, item) in items.into_iter().enumerate() {
            tracing::trace!(index = i, item = lp.item, "rendering loop iteration");
            if i > 0 {
                buf.push_str(lp.separator);
            }
            self.stack.push_var(lp.item, item);
            self.stack.push_var(lp.index, ValueCow::Owned(Value::from(i)));
            let mut out = String::new();
            let mut replay = Replay::new(&body);
            let result = self.render_body(&mut replay, &mut out, true, Tag::Foreach, open);
            self.stack.pop_var();
            self.stack.pop_var();
            result?;
            if lp.trim {
                buf.push_str(out.trim());
            } else {
                buf.push_str(&out);
            }
        }
        buf.push_str(lp.close);
        Ok(())
    }

    /// Validates the shape of the loop attributes.
    ///
    /// The collection is only checked for syntax here, it is resolved when
    /// the loop is rendered.
    fn loop_attrs<'a>(&self, attrs: &'a Attrs) -> Result<Loop<'a>> {
        let collection = attrs.require("collection", self.source)?;
        if vars::parse_path(&collection.value).is_none() {
            return Err(self.err_collection(collection));
        }

        let ident = move |name: &str, default: &'a str| -> Result<&'a str> {
            match attrs.get(name) {
                None => Ok(default),
                Some(attr) if is_identifier(&attr.value) => Ok(attr.value.as_str()),
                Some(attr) => Err(self.err_attr_value(
                    Tag::Foreach,
                    name.to_owned(),
                    Some("an identifier"),
                    attr.span,
                )),
            }
        };
        let item = ident("item", "item")?;
        let index = ident("index", "index")?;

        let trim = match attrs.get("trim") {
            None => false,
            Some(attr) => match attr.value.as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(self.err_attr_value(
                        Tag::Foreach,
                        "trim".to_owned(),
                        Some("true or false"),
                        attr.span,
                    ));
                }
            },
        };

        let text = move |name: &str| {
            attrs
                .get(name)
                .map(|attr| attr.value.as_str())
                .unwrap_or("")
        };

        Ok(Loop {
            collection,
            item,
            index,
            open: text("open"),
            close: text("close"),
            separator: text("separator"),
            trim,
        })
    }

    /// Resolves the loop collection and splits it into items.
    ///
    /// The collection must exist, the missing value policy does not apply.
    fn loop_items(&self, collection: &Attr) -> Result<Vec<ValueCow<'render>>> {
        let (name, path) = vars::parse_path(&collection.value)
            .ok_or_else(|| self.err_collection(collection))?;
        match self.stack.resolve(name, &path) {
            Resolved::Found(value) => value.into_items().ok_or_else(|| {
                self.err_attr_value(
                    Tag::Foreach,
                    "collection".to_owned(),
                    Some("iterable"),
                    collection.span,
                )
            }),
            Resolved::Absent(_) => Err(self.err_collection(collection)),
        }
    }

    fn err_collection(&self, collection: &Attr) -> Error {
        Error::spanned(
            ErrorKind::InvalidParameterReference {
                reference: collection.value.clone(),
            },
            self.source,
            collection.span,
        )
    }
}

/// Buffers the loop body up to and including the matching closing tag.
///
/// Stops early at the end of the stream, replaying the buffer then reports
/// the unbalanced tag.
fn buffer_body(cursor: &mut dyn Cursor) -> Vec<(Token, Span)> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    loop {
        let (token, span) = cursor.next();
        let open = matches!(&token, Token::OpeningTagStart { name } if name == "foreach");
        let close = matches!(&token, Token::ClosingTag { name } if name == "foreach");
        let done = token == Token::Done;
        tokens.push((token, span));
        if done || (close && depth == 0) {
            return tokens;
        }
        if open {
            depth += 1;
        } else if close {
            depth -= 1;
        }
    }
}

/// A letter followed by letters, digits or underscores.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
