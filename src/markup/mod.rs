//! The markup token source.
//!
//! Templates are tokenized into a flat stream of [`Token`]s, the tag
//! processors pull tokens from the stream one at a time and never see the raw
//! template text.

mod entity;
mod lex;

pub use crate::markup::entity::decode;
pub use crate::markup::lex::Tokenizer;

/// The unit yielded by the tokenizer.
///
/// Text and attribute values are already entity decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Always the first token in the stream.
    Start,
    /// Plain text between tags, e.g. `SELECT * FROM users`.
    Text { content: String },
    /// A comment, e.g. `<!--text-->`.
    Comment { text: String },
    /// The beginning of an opening tag, e.g. `<if`.
    OpeningTagStart { name: String },
    /// An attribute within an opening tag, e.g. `test="a > b"`.
    Attribute { name: String, value: String },
    /// The end of an opening tag, either `>` or `/>`.
    OpeningTagEnd { self_closing: bool },
    /// A closing tag, e.g. `</if>`.
    ClosingTag { name: String },
    /// The end of the stream, yielded forever once the source is exhausted.
    Done,
}

impl Token {
    pub fn human(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Text { .. } => "text",
            Self::Comment { .. } => "comment",
            Self::OpeningTagStart { .. } => "opening tag",
            Self::Attribute { .. } => "attribute",
            Self::OpeningTagEnd { .. } => "end of opening tag",
            Self::ClosingTag { .. } => "closing tag",
            Self::Done => "end of template",
        }
    }
}
