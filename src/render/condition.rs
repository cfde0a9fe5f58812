use crate::render::cursor::Cursor;
use crate::render::tag::Tag;
use crate::render::Renderer;
use crate::types::span::Span;
use crate::Result;

impl Renderer<'_> {
    /// Renders an `<if test="..">` tag.
    ///
    /// The body is always consumed and validated, it is only rendered if
    /// `emit` is set and the test is truthy.
    pub(super) fn render_if(
        &mut self,
        cursor: &mut dyn Cursor,
        buf: &mut String,
        emit: bool,
        open: Span,
    ) -> Result<()> {
        let attrs = self.read_attrs(cursor, Tag::If, open)?;
        let test = attrs.require("test", self.source)?;
        let cond = emit && self.eval_test(test)?;
        self.render_body(cursor, buf, cond, Tag::If, open)
    }
}
