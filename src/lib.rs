//! An embeddable template engine for dynamic SQL and structured text.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Interpolation: `#{user.name}` formatted for the output mode, `${table}`
//!   inserted raw
//! - Conditionals: `<if test="user.age >= 18"> ... </if>`
//! - Multi-branch conditionals:
//!   `<choose><when test="a"> ... </when><otherwise> ... </otherwise></choose>`
//! - Loops:
//!   `<foreach collection="ids" open="(" separator=", " close=")">#{item}</foreach>`
//! - Comments: `<!-- kept or stripped -->`
//!
//! ### Engine
//!
//! - SQL mode escapes and quotes every `#{..}` value, JSON mode formats them
//!   as JSON literals
//! - Configurable handling of missing parameters: fail immediately, collect
//!   every missing path or render them as empty
//! - Render using any [`serde`] serializable values
//! - Register functions to call from expressions
//! - Every malformed template is reported as a typed [`Error`] pointing at the
//!   offending source, the engine never returns partial output
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the render
//! [`Options`] and registered functions. Templates are interpreted directly
//! from source on every render.
//!
//! ```
//! let engine = tagmold::Engine::new();
//! let result = engine.render(
//!     "SELECT * FROM users WHERE name = #{name}",
//!     serde_json::json!({ "name": "John Smith" }),
//! )?;
//! assert_eq!(result, "SELECT * FROM users WHERE name = John Smith");
//! # Ok::<(), tagmold::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Render dynamic SQL
//!
//! In [`Mode::Sql`] every `#{..}` value is rendered as an escaped SQL literal.
//!
//! ```
//! use tagmold::{Engine, Mode, Options};
//!
//! let engine = Engine::with_options(Options::builder().mode(Mode::Sql).build());
//!
//! let template = r#"
//! SELECT * FROM users
//! WHERE 1 = 1
//! <if test="name">AND name = #{name}</if>
//! <if test="ids.length">
//!   AND id IN <foreach collection="ids" open="(" separator=", " close=")">#{item}</foreach>
//! </if>
//! "#;
//!
//! let result = engine.render(template, serde_json::json!({ "name": "O'Brien", "ids": [1, 2] }))?;
//! assert!(result.contains(r"AND name = 'O\'Brien'"));
//! assert!(result.contains("AND id IN (1, 2)"));
//! # Ok::<(), tagmold::Error>(())
//! ```
//!
//! ### Render using structured data
//!
//! ```
//! #[derive(serde::Serialize)]
//! struct Context { user: User }
//!
//! #[derive(serde::Serialize)]
//! struct User { name: String, admin: bool }
//!
//! let ctx = Context { user: User { name: "John Smith".into(), admin: true } };
//!
//! let result = tagmold::Engine::new().render(
//!     r#"<choose><when test="user.admin">Hello admin ${user.name}</when><otherwise>Hello</otherwise></choose>"#,
//!     &ctx,
//! )?;
//!
//! assert_eq!(result, "Hello admin John Smith");
//! # Ok::<(), tagmold::Error>(())
//! ```
//!
//! ### Collect missing parameters
//!
//! ```
//! use tagmold::{Engine, Options};
//!
//! let options = Options::builder()
//!     .throw_on_missing_params(false)
//!     .collect_missing_params(true)
//!     .build();
//!
//! let err = Engine::with_options(options)
//!     .render("#{a} #{user.name} #{a}", serde_json::json!({ "user": {} }))
//!     .unwrap_err();
//!
//! assert_eq!(err.missing_params(), Some(&["a".to_owned(), "user.name".to_owned()][..]));
//! ```
//!
//! ### Call functions from expressions
//!
//! ```
//! let mut engine = tagmold::Engine::new();
//! engine.add_function("lower", |s: String| s.to_lowercase());
//!
//! let result = engine.render(
//!     r#"<if test="lower(name) == 'world'">Hello ${name}!</if>"#,
//!     serde_json::json!({ "name": "WORLD" }),
//! )?;
//!
//! assert_eq!(result, "Hello WORLD!");
//! # Ok::<(), tagmold::Error>(())
//! ```
//!
//! See the [`Function`] trait documentation for more information on
//! functions.

mod error;
mod expr;
mod functions;
mod markup;
mod options;
mod render;
mod types;
mod value;

use std::collections::BTreeMap;
use std::fmt;

pub use crate::error::{Error, ErrorKind};
pub use crate::functions::Function;
pub use crate::options::{Mode, Options, OptionsBuilder};
pub use crate::value::{to_value, Value};

use crate::functions::{FunctionArgs, FunctionFn, FunctionReturn};
use crate::render::Renderer;

/// A type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The rendering engine.
///
/// An engine holds the render options and registered functions. Rendering
/// only requires a shared reference so a single engine can be used to render
/// from many threads at once.
pub struct Engine<'engine> {
    options: Options,
    functions: BTreeMap<&'engine str, Box<FunctionFn>>,
    max_nesting_depth: usize,
}

impl<'engine> Default for Engine<'engine> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'engine> Engine<'engine> {
    /// Construct a new engine with the default options.
    #[inline]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Construct a new engine with custom options.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagmold::{Engine, Mode, Options};
    ///
    /// let options = Options::builder().mode(Mode::Json).trim(false).build();
    /// let engine = Engine::with_options(options);
    /// ```
    #[inline]
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            functions: BTreeMap::new(),
            max_nesting_depth: 64,
        }
    }

    /// Replace the options used for subsequent renders.
    #[inline]
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    /// Returns the options used for rendering.
    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Set the maximum number of nested control tags.
    ///
    /// Rendering a template that nests tags deeper than this fails with
    /// [`ErrorKind::MaxNestingDepth`]. Defaults to 64.
    #[inline]
    pub fn set_max_nesting_depth(&mut self, depth: usize) {
        self.max_nesting_depth = depth;
    }

    /// Add a new function to the engine.
    ///
    /// The function can be called from any expression, for example in an
    /// `<if>` test. Registering a function with an existing name replaces it.
    #[inline]
    pub fn add_function<F, R, A>(&mut self, name: &'engine str, f: F)
    where
        F: Function<R, A> + Send + Sync + 'static,
        R: FunctionReturn,
        A: FunctionArgs,
    {
        self.functions.insert(name, functions::new(f));
    }

    /// Render a template to a string using the provided value.
    ///
    /// The value must serialize to a map, its entries are the parameters
    /// available to the template.
    #[inline]
    pub fn render<S>(&self, source: &str, ctx: S) -> Result<String>
    where
        S: serde::Serialize,
    {
        self.render_from(source, &to_value(ctx)?)
    }

    /// Render a template to a string using the provided [`Value`].
    pub fn render_from(&self, source: &str, globals: &Value) -> Result<String> {
        tracing::debug!(len = source.len(), mode = ?self.options.mode, "rendering template");
        let result = Renderer::new(self, source, globals).render();
        match &result {
            Ok(s) => tracing::debug!(len = s.len(), "rendered template"),
            Err(err) => tracing::debug!(error = %err, "failed to render template"),
        }
        result
    }
}

impl fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("functions", &self.functions.keys())
            .field("max_nesting_depth", &self.max_nesting_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine<'_>>();
    }

    #[test]
    fn engine_debug() {
        let mut engine = Engine::new();
        engine.add_function("f", || 1);
        let s = format!("{engine:?}");
        assert!(s.starts_with("Engine { options: Options {"));
        assert!(s.ends_with("functions: [\"f\"] }"));
    }
}
