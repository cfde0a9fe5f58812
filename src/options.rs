use std::collections::BTreeMap;

use serde::Deserialize;

/// The render configuration.
///
/// Use [`Options::default()`] to get the default configuration and
/// [`Options::builder()`] to create a custom one. Options can also be
/// deserialized, any field that is not present falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// How `#{..}` interpolations are formatted.
    pub mode: Mode,

    /// Fail on the first parameter reference that does not exist.
    pub throw_on_missing_params: bool,

    /// Collect every missing parameter reference and fail once at the end of
    /// the render. Only takes effect when `throw_on_missing_params` is off.
    pub collect_missing_params: bool,

    /// Trim leading and trailing whitespace from the output.
    pub trim: bool,

    /// Emit `<!-- .. -->` comments in the output.
    pub preserve_comments: bool,

    /// Additional named entities decoded in text and attribute values, e.g.
    /// `"le" => "<="` makes `&le;` decode to `<=`.
    pub html_entities: BTreeMap<String, String>,
}

/// The output mode for `#{..}` interpolations.
///
/// `${..}` interpolations are always emitted raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Values are emitted in their plain string form.
    #[default]
    Default,
    /// Values are emitted as escaped SQL literals.
    Sql,
    /// Values are emitted as JSON literals.
    Json,
}

/// A builder for the render configuration.
///
/// This struct is typically created using [`Options::builder()`].
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    options: Options,
}

impl Default for Options {
    /// Returns the default render configuration.
    ///
    /// This is equivalent to the following.
    /// ```
    /// use tagmold::{Mode, Options};
    ///
    /// let options = Options::builder()
    ///     .mode(Mode::Default)
    ///     .throw_on_missing_params(true)
    ///     .collect_missing_params(false)
    ///     .trim(true)
    ///     .preserve_comments(true)
    ///     .build();
    /// assert_eq!(options, Options::default());
    /// ```
    #[inline]
    fn default() -> Self {
        Self {
            mode: Mode::Default,
            throw_on_missing_params: true,
            collect_missing_params: false,
            trim: true,
            preserve_comments: true,
            html_entities: BTreeMap::new(),
        }
    }
}

impl Options {
    /// Create a new options builder.
    ///
    /// # Examples
    ///
    /// ```
    /// let options = tagmold::Options::builder()
    ///     .mode(tagmold::Mode::Sql)
    ///     .throw_on_missing_params(false)
    ///     .build();
    /// ```
    #[inline]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}

impl OptionsBuilder {
    /// Creates a new builder starting from the default options.
    #[inline]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            options: Options::default(),
        }
    }

    /// Set the output mode.
    #[inline]
    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.options.mode = mode;
        self
    }

    /// Set whether to fail on the first missing parameter reference.
    #[inline]
    pub fn throw_on_missing_params(&mut self, yes: bool) -> &mut Self {
        self.options.throw_on_missing_params = yes;
        self
    }

    /// Set whether to collect missing parameter references and report them
    /// all at the end of the render.
    #[inline]
    pub fn collect_missing_params(&mut self, yes: bool) -> &mut Self {
        self.options.collect_missing_params = yes;
        self
    }

    /// Set whether to trim the output.
    #[inline]
    pub fn trim(&mut self, yes: bool) -> &mut Self {
        self.options.trim = yes;
        self
    }

    /// Set whether to keep comments in the output.
    #[inline]
    pub fn preserve_comments(&mut self, yes: bool) -> &mut Self {
        self.options.preserve_comments = yes;
        self
    }

    /// Add a named entity, `name` is given without the surrounding `&` and
    /// `;`.
    ///
    /// # Panics
    ///
    /// If the name is empty.
    #[inline]
    pub fn html_entity(&mut self, name: &str, replacement: &str) -> &mut Self {
        assert!(!name.is_empty());
        self.options
            .html_entities
            .insert(name.to_owned(), replacement.to_owned());
        self
    }

    /// Builds the options.
    #[inline]
    pub fn build(&self) -> Options {
        self.options.clone()
    }
}
