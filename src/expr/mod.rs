//! The expression language used in tag attributes and interpolations.
//!
//! Expressions are small JavaScript-like snippets, e.g. `user.age >= 18` or
//! `roles.length > 0 && contains(roles, 'admin')`. They are parsed into an
//! [`ast::Expr`][crate::types::ast::Expr] and evaluated against an [`Env`]
//! which resolves variables and calls functions.

mod eval;
mod lex;
mod parse;

use crate::value::{Key, ValueCow};
use crate::{Result, Value};

use crate::expr::parse::Parser;

/// The environment an expression is evaluated in.
pub trait Env {
    /// Resolves a variable path like `user.roles[0]`.
    ///
    /// Returns `Ok(None)` if the path does not exist and the missing value
    /// policy allows the render to continue.
    fn lookup(&self, name: &str, path: &[Key<'_>]) -> Result<Option<ValueCow<'_>>>;

    /// Calls a registered function, returns `None` if there is no function
    /// with the given name.
    fn call(&self, name: &str, args: Vec<Value>) -> Option<Result<Value>>;
}

/// Parses and evaluates an expression.
///
/// Lexing, parsing and evaluation failures are reported as
/// [`ErrorKind::Expression`][crate::ErrorKind::Expression] errors carrying the
/// expression source. Missing parameter errors raised by the environment are
/// propagated unchanged.
pub fn evaluate<'a, E>(source: &str, env: &'a E) -> Result<ValueCow<'a>>
where
    E: Env,
{
    let expr = Parser::new(source).parse()?;
    eval::Evaluator::new(source, env).eval(&expr)
}
