mod args;

use std::vec;

use crate::{Error, Result, Value};

pub type FunctionFn = dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static;

pub fn new<F, R, A>(f: F) -> Box<FunctionFn>
where
    F: Function<R, A> + Send + Sync + 'static,
    R: FunctionReturn,
    A: FunctionArgs,
{
    Box::new(move |args: Vec<Value>| -> Result<Value> {
        let args = A::from_values(args)?;
        let result = Function::call(&f, args);
        FunctionReturn::to_value(result)
    })
}

/// Represents any function that can be called from an expression.
///
/// This trait is used by the
/// [`Engine::add_function`][crate::Engine::add_function] method to abstract
/// over a variety of function and closure types. This includes functions with
/// variable argument types, return types and arity. A function can take up to
/// four arguments. The number and the type of the arguments are checked when
/// the function is called.
///
/// [`Function`] is implemented for functions that return any of the following
/// types.
///
/// - `R` where `R` implements `Into<Value>`
/// - `Result<R>` where `R` implements `Into<Value>`
///
/// [`Function`] is implemented for functions that take any of the following
/// owned types as arguments.
/// - [`bool`]
/// - [`i64`] and the other integer types
/// - [`f64`] and [`f32`]
/// - [`String`]
/// - [`Vec<Value>`]
/// - [`BTreeMap<String, Value>`][std::collections::BTreeMap]
/// - [`Value`]
/// - [`Option<T>`] of any of the above, receiving `None` for `null`
///
/// ## Examples
///
/// Consider the following template.
///
/// ```text
/// <if test="contains(roles, 'admin')">...</if>
/// ```
///
/// We could implement the `contains` function like this:
///
/// ```rust
/// use tagmold::{Engine, Value};
///
/// let mut engine = Engine::new();
/// engine.add_function("contains", contains);
///
/// fn contains(list: Vec<Value>, needle: String) -> bool {
///     list.contains(&Value::String(needle))
/// }
/// ```
pub trait Function<R, A>
where
    A: FunctionArgs,
{
    #[doc(hidden)]
    fn call(&self, args: A) -> R;
}

pub trait FunctionArgs: Sized {
    fn from_values(args: Vec<Value>) -> Result<Self>;
}

pub trait FunctionArg: Sized {
    fn from_value(v: Value) -> args::Result<Self>;
}

pub trait FunctionReturn {
    fn to_value(self) -> Result<Value>;
}

////////////////////////////////////////////////////////////////////////////////
// Function
////////////////////////////////////////////////////////////////////////////////

impl<Func, R> Function<R, ()> for Func
where
    Func: Fn() -> R,
    R: FunctionReturn,
{
    #[doc(hidden)]
    fn call(&self, (): ()) -> R {
        self()
    }
}

impl<Func, R, A> Function<R, (A,)> for Func
where
    Func: Fn(A) -> R,
    R: FunctionReturn,
    A: FunctionArg,
{
    #[doc(hidden)]
    fn call(&self, (a,): (A,)) -> R {
        self(a)
    }
}

impl<Func, R, A, B> Function<R, (A, B)> for Func
where
    Func: Fn(A, B) -> R,
    R: FunctionReturn,
    A: FunctionArg,
    B: FunctionArg,
{
    #[doc(hidden)]
    fn call(&self, (a, b): (A, B)) -> R {
        self(a, b)
    }
}

impl<Func, R, A, B, C> Function<R, (A, B, C)> for Func
where
    Func: Fn(A, B, C) -> R,
    R: FunctionReturn,
    A: FunctionArg,
    B: FunctionArg,
    C: FunctionArg,
{
    #[doc(hidden)]
    fn call(&self, (a, b, c): (A, B, C)) -> R {
        self(a, b, c)
    }
}

impl<Func, R, A, B, C, D> Function<R, (A, B, C, D)> for Func
where
    Func: Fn(A, B, C, D) -> R,
    R: FunctionReturn,
    A: FunctionArg,
    B: FunctionArg,
    C: FunctionArg,
    D: FunctionArg,
{
    #[doc(hidden)]
    fn call(&self, (a, b, c, d): (A, B, C, D)) -> R {
        self(a, b, c, d)
    }
}

////////////////////////////////////////////////////////////////////////////////
// FunctionArgs
////////////////////////////////////////////////////////////////////////////////

impl FunctionArgs for () {
    fn from_values(args: Vec<Value>) -> Result<Self> {
        check_args(&args, 0)?;
        Ok(())
    }
}

impl<A> FunctionArgs for (A,)
where
    A: FunctionArg,
{
    fn from_values(args: Vec<Value>) -> Result<Self> {
        check_args(&args, 1)?;
        let mut args = args.into_iter();
        Ok((get_arg(&mut args, 0)?,))
    }
}

impl<A, B> FunctionArgs for (A, B)
where
    A: FunctionArg,
    B: FunctionArg,
{
    fn from_values(args: Vec<Value>) -> Result<Self> {
        check_args(&args, 2)?;
        let mut args = args.into_iter();
        let a = get_arg(&mut args, 0)?;
        let b = get_arg(&mut args, 1)?;
        Ok((a, b))
    }
}

impl<A, B, C> FunctionArgs for (A, B, C)
where
    A: FunctionArg,
    B: FunctionArg,
    C: FunctionArg,
{
    fn from_values(args: Vec<Value>) -> Result<Self> {
        check_args(&args, 3)?;
        let mut args = args.into_iter();
        let a = get_arg(&mut args, 0)?;
        let b = get_arg(&mut args, 1)?;
        let c = get_arg(&mut args, 2)?;
        Ok((a, b, c))
    }
}

impl<A, B, C, D> FunctionArgs for (A, B, C, D)
where
    A: FunctionArg,
    B: FunctionArg,
    C: FunctionArg,
    D: FunctionArg,
{
    fn from_values(args: Vec<Value>) -> Result<Self> {
        check_args(&args, 4)?;
        let mut args = args.into_iter();
        let a = get_arg(&mut args, 0)?;
        let b = get_arg(&mut args, 1)?;
        let c = get_arg(&mut args, 2)?;
        let d = get_arg(&mut args, 3)?;
        Ok((a, b, c, d))
    }
}

fn check_args(args: &[Value], exp: usize) -> Result<()> {
    if args.len() == exp {
        Ok(())
    } else {
        let s = if exp == 1 { "" } else { "s" };
        Err(Error::from(format!(
            "expected {exp} argument{s}, found {}",
            args.len()
        )))
    }
}

fn get_arg<T>(args: &mut vec::IntoIter<Value>, i: usize) -> Result<T>
where
    T: FunctionArg,
{
    let v = args.next().unwrap_or_default();
    T::from_value(v).map_err(|err| err_expected_arg(err, i))
}

fn err_expected_arg(err: args::Error, i: usize) -> Error {
    let n = i + 1;
    let msg = match err {
        args::Error::Type(exp, got) => {
            format!("expected {exp} for argument {n}, found {got}")
        }
        args::Error::TryFromInt(ty, v) => {
            format!("argument {n} `{v}` is out of range for {ty}")
        }
    };
    Error::from(msg)
}

////////////////////////////////////////////////////////////////////////////////
// FunctionReturn
////////////////////////////////////////////////////////////////////////////////

impl<T> FunctionReturn for T
where
    T: Into<Value>,
{
    fn to_value(self) -> Result<Value> {
        Ok(self.into())
    }
}

impl<T> FunctionReturn for Result<T>
where
    T: Into<Value>,
{
    fn to_value(self) -> Result<Value> {
        self.map(Into::into)
    }
}
