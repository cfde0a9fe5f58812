use std::borrow::Cow;

use crate::value::{Key, ValueCow};
use crate::Value;

/// The variables visible at a point in the render.
///
/// The bottom of the stack is always the render parameters, each loop
/// iteration pushes its item and index bindings on top and pops them when the
/// iteration is done. Lookups search from the top so loop bindings shadow the
/// outer scope without ever modifying it.
#[cfg_attr(test, derive(Debug))]
pub struct Stack<'render> {
    stack: Vec<State<'render>>,
}

#[cfg_attr(test, derive(Debug))]
pub enum State<'render> {
    /// An entire scope of variables, always a map
    Scope(ValueCow<'render>),

    /// A single variable.
    Var(String, ValueCow<'render>),
}

/// The result of resolving a path.
#[derive(Debug)]
pub enum Resolved<'render> {
    Found(ValueCow<'render>),
    /// The path up to and including the first segment that does not exist.
    Absent(String),
}

impl<'render> Stack<'render> {
    pub fn new(globals: &'render Value) -> Self {
        Self {
            stack: vec![State::Scope(ValueCow::Borrowed(globals))],
        }
    }

    pub fn push_var(&mut self, name: &str, value: ValueCow<'render>) {
        self.stack.push(State::Var(name.to_owned(), value));
    }

    pub fn pop_var(&mut self) {
        debug_assert!(matches!(self.stack.last(), Some(State::Var(..))));
        self.stack.pop();
    }

    /// Resolves a path to a variable on the stack.
    ///
    /// Resolution stops at the first segment that does not exist. The null
    /// value counts as existing.
    pub fn resolve(&self, name: &str, path: &[Key<'_>]) -> Resolved<'render> {
        let first = Key::Name(Cow::Borrowed(name));
        for state in self.stack.iter().rev() {
            match state {
                State::Var(var, value) if var == name => return walk(value, None, name, path),
                State::Scope(scope) if contains(scope, name) => {
                    return walk(scope, Some(&first), name, path)
                }
                _ => {}
            }
        }
        Resolved::Absent(name.to_owned())
    }
}

fn contains(scope: &Value, name: &str) -> bool {
    matches!(scope, Value::Map(map) if map.contains_key(name))
}

fn walk<'render>(
    root: &ValueCow<'render>,
    first: Option<&Key<'_>>,
    name: &str,
    path: &[Key<'_>],
) -> Resolved<'render> {
    match root {
        // If the root is borrowed we can lookup the value and return a
        // reference with lifetime 'render
        ValueCow::Borrowed(v) => walk_from(ValueCow::Borrowed(*v), first, name, path),
        // Otherwise we only clone the value at the end of the path
        ValueCow::Owned(v) => match walk_from(ValueCow::Borrowed(v), first, name, path) {
            Resolved::Found(v) => Resolved::Found(ValueCow::Owned(v.into_owned())),
            Resolved::Absent(p) => Resolved::Absent(p),
        },
    }
}

fn walk_from<'a>(
    mut value: ValueCow<'a>,
    first: Option<&Key<'_>>,
    name: &str,
    path: &[Key<'_>],
) -> Resolved<'a> {
    let mut p = name.to_owned();
    if let Some(first) = first {
        value = match value.index(first) {
            Some(v) => v,
            None => return Resolved::Absent(p),
        };
    }
    for key in path {
        key.push_to(&mut p);
        value = match value.index(key) {
            Some(v) => v,
            None => return Resolved::Absent(p),
        };
    }
    Resolved::Found(value)
}
