//! Defines a clone-on-write [`Value`].

use std::borrow::Cow;
use std::ops::Deref;

use crate::Value;

#[derive(Debug, Clone)]
pub enum ValueCow<'a> {
    Borrowed(&'a Value),
    Owned(Value),
}

/// A single segment of a parameter path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key<'a> {
    /// `.name`
    Name(Cow<'a, str>),
    /// `[0]`
    Index(usize),
}

impl Deref for ValueCow<'_> {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Borrowed(v) => v,
            Self::Owned(v) => v,
        }
    }
}

impl<'a> ValueCow<'a> {
    pub fn into_owned(self) -> Value {
        match self {
            Self::Borrowed(v) => v.clone(),
            Self::Owned(v) => v,
        }
    }

    /// Looks up a key in this value.
    ///
    /// Borrowed values stay borrowed, owned values only clone the looked up
    /// child. Returns `None` if the key does not exist.
    pub fn index(self, key: &Key<'_>) -> Option<ValueCow<'a>> {
        match self {
            Self::Borrowed(v) => match lookup(v, key)? {
                Lookup::Child(child) => Some(Self::Borrowed(child)),
                Lookup::Length(len) => Some(Self::Owned(Value::from(len))),
            },
            Self::Owned(v) => match lookup(&v, key)? {
                Lookup::Child(child) => Some(Self::Owned(child.clone())),
                Lookup::Length(len) => Some(Self::Owned(Value::from(len))),
            },
        }
    }

    /// Splits a list into its elements or a string into its characters.
    ///
    /// Returns `None` for any other value.
    pub fn into_items(self) -> Option<Vec<ValueCow<'a>>> {
        match self {
            Self::Borrowed(Value::List(list)) => Some(list.iter().map(Self::Borrowed).collect()),
            Self::Owned(Value::List(list)) => Some(list.into_iter().map(Self::Owned).collect()),
            Self::Borrowed(Value::String(s)) => Some(chars(s)),
            Self::Owned(Value::String(s)) => Some(chars(&s)),
            _ => None,
        }
    }
}

fn chars<'a>(s: &str) -> Vec<ValueCow<'a>> {
    s.chars()
        .map(|c| ValueCow::Owned(Value::String(c.to_string())))
        .collect()
}

enum Lookup<'a> {
    Child(&'a Value),
    Length(usize),
}

fn lookup<'a>(value: &'a Value, key: &Key<'_>) -> Option<Lookup<'a>> {
    match (value, key) {
        (Value::Map(map), Key::Name(name)) => map.get(&**name).map(Lookup::Child),
        (Value::Map(map), Key::Index(i)) => map.get(&i.to_string()).map(Lookup::Child),
        (Value::List(list), Key::Index(i)) => list.get(*i).map(Lookup::Child),
        (Value::List(list), Key::Name(name)) if &**name == "length" => {
            Some(Lookup::Length(list.len()))
        }
        (Value::String(s), Key::Name(name)) if &**name == "length" => {
            Some(Lookup::Length(s.chars().count()))
        }
        _ => None,
    }
}

impl Key<'_> {
    /// Appends this key to a path in source notation, e.g. `user.roles[0]`.
    pub fn push_to(&self, path: &mut String) {
        match self {
            Self::Name(name) => {
                path.push('.');
                path.push_str(name);
            }
            Self::Index(i) => {
                path.push('[');
                path.push_str(&i.to_string());
                path.push(']');
            }
        }
    }
}
