use crate::functions::FunctionArg;
use crate::value::{List, Map};
use crate::Value;

pub type Result<T> = std::result::Result<T, Error>;

pub enum Error {
    /// When there is a type mismatch.
    Type(
        /// Expected
        &'static str,
        /// Got
        &'static str,
    ),
    /// Failed to convert from i64 to the integer type.
    TryFromInt(
        /// Type
        &'static str,
        /// Value
        i64,
    ),
}

impl FunctionArg for bool {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Bool(b) => Ok(b),
            v => Err(Error::Type("bool", v.human())),
        }
    }
}

macro_rules! impl_for_int {
    ($($ty:ty)+) => {
        $(
            impl FunctionArg for $ty {
                fn from_value(v: Value) -> Result<Self> {
                    match v {
                        Value::Integer(i) => i.try_into().map_err(|_| {
                            Error::TryFromInt(stringify!($ty), i)
                        }),
                        v => Err(Error::Type(stringify!($ty), v.human())),
                    }
                }
            }
        )+
    };
}

impl_for_int! { u8 u16 u32 u64 usize i8 i16 i32 i64 isize }

macro_rules! impl_for_float {
    ($($ty:ty)+) => {
        $(
            impl FunctionArg for $ty {
                fn from_value(v: Value) -> Result<Self> {
                    match v {
                        Value::Float(f) => Ok(f as $ty),
                        Value::Integer(i) => Ok(i as $ty),
                        v => Err(Error::Type(stringify!($ty), v.human())),
                    }
                }
            }
        )+
    }
}

impl_for_float! { f32 f64 }

impl FunctionArg for String {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::String(s) => Ok(s),
            v => Err(Error::Type("string", v.human())),
        }
    }
}

impl FunctionArg for List<Value> {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::List(l) => Ok(l),
            v => Err(Error::Type("list", v.human())),
        }
    }
}

impl FunctionArg for Map<String, Value> {
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Map(m) => Ok(m),
            v => Err(Error::Type("map", v.human())),
        }
    }
}

impl FunctionArg for Value {
    fn from_value(v: Value) -> Result<Self> {
        Ok(v)
    }
}

impl<T> FunctionArg for Option<T>
where
    T: FunctionArg,
{
    fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::None => Ok(None),
            v => T::from_value(v).map(Some),
        }
    }
}
