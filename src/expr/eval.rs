use std::borrow::Cow;
use std::cmp::Ordering;

use crate::expr::Env;
use crate::render::fmt;
use crate::types::ast::{self, BinaryOp, UnaryOp};
use crate::value::{Key, ValueCow};
use crate::{Error, Result, Value};

/// Walks an expression AST and computes its value.
pub struct Evaluator<'s, 'a, E> {
    source: &'s str,
    env: &'a E,
}

impl<'s, 'a, E> Evaluator<'s, 'a, E>
where
    E: Env,
{
    pub fn new(source: &'s str, env: &'a E) -> Self {
        Self { source, env }
    }

    pub fn eval(&self, expr: &ast::Expr) -> Result<ValueCow<'a>> {
        match expr {
            ast::Expr::Literal(lit) => Ok(ValueCow::Owned(lit.value.clone())),

            ast::Expr::Var(var) => {
                let mut keys = Vec::with_capacity(var.path.len());
                for access in &var.path {
                    keys.push(self.eval_key(access)?);
                }
                let value = self.env.lookup(&var.name.name, &keys)?;
                Ok(value.unwrap_or(ValueCow::Owned(Value::None)))
            }

            ast::Expr::Member(member) => {
                let receiver = self.eval(&member.receiver)?;
                let key = self.eval_key(&member.access)?;
                Ok(receiver
                    .index(&key)
                    .unwrap_or(ValueCow::Owned(Value::None)))
            }

            ast::Expr::Call(call) => {
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval(arg)?.into_owned());
                }
                let name = &call.name.name;
                match self.env.call(name, args) {
                    Some(Ok(value)) => Ok(ValueCow::Owned(value)),
                    Some(Err(err)) if err.is_missing() => Err(err),
                    Some(Err(err)) => Err(self.err(format!("call to `{name}` failed: {err}"))),
                    None => Err(self.err(format!("unknown function `{name}`"))),
                }
            }

            ast::Expr::Unary(unary) => {
                let value = self.eval(&unary.expr)?;
                let value = match (unary.op, &*value) {
                    (UnaryOp::Not, v) => Value::Bool(!v.truthy()),
                    (UnaryOp::Neg, Value::Integer(i)) => match i.checked_neg() {
                        Some(i) => Value::Integer(i),
                        None => Value::Float(-(*i as f64)),
                    },
                    (UnaryOp::Neg, Value::Float(f)) => Value::Float(-f),
                    (UnaryOp::Neg, v) => {
                        return Err(self.err(format!("cannot negate {}", v.human())));
                    }
                };
                Ok(ValueCow::Owned(value))
            }

            ast::Expr::Binary(binary) => {
                let value = match binary.op {
                    BinaryOp::Or => {
                        let b = self.eval(&binary.lhs)?.truthy() || self.eval(&binary.rhs)?.truthy();
                        Value::Bool(b)
                    }
                    BinaryOp::And => {
                        let b = self.eval(&binary.lhs)?.truthy() && self.eval(&binary.rhs)?.truthy();
                        Value::Bool(b)
                    }
                    op => {
                        let lhs = self.eval(&binary.lhs)?;
                        let rhs = self.eval(&binary.rhs)?;
                        self.binary(op, &lhs, &rhs)?
                    }
                };
                Ok(ValueCow::Owned(value))
            }
        }
    }

    fn eval_key<'e>(&self, access: &'e ast::Access) -> Result<Key<'e>> {
        match access {
            ast::Access::Key(ident) => Ok(Key::Name(Cow::Borrowed(&ident.name))),
            ast::Access::Index(i) => Ok(Key::Index(*i)),
            ast::Access::Dynamic(expr) => match &*self.eval(expr)? {
                Value::Integer(i) if *i >= 0 => match usize::try_from(*i) {
                    Ok(i) => Ok(Key::Index(i)),
                    Err(_) => Err(self.err(format!("index `{i}` is out of range"))),
                },
                Value::Float(f) if *f >= 0.0 && f.fract() == 0.0 && *f <= usize::MAX as f64 => {
                    Ok(Key::Index(*f as usize))
                }
                Value::String(s) => Ok(Key::Name(Cow::Owned(s.clone()))),
                v => Err(self.err(format!("cannot index using {}", v.human()))),
            },
        }
    }

    fn binary(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
        let value = match op {
            BinaryOp::Eq => Value::Bool(loose_eq(lhs, rhs)),
            BinaryOp::Ne => Value::Bool(!loose_eq(lhs, rhs)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                Value::Bool(self.compare(op, lhs, rhs)?)
            }
            BinaryOp::Add if is_string(lhs) || is_string(rhs) => {
                let mut s = fmt::to_plain(lhs);
                fmt::plain(&mut s, rhs);
                Value::String(s)
            }
            op => match (lhs, rhs) {
                (Value::Integer(a), Value::Integer(b)) => self.integer(op, *a, *b)?,
                _ => match (as_f64(lhs), as_f64(rhs)) {
                    (Some(a), Some(b)) => self.float(op, a, b)?,
                    _ => return Err(self.err_operands(op, lhs, rhs)),
                },
            },
        };
        Ok(value)
    }

    fn compare(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<bool> {
        let ord = match (lhs, rhs) {
            (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            _ => match (as_f64(lhs), as_f64(rhs)) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => return Err(self.err_operands(op, lhs, rhs)),
            },
        };
        // Comparisons involving `NaN` are always false.
        let Some(ord) = ord else {
            return Ok(false);
        };
        Ok(match op {
            BinaryOp::Lt => ord == Ordering::Less,
            BinaryOp::Le => ord != Ordering::Greater,
            BinaryOp::Gt => ord == Ordering::Greater,
            _ => ord != Ordering::Less,
        })
    }

    fn integer(&self, op: BinaryOp, a: i64, b: i64) -> Result<Value> {
        let checked = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div if b == 0 => return Err(self.err("division by zero")),
            BinaryOp::Div if a.checked_rem(b) != Some(0) => None,
            BinaryOp::Div => a.checked_div(b),
            BinaryOp::Rem if b == 0 => return Err(self.err("division by zero")),
            BinaryOp::Rem => Some(a.checked_rem(b).unwrap_or(0)),
            _ => None,
        };
        match checked {
            Some(i) => Ok(Value::Integer(i)),
            // Overflow or an inexact division, fallback to floating point.
            None => self.float(op, a as f64, b as f64),
        }
    }

    fn float(&self, op: BinaryOp, a: f64, b: f64) -> Result<Value> {
        let f = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div | BinaryOp::Rem if b == 0.0 => {
                return Err(self.err("division by zero"));
            }
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            op => return Err(self.err(format!("`{}` is not arithmetic", op.human()))),
        };
        Ok(Value::Float(f))
    }

    fn err(&self, reason: impl Into<String>) -> Error {
        Error::expression(self.source, reason)
    }

    fn err_operands(&self, op: BinaryOp, lhs: &Value, rhs: &Value) -> Error {
        self.err(format!(
            "cannot apply `{}` to {} and {}",
            op.human(),
            lhs.human(),
            rhs.human()
        ))
    }
}

/// Equality where integers and floats compare numerically.
fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
            *a as f64 == *b
        }
        _ => lhs == rhs,
    }
}

fn is_string(v: &Value) -> bool {
    matches!(v, Value::String(_))
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::expr::evaluate;

    /// Resolves variables from a map and records every missing path.
    struct TestEnv {
        globals: Value,
        missing: RefCell<Vec<String>>,
    }

    impl Env for TestEnv {
        fn lookup(&self, name: &str, path: &[Key<'_>]) -> Result<Option<ValueCow<'_>>> {
            let mut value = ValueCow::Borrowed(&self.globals);
            let mut p = name.to_owned();
            value = match value.index(&Key::Name(Cow::Borrowed(name))) {
                Some(v) => v,
                None => {
                    self.missing.borrow_mut().push(p);
                    return Ok(None);
                }
            };
            for key in path {
                key.push_to(&mut p);
                value = match value.index(key) {
                    Some(v) => v,
                    None => {
                        self.missing.borrow_mut().push(p);
                        return Ok(None);
                    }
                };
            }
            Ok(Some(value))
        }

        fn call(&self, name: &str, args: Vec<Value>) -> Option<Result<Value>> {
            match name {
                "len" => Some(Ok(Value::from(args.len()))),
                "fail" => Some(Err(Error::from("boom"))),
                _ => None,
            }
        }
    }

    fn env() -> TestEnv {
        let globals = serde_json::json!({
            "a": 1,
            "b": 2.5,
            "s": "foo",
            "empty": "",
            "list": [10, 20, 30],
            "user": { "name": "John", "roles": ["admin", "dev"] },
            "nil": null,
            "min": i64::MIN,
        });
        TestEnv {
            globals: Value::from(globals),
            missing: RefCell::new(Vec::new()),
        }
    }

    fn eval(source: &str) -> Result<Value> {
        evaluate(source, &env()).map(ValueCow::into_owned)
    }

    #[test]
    fn eval_literals() {
        assert_eq!(eval("1").unwrap(), Value::Integer(1));
        assert_eq!(eval("1.5").unwrap(), Value::Float(1.5));
        assert_eq!(eval("'x'").unwrap(), Value::from("x"));
        assert_eq!(eval("null").unwrap(), Value::None);
        assert_eq!(eval("true").unwrap(), Value::Bool(true));
    }

    #[test]
    fn eval_paths() {
        assert_eq!(eval("user.name").unwrap(), Value::from("John"));
        assert_eq!(eval("user.roles[1]").unwrap(), Value::from("dev"));
        assert_eq!(eval("user['roles'].0").unwrap(), Value::from("admin"));
        assert_eq!(eval("list[a + 1]").unwrap(), Value::Integer(30));
        assert_eq!(eval("user.roles.length").unwrap(), Value::Integer(2));
        assert_eq!(eval("s.length").unwrap(), Value::Integer(3));
    }

    #[test]
    fn eval_missing_paths_recorded() {
        let env = env();
        let value = evaluate("user.address.city || x", &env).unwrap();
        assert_eq!(*value, Value::Bool(false));
        assert_eq!(*env.missing.borrow(), ["user.address", "x"]);
    }

    #[test]
    fn eval_null_is_present() {
        let env = env();
        let value = evaluate("nil == null", &env).unwrap();
        assert_eq!(*value, Value::Bool(true));
        assert!(env.missing.borrow().is_empty());
    }

    #[test]
    fn eval_logic() {
        assert_eq!(eval("a && s").unwrap(), Value::Bool(true));
        assert_eq!(eval("a && empty").unwrap(), Value::Bool(false));
        assert_eq!(eval("!list").unwrap(), Value::Bool(false));
        assert_eq!(eval("empty || a").unwrap(), Value::Bool(true));
    }

    #[test]
    fn eval_short_circuit() {
        let env = env();
        evaluate("a || missing", &env).unwrap();
        evaluate("empty && missing", &env).unwrap();
        assert!(env.missing.borrow().is_empty());
    }

    #[test]
    fn eval_comparison() {
        assert_eq!(eval("a == 1.0").unwrap(), Value::Bool(true));
        assert_eq!(eval("s === 'foo'").unwrap(), Value::Bool(true));
        assert_eq!(eval("s != 'bar'").unwrap(), Value::Bool(true));
        assert_eq!(eval("a < b").unwrap(), Value::Bool(true));
        assert_eq!(eval("b >= 2.5").unwrap(), Value::Bool(true));
        assert_eq!(eval("'abc' < 'abd'").unwrap(), Value::Bool(true));
        assert_eq!(eval("user.roles == user.roles").unwrap(), Value::Bool(true));
    }

    #[test]
    fn eval_arithmetic() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), Value::Integer(7));
        assert_eq!(eval("7 / 2").unwrap(), Value::Float(3.5));
        assert_eq!(eval("8 / 2").unwrap(), Value::Integer(4));
        assert_eq!(eval("7 % 4").unwrap(), Value::Integer(3));
        assert_eq!(eval("-a + b").unwrap(), Value::Float(1.5));
        assert_eq!(eval("s + a").unwrap(), Value::from("foo1"));
        assert_eq!(
            eval("9223372036854775807 + 1").unwrap(),
            Value::Float(9223372036854775808.0)
        );
    }

    #[test]
    fn eval_calls() {
        assert_eq!(eval("len(1, 'a', list)").unwrap(), Value::Integer(3));
        assert_eq!(eval("len().length").unwrap(), Value::None);
    }

    #[test]
    fn eval_err_division_by_zero() {
        let err = eval("a / 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to evaluate expression `a / 0`: division by zero"
        );
    }

    #[test]
    fn eval_overflowing_division() {
        assert_eq!(eval("min / -1").unwrap(), Value::Float(-(i64::MIN as f64)));
        assert_eq!(eval("min % -1").unwrap(), Value::Integer(0));
        assert_eq!(eval("-min").unwrap(), Value::Float(-(i64::MIN as f64)));
    }

    #[test]
    fn eval_err_operands() {
        let err = eval("list - 1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to evaluate expression `list - 1`: cannot apply `-` to list and integer"
        );
    }

    #[test]
    fn eval_err_unknown_function() {
        let err = eval("nope(1)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to evaluate expression `nope(1)`: unknown function `nope`"
        );
    }

    #[test]
    fn eval_err_function_failed() {
        let err = eval("fail()").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to evaluate expression `fail()`: call to `fail` failed: boom"
        );
    }
}
