// Number built-in class
// Native receiver type for `Number`; its methods are reached through the
// generated bindings declared in bindings.json

use crate::error::RuntimeError;
use crate::vm::value::format_float;
use crate::vm::{Env, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberBox {
    value: f64,
}

impl NumberBox {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Numeric view of another value, if it has one
    fn coerce(other: &Value) -> Option<f64> {
        match other {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => other.downcast_ref::<NumberBox>().map(|n| n.value),
        }
    }

    /// `==` / `===`: numeric equality across integers, floats and numbers
    pub fn equals(&self, _env: &mut Env, other: &Value) -> bool {
        Self::coerce(other) == Some(self.value)
    }

    /// `eql?`: equal value and also a `Number`
    pub fn eql(&self, other: &Value) -> bool {
        other
            .downcast_ref::<NumberBox>()
            .is_some_and(|n| n.value == self.value)
    }

    pub fn to_s(&self, _env: &mut Env) -> Result<Value, RuntimeError> {
        Ok(Value::string(format_float(self.value)))
    }

    /// `<=>`: -1, 0 or 1, nil when not comparable
    pub fn cmp(&self, _env: &mut Env, other: &Value) -> Result<Value, RuntimeError> {
        let ordering = Self::coerce(other).and_then(|n| self.value.partial_cmp(&n));
        Ok(match ordering {
            Some(Ordering::Less) => Value::Integer(-1),
            Some(Ordering::Equal) => Value::Integer(0),
            Some(Ordering::Greater) => Value::Integer(1),
            None => Value::Nil,
        })
    }

    pub fn add(&self, env: &mut Env, other: &Value) -> Result<Value, RuntimeError> {
        let rhs = Self::coerce(other).ok_or_else(|| {
            RuntimeError::type_error(format!(
                "{} can't be coerced into Number",
                other.class_name()
            ))
        })?;
        env.new_object("Number", NumberBox::new(self.value + rhs))
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }
}
