use super::class::{ClassId, TableTag};
use super::env::Env;
use crate::error::RuntimeError;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Dynamic value handle passed through the native calling convention
#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Rc<str>),
    Object(Rc<Object>),
}

/// Classes whose instances are immediate values rather than objects.
/// They never carry a native type, so no trampoline is reachable from them.
pub const PRIMITIVE_CLASSES: [&str; 5] = ["NilClass", "Boolean", "Integer", "Float", "String"];

/// Heap object backed by a native receiver type.
///
/// The payload type always equals the native type declared by `class`
/// (checked once in [`Env::new_object`]). `class` is only meaningful in the
/// class table identified by `table`.
pub struct Object {
    pub class: ClassId,
    pub class_name: String,
    pub(crate) table: TableTag,
    payload: Box<dyn Any>,
}

impl Object {
    pub(crate) fn new(
        table: TableTag,
        class: ClassId,
        class_name: impl Into<String>,
        payload: Box<dyn Any>,
    ) -> Self {
        Self {
            class,
            class_name: class_name.into(),
            table,
            payload,
        }
    }
}

impl Value {
    /// Canonical true singleton
    pub const TRUE: Value = Value::Boolean(true);
    /// Canonical false singleton
    pub const FALSE: Value = Value::Boolean(false);

    /// Map a native boolean onto the canonical singletons
    #[inline]
    pub fn truthy(b: bool) -> Value {
        if b {
            Value::TRUE
        } else {
            Value::FALSE
        }
    }

    pub fn string(s: impl AsRef<str>) -> Value {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "NilClass",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Object(_) => "Object",
        }
    }

    /// Class name used for dispatch
    pub fn class_name(&self) -> &str {
        match self {
            Value::Object(obj) => &obj.class_name,
            other => other.type_name(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Checked access to an object's native payload
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Object(obj) => obj.payload.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Reinterpret the receiver's payload as `T` without checking.
    ///
    /// # Safety
    ///
    /// `self` must be an object whose payload is a `T`. Generated trampolines
    /// are only reached through [`Env::send`], which dispatches on the
    /// receiver's own class, and `ClassTable::install` only accepts a binding
    /// on a class whose declared native type is `T`.
    #[inline]
    pub unsafe fn downcast_unchecked<T: Any>(&self) -> &T {
        match self {
            Value::Object(obj) => {
                debug_assert!(
                    obj.payload.is::<T>(),
                    "receiver of class {} is not a {}",
                    obj.class_name,
                    std::any::type_name::<T>()
                );
                &*(obj.payload.as_ref() as *const dyn Any as *const T)
            }
            _ => {
                debug_assert!(false, "native receiver must be an object, got {}", self.type_name());
                std::hint::unreachable_unchecked()
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Float formatting with a trailing `.0` for whole numbers
pub fn format_float(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{:.1}", n)
    } else if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", format_float(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(obj) => write!(f, "#<{}>", obj.class_name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

/// Block closure body
pub type BlockFn = dyn Fn(&mut Env, &[Value]) -> Result<Value, RuntimeError>;

/// Optional closure handle forwarded last to native methods.
///
/// A block carries the environment it was created in, so natives that take
/// only the block can still call it.
#[derive(Clone)]
pub struct Block {
    env: Env,
    func: Rc<BlockFn>,
}

impl Block {
    pub fn new(
        env: &Env,
        func: impl Fn(&mut Env, &[Value]) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        Self {
            env: env.clone(),
            func: Rc::new(func),
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        let mut env = self.env.clone();
        (self.func)(&mut env, args)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<block>")
    }
}
