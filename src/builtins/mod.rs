// Sald Built-in Classes
// Bootstraps the class hierarchy and installs the generated bindings

mod list;
mod number;
mod object;

pub use list::ListBox;
pub use number::NumberBox;

use crate::error::BindError;
use crate::vm::{ClassTable, Env, NativeType, PRIMITIVE_CLASSES};
use std::rc::Rc;

/// Trampolines and `init_bindings` generated by build.rs from bindings.json.
///
/// Trampolines trust their receiver's type, so calling one directly needs
/// `unsafe`; [`Env::send`] is the safe entry point.
///
/// ```compile_fail
/// use sald_bind::builtins::{bootstrap, generated};
/// use sald_bind::vm::Value;
///
/// let mut env = bootstrap().unwrap();
/// let _ = generated::NumberBox_equals_binding(&mut env, &Value::Integer(3), &[Value::Nil], None);
/// ```
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
}

pub use generated::{init_bindings, BINDINGS};

/// Create all built-in classes, without any methods
pub fn create_builtin_classes() -> Result<ClassTable, BindError> {
    let mut classes = ClassTable::new();

    classes.define_class("Object", None, None)?;
    for name in PRIMITIVE_CLASSES {
        classes.define_class(name, Some("Object"), None)?;
    }
    classes.define_class("Number", Some("Object"), Some(NativeType::of::<NumberBox>()))?;
    classes.define_class("List", Some("Object"), Some(NativeType::of::<ListBox>()))?;

    Ok(classes)
}

/// Build the class table, install hand-written natives and generated
/// bindings, then freeze it into an `Env`.
///
/// An error here means bindings.json and the class hierarchy disagree.
pub fn bootstrap() -> Result<Env, BindError> {
    let mut classes = create_builtin_classes()?;
    object::define_object_methods(&mut classes)?;
    init_bindings(&mut classes)?;
    tracing::debug!(
        classes = classes.len(),
        bindings = BINDINGS.len(),
        "bootstrapped built-in classes"
    );
    Ok(Env::new(Rc::new(classes)))
}
