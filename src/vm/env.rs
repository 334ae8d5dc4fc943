use super::class::ClassTable;
use super::value::{Block, Object, Value};
use crate::error::RuntimeError;
use std::any::{Any, TypeId};
use std::rc::Rc;

/// Execution context handed to every native method.
///
/// Holds the class table frozen after bindings were installed; cloning an
/// `Env` shares the same table.
#[derive(Debug, Clone)]
pub struct Env {
    classes: Rc<ClassTable>,
}

impl Env {
    pub fn new(classes: Rc<ClassTable>) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    /// Allocate an object of `class_name` with a native payload.
    ///
    /// The payload must be the class's declared native type; this is what
    /// lets trampolines downcast receivers without checking.
    pub fn new_object<T: Any>(&self, class_name: &str, payload: T) -> Result<Value, RuntimeError> {
        let id = self
            .classes
            .lookup(class_name)
            .ok_or_else(|| RuntimeError::UndefinedClass(class_name.to_string()))?;
        let class = self.classes.class(id);
        if class.native_type.map(|t| t.id) != Some(TypeId::of::<T>()) {
            return Err(RuntimeError::type_error(format!(
                "{} cannot wrap a native {}",
                class_name,
                std::any::type_name::<T>()
            )));
        }
        Ok(Value::Object(Rc::new(Object::new(
            self.classes.tag(),
            id,
            class.name.clone(),
            Box::new(payload),
        ))))
    }

    /// Dispatch `method` on `receiver` through the class table.
    ///
    /// This is the only safe way to reach a generated trampoline.
    pub fn send(
        &mut self,
        receiver: &Value,
        method: &str,
        args: &[Value],
        block: Option<&Block>,
    ) -> Result<Value, RuntimeError> {
        let classes = Rc::clone(&self.classes);
        let no_method = || RuntimeError::NoMethod {
            class: receiver.class_name().to_string(),
            method: method.to_string(),
        };
        let class = classes.class_of(receiver).ok_or_else(no_method)?;
        let func = classes.find_method(class, method).ok_or_else(no_method)?.func;
        // SAFETY: `func` was found on the receiver's own class or an ancestor.
        // Such a method only downcasts to that class's native type, which
        // subclasses inherit and `new_object` enforces on every payload.
        // Immediate values only reach classes without a native type.
        unsafe { func(self, receiver, args, block) }
    }
}
