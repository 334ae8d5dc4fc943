pub mod caller;
pub mod class;
pub mod env;
pub mod value;

pub use caller::{check_arity, NativeMethod, UncheckedMethod};
pub use class::{Class, ClassId, ClassTable, Installation, Method, NativeType};
pub use env::Env;
pub use value::{Block, Object, Value, PRIMITIVE_CLASSES};

// Generated units import their error types from the runtime module
pub use crate::error::{BindError, RuntimeError};
