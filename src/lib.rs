//! Sald native-method bindings.
//!
//! [`binding`] declares native methods and generates one trampoline per
//! binding plus an `init_bindings` installer. [`vm`] holds the calling
//! convention the trampolines satisfy and the class table they are
//! installed into. [`builtins`] wires the generated built-in bindings in.

pub mod binding;
pub mod builtins;
pub mod error;
pub mod vm;

pub use binding::{BindingDescriptor, DescriptorRegistry, ReturnConversion};
pub use error::{BindError, ErrorKind, RuntimeError};
pub use vm::{Block, ClassTable, Env, NativeMethod, Value};
