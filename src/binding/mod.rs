// Sald Native Bindings
// Declares native methods, names their trampolines and emits the generated unit.
//
// This module is also compiled by build.rs (via #[path]); outside of tests it
// only refers to its own submodules and to external crates, never to `crate::`.

pub mod descriptor;
pub mod emitter;
pub mod manifest;
pub mod registry;
pub mod trampoline;

pub use descriptor::{BindingDescriptor, ReturnConversion};
pub use emitter::{emit_unit, EmitOptions, RegistrationEmitter};
pub use manifest::{load_manifest, parse_manifest, ManifestError};
pub use registry::{DescriptorRegistry, RegisteredBinding};
pub use trampoline::{call_expression, forwarded_args, ForwardedArg, TrampolineGenerator};
