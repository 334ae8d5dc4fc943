// Registration emitter
// Emits the installation table and the single `init_bindings` routine,
// and assembles the complete generated compilation unit

use super::registry::DescriptorRegistry;
use super::trampoline::TrampolineGenerator;

/// Settings for the generated unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Module the runtime items (`Env`, `Value`, `ClassTable`, ...) are imported from
    pub runtime_path: String,
    /// Module the native receiver types are imported from, if not already in scope
    pub types_path: Option<String>,
    /// Manifest the unit was generated from, named in the header
    pub source: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            runtime_path: "crate::vm".to_string(),
            types_path: None,
            source: None,
        }
    }
}

pub struct RegistrationEmitter<'a> {
    registry: &'a DescriptorRegistry,
}

impl<'a> RegistrationEmitter<'a> {
    pub fn new(registry: &'a DescriptorRegistry) -> Self {
        Self { registry }
    }

    /// `BINDINGS` in registration order, followed by `init_bindings`.
    ///
    /// Installation stops at the first error; a missing class means the
    /// bindings and the bootstrapped class hierarchy are out of sync.
    pub fn emit(&self) -> String {
        let mut output = String::new();

        output.push_str("pub static BINDINGS: &[Installation] = &[\n");
        for binding in self.registry.descriptors() {
            let desc = &binding.descriptor;
            output.push_str(&format!(
                "    // SAFETY: {} only downcasts its receiver to {}.\n",
                binding.symbol,
                desc.native_type()
            ));
            output.push_str("    unsafe {\n");
            output.push_str("        Installation::new(\n");
            output.push_str(&format!("            {:?},\n", desc.source_class()));
            output.push_str(&format!("            {:?},\n", desc.source_method()));
            output.push_str(&format!("            {:?},\n", desc.native_type()));
            output.push_str(&format!(
                "            std::any::TypeId::of::<{}>,\n",
                desc.native_type()
            ));
            output.push_str(&format!("            {:?},\n", binding.symbol));
            output.push_str(&format!("            {},\n", desc.arity()));
            output.push_str(&format!("            {},\n", binding.symbol));
            output.push_str("        )\n");
            output.push_str("    },\n");
        }
        output.push_str("];\n\n");

        output.push_str("pub fn init_bindings(classes: &mut ClassTable) -> Result<(), BindError> {\n");
        output.push_str("    for installation in BINDINGS {\n");
        output.push_str("        classes.install(installation)?;\n");
        output.push_str("    }\n");
        output.push_str("    Ok(())\n");
        output.push_str("}\n");
        output
    }
}

/// Native types in first-use order, without duplicates
fn native_types(registry: &DescriptorRegistry) -> Vec<&str> {
    let mut types: Vec<&str> = Vec::new();
    for binding in registry.descriptors() {
        let name = binding.descriptor.native_type();
        if !types.contains(&name) {
            types.push(name);
        }
    }
    types
}

/// Assemble the whole generated compilation unit.
///
/// The output has no inner attributes so it can be pulled in with `include!`.
pub fn emit_unit(registry: &DescriptorRegistry, options: &EmitOptions) -> String {
    let mut output = String::new();

    output.push_str("// DO NOT EDIT THIS FILE BY HAND!\n");
    match &options.source {
        Some(source) => output.push_str(&format!(
            "// This file is generated by sald-bindgen from {}.\n",
            source
        )),
        None => output.push_str("// This file is generated by sald-bindgen.\n"),
    }
    output.push('\n');

    output.push_str(&format!(
        "use {}::{{check_arity, BindError, Block, ClassTable, Env, Installation, RuntimeError, Value}};\n",
        options.runtime_path
    ));
    if let Some(types_path) = &options.types_path {
        let types = native_types(registry);
        if !types.is_empty() {
            output.push_str(&format!("use {}::{{{}}};\n", types_path, types.join(", ")));
        }
    }
    output.push('\n');

    let generator = TrampolineGenerator::new();
    for binding in registry.descriptors() {
        output.push_str(&generator.emit(binding));
        output.push('\n');
    }

    output.push_str(&RegistrationEmitter::new(registry).emit());

    tracing::info!(
        bindings = registry.len(),
        types = native_types(registry).len(),
        "emitted binding unit"
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::descriptor::{BindingDescriptor, ReturnConversion};

    fn number_registry() -> DescriptorRegistry {
        let mut registry = DescriptorRegistry::new();
        for method in ["==", "==="] {
            registry.register(
                BindingDescriptor::new("Number", method, "NumberBox", "equals")
                    .with_arity(1)
                    .with_env(true)
                    .with_return(ReturnConversion::BooleanToTruthy),
            );
        }
        registry.register(BindingDescriptor::new("List", "size", "ListBox", "size"));
        registry
    }

    #[test]
    fn test_installations_in_registration_order() {
        let registry = number_registry();
        let code = RegistrationEmitter::new(&registry).emit();

        let first = code.find("\n            NumberBox_equals_binding,\n").unwrap();
        let second = code.find("\n            NumberBox_equals_binding1,\n").unwrap();
        let third = code.find("\n            ListBox_size_binding,\n").unwrap();
        assert!(first < second && second < third);

        assert!(code.contains("            \"==\",\n"));
        assert!(code.contains("            \"===\",\n"));
        assert!(code.contains("            std::any::TypeId::of::<NumberBox>,\n"));
        // every record is built through the unsafe constructor
        assert_eq!(code.matches("    unsafe {\n        Installation::new(").count(), 3);
        assert!(!code.contains("Installation {"));
        assert_eq!(code.matches("pub fn init_bindings").count(), 1);
    }

    #[test]
    fn test_aliases_are_not_deduplicated() {
        let registry = number_registry();
        let code = emit_unit(&registry, &EmitOptions::default());
        assert_eq!(code.matches("pub unsafe fn NumberBox_equals_binding(").count(), 1);
        assert_eq!(code.matches("pub unsafe fn NumberBox_equals_binding1(").count(), 1);
        assert_eq!(code.matches("Installation::new(").count(), 3);
    }

    #[test]
    fn test_unit_header_and_imports() {
        let registry = number_registry();
        let options = EmitOptions {
            runtime_path: "sald_bind::vm".to_string(),
            types_path: Some("super".to_string()),
            source: Some("bindings.json".to_string()),
        };
        let code = emit_unit(&registry, &options);
        assert!(code.starts_with("// DO NOT EDIT THIS FILE BY HAND!\n"));
        assert!(code.contains("generated by sald-bindgen from bindings.json."));
        assert!(code.contains("use sald_bind::vm::{check_arity, BindError, Block,"));
        assert!(code.contains("use super::{NumberBox, ListBox};\n"));
        assert!(!code.contains("#!["));
    }

    #[test]
    fn test_method_names_are_escaped() {
        let mut registry = DescriptorRegistry::new();
        registry.register(BindingDescriptor::new("Str", "say\"hi\"", "StrBox", "say"));
        let code = RegistrationEmitter::new(&registry).emit();
        assert!(code.contains(r#"            "say\"hi\"","#));
    }

    #[test]
    fn test_empty_registry() {
        let registry = DescriptorRegistry::new();
        let code = emit_unit(&registry, &EmitOptions::default());
        assert!(code.contains("pub static BINDINGS: &[Installation] = &[\n];"));
        assert!(code.contains("pub fn init_bindings"));
    }
}
