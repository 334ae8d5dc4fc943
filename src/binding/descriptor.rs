// Binding descriptors
// One immutable record per native method exposed to the dispatcher

use serde::Deserialize;
use std::fmt;

/// How the native return value becomes a dynamic value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum ReturnConversion {
    /// The native method already returns `Result<Value, RuntimeError>`
    #[default]
    #[serde(rename = "value")]
    Direct,
    /// The native method returns `bool`, mapped onto the canonical singletons
    #[serde(rename = "bool")]
    BooleanToTruthy,
}

/// Declarative record of one binding to generate.
///
/// Built with [`BindingDescriptor::new`] and the `with_*` methods, then handed
/// to the registry. There are no setters: once registered it cannot change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingDescriptor {
    source_class: String,
    source_method: String,
    native_type: String,
    native_method: String,
    arity: usize,
    pass_env: bool,
    pass_block: bool,
    return_conversion: ReturnConversion,
}

impl BindingDescriptor {
    pub fn new(
        source_class: impl Into<String>,
        source_method: impl Into<String>,
        native_type: impl Into<String>,
        native_method: impl Into<String>,
    ) -> Self {
        Self {
            source_class: source_class.into(),
            source_method: source_method.into(),
            native_type: native_type.into(),
            native_method: native_method.into(),
            arity: 0,
            pass_env: false,
            pass_block: false,
            return_conversion: ReturnConversion::Direct,
        }
    }

    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = arity;
        self
    }

    pub fn with_env(mut self, pass_env: bool) -> Self {
        self.pass_env = pass_env;
        self
    }

    pub fn with_block(mut self, pass_block: bool) -> Self {
        self.pass_block = pass_block;
        self
    }

    pub fn with_return(mut self, conversion: ReturnConversion) -> Self {
        self.return_conversion = conversion;
        self
    }

    pub fn source_class(&self) -> &str {
        &self.source_class
    }

    pub fn source_method(&self) -> &str {
        &self.source_method
    }

    pub fn native_type(&self) -> &str {
        &self.native_type
    }

    pub fn native_method(&self) -> &str {
        &self.native_method
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn passes_env(&self) -> bool {
        self.pass_env
    }

    pub fn passes_block(&self) -> bool {
        self.pass_block
    }

    pub fn return_conversion(&self) -> ReturnConversion {
        self.return_conversion
    }

    /// Symbol name before collision resolution: `{type}_{method}_binding`
    pub fn base_symbol(&self) -> String {
        format!("{}_{}_binding", self.native_type, self.native_method)
    }
}

impl fmt::Display for BindingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} -> {}::{}/{}",
            self.source_class, self.source_method, self.native_type, self.native_method, self.arity
        )
    }
}
