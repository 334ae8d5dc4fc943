// Binding manifest
// JSON declaration file read by build.rs and the sald-bindgen CLI

use super::descriptor::{BindingDescriptor, ReturnConversion};
use super::registry::DescriptorRegistry;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read binding manifest '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid binding manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binding #{index}: '{field}' must not be empty")]
    EmptyName { index: usize, field: &'static str },

    #[error("binding #{index}: {field} '{name}' is not a valid Rust identifier")]
    InvalidIdentifier {
        index: usize,
        field: &'static str,
        name: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    bindings: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestEntry {
    class: String,
    method: String,
    native_type: String,
    native_method: String,
    arity: usize,
    #[serde(default)]
    pass_env: bool,
    #[serde(default)]
    pass_block: bool,
    #[serde(default)]
    returns: ReturnConversion,
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = match chars.next() {
        Some(c) => c == '_' || c.is_ascii_alphabetic(),
        None => false,
    };
    starts_ok
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && name != "_"
        && !KEYWORDS.contains(&name)
}

impl ManifestEntry {
    fn validate(&self, index: usize) -> Result<(), ManifestError> {
        if self.class.is_empty() {
            return Err(ManifestError::EmptyName {
                index,
                field: "class",
            });
        }
        if self.method.is_empty() {
            return Err(ManifestError::EmptyName {
                index,
                field: "method",
            });
        }
        for (field, name) in [
            ("native_type", &self.native_type),
            ("native_method", &self.native_method),
        ] {
            if !is_identifier(name) {
                return Err(ManifestError::InvalidIdentifier {
                    index,
                    field,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    fn into_descriptor(self) -> BindingDescriptor {
        BindingDescriptor::new(self.class, self.method, self.native_type, self.native_method)
            .with_arity(self.arity)
            .with_env(self.pass_env)
            .with_block(self.pass_block)
            .with_return(self.returns)
    }
}

/// Parse a manifest and register its bindings in file order
pub fn parse_manifest(text: &str) -> Result<DescriptorRegistry, ManifestError> {
    let manifest: Manifest = serde_json::from_str(text)?;

    let mut registry = DescriptorRegistry::new();
    for (index, entry) in manifest.bindings.into_iter().enumerate() {
        entry.validate(index)?;
        registry.register(entry.into_descriptor());
    }
    Ok(registry)
}

pub fn load_manifest(path: &Path) -> Result<DescriptorRegistry, ManifestError> {
    let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_manifest(&text)
}
