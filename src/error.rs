// Sald Binding Error Handling
// Call-time errors raised by native methods and initialization errors raised
// while installing bindings

use colored::*;
use std::fmt;
use thiserror::Error;

/// Types of errors surfaced to the dynamic runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ArgumentError,
    TypeError,
    NameError,
    IndexError,
    RuntimeError,
    LoadError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ArgumentError => write!(f, "ArgumentError"),
            ErrorKind::TypeError => write!(f, "TypeError"),
            ErrorKind::NameError => write!(f, "NameError"),
            ErrorKind::IndexError => write!(f, "IndexError"),
            ErrorKind::RuntimeError => write!(f, "RuntimeError"),
            ErrorKind::LoadError => write!(f, "LoadError"),
        }
    }
}

/// Recoverable error returned through the native calling convention
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("wrong number of arguments (given {actual}, expected {expected})")]
    ArityMismatch { expected: usize, actual: usize },

    #[error("undefined method '{method}' for {class}")]
    NoMethod { class: String, method: String },

    #[error("uninitialized constant {0}")]
    UndefinedClass(String),

    #[error("{0}")]
    TypeError(String),

    #[error("{0}")]
    IndexError(String),

    #[error("no block given (yield)")]
    NoBlock,
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::ArityMismatch { .. } => ErrorKind::ArgumentError,
            RuntimeError::NoMethod { .. } | RuntimeError::UndefinedClass(_) => {
                ErrorKind::NameError
            }
            RuntimeError::TypeError(_) => ErrorKind::TypeError,
            RuntimeError::IndexError(_) => ErrorKind::IndexError,
            RuntimeError::NoBlock => ErrorKind::RuntimeError,
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::TypeError(message.into())
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        RuntimeError::IndexError(message.into())
    }
}

/// Fatal error while building the class table or installing bindings.
///
/// These mean the declared bindings and the bootstrapped class hierarchy
/// disagree; initialization stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("cannot install binding: class '{class}' is not defined")]
    UndefinedClass { class: String },

    #[error("cannot install {class}#{method}: receiver type {native_type} is not the native type of '{class}'")]
    NativeTypeMismatch {
        class: String,
        method: String,
        native_type: String,
    },

    #[error("class '{class}' must share the native type of its superclass '{superclass}'")]
    SuperclassTypeMismatch { class: String, superclass: String },

    #[error("class '{class}' is already defined")]
    DuplicateClass { class: String },

    #[error("class '{class}' backs immediate values and cannot have a native type")]
    PrimitiveNativeType { class: String },
}

impl BindError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BindError::UndefinedClass { .. } => ErrorKind::NameError,
            BindError::NativeTypeMismatch { .. }
            | BindError::SuperclassTypeMismatch { .. }
            | BindError::PrimitiveNativeType { .. } => ErrorKind::TypeError,
            BindError::DuplicateClass { .. } => ErrorKind::LoadError,
        }
    }
}

/// Format an error for the terminal: `Kind: message`, with an optional help line
pub fn format_error(kind: ErrorKind, message: &str, help: Option<&str>) -> String {
    let mut output = format!(
        "{}: {}\n",
        kind.to_string().red().bold(),
        message.white().bold()
    );
    if let Some(help) = help {
        output.push_str(&format!("\n      {}: {}\n", "Help".cyan().bold(), help));
    }
    output
}
