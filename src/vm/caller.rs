use super::env::Env;
use super::value::{Block, Value};
use crate::error::RuntimeError;

/// The native calling convention.
///
/// Every installed method, generated trampoline or hand-written native,
/// receives the environment, the receiver, the positional arguments and an
/// optional block, and returns a dynamic value.
pub type NativeMethod =
    fn(&mut Env, &Value, &[Value], Option<&Block>) -> Result<Value, RuntimeError>;

/// The same convention for methods that may assume their receiver's native
/// type. Generated trampolines have this type; a `NativeMethod` coerces to it.
///
/// Calling one is only sound with a receiver of the class it was installed
/// on, or a subclass of it.
pub type UncheckedMethod =
    unsafe fn(&mut Env, &Value, &[Value], Option<&Block>) -> Result<Value, RuntimeError>;

/// Helper: check exact arity
#[inline]
pub fn check_arity(expected: usize, actual: usize) -> Result<(), RuntimeError> {
    if expected != actual {
        Err(RuntimeError::ArityMismatch { expected, actual })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_arity() {
        assert!(check_arity(1, 1).is_ok());
        assert_eq!(
            check_arity(1, 0),
            Err(RuntimeError::ArityMismatch {
                expected: 1,
                actual: 0
            })
        );
        assert_eq!(
            check_arity(0, 2),
            Err(RuntimeError::ArityMismatch {
                expected: 0,
                actual: 2
            })
        );
    }
}
