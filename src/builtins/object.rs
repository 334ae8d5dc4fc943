// Object built-in class
// Hand-written natives: same calling convention as generated trampolines,
// but they check their own arity and accept any receiver

use crate::error::{BindError, RuntimeError};
use crate::vm::{check_arity, Block, ClassTable, Env, Value};

pub fn define_object_methods(classes: &mut ClassTable) -> Result<(), BindError> {
    classes.define_native("Object", "nil?", 0, object_is_nil)?;
    classes.define_native("Object", "itself", 0, object_itself)?;
    classes.define_native("Object", "to_s", 0, object_to_s)?;
    classes.define_native("NilClass", "nil?", 0, nil_is_nil)?;
    Ok(())
}

fn object_is_nil(
    _env: &mut Env,
    _recv: &Value,
    args: &[Value],
    _block: Option<&Block>,
) -> Result<Value, RuntimeError> {
    check_arity(0, args.len())?;
    Ok(Value::FALSE)
}

fn nil_is_nil(
    _env: &mut Env,
    _recv: &Value,
    args: &[Value],
    _block: Option<&Block>,
) -> Result<Value, RuntimeError> {
    check_arity(0, args.len())?;
    Ok(Value::TRUE)
}

fn object_itself(
    _env: &mut Env,
    recv: &Value,
    args: &[Value],
    _block: Option<&Block>,
) -> Result<Value, RuntimeError> {
    check_arity(0, args.len())?;
    Ok(recv.clone())
}

fn object_to_s(
    _env: &mut Env,
    recv: &Value,
    args: &[Value],
    _block: Option<&Block>,
) -> Result<Value, RuntimeError> {
    check_arity(0, args.len())?;
    Ok(Value::string(recv.to_string()))
}
