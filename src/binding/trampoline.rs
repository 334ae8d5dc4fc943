// Trampoline generator
// Emits one Rust function per registered binding, matching the native calling convention:
//   unsafe fn(env: &mut Env, receiver: &Value, args: &[Value], block: Option<&Block>)
//       -> Result<Value, RuntimeError>
// The functions are unsafe because they downcast the receiver without checking.

use super::descriptor::{BindingDescriptor, ReturnConversion};
use super::registry::RegisteredBinding;
use smallvec::SmallVec;

/// One argument handed to the native method, in forwarding order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardedArg {
    Env,
    Positional(usize),
    Block,
}

impl ForwardedArg {
    /// Source text of this argument inside the trampoline body
    pub fn render(&self) -> String {
        match self {
            ForwardedArg::Env => "env".to_string(),
            ForwardedArg::Positional(index) => format!("&args[{}]", index),
            ForwardedArg::Block => "block".to_string(),
        }
    }
}

pub type ForwardedArgs = SmallVec<[ForwardedArg; 4]>;

/// Env first, then positional arguments in order, then the block.
pub fn forwarded_args(descriptor: &BindingDescriptor) -> ForwardedArgs {
    let mut args = ForwardedArgs::new();
    if descriptor.passes_env() {
        args.push(ForwardedArg::Env);
    }
    args.extend((0..descriptor.arity()).map(ForwardedArg::Positional));
    if descriptor.passes_block() {
        args.push(ForwardedArg::Block);
    }
    args
}

/// The native call expression, e.g. `this.equals(env, &args[0])`
pub fn call_expression(descriptor: &BindingDescriptor) -> String {
    let args: Vec<String> = forwarded_args(descriptor)
        .iter()
        .map(ForwardedArg::render)
        .collect();
    format!("this.{}({})", descriptor.native_method(), args.join(", "))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TrampolineGenerator;

impl TrampolineGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Emit the trampoline for one registered binding
    pub fn emit(&self, binding: &RegisteredBinding) -> String {
        let desc = &binding.descriptor;
        let env_param = if desc.passes_env() { "env" } else { "_env" };
        let block_param = if desc.passes_block() { "block" } else { "_block" };

        let mut output = String::new();
        output.push_str(&format!(
            "/// `{}#{}`\n",
            desc.source_class().escape_debug(),
            desc.source_method().escape_debug()
        ));
        output.push_str("///\n");
        output.push_str("/// # Safety\n");
        output.push_str("///\n");
        output.push_str(&format!(
            "/// `receiver` must be an object whose payload is a `{}`.\n",
            desc.native_type()
        ));
        output.push_str("#[allow(non_snake_case)]\n");
        output.push_str(&format!("pub unsafe fn {}(\n", binding.symbol));
        output.push_str(&format!("    {}: &mut Env,\n", env_param));
        output.push_str("    receiver: &Value,\n");
        output.push_str("    args: &[Value],\n");
        output.push_str(&format!("    {}: Option<&Block>,\n", block_param));
        output.push_str(") -> Result<Value, RuntimeError> {\n");
        output.push_str(&format!("    check_arity({}, args.len())?;\n", desc.arity()));
        output.push_str("    // SAFETY: upheld by the caller.\n");
        output.push_str(&format!(
            "    let this = unsafe {{ receiver.downcast_unchecked::<{}>() }};\n",
            desc.native_type()
        ));

        let call = call_expression(desc);
        match desc.return_conversion() {
            ReturnConversion::Direct => {
                output.push_str(&format!("    {}\n", call));
            }
            ReturnConversion::BooleanToTruthy => {
                output.push_str(&format!("    let result: bool = {};\n", call));
                output.push_str("    Ok(Value::truthy(result))\n");
            }
        }
        output.push_str("}\n");
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(arity: usize, pass_env: bool, pass_block: bool) -> BindingDescriptor {
        BindingDescriptor::new("Probe", "probe", "ProbeBox", "probe")
            .with_arity(arity)
            .with_env(pass_env)
            .with_block(pass_block)
    }

    fn all_combinations() -> Vec<BindingDescriptor> {
        let mut out = Vec::new();
        for arity in 0..=3 {
            for pass_env in [false, true] {
                for pass_block in [false, true] {
                    out.push(descriptor(arity, pass_env, pass_block));
                }
            }
        }
        out
    }

    #[test]
    fn test_forwarded_length_matches_flags() {
        for desc in all_combinations() {
            let args = forwarded_args(&desc);
            let expected =
                desc.arity() + usize::from(desc.passes_env()) + usize::from(desc.passes_block());
            assert_eq!(args.len(), expected, "{:?}", desc);
            assert!(args.iter().all(|a| !a.render().is_empty()));
        }
    }

    #[test]
    fn test_forwarded_order() {
        let args = forwarded_args(&descriptor(2, true, true));
        assert_eq!(
            args.as_slice(),
            &[
                ForwardedArg::Env,
                ForwardedArg::Positional(0),
                ForwardedArg::Positional(1),
                ForwardedArg::Block
            ]
        );
    }

    #[test]
    fn test_call_expression_has_no_dangling_separators() {
        for desc in all_combinations() {
            let call = call_expression(&desc);
            assert!(!call.contains("(,"), "{}", call);
            assert!(!call.contains(", )"), "{}", call);
            assert!(!call.contains(",,"), "{}", call);
            assert!(!call.contains(", ,"), "{}", call);
            assert!(!call.ends_with(",)"), "{}", call);
            let inner = &call["this.probe(".len()..call.len() - 1];
            let segments = if inner.is_empty() {
                0
            } else {
                inner.split(", ").count()
            };
            assert_eq!(segments, forwarded_args(&desc).len(), "{}", call);
        }
    }

    #[test]
    fn test_call_expression_shapes() {
        assert_eq!(call_expression(&descriptor(0, false, false)), "this.probe()");
        assert_eq!(call_expression(&descriptor(0, true, false)), "this.probe(env)");
        assert_eq!(call_expression(&descriptor(0, false, true)), "this.probe(block)");
        assert_eq!(
            call_expression(&descriptor(0, true, true)),
            "this.probe(env, block)"
        );
        assert_eq!(
            call_expression(&descriptor(3, false, false)),
            "this.probe(&args[0], &args[1], &args[2])"
        );
        assert_eq!(
            call_expression(&descriptor(1, true, true)),
            "this.probe(env, &args[0], block)"
        );
    }

    #[test]
    fn test_emit_boolean_binding() {
        let binding = RegisteredBinding {
            symbol: "NumberBox_equals_binding1".to_string(),
            descriptor: BindingDescriptor::new("Number", "===", "NumberBox", "equals")
                .with_arity(1)
                .with_env(true)
                .with_return(ReturnConversion::BooleanToTruthy),
        };
        let code = TrampolineGenerator::new().emit(&binding);
        assert!(code.contains("pub unsafe fn NumberBox_equals_binding1(\n"));
        assert!(code.contains("/// # Safety\n"));
        assert!(code.contains("payload is a `NumberBox`"));
        assert!(code.contains("    env: &mut Env,\n"));
        assert!(code.contains("    _block: Option<&Block>,\n"));
        assert!(code.contains("check_arity(1, args.len())?;"));
        assert!(code.contains("receiver.downcast_unchecked::<NumberBox>()"));
        assert!(code.contains("let result: bool = this.equals(env, &args[0]);"));
        assert!(code.contains("Ok(Value::truthy(result))"));
    }

    #[test]
    fn test_emit_direct_binding_is_tail_call() {
        let binding = RegisteredBinding {
            symbol: "ListBox_count_binding".to_string(),
            descriptor: BindingDescriptor::new("List", "count", "ListBox", "count")
                .with_block(true),
        };
        let code = TrampolineGenerator::new().emit(&binding);
        assert!(code.contains("    _env: &mut Env,\n"));
        assert!(code.contains("    block: Option<&Block>,\n"));
        assert!(code.contains("check_arity(0, args.len())?;"));
        assert!(code.contains("    this.count(block)\n}\n"));
        assert!(!code.contains("truthy"));
    }
}
