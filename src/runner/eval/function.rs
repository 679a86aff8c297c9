//! Function call execution.

use crate::runner::ds::function::{FunctionKind, JsFunction};
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::types::EvalContext;

use super::expression::evaluate_expression;
use super::types::ValueResult;

/// Call a function with the given arguments.
///
/// Every call claims one level of the sandbox depth budget, so runaway
/// recursion ends in a `RangeError` rather than a stack overflow.
pub fn call_function(
    func: &JsFunction,
    this_value: JsValue,
    args: Vec<JsValue>,
    ctx: &mut EvalContext<'_>,
) -> ValueResult {
    let sandbox = ctx.sandbox;
    let _guard = sandbox.enter()?;
    match &func.kind {
        FunctionKind::Native(f) => f(ctx, this_value, args),
        FunctionKind::Plugin(f) => f(ctx, this_value, args),
        FunctionKind::Arrow(closure) => {
            let mut frame = closure.captured.clone();
            let mut args = args.into_iter();
            for param in &closure.data.params {
                frame.push((param.name.clone(), args.next().unwrap_or(JsValue::Undefined)));
            }
            ctx.push_frame(frame);
            let result = evaluate_expression(&closure.data.body, ctx);
            ctx.pop_frame();
            result
        }
    }
}

/// Check if a value is callable.
pub fn is_callable(value: &JsValue) -> bool {
    matches!(value, JsValue::Function(_))
}
