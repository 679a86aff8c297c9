//! Math built-in object.
//!
//! Provides mathematical constants and functions. `Math.random` is left out
//! on purpose: a binding pass must give the same result every time it runs.

use std::f64::consts;

use crate::runner::ds::operations::type_conversion::{to_int32, to_uint32};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::ValueResult;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg_number;

/// Register the Math object with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let math = BuiltInObject::new("Math")
        // Constants
        .add_property("E", JsValue::from(consts::E))
        .add_property("LN10", JsValue::from(consts::LN_10))
        .add_property("LN2", JsValue::from(consts::LN_2))
        .add_property("LOG10E", JsValue::from(consts::LOG10_E))
        .add_property("LOG2E", JsValue::from(consts::LOG2_E))
        .add_property("PI", JsValue::from(consts::PI))
        .add_property("SQRT1_2", JsValue::from(consts::FRAC_1_SQRT_2))
        .add_property("SQRT2", JsValue::from(consts::SQRT_2))
        // Methods
        .add_method("abs", math_abs)
        .add_method("floor", math_floor)
        .add_method("ceil", math_ceil)
        .add_method("round", math_round)
        .add_method("trunc", math_trunc)
        .add_method("sign", math_sign)
        .add_method("min", math_min)
        .add_method("max", math_max)
        .add_method("sqrt", math_sqrt)
        .add_method("cbrt", math_cbrt)
        .add_method("pow", math_pow)
        .add_method("exp", math_exp)
        .add_method("expm1", math_expm1)
        .add_method("log", math_log)
        .add_method("log10", math_log10)
        .add_method("log2", math_log2)
        .add_method("log1p", math_log1p)
        .add_method("sin", math_sin)
        .add_method("cos", math_cos)
        .add_method("tan", math_tan)
        .add_method("asin", math_asin)
        .add_method("acos", math_acos)
        .add_method("atan", math_atan)
        .add_method("atan2", math_atan2)
        .add_method("sinh", math_sinh)
        .add_method("cosh", math_cosh)
        .add_method("tanh", math_tanh)
        .add_method("asinh", math_asinh)
        .add_method("acosh", math_acosh)
        .add_method("atanh", math_atanh)
        .add_method("hypot", math_hypot)
        .add_method("clz32", math_clz32)
        .add_method("imul", math_imul)
        .add_method("fround", math_fround);

    registry.register_object(math);
}

/// Applies `f` to the first argument.
fn unary(args: &[JsValue], f: fn(f64) -> f64) -> ValueResult {
    Ok(JsValue::from(f(arg_number(args, 0))))
}

fn math_abs(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::abs)
}

fn math_floor(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::floor)
}

fn math_ceil(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::ceil)
}

/// Math.round rounds halves towards +Infinity, unlike `f64::round`.
fn math_round(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, |x| {
        if !x.is_finite() || x.fract() == 0.0 {
            x
        } else {
            (x + 0.5).floor()
        }
    })
}

fn math_trunc(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::trunc)
}

fn math_sign(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, |x| {
        if x.is_nan() || x == 0.0 {
            x
        } else {
            x.signum()
        }
    })
}

fn math_min(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let mut result = f64::INFINITY;
    for i in 0..args.len() {
        let x = arg_number(&args, i);
        if x.is_nan() {
            return Ok(JsValue::from(f64::NAN));
        }
        result = result.min(x);
    }
    Ok(JsValue::from(result))
}

fn math_max(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let mut result = f64::NEG_INFINITY;
    for i in 0..args.len() {
        let x = arg_number(&args, i);
        if x.is_nan() {
            return Ok(JsValue::from(f64::NAN));
        }
        result = result.max(x);
    }
    Ok(JsValue::from(result))
}

fn math_sqrt(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::sqrt)
}

fn math_cbrt(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::cbrt)
}

fn math_pow(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let base = arg_number(&args, 0);
    let exp = arg_number(&args, 1);
    if exp.is_nan() || (base.abs() == 1.0 && exp.is_infinite()) {
        return Ok(JsValue::from(f64::NAN));
    }
    Ok(JsValue::from(base.powf(exp)))
}

fn math_exp(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::exp)
}

fn math_expm1(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::exp_m1)
}

fn math_log(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::ln)
}

fn math_log10(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::log10)
}

fn math_log2(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::log2)
}

fn math_log1p(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::ln_1p)
}

fn math_sin(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::sin)
}

fn math_cos(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::cos)
}

fn math_tan(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::tan)
}

fn math_asin(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::asin)
}

fn math_acos(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::acos)
}

fn math_atan(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::atan)
}

fn math_atan2(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::from(arg_number(&args, 0).atan2(arg_number(&args, 1))))
}

fn math_sinh(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::sinh)
}

fn math_cosh(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::cosh)
}

fn math_tanh(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::tanh)
}

fn math_asinh(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::asinh)
}

fn math_acosh(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::acosh)
}

fn math_atanh(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, f64::atanh)
}

fn math_hypot(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let mut sum = 0.0;
    for i in 0..args.len() {
        let x = arg_number(&args, i);
        if x.is_infinite() {
            return Ok(JsValue::from(f64::INFINITY));
        }
        sum += x * x;
    }
    Ok(JsValue::from(sum.sqrt()))
}

fn math_clz32(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::from(to_uint32(arg_number(&args, 0)).leading_zeros() as i64))
}

fn math_imul(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let a = to_int32(arg_number(&args, 0));
    let b = to_int32(arg_number(&args, 1));
    Ok(JsValue::from(a.wrapping_mul(b) as i64))
}

fn math_fround(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    unary(&args, |x| x as f32 as f64)
}
