//! Number built-in.
//!
//! Provides the callable `Number` global, its constants and predicates, and
//! the formatting methods reachable from number values.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{to_integer, to_js_string, to_number};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::eval::types::ValueResult;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;
use super::core::{parse_float, parse_int};

const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Register the Number built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let number = BuiltInObject::new("Number")
        .with_call(number_call)
        .add_property("MAX_VALUE", JsValue::Number(JsNumberType::Float(f64::MAX)))
        .add_property("MIN_VALUE", JsValue::Number(JsNumberType::Float(5e-324)))
        .add_property("POSITIVE_INFINITY", JsValue::Number(JsNumberType::PositiveInfinity))
        .add_property("NEGATIVE_INFINITY", JsValue::Number(JsNumberType::NegativeInfinity))
        .add_property("NaN", JsValue::Number(JsNumberType::NaN))
        .add_property("MAX_SAFE_INTEGER", JsValue::from(MAX_SAFE_INTEGER))
        .add_property("MIN_SAFE_INTEGER", JsValue::from(-MAX_SAFE_INTEGER))
        .add_property("EPSILON", JsValue::Number(JsNumberType::Float(f64::EPSILON)))
        .add_method("isNaN", number_is_nan)
        .add_method("isFinite", number_is_finite)
        .add_method("isInteger", number_is_integer)
        .add_method("isSafeInteger", number_is_safe_integer)
        .add_method("parseFloat", parse_float)
        .add_method("parseInt", parse_int)
        .add_prototype_method("toFixed", number_to_fixed)
        .add_prototype_method("toString", number_to_string);

    registry.register_object(number);
}

/// The argument as a number, only if it already is one. The `Number.is*`
/// predicates never coerce.
fn number_arg(args: &[JsValue]) -> Option<f64> {
    args.first().and_then(JsValue::as_f64)
}

/// Number(value)
fn number_call(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::from(args.first().map_or(0.0, to_number)))
}

/// Number.isNaN(value)
fn number_is_nan(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::Boolean(number_arg(&args).map_or(false, f64::is_nan)))
}

/// Number.isFinite(value)
fn number_is_finite(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::Boolean(number_arg(&args).map_or(false, f64::is_finite)))
}

/// Number.isInteger(value)
fn number_is_integer(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::Boolean(
        number_arg(&args).map_or(false, |n| n.is_finite() && n.trunc() == n),
    ))
}

/// Number.isSafeInteger(value)
fn number_is_safe_integer(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::Boolean(number_arg(&args).map_or(false, |n| {
        n.is_finite() && n.trunc() == n && n.abs() <= MAX_SAFE_INTEGER
    })))
}

/// Number.prototype.toFixed(digits)
fn number_to_fixed(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let x = to_number(&this);
    let digits = to_integer(&arg(&args, 0));
    if !(0.0..=100.0).contains(&digits) {
        return Err(JErrorType::RangeError(
            "toFixed() digits argument must be between 0 and 100".to_string(),
        )
        .into());
    }
    Ok(JsValue::String(format_fixed(x, digits as usize)))
}

pub(crate) fn format_fixed(x: f64, digits: usize) -> String {
    if !x.is_finite() || x.abs() >= 1e21 {
        return to_js_string(&JsValue::from(x));
    }
    // Exact ties round away from zero, where `format!` would round to even.
    let scale = 10f64.powi(digits as i32);
    let scaled = x.abs() * scale;
    let value = if x == 0.0 {
        0.0
    } else if scaled.is_finite() && scaled.fract() == 0.5 {
        (scaled.ceil() / scale).copysign(x)
    } else {
        x
    };
    format!("{:.*}", digits, value)
}

/// Number.prototype.toString(radix)
fn number_to_string(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let x = to_number(&this);
    let radix = match arg(&args, 0) {
        JsValue::Undefined => 10.0,
        r => to_integer(&r),
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(JErrorType::RangeError(
            "toString() radix must be between 2 and 36".to_string(),
        )
        .into());
    }
    if radix == 10.0 || !x.is_finite() {
        return Ok(JsValue::String(to_js_string(&JsValue::from(x))));
    }
    Ok(JsValue::String(format_radix(x, radix as u32)))
}

pub(crate) fn format_radix(x: f64, radix: u32) -> String {
    let r = radix as f64;
    let mut int = x.abs().trunc();
    let mut frac = x.abs() - int;

    let mut int_digits = Vec::new();
    loop {
        let d = (int % r) as usize;
        int_digits.push(DIGITS[d]);
        int = (int / r).trunc();
        if int == 0.0 {
            break;
        }
    }
    int_digits.reverse();

    let mut out = String::new();
    if x < 0.0 {
        out.push('-');
    }
    out.push_str(&String::from_utf8_lossy(&int_digits));
    if frac > 0.0 {
        out.push('.');
        for _ in 0..52 {
            if frac <= 0.0 {
                break;
            }
            frac *= r;
            let d = frac.trunc();
            out.push(DIGITS[d as usize] as char);
            frac -= d;
        }
    }
    out
}
