//! Core built-ins registration and the global functions.

use crate::runner::ds::operations::type_conversion::{to_boolean, to_js_string};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::ValueResult;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::{arg, arg_number};
use super::{array, console, json, math, number, object, string};

/// Register all core built-in objects with the registry.
pub fn register_core_builtins(registry: &mut BuiltInRegistry) {
    object::register(registry);
    array::register(registry);
    string::register(registry);
    number::register(registry);
    math::register(registry);
    json::register(registry);
    console::register(registry);
    register(registry);
}

fn register(registry: &mut BuiltInRegistry) {
    registry.register_value("undefined", JsValue::Undefined);
    registry.register_value("NaN", JsValue::from(f64::NAN));
    registry.register_value("Infinity", JsValue::from(f64::INFINITY));

    registry.register_object(BuiltInObject::new("Boolean").with_call(boolean_call));
    registry.register_object(BuiltInObject::new("parseInt").with_call(parse_int));
    registry.register_object(BuiltInObject::new("parseFloat").with_call(parse_float));
    registry.register_object(BuiltInObject::new("isNaN").with_call(is_nan));
    registry.register_object(BuiltInObject::new("isFinite").with_call(is_finite));
}

/// Boolean(value)
fn boolean_call(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::Boolean(args.first().map_or(false, to_boolean)))
}

/// parseInt(string, radix)
pub(crate) fn parse_int(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let text = to_js_string(&arg(&args, 0));
    let radix = match args.get(1) {
        None | Some(JsValue::Undefined) => 0,
        Some(_) => {
            let r = arg_number(&args, 1);
            if r.is_finite() {
                r.trunc() as i64
            } else {
                0
            }
        }
    };
    Ok(JsValue::from(parse_int_str(&text, radix)))
}

pub(crate) fn parse_int_str(text: &str, radix: i64) -> f64 {
    let mut s = text.trim_start();
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    let mut radix = radix;
    if radix == 0 || radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let mut result: Option<f64> = None;
    for c in s.chars() {
        match c.to_digit(radix as u32) {
            Some(d) => result = Some(result.unwrap_or(0.0) * radix as f64 + d as f64),
            None => break,
        }
    }
    result.map_or(f64::NAN, |n| sign * n)
}

/// parseFloat(string)
pub(crate) fn parse_float(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::from(parse_float_str(&to_js_string(&arg(&args, 0)))))
}

/// Parses the longest prefix that forms a decimal literal.
pub(crate) fn parse_float_str(text: &str) -> f64 {
    let s = text.trim_start();
    let unsigned = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);
    if unsigned.starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if end == digits_start || &s[digits_start..end] == "." {
        return f64::NAN;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// isNaN(value)
pub(crate) fn is_nan(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::Boolean(arg_number(&args, 0).is_nan()))
}

/// isFinite(value)
pub(crate) fn is_finite(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::Boolean(arg_number(&args, 0).is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int_str() {
        assert_eq!(parse_int_str("42px", 0), 42.0);
        assert_eq!(parse_int_str("  -0x1f", 0), -31.0);
        assert_eq!(parse_int_str("101", 2), 5.0);
        assert_eq!(parse_int_str("z", 36), 35.0);
        assert!(parse_int_str("px", 0).is_nan());
        assert!(parse_int_str("1", 1).is_nan());
    }

    #[test]
    fn test_parse_float_str() {
        assert_eq!(parse_float_str("3.14abc"), 3.14);
        assert_eq!(parse_float_str(" -2.5e3x"), -2500.0);
        assert_eq!(parse_float_str("1e"), 1.0);
        assert_eq!(parse_float_str(".5"), 0.5);
        assert_eq!(parse_float_str("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float_str("abc").is_nan());
        assert!(parse_float_str(".").is_nan());
    }
}
