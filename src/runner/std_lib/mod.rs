//! Standard library built-in objects.
//!
//! This module contains the globals available inside the sandbox: console,
//! Object, Array, String, Number, Boolean, Math, JSON and the global
//! functions. Everything here is side-effect free apart from `console`, which
//! only writes to the log.

pub mod array;
pub mod console;
pub mod core;
pub mod json;
pub mod math;
pub mod number;
pub mod object;
pub mod string;

pub use self::core::register_core_builtins;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{to_integer, to_number};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::Abrupt;
use crate::runner::plugin::types::EvalContext;

/// Argument `i`, or `undefined` when not supplied.
pub(crate) fn arg(args: &[JsValue], i: usize) -> JsValue {
    args.get(i).cloned().unwrap_or(JsValue::Undefined)
}

pub(crate) fn arg_number(args: &[JsValue], i: usize) -> f64 {
    args.get(i).map_or(f64::NAN, to_number)
}

/// Resolves a relative index argument (negative counts from the end)
/// against `len`, clamped to `0..=len`. Missing arguments yield `default`.
pub(crate) fn relative_index(args: &[JsValue], i: usize, len: usize, default: usize) -> usize {
    match args.get(i) {
        None | Some(JsValue::Undefined) => default,
        Some(v) => {
            let rel = to_integer(v);
            let len = len as f64;
            let idx = if rel < 0.0 { (len + rel).max(0.0) } else { rel.min(len) };
            idx as usize
        }
    }
}

/// Checks a result length, in code units, before a string is built.
/// Taken as `f64` so oversized products never wrap.
pub(crate) fn check_string_length(ctx: &EvalContext<'_>, len: f64) -> Result<usize, Abrupt> {
    if len > ctx.sandbox.config().max_string_length as f64 {
        return Err(JErrorType::RangeError("Invalid string length".to_string()).into());
    }
    Ok(len as usize)
}

/// Checks an array length before anything is allocated for it.
pub(crate) fn check_array_length(ctx: &EvalContext<'_>, len: f64) -> Result<usize, Abrupt> {
    if len > ctx.sandbox.config().array_length_limit() as f64 {
        return Err(JErrorType::RangeError("Invalid array length".to_string()).into());
    }
    Ok(len as usize)
}
