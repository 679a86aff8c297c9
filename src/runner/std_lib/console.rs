//! Console built-in object.
//!
//! Provides console.log, console.info, console.debug, console.warn and
//! console.error. Output goes to the `tracing` pipeline under the
//! `toolpad_eval::console` target instead of stdout, tagged with the sandbox
//! id. Turning `console_enabled` off in the sandbox config silences all of it.

use tracing::{debug, error, info, warn};

use crate::runner::ds::operations::type_conversion::to_js_string;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::ValueResult;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::json::stringify;

/// Register the console object with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let console = BuiltInObject::new("console")
        .add_method("log", console_log)
        .add_method("info", console_info)
        .add_method("debug", console_debug)
        .add_method("warn", console_warn)
        .add_method("error", console_error);

    registry.register_object(console);
}

/// Format a JsValue for console output. Strings print raw and containers
/// as JSON.
fn format_value(value: &JsValue) -> String {
    match value {
        JsValue::String(s) => s.clone(),
        JsValue::Array(_) | JsValue::Object(_) => value
            .to_json()
            .and_then(|json| stringify(&json, "").ok())
            .unwrap_or_else(|| to_js_string(value)),
        JsValue::Function(_) => format!("{}", value),
        other => to_js_string(other),
    }
}

/// Format all arguments for console output.
fn format_args(args: &[JsValue]) -> String {
    args.iter()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(" ")
}

/// console.log
fn console_log(ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    if ctx.sandbox.config().console_enabled {
        info!(target: "toolpad_eval::console", sandbox = %ctx.sandbox.id(), "{}", format_args(&args));
    }
    Ok(JsValue::Undefined)
}

/// console.info
fn console_info(ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    if ctx.sandbox.config().console_enabled {
        info!(target: "toolpad_eval::console", sandbox = %ctx.sandbox.id(), "{}", format_args(&args));
    }
    Ok(JsValue::Undefined)
}

/// console.debug
fn console_debug(ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    if ctx.sandbox.config().console_enabled {
        debug!(target: "toolpad_eval::console", sandbox = %ctx.sandbox.id(), "{}", format_args(&args));
    }
    Ok(JsValue::Undefined)
}

/// console.warn
fn console_warn(ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    if ctx.sandbox.config().console_enabled {
        warn!(target: "toolpad_eval::console", sandbox = %ctx.sandbox.id(), "{}", format_args(&args));
    }
    Ok(JsValue::Undefined)
}

/// console.error
fn console_error(ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    if ctx.sandbox.config().console_enabled {
        error!(target: "toolpad_eval::console", sandbox = %ctx.sandbox.id(), "{}", format_args(&args));
    }
    Ok(JsValue::Undefined)
}
