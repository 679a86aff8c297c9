//! JSON built-in object.
//!
//! Provides JSON.parse and JSON.stringify, both backed by `serde_json`.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{to_integer, to_js_string};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::ValueResult;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Longest indent JSON.stringify honors.
const MAX_INDENT: usize = 10;

/// Register the JSON object with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let json = BuiltInObject::new("JSON")
        .add_method("parse", json_parse)
        .add_method("stringify", json_stringify);

    registry.register_object(json);
}

/// JSON.parse(text)
fn json_parse(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let text = to_js_string(&arg(&args, 0));
    let parsed: Value = serde_json::from_str(&text)
        .map_err(|e| JErrorType::SyntaxError(format!("Unexpected token in JSON: {}", e)))?;
    Ok(JsValue::from(parsed))
}

/// JSON.stringify(value, replacer, space)
///
/// The replacer argument is accepted but not applied.
fn json_stringify(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let json = match arg(&args, 0).to_json() {
        Some(json) => json,
        None => return Ok(JsValue::Undefined),
    };
    let indent = indent_from(&arg(&args, 2));
    Ok(JsValue::String(stringify(&json, &indent)?))
}

/// The indent string described by the `space` argument.
fn indent_from(space: &JsValue) -> String {
    match space {
        JsValue::Number(_) => {
            let n = to_integer(space).clamp(0.0, MAX_INDENT as f64) as usize;
            " ".repeat(n)
        }
        JsValue::String(s) => s.chars().take(MAX_INDENT).collect(),
        _ => String::new(),
    }
}

pub(crate) fn stringify(json: &Value, indent: &str) -> Result<String, JErrorType> {
    if indent.is_empty() {
        return serde_json::to_string(json).map_err(|e| JErrorType::TypeError(e.to_string()));
    }
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    json.serialize(&mut ser)
        .map_err(|e| JErrorType::TypeError(e.to_string()))?;
    String::from_utf8(out).map_err(|e| JErrorType::TypeError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indent_from_space_argument() {
        assert_eq!(indent_from(&JsValue::from(2)), "  ");
        assert_eq!(indent_from(&JsValue::from(40)), " ".repeat(MAX_INDENT));
        assert_eq!(indent_from(&JsValue::from(-3)), "");
        assert_eq!(indent_from(&JsValue::from("\t")), "\t");
        assert_eq!(indent_from(&JsValue::Undefined), "");
    }

    #[test]
    fn test_stringify_compact_and_pretty() {
        let v = json!({"a": [1, 2], "b": "x"});
        assert_eq!(stringify(&v, "").unwrap(), r#"{"a":[1,2],"b":"x"}"#);
        assert_eq!(
            stringify(&json!({"a": 1}), "  ").unwrap(),
            "{\n  \"a\": 1\n}"
        );
    }
}
