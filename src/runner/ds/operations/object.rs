use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::to_js_string;
use crate::runner::ds::value::JsValue;
use crate::runner::sandbox::Sandbox;

pub const PROTOTYPE_ARRAY: &str = "Array";
pub const PROTOTYPE_STRING: &str = "String";
pub const PROTOTYPE_NUMBER: &str = "Number";
pub const PROTOTYPE_OBJECT: &str = "Object";

/// Parses a canonical array index key (`"0"`, `"12"`, but not `"01"`).
pub fn array_index(key: &str) -> Option<usize> {
    let idx = key.parse::<usize>().ok()?;
    if idx.to_string() == key {
        Some(idx)
    } else {
        None
    }
}

/// UTF-16 length, which is what `.length` reports for strings.
pub fn string_length(s: &str) -> usize {
    s.encode_utf16().count()
}

pub fn string_char_at(s: &str, idx: usize) -> Option<String> {
    let unit = s.encode_utf16().nth(idx)?;
    Some(String::from_utf16_lossy(&[unit]))
}

/// Reads `target[key]`. Own data wins over prototype methods, and only the
/// prototype methods registered with the sandbox are reachable, so there is
/// no path to `constructor` or `__proto__`.
pub fn get_property(target: &JsValue, key: &str, sandbox: &Sandbox) -> Result<JsValue, JErrorType> {
    let prototype = match target {
        JsValue::Undefined | JsValue::Null => {
            return Err(JErrorType::TypeError(format!(
                "Cannot read properties of {} (reading '{}')",
                to_js_string(target),
                key
            )))
        }
        JsValue::Object(o) => {
            if let Some(v) = o.get(key) {
                return Ok(v.clone());
            }
            PROTOTYPE_OBJECT
        }
        JsValue::Array(items) => {
            if key == "length" {
                return Ok(JsValue::from(items.len() as i64));
            }
            if let Some(idx) = array_index(key) {
                return Ok(items.get(idx).cloned().unwrap_or(JsValue::Undefined));
            }
            PROTOTYPE_ARRAY
        }
        JsValue::String(s) => {
            if key == "length" {
                return Ok(JsValue::from(string_length(s) as i64));
            }
            if let Some(idx) = array_index(key) {
                return Ok(string_char_at(s, idx).map_or(JsValue::Undefined, JsValue::String));
            }
            PROTOTYPE_STRING
        }
        JsValue::Number(_) => PROTOTYPE_NUMBER,
        JsValue::Boolean(_) => return Ok(JsValue::Undefined),
        JsValue::Function(f) => {
            if let Some(v) = f.properties.get(key) {
                return Ok(v.clone());
            }
            return Ok(match key {
                "name" => JsValue::from(f.name.as_str()),
                "length" => JsValue::from(f.arity() as i64),
                _ => JsValue::Undefined,
            });
        }
    };
    Ok(sandbox
        .prototype_method(prototype, key)
        .unwrap_or(JsValue::Undefined))
}

/// Values produced by iterating `v`, as spread and `Array.from` see them.
pub fn iterate_values(v: &JsValue) -> Result<Vec<JsValue>, JErrorType> {
    match v {
        JsValue::Array(items) => Ok(items.iter().cloned().collect()),
        JsValue::String(s) => Ok(s.chars().map(|c| JsValue::String(c.to_string())).collect()),
        _ => Err(JErrorType::TypeError(format!(
            "{} is not iterable",
            to_js_string(v)
        ))),
    }
}

/// The `in` operator.
pub fn has_property(target: &JsValue, key: &str) -> Result<bool, JErrorType> {
    match target {
        JsValue::Object(o) => Ok(o.has(key)),
        JsValue::Array(items) => Ok(key == "length" || array_index(key).map_or(false, |i| i < items.len())),
        JsValue::Function(f) => Ok(f.properties.has(key) || key == "name" || key == "length"),
        _ => Err(JErrorType::TypeError(format!(
            "Cannot use 'in' operator to search for '{}' in {}",
            key,
            to_js_string(target)
        ))),
    }
}
