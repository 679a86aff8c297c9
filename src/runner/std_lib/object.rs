//! Object built-in.
//!
//! Provides the `Object` global with its static helpers and the methods
//! reachable from plain objects. Objects are immutable once shared, so
//! `Object.assign` builds and returns a fresh object instead of writing into
//! its first argument.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::JsObject;
use crate::runner::ds::operations::object::{iterate_values, string_char_at, string_length};
use crate::runner::ds::operations::type_conversion::{to_js_string, to_property_key};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::ValueResult;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::{BuiltInObject, EvalContext};

use super::arg;

/// Register the Object built-in with the registry.
pub fn register(registry: &mut BuiltInRegistry) {
    let object = BuiltInObject::new("Object")
        .with_call(object_call)
        .add_method("keys", object_keys)
        .add_method("values", object_values)
        .add_method("entries", object_entries)
        .add_method("fromEntries", object_from_entries)
        .add_method("assign", object_assign)
        .add_prototype_method("hasOwnProperty", object_has_own_property)
        .add_prototype_method("toString", object_to_string);

    registry.register_object(object);
}

/// Own enumerable `(key, value)` pairs of `v`, in insertion order.
pub(crate) fn own_entries(v: &JsValue) -> Result<Vec<(String, JsValue)>, JErrorType> {
    match v {
        JsValue::Undefined | JsValue::Null => Err(JErrorType::TypeError(
            "Cannot convert undefined or null to object".to_string(),
        )),
        JsValue::Object(o) => Ok(o.entries().map(|(k, v)| (k.clone(), v.clone())).collect()),
        JsValue::Array(items) => Ok(items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect()),
        JsValue::String(s) => Ok((0..string_length(s))
            .filter_map(|i| string_char_at(s, i).map(|c| (i.to_string(), JsValue::String(c))))
            .collect()),
        JsValue::Function(f) => Ok(f
            .properties
            .entries()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()),
        JsValue::Boolean(_) | JsValue::Number(_) => Ok(Vec::new()),
    }
}

/// Object(value)
fn object_call(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    match arg(&args, 0) {
        v @ JsValue::Object(_) | v @ JsValue::Array(_) | v @ JsValue::Function(_) => Ok(v),
        _ => Ok(JsValue::object(JsObject::new())),
    }
}

/// Object.keys(o)
fn object_keys(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let entries = own_entries(&arg(&args, 0))?;
    Ok(JsValue::array(
        entries.into_iter().map(|(k, _)| JsValue::String(k)).collect(),
    ))
}

/// Object.values(o)
fn object_values(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let entries = own_entries(&arg(&args, 0))?;
    Ok(JsValue::array(entries.into_iter().map(|(_, v)| v).collect()))
}

/// Object.entries(o)
fn object_entries(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let entries = own_entries(&arg(&args, 0))?;
    Ok(JsValue::array(
        entries
            .into_iter()
            .map(|(k, v)| JsValue::array(vec![JsValue::String(k), v]))
            .collect(),
    ))
}

/// Object.fromEntries(iterable)
fn object_from_entries(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let mut result = JsObject::new();
    for entry in iterate_values(&arg(&args, 0))? {
        match &entry {
            JsValue::Array(pair) => {
                let key = pair.first().map_or_else(|| "undefined".to_string(), to_property_key);
                result.insert(key, pair.get(1).cloned().unwrap_or(JsValue::Undefined));
            }
            other => {
                return Err(JErrorType::TypeError(format!(
                    "Iterator value {} is not an entry object",
                    to_js_string(other)
                ))
                .into())
            }
        }
    }
    Ok(JsValue::object(result))
}

/// Object.assign(target, ...sources)
fn object_assign(_ctx: &mut EvalContext<'_>, _this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let mut result = JsObject::new();
    for (i, source) in args.iter().enumerate() {
        if i > 0 && source.is_nullish() {
            continue;
        }
        for (k, v) in own_entries(source)? {
            result.insert(k, v);
        }
    }
    Ok(JsValue::object(result))
}

/// Object.prototype.hasOwnProperty(key)
fn object_has_own_property(_ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult {
    let key = to_property_key(&arg(&args, 0));
    Ok(JsValue::Boolean(match &this {
        JsValue::Object(o) => o.has(&key),
        _ => false,
    }))
}

/// Object.prototype.toString()
fn object_to_string(_ctx: &mut EvalContext<'_>, _this: JsValue, _args: Vec<JsValue>) -> ValueResult {
    Ok(JsValue::from("[object Object]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_entries_of_array_and_string() {
        let arr = JsValue::array(vec![JsValue::from("a"), JsValue::from("b")]);
        let keys: Vec<String> = own_entries(&arr).unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["0", "1"]);

        let chars: Vec<JsValue> = own_entries(&JsValue::from("hi"))
            .unwrap()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        assert_eq!(chars, vec![JsValue::from("h"), JsValue::from("i")]);
    }

    #[test]
    fn test_own_entries_rejects_nullish() {
        let err = own_entries(&JsValue::Null).unwrap_err();
        assert_eq!(err.name(), "TypeError");
    }
}
