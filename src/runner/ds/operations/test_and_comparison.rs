use std::cmp::Ordering;
use std::rc::Rc;

use crate::runner::ds::operations::type_conversion::{to_number, to_primitive, string_to_number};
use crate::runner::ds::value::JsValue;

fn is_same_value(a: &JsValue, b: &JsValue, nan_equals_nan: bool) -> bool {
    match (a, b) {
        (JsValue::Undefined, JsValue::Undefined) | (JsValue::Null, JsValue::Null) => true,
        (JsValue::Boolean(x), JsValue::Boolean(y)) => x == y,
        (JsValue::String(x), JsValue::String(y)) => x == y,
        (JsValue::Number(x), JsValue::Number(y)) => {
            let (x, y) = (x.as_f64(), y.as_f64());
            if x.is_nan() && y.is_nan() {
                nan_equals_nan
            } else {
                x == y
            }
        }
        (JsValue::Array(x), JsValue::Array(y)) => Rc::ptr_eq(x, y),
        (JsValue::Object(x), JsValue::Object(y)) => Rc::ptr_eq(x, y),
        (JsValue::Function(x), JsValue::Function(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// `===`
pub fn strict_equality_comparison(a: &JsValue, b: &JsValue) -> bool {
    is_same_value(a, b, false)
}

/// Equality used by `includes`: like `===` except `NaN` matches itself.
pub fn same_value_zero(a: &JsValue, b: &JsValue) -> bool {
    is_same_value(a, b, true)
}

fn is_container(v: &JsValue) -> bool {
    matches!(v, JsValue::Array(_) | JsValue::Object(_) | JsValue::Function(_))
}

/// `==`
pub fn abstract_equality_comparison(a: &JsValue, b: &JsValue) -> bool {
    match (a, b) {
        (JsValue::Undefined | JsValue::Null, JsValue::Undefined | JsValue::Null) => true,
        (JsValue::Undefined | JsValue::Null, _) | (_, JsValue::Undefined | JsValue::Null) => false,
        (JsValue::Number(x), JsValue::String(y)) => x.as_f64() == string_to_number(y),
        (JsValue::String(x), JsValue::Number(y)) => string_to_number(x) == y.as_f64(),
        (JsValue::Boolean(_), _) => abstract_equality_comparison(&JsValue::from(to_number(a)), b),
        (_, JsValue::Boolean(_)) => abstract_equality_comparison(a, &JsValue::from(to_number(b))),
        (x, y) if is_container(x) && !is_container(y) => {
            abstract_equality_comparison(&to_primitive(x), y)
        }
        (x, y) if !is_container(x) && is_container(y) => {
            abstract_equality_comparison(x, &to_primitive(y))
        }
        _ => strict_equality_comparison(a, b),
    }
}

/// Orders two values for `<`, `<=`, `>`, `>=`. `None` means the comparison
/// involved `NaN` and every relational operator yields `false`.
pub fn abstract_relational_comparison(a: &JsValue, b: &JsValue) -> Option<Ordering> {
    let pa = to_primitive(a);
    let pb = to_primitive(b);
    if let (JsValue::String(x), JsValue::String(y)) = (&pa, &pb) {
        // JS compares strings by UTF-16 code units.
        return Some(x.encode_utf16().cmp(y.encode_utf16()));
    }
    to_number(&pa).partial_cmp(&to_number(&pb))
}
