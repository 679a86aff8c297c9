use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use serde_json::{Map, Number, Value};

use crate::runner::ds::function::JsFunction;
use crate::runner::ds::object::JsObject;
use crate::runner::ds::operations::type_conversion::{
    number_to_string, TYPE_STR_NULL, TYPE_STR_UNDEFINED,
};

pub type JsObjectType = Rc<JsObject>;
pub type JsArrayType = Rc<Vec<JsValue>>;
pub type JsFunctionType = Rc<JsFunction>;

/// A value produced or consumed by binding expressions.
///
/// Containers are reference counted and never mutated once shared, so a
/// clone is cheap and two values compare equal only when they are the same
/// allocation (mirroring JS reference identity).
#[derive(Clone)]
pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    String(String),
    Number(JsNumberType),
    Array(JsArrayType),
    Object(JsObjectType),
    Function(JsFunctionType),
}

impl JsValue {
    pub fn array(items: Vec<JsValue>) -> Self {
        JsValue::Array(Rc::new(items))
    }

    pub fn object(object: JsObject) -> Self {
        JsValue::Object(Rc::new(object))
    }

    pub fn function(function: JsFunction) -> Self {
        JsValue::Function(Rc::new(function))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, JsValue::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsObject> {
        match self {
            JsValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsValue]> {
        match self {
            JsValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Converts into JSON following `JSON.stringify` rules: functions and
    /// `undefined` are dropped from objects and become `null` inside arrays.
    /// Returns `None` when the value itself has no JSON form.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            JsValue::Undefined | JsValue::Function(_) => None,
            JsValue::Null => Some(Value::Null),
            JsValue::Boolean(b) => Some(Value::Bool(*b)),
            JsValue::String(s) => Some(Value::String(s.clone())),
            JsValue::Number(n) => Some(match n {
                JsNumberType::Integer(i) => Value::Number(Number::from(*i)),
                JsNumberType::Float(f) if *f == 0.0 => Value::Number(Number::from(0)),
                JsNumberType::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
                _ => Value::Null,
            }),
            JsValue::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .map(|v| v.to_json().unwrap_or(Value::Null))
                    .collect(),
            )),
            JsValue::Object(o) => {
                let mut map = Map::new();
                for (k, v) in o.entries() {
                    if let Some(v) = v.to_json() {
                        map.insert(k.clone(), v);
                    }
                }
                Some(Value::Object(map))
            }
        }
    }
}

impl From<Value> for JsValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsValue::Null,
            Value::Bool(b) => JsValue::Boolean(b),
            Value::String(s) => JsValue::String(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => JsValue::Number(JsNumberType::Integer(i)),
                None => JsValue::Number(JsNumberType::from_f64(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::Array(items) => JsValue::array(items.into_iter().map(JsValue::from).collect()),
            Value::Object(map) => {
                let mut o = JsObject::new();
                for (k, v) in map {
                    o.insert(k, JsValue::from(v));
                }
                JsValue::object(o)
            }
        }
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<i64> for JsValue {
    fn from(i: i64) -> Self {
        JsValue::Number(JsNumberType::Integer(i))
    }
}

impl From<f64> for JsValue {
    fn from(f: f64) -> Self {
        JsValue::Number(JsNumberType::from_f64(f))
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(s.to_string())
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(s)
    }
}

impl Display for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "{}", TYPE_STR_UNDEFINED),
            JsValue::Null => write!(f, "{}", TYPE_STR_NULL),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::String(s) => write!(f, "\"{}\"", s),
            JsValue::Number(n) => write!(f, "{}", n),
            JsValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            JsValue::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.entries().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", k, v)?;
                }
                if o.is_empty() {
                    write!(f, "}}")
                } else {
                    write!(f, " }}")
                }
            }
            JsValue::Function(func) => write!(f, "[Function: {}]", func.display_name()),
        }
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "JsValue::Undefined"),
            JsValue::Null => write!(f, "JsValue::Null"),
            JsValue::Boolean(b) => write!(f, "JsValue::Boolean({})", b),
            JsValue::String(s) => write!(f, "JsValue::String({:?})", s),
            JsValue::Number(n) => write!(f, "JsValue::Number({:?})", n),
            JsValue::Array(items) => write!(f, "JsValue::Array({:?})", items),
            JsValue::Object(o) => {
                write!(f, "JsValue::Object(")?;
                f.debug_map().entries(o.entries()).finish()?;
                write!(f, ")")
            }
            JsValue::Function(func) => write!(f, "JsValue::Function({})", func.display_name()),
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::Array(a), JsValue::Array(b)) => Rc::ptr_eq(a, b),
            (JsValue::Object(a), JsValue::Object(b)) => Rc::ptr_eq(a, b),
            (JsValue::Function(a), JsValue::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum JsNumberType {
    Integer(i64),
    Float(f64),
    NaN,
    PositiveInfinity,
    NegativeInfinity,
}

/// Largest integer magnitude an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;

impl JsNumberType {
    /// Normalizes an f64 into the narrowest variant: whole numbers within the
    /// safe range become `Integer`.
    pub fn from_f64(f: f64) -> Self {
        if f.is_nan() {
            JsNumberType::NaN
        } else if f == f64::INFINITY {
            JsNumberType::PositiveInfinity
        } else if f == f64::NEG_INFINITY {
            JsNumberType::NegativeInfinity
        } else if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER && !(f == 0.0 && f.is_sign_negative()) {
            JsNumberType::Integer(f as i64)
        } else {
            JsNumberType::Float(f)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            JsNumberType::Integer(i) => *i as f64,
            JsNumberType::Float(f) => *f,
            JsNumberType::NaN => f64::NAN,
            JsNumberType::PositiveInfinity => f64::INFINITY,
            JsNumberType::NegativeInfinity => f64::NEG_INFINITY,
        }
    }
}

impl PartialEq for JsNumberType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsNumberType::Integer(a), JsNumberType::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl Display for JsNumberType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", number_to_string(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_f64_normalizes_whole_numbers() {
        assert!(matches!(JsNumberType::from_f64(3.0), JsNumberType::Integer(3)));
        assert!(matches!(JsNumberType::from_f64(0.5), JsNumberType::Float(_)));
        assert!(matches!(JsNumberType::from_f64(f64::NAN), JsNumberType::NaN));
        assert!(matches!(
            JsNumberType::from_f64(-1.0 / 0.0),
            JsNumberType::NegativeInfinity
        ));
    }

    #[test]
    fn test_json_keeps_key_order() {
        let v = JsValue::from(json!({"b": 1, "a": [true, null], "c": {"d": 2.5}}));
        let keys: Vec<String> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(
            v.to_json().unwrap(),
            json!({"b": 1, "a": [true, null], "c": {"d": 2.5}})
        );
    }

    #[test]
    fn test_to_json_drops_undefined_members() {
        let mut o = JsObject::new();
        o.insert("a", JsValue::Undefined);
        o.insert("b", JsValue::from(1));
        let v = JsValue::array(vec![JsValue::object(o), JsValue::Undefined]);
        assert_eq!(v.to_json().unwrap(), json!([{"b": 1}, null]));
    }
}
