use crate::runner::ds::value::{JsNumberType, JsValue};

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_FUNCTION: &str = "function";

/// Result of the `typeof` operator.
pub fn get_type(a: &JsValue) -> &'static str {
    match a {
        JsValue::Undefined => TYPE_STR_UNDEFINED,
        JsValue::Null => TYPE_STR_OBJECT,
        JsValue::Boolean(_) => TYPE_STR_BOOLEAN,
        JsValue::String(_) => TYPE_STR_STRING,
        JsValue::Number(_) => TYPE_STR_NUMBER,
        JsValue::Array(_) | JsValue::Object(_) => TYPE_STR_OBJECT,
        JsValue::Function(_) => TYPE_STR_FUNCTION,
    }
}

/// Collapses containers to primitives the way the default `toString`
/// implementations do; primitives pass through.
pub fn to_primitive(v: &JsValue) -> JsValue {
    match v {
        JsValue::Array(_) | JsValue::Object(_) | JsValue::Function(_) => {
            JsValue::String(to_js_string(v))
        }
        _ => v.clone(),
    }
}

pub fn to_boolean(v: &JsValue) -> bool {
    match v {
        JsValue::Undefined | JsValue::Null => false,
        JsValue::Boolean(b) => *b,
        JsValue::String(s) => !s.is_empty(),
        JsValue::Number(n) => {
            let f = n.as_f64();
            !(f == 0.0 || f.is_nan())
        }
        JsValue::Array(_) | JsValue::Object(_) | JsValue::Function(_) => true,
    }
}

pub fn to_number(v: &JsValue) -> f64 {
    match v {
        JsValue::Undefined => f64::NAN,
        JsValue::Null => 0.0,
        JsValue::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        JsValue::Number(n) => n.as_f64(),
        JsValue::String(s) => string_to_number(s),
        JsValue::Function(_) => f64::NAN,
        JsValue::Array(_) | JsValue::Object(_) => to_number(&to_primitive(v)),
    }
}

/// `Number(s)` for strings: whitespace trimmed, empty is zero, otherwise the
/// whole text must be a numeric literal.
pub fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix).map_or(f64::NAN, |n| n as f64);
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn to_js_string(v: &JsValue) -> String {
    match v {
        JsValue::Undefined => TYPE_STR_UNDEFINED.to_string(),
        JsValue::Null => TYPE_STR_NULL.to_string(),
        JsValue::Boolean(b) => b.to_string(),
        JsValue::String(s) => s.clone(),
        JsValue::Number(n) => number_to_string(n),
        JsValue::Array(items) => items
            .iter()
            .map(|item| {
                if item.is_nullish() {
                    String::new()
                } else {
                    to_js_string(item)
                }
            })
            .collect::<Vec<String>>()
            .join(","),
        JsValue::Object(_) => "[object Object]".to_string(),
        JsValue::Function(f) => format!("function {}() {{ [native code] }}", f.name),
    }
}

pub fn to_property_key(v: &JsValue) -> String {
    to_js_string(v)
}

pub fn number_to_string(n: &JsNumberType) -> String {
    match n {
        JsNumberType::Integer(i) => i.to_string(),
        JsNumberType::Float(f) => float_to_string(*f),
        JsNumberType::NaN => "NaN".to_string(),
        JsNumberType::PositiveInfinity => "Infinity".to_string(),
        JsNumberType::NegativeInfinity => "-Infinity".to_string(),
    }
}

fn float_to_string(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    let abs = f.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let s = format!("{:e}", f);
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => s,
        }
    } else {
        format!("{}", f)
    }
}

pub fn to_int32(f: f64) -> i32 {
    to_uint32(f) as i32
}

pub fn to_uint32(f: f64) -> u32 {
    if !f.is_finite() {
        return 0;
    }
    let int = f.trunc() % 4294967296.0;
    let int = if int < 0.0 { int + 4294967296.0 } else { int };
    int as u32
}

/// `ToIntegerOrInfinity`, used for index arguments.
pub fn to_integer(v: &JsValue) -> f64 {
    let f = to_number(v);
    if f.is_nan() {
        0.0
    } else {
        f.trunc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::object::JsObject;

    #[test]
    fn test_number_formatting() {
        assert_eq!(number_to_string(&JsNumberType::from_f64(0.1 + 0.2)), "0.30000000000000004");
        assert_eq!(number_to_string(&JsNumberType::Float(1.5e21)), "1.5e+21");
        assert_eq!(number_to_string(&JsNumberType::Float(1e-7)), "1e-7");
        assert_eq!(number_to_string(&JsNumberType::Float(2.5)), "2.5");
        assert_eq!(number_to_string(&JsNumberType::NegativeInfinity), "-Infinity");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number("  42 "), 42.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("inf").is_nan());
    }

    #[test]
    fn test_truthiness() {
        assert!(!to_boolean(&JsValue::from("")));
        assert!(!to_boolean(&JsValue::from(f64::NAN)));
        assert!(to_boolean(&JsValue::array(vec![])));
        assert!(to_boolean(&JsValue::object(JsObject::new())));
    }

    #[test]
    fn test_array_to_string() {
        let v = JsValue::array(vec![
            JsValue::from(1),
            JsValue::Null,
            JsValue::array(vec![JsValue::from("a"), JsValue::from(true)]),
        ]);
        assert_eq!(to_js_string(&v), "1,,a,true");
        assert_eq!(to_number(&JsValue::array(vec![JsValue::from("7")])), 7.0);
    }

    #[test]
    fn test_int32_wraps() {
        assert_eq!(to_int32(4294967297.0), 1);
        assert_eq!(to_int32(-1.0), -1);
        assert_eq!(to_uint32(-1.0), 4294967295);
    }
}
