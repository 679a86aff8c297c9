//! Tests for the built-in globals, exercised through expressions.

extern crate toolpad_eval;

use serde_json::json;

use toolpad_eval::runner::ds::error::EvalError;
use toolpad_eval::runner::ds::object::JsObject;
use toolpad_eval::runner::ds::value::JsValue;
use toolpad_eval::runner::eval::scope::StaticScope;
use toolpad_eval::runner::eval::types::EvalOutcome;
use toolpad_eval::runner::plugin::config::SandboxConfig;
use toolpad_eval::runner::sandbox::Sandbox;

fn run(code: &str) -> EvalOutcome {
    let scope: JsObject = vec![
        ("items", JsValue::from(json!([{"name": "pen", "price": 3}, {"name": "ink", "price": 12}]))),
        ("words", JsValue::from(json!(["b", "a", "c"]))),
    ]
    .into_iter()
    .collect();
    Sandbox::new().evaluate(code, &mut StaticScope::new(&scope))
}

fn eval(code: &str) -> JsValue {
    match run(code) {
        EvalOutcome::Value(v) => v,
        other => panic!("{} did not produce a value: {:?}", code, other),
    }
}

fn eval_json(code: &str) -> serde_json::Value {
    eval(code).to_json().expect("value has a JSON form")
}

fn eval_err(code: &str) -> EvalError {
    match run(code) {
        EvalOutcome::Error(e) => e,
        other => panic!("{} did not fail: {:?}", code, other),
    }
}

// ============================================================================
// Math
// ============================================================================

mod math_tests {
    use super::*;

    #[test]
    fn test_rounding() {
        assert_eq!(eval("Math.round(2.5)"), JsValue::from(3));
        assert_eq!(eval("Math.round(-2.5)"), JsValue::from(-2));
        assert_eq!(eval("Math.floor(-1.5)"), JsValue::from(-2));
        assert_eq!(eval("Math.ceil(1.1)"), JsValue::from(2));
        assert_eq!(eval("Math.trunc(-4.7)"), JsValue::from(-4));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(eval("Math.max(1, 5, 3)"), JsValue::from(5));
        assert_eq!(eval("Math.min(...items.map(i => i.price))"), JsValue::from(3));
        assert_eq!(eval("Math.max()"), JsValue::from(f64::NEG_INFINITY));
        assert!(eval("Math.max(1, 'x')").as_f64().unwrap().is_nan());
    }

    #[test]
    fn test_misc() {
        assert_eq!(eval("Math.abs(-7)"), JsValue::from(7));
        assert_eq!(eval("Math.pow(2, 8)"), JsValue::from(256));
        assert_eq!(eval("Math.sqrt(81)"), JsValue::from(9));
        assert_eq!(eval("Math.sign(-3)"), JsValue::from(-1));
        assert_eq!(eval("Math.hypot(3, 4)"), JsValue::from(5));
        assert_eq!(eval("Math.PI > 3.14 && Math.PI < 3.15"), JsValue::from(true));
    }

    #[test]
    fn test_no_random() {
        assert_eq!(eval("typeof Math.random"), JsValue::from("undefined"));
    }
}

// ============================================================================
// JSON
// ============================================================================

mod json_tests {
    use super::*;

    #[test]
    fn test_stringify() {
        assert_eq!(eval("JSON.stringify({ a: 1, b: [true, null] })"), JsValue::from("{\"a\":1,\"b\":[true,null]}"));
        assert_eq!(eval("JSON.stringify('hi')"), JsValue::from("\"hi\""));
        assert_eq!(eval("JSON.stringify({ f: x => x, u: undefined, n: 1 })"), JsValue::from("{\"n\":1}"));
        assert_eq!(eval("JSON.stringify(undefined)"), JsValue::Undefined);
    }

    #[test]
    fn test_stringify_indent() {
        assert_eq!(eval("JSON.stringify({ a: 1 }, null, 2)"), JsValue::from("{\n  \"a\": 1\n}"));
    }

    #[test]
    fn test_parse() {
        assert_eq!(eval_json("JSON.parse('{\"a\": [1, 2]}')"), json!({"a": [1, 2]}));
        assert_eq!(eval("JSON.parse('3').toFixed(1)"), JsValue::from("3.0"));
        assert_eq!(eval_err("JSON.parse('{')").name(), "SyntaxError");
    }
}

// ============================================================================
// Object and Array
// ============================================================================

mod collection_tests {
    use super::*;

    #[test]
    fn test_object_statics() {
        assert_eq!(eval_json("Object.keys({ b: 1, a: 2 })"), json!(["b", "a"]));
        assert_eq!(eval_json("Object.values({ b: 1, a: 2 })"), json!([1, 2]));
        assert_eq!(eval_json("Object.entries({ k: 'v' })"), json!([["k", "v"]]));
        assert_eq!(eval_json("Object.fromEntries([['x', 1], ['y', 2]])"), json!({"x": 1, "y": 2}));
        assert_eq!(eval_json("Object.assign({ a: 1 }, { b: 2 }, { a: 3 })"), json!({"a": 3, "b": 2}));
        assert_eq!(eval("({ a: 1 }).hasOwnProperty('a')"), JsValue::from(true));
        assert_eq!(eval_err("Object.keys(null)").name(), "TypeError");
    }

    #[test]
    fn test_array_callbacks() {
        assert_eq!(eval_json("items.map(i => i.name)"), json!(["pen", "ink"]));
        assert_eq!(eval_json("items.filter(i => i.price > 5).map(i => i.name)"), json!(["ink"]));
        assert_eq!(eval("items.reduce((sum, i) => sum + i.price, 0)"), JsValue::from(15));
        assert_eq!(eval("items.find(i => i.name === 'ink').price"), JsValue::from(12));
        assert_eq!(eval("items.findIndex(i => i.price > 100)"), JsValue::from(-1));
        assert_eq!(eval("items.some(i => i.price > 10)"), JsValue::from(true));
        assert_eq!(eval("items.every(i => i.price > 10)"), JsValue::from(false));
        assert_eq!(eval_json("[1, 2, 3].map((x, idx) => x * idx)"), json!([0, 2, 6]));
    }

    #[test]
    fn test_array_reduce_without_initial_value() {
        assert_eq!(eval("[1, 2, 3].reduce((a, b) => a + b)"), JsValue::from(6));
        assert_eq!(eval_err("[].reduce((a, b) => a + b)").name(), "TypeError");
    }

    #[test]
    fn test_array_queries() {
        assert_eq!(eval("words.includes('a')"), JsValue::from(true));
        assert_eq!(eval("words.indexOf('c')"), JsValue::from(2));
        assert_eq!(eval("words.join('/')"), JsValue::from("b/a/c"));
        assert_eq!(eval("words.at(-1)"), JsValue::from("c"));
        assert_eq!(eval_json("words.slice(1)"), json!(["a", "c"]));
        assert_eq!(eval_json("[1, [2, [3]]].flat()"), json!([1, 2, [3]]));
        assert_eq!(eval_json("[1, 2].concat([3], 4)"), json!([1, 2, 3, 4]));
        assert_eq!(eval("Array.isArray(words)"), JsValue::from(true));
        assert_eq!(eval_json("Array.from('ab')"), json!(["a", "b"]));
    }

    #[test]
    fn test_sorting_leaves_the_source_alone() {
        assert_eq!(eval_json("words.sort()"), json!(["a", "b", "c"]));
        assert_eq!(eval_json("words"), json!(["b", "a", "c"]));
        assert_eq!(eval_json("[10, 9, 1].toSorted()"), json!([1, 10, 9]));
        assert_eq!(eval_json("[10, 9, 1].toSorted((a, b) => a - b)"), json!([1, 9, 10]));
        assert_eq!(eval_json("words.toReversed()"), json!(["c", "a", "b"]));
    }

    #[test]
    fn test_callback_must_be_a_function() {
        assert_eq!(eval_err("words.map(1)").name(), "TypeError");
    }
}

// ============================================================================
// String, Number and globals
// ============================================================================

mod primitive_tests {
    use super::*;

    #[test]
    fn test_string_methods() {
        assert_eq!(eval("'Hello'.toUpperCase()"), JsValue::from("HELLO"));
        assert_eq!(eval("'  pad '.trim()"), JsValue::from("pad"));
        assert_eq!(eval("'a-b-c'.split('-').length"), JsValue::from(3));
        assert_eq!(eval("'abc'.slice(-2)"), JsValue::from("bc"));
        assert_eq!(eval("'7'.padStart(3, '0')"), JsValue::from("007"));
        assert_eq!(eval("'aXbX'.replaceAll('X', '-')"), JsValue::from("a-b-"));
        assert_eq!(eval("'aXbX'.replace('X', '-')"), JsValue::from("a-bX"));
        assert_eq!(eval("'ab'.repeat(3)"), JsValue::from("ababab"));
        assert_eq!(eval("'abc'.startsWith('ab')"), JsValue::from(true));
        assert_eq!(eval("'abc'.charCodeAt(1)"), JsValue::from(98));
        assert_eq!(eval_err("'x'.repeat(-1)").name(), "RangeError");
    }

    #[test]
    fn test_number_methods() {
        assert_eq!(eval("(1.005).toFixed(2)"), JsValue::from("1.00"));
        assert_eq!(eval("(2.5).toFixed(0)"), JsValue::from("3"));
        assert_eq!(eval("(255).toString(16)"), JsValue::from("ff"));
        assert_eq!(eval("Number('42')"), JsValue::from(42));
        assert_eq!(eval("Number.isInteger(5)"), JsValue::from(true));
        assert_eq!(eval("Number.isNaN('x')"), JsValue::from(false));
        assert_eq!(eval_err("(1).toFixed(101)").name(), "RangeError");
    }

    #[test]
    fn test_global_functions() {
        assert_eq!(eval("parseInt('42px')"), JsValue::from(42));
        assert_eq!(eval("parseInt('ff', 16)"), JsValue::from(255));
        assert_eq!(eval("parseFloat('3.5e1x')"), JsValue::from(35));
        assert_eq!(eval("isNaN('x')"), JsValue::from(true));
        assert_eq!(eval("Boolean('')"), JsValue::from(false));
        assert_eq!(eval("String(12)"), JsValue::from("12"));
    }

    #[test]
    fn test_console_returns_undefined() {
        assert_eq!(eval("console.log('total', 1)"), JsValue::Undefined);
    }

    #[test]
    fn test_disabled_builtins_are_gone() {
        let config = SandboxConfig {
            disabled_globals: vec!["console".to_string()],
            ..SandboxConfig::default()
        };
        let sandbox = Sandbox::with_config(config);
        let scope = JsObject::new();
        let outcome = sandbox.evaluate("console.log(1)", &mut StaticScope::new(&scope));
        assert_eq!(outcome.error().unwrap().name(), "ReferenceError");
    }
}

// ============================================================================
// Size limits
// ============================================================================

mod limit_tests {
    use super::*;

    fn run_with(config: SandboxConfig, code: &str) -> EvalOutcome {
        let scope = JsObject::new();
        Sandbox::with_config(config).evaluate(code, &mut StaticScope::new(&scope))
    }

    fn assert_range_error(code: &str, message: &str) {
        let err = eval_err(code);
        assert_eq!(err.name(), "RangeError", "{}", code);
        assert_eq!(err.message(), message, "{}", code);
    }

    #[test]
    fn test_huge_repeat_is_a_range_error() {
        assert_range_error("'ab'.repeat(1e18)", "Invalid string length");
        assert_range_error("'ab'.repeat(2 ** 29 + 1)", "Invalid string length");
        assert_eq!(eval("''.repeat(1e18)"), JsValue::from(""));
        assert_eq!(eval("'ab'.repeat(0)"), JsValue::from(""));
    }

    #[test]
    fn test_huge_padding_is_a_range_error() {
        assert_range_error("'a'.padStart(1e18)", "Invalid string length");
        assert_range_error("'a'.padEnd(1e18, 'xy')", "Invalid string length");
        assert_eq!(eval("'a'.padStart(1e18, '')"), JsValue::from("a"));
    }

    #[test]
    fn test_huge_array_from_is_a_range_error() {
        assert_range_error("Array.from({ length: 1e18 })", "Invalid array length");
        assert_range_error("Array.from({ length: 2 ** 32 })", "Invalid array length");
        assert_eq!(eval_json("Array.from({ length: 2 })"), json!([null, null]));
        assert_eq!(eval_json("Array.from({ length: 3 }, (_, i) => i * 2)"), json!([0, 2, 4]));
    }

    #[test]
    fn test_configured_caps_are_enforced() {
        let config = SandboxConfig {
            max_string_length: 8,
            max_array_length: 4,
            ..SandboxConfig::default()
        };
        let err = run_with(config.clone(), "'ab'.repeat(5)").error().cloned().unwrap();
        assert_eq!(err.message(), "Invalid string length");
        assert_eq!(run_with(config.clone(), "'ab'.repeat(4)").value(), Some(&JsValue::from("abababab")));
        assert!(run_with(config.clone(), "'x'.padEnd(9)").error().is_some());
        assert_eq!(run_with(config.clone(), "'x'.padEnd(8).length").value(), Some(&JsValue::from(8)));
        let err = run_with(config.clone(), "Array.from({ length: 5 })").error().cloned().unwrap();
        assert_eq!(err.message(), "Invalid array length");
        assert_eq!(run_with(config, "Array.from({ length: 4 }).length").value(), Some(&JsValue::from(4)));
    }

    #[test]
    fn test_sandbox_survives_a_limit_error() {
        let sandbox = Sandbox::new();
        let scope = JsObject::new();
        let outcome = sandbox.evaluate("'ab'.repeat(1e18)", &mut StaticScope::new(&scope));
        assert!(outcome.error().is_some());
        let outcome = sandbox.evaluate("'ab'.repeat(2)", &mut StaticScope::new(&scope));
        assert_eq!(outcome.value(), Some(&JsValue::from("abab")));
    }
}
