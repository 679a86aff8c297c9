//! Tests for binding passes: lazy resolution of bound scope paths,
//! memoization, cycles, loading values and error isolation.

extern crate toolpad_eval;

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::json;

use toolpad_eval::runner::api::{eval_bindings, eval_bindings_with_report, eval_parsed_bindings};
use toolpad_eval::runner::binding::{BindingGraph, ParsedBinding};
use toolpad_eval::runner::ds::error::{EvalError, JErrorType};
use toolpad_eval::runner::ds::function::JsFunction;
use toolpad_eval::runner::ds::object::JsObject;
use toolpad_eval::runner::ds::value::JsValue;
use toolpad_eval::runner::eval::types::EvalOutcome;
use toolpad_eval::runner::plugin::resolver::PluginResolver;
use toolpad_eval::runner::sandbox::Sandbox;

/// Builds a pass input from `(id, scope path, expression)` triples.
fn expressions(
    entries: &[(&str, &str, &str)],
) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let mut exprs = BTreeMap::new();
    let mut paths = BTreeMap::new();
    for (id, path, source) in entries {
        exprs.insert(id.to_string(), source.to_string());
        paths.insert(path.to_string(), id.to_string());
    }
    (exprs, paths)
}

fn run(entries: &[(&str, &str, &str)]) -> BTreeMap<String, EvalOutcome> {
    let (exprs, paths) = expressions(entries);
    eval_bindings(&Sandbox::new(), &JsObject::new(), BTreeMap::new(), exprs, paths)
}

fn value_of(results: &BTreeMap<String, EvalOutcome>, id: &str) -> serde_json::Value {
    match &results[id] {
        EvalOutcome::Value(v) => v.to_json().unwrap_or(serde_json::Value::Null),
        other => panic!("binding {} has no value: {:?}", id, other),
    }
}

fn error_of<'r>(results: &'r BTreeMap<String, EvalOutcome>, id: &str) -> &'r EvalError {
    match &results[id] {
        EvalOutcome::Error(e) => e,
        other => panic!("binding {} did not fail: {:?}", id, other),
    }
}

/// Global `tick()` counting how many times it was called.
struct CounterPlugin {
    calls: Rc<Cell<usize>>,
}

impl PluginResolver for CounterPlugin {
    fn has_binding(&self, name: &str) -> bool {
        name == "tick"
    }

    fn resolve(&self, _name: &str) -> Result<JsValue, JErrorType> {
        let calls = self.calls.clone();
        Ok(JsValue::function(JsFunction::plugin("tick", move |_ctx, _this, _args| {
            calls.set(calls.get() + 1);
            Ok(JsValue::from(1))
        })))
    }

    fn name(&self) -> &str {
        "counter_plugin"
    }
}

// ============================================================================
// Resolution
// ============================================================================

mod resolution_tests {
    use super::*;

    #[test]
    fn test_bindings_read_each_other_in_any_order() {
        let results = run(&[
            ("total", "form.total", "form.subtotal + form.tax"),
            ("subtotal", "form.subtotal", "form.price * form.qty"),
            ("tax", "form.tax", "form.subtotal / 10"),
            ("price", "form.price", "20"),
            ("qty", "form.qty", "5"),
        ]);
        assert_eq!(value_of(&results, "subtotal"), json!(100));
        assert_eq!(value_of(&results, "tax"), json!(10));
        assert_eq!(value_of(&results, "total"), json!(110));
    }

    #[test]
    fn test_every_binding_has_a_result() {
        let mut precomputed = BTreeMap::new();
        precomputed.insert("state".to_string(), EvalOutcome::Value(JsValue::from("ready")));
        let (exprs, paths) = expressions(&[("label", "label.text", "'Status: ' + status")]);
        let mut paths = paths;
        paths.insert("status".to_string(), "state".to_string());

        let results = eval_bindings(&Sandbox::new(), &JsObject::new(), precomputed, exprs, paths);
        let ids: Vec<&String> = results.keys().collect();
        assert_eq!(ids, vec!["label", "state"]);
        assert_eq!(value_of(&results, "label"), json!("Status: ready"));
        assert_eq!(value_of(&results, "state"), json!("ready"));
    }

    #[test]
    fn test_scope_values_and_bindings_mix() {
        let scope: JsObject = vec![(
            "user",
            JsValue::from(json!({"first": "Ada", "last": "Lovelace"})),
        )]
        .into_iter()
        .collect();
        let (exprs, paths) = expressions(&[
            ("full", "user.full", "user.first + ' ' + user.last"),
            ("greeting", "greeting", "`Hi ${user.full}`"),
        ]);
        let results = eval_bindings(&Sandbox::new(), &scope, BTreeMap::new(), exprs, paths);
        assert_eq!(value_of(&results, "full"), json!("Ada Lovelace"));
        assert_eq!(value_of(&results, "greeting"), json!("Hi Ada Lovelace"));
    }

    #[test]
    fn test_reading_a_parent_object_fills_in_bound_children() {
        let results = run(&[
            ("a", "form.fields.a", "1"),
            ("b", "form.fields.b", "form.fields.a + 1"),
            ("snapshot", "snapshot", "JSON.stringify(form)"),
            ("keys", "keys", "Object.keys(form.fields)"),
        ]);
        assert_eq!(value_of(&results, "snapshot"), json!("{\"fields\":{\"a\":1,\"b\":2}}"));
        assert_eq!(value_of(&results, "keys"), json!(["a", "b"]));
    }

    #[test]
    fn test_bound_array_elements() {
        let scope: JsObject = vec![("rows", JsValue::from(json!([{"qty": 1}, {"qty": 2}])))]
            .into_iter()
            .collect();
        let (exprs, paths) = expressions(&[
            ("second", "rows.1.qty", "rows[0].qty * 10"),
            ("sum", "sum", "rows.reduce((acc, r) => acc + r.qty, 0)"),
        ]);
        let results = eval_bindings(&Sandbox::new(), &scope, BTreeMap::new(), exprs, paths);
        assert_eq!(value_of(&results, "second"), json!(10));
        assert_eq!(value_of(&results, "sum"), json!(11));
    }

    #[test]
    fn test_binding_without_scope_path_still_evaluates() {
        let mut bindings = BTreeMap::new();
        bindings.insert("shown".to_string(), ParsedBinding::expression("panel.visible", "count > 0"));
        bindings.insert(
            "count".to_string(),
            ParsedBinding::value("count", EvalOutcome::Value(JsValue::from(3))),
        );
        bindings.insert(
            "orphan".to_string(),
            ParsedBinding {
                expression: Some("panel.visible ? 'on' : 'off'".to_string()),
                ..ParsedBinding::default()
            },
        );
        let results = eval_parsed_bindings(&Sandbox::new(), &JsObject::new(), &bindings);
        assert_eq!(value_of(&results, "shown"), json!(true));
        assert_eq!(value_of(&results, "orphan"), json!("on"));
    }
}

// ============================================================================
// Memoization and determinism
// ============================================================================

mod memoization_tests {
    use super::*;

    #[test]
    fn test_each_expression_runs_once_per_pass() {
        let calls = Rc::new(Cell::new(0));
        let mut sandbox = Sandbox::new();
        sandbox.add_resolver(Box::new(CounterPlugin { calls: calls.clone() }));

        let (exprs, paths) = expressions(&[
            ("base", "base", "tick() + 41"),
            ("a", "a", "base + 1"),
            ("b", "b", "base + base"),
            ("c", "c", "a + b + base"),
        ]);
        let results = eval_bindings(&sandbox, &JsObject::new(), BTreeMap::new(), exprs, paths);
        assert_eq!(value_of(&results, "c"), json!(43 + 84 + 42));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_passes_do_not_share_results() {
        let calls = Rc::new(Cell::new(0));
        let mut sandbox = Sandbox::new();
        sandbox.add_resolver(Box::new(CounterPlugin { calls: calls.clone() }));

        let (exprs, paths) = expressions(&[("base", "base", "tick()")]);
        eval_bindings(&sandbox, &JsObject::new(), BTreeMap::new(), exprs.clone(), paths.clone());
        eval_bindings(&sandbox, &JsObject::new(), BTreeMap::new(), exprs, paths);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_repeated_passes_agree() {
        let entries = [
            ("x", "x", "[3, 1, 2].toSorted()"),
            ("y", "y", "x.map(n => n * n).join('-')"),
            ("z", "z", "missing.value"),
        ];
        let first = run(&entries);
        let second = run(&entries);
        assert_eq!(value_of(&first, "y"), value_of(&second, "y"));
        assert_eq!(value_of(&first, "y"), json!("1-4-9"));
        assert_eq!(error_of(&first, "z").to_string(), error_of(&second, "z").to_string());
    }
}

// ============================================================================
// Cycles, errors and loading
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn test_self_reference_is_a_cycle() {
        let results = run(&[("loop", "page.loop", "page.loop + 1")]);
        let err = error_of(&results, "loop");
        assert_eq!(err.error, JErrorType::CycleError("page.loop".to_string()));
        assert_eq!(err.to_string().lines().next(), Some("Error: Cycle detected \"page.loop\""));
    }

    #[test]
    fn test_cycle_does_not_poison_unrelated_bindings() {
        let results = run(&[
            ("x", "x", "y + 1"),
            ("y", "y", "x + 1"),
            ("ok", "ok", "2 * 21"),
            ("reader", "reader", "x"),
        ]);
        assert!(matches!(error_of(&results, "x").error, JErrorType::CycleError(_)));
        assert!(matches!(error_of(&results, "y").error, JErrorType::CycleError(_)));
        assert!(matches!(error_of(&results, "reader").error, JErrorType::CycleError(_)));
        assert_eq!(value_of(&results, "ok"), json!(42));
    }

    #[test]
    fn test_errors_propagate_to_readers_with_a_stack() {
        let results = run(&[
            ("broken", "broken", "nothing.here"),
            ("reader", "reader", "broken + 1"),
            ("guarded", "guarded", "typeof other"),
        ]);
        let err = error_of(&results, "reader");
        assert_eq!(err.name(), "ReferenceError");
        assert_eq!(err.message(), "nothing is not defined");
        assert_eq!(err.stack, vec!["at broken (nothing.here)", "at reader (broken + 1)"]);
        assert_eq!(value_of(&results, "guarded"), json!("undefined"));
    }

    #[test]
    fn test_syntax_errors_are_per_binding() {
        let results = run(&[("bad", "bad", "1 +* 2"), ("good", "good", "1 + 2")]);
        assert_eq!(error_of(&results, "bad").name(), "SyntaxError");
        assert_eq!(value_of(&results, "good"), json!(3));
    }

    #[test]
    fn test_precomputed_errors_are_rethrown_to_readers() {
        let mut precomputed = BTreeMap::new();
        precomputed.insert(
            "query".to_string(),
            EvalOutcome::Error(EvalError::new(JErrorType::Error("request failed".to_string()))),
        );
        let (exprs, mut paths) = expressions(&[("rows", "table.rows", "query.data")]);
        paths.insert("query".to_string(), "query".to_string());

        let results = eval_bindings(&Sandbox::new(), &JsObject::new(), precomputed, exprs, paths);
        assert_eq!(error_of(&results, "rows").message(), "request failed");
        assert_eq!(error_of(&results, "query").message(), "request failed");
    }

    #[test]
    fn test_loading_propagates_to_readers_only() {
        let mut precomputed = BTreeMap::new();
        precomputed.insert("users".to_string(), EvalOutcome::Loading);
        let (exprs, mut paths) = expressions(&[
            ("count", "count", "users.data.length"),
            ("fallback", "fallback", "users ?? []"),
            ("title", "title", "'Users'"),
        ]);
        paths.insert("users".to_string(), "users".to_string());

        let results = eval_bindings(&Sandbox::new(), &JsObject::new(), precomputed, exprs, paths);
        assert!(results["users"].is_loading());
        assert!(results["count"].is_loading());
        assert!(results["fallback"].is_loading());
        assert_eq!(value_of(&results, "title"), json!("Users"));
    }

    #[test]
    fn test_unknown_binding_id_is_an_error() {
        let mut paths = BTreeMap::new();
        paths.insert("ghost".to_string(), "gone".to_string());
        let mut exprs = BTreeMap::new();
        exprs.insert("reader".to_string(), "ghost".to_string());
        let results = eval_bindings(&Sandbox::new(), &JsObject::new(), BTreeMap::new(), exprs, paths);
        assert_eq!(error_of(&results, "reader").message(), "No binding for \"gone\"");
    }
}

// ============================================================================
// Dependency report
// ============================================================================

mod report_tests {
    use super::*;

    #[test]
    fn test_report_records_direct_and_transitive_readers() {
        let (exprs, paths) = expressions(&[
            ("price", "price", "10"),
            ("subtotal", "subtotal", "price * 2"),
            ("total", "total", "subtotal + 1"),
            ("label", "label", "'fixed'"),
        ]);
        let graph = BindingGraph::new(BTreeMap::new(), exprs, paths);
        let report = eval_bindings_with_report(&Sandbox::new(), &JsObject::new(), &graph);

        assert_eq!(report.results.len(), 4);
        assert!(report.dependencies["total"].contains("subtotal"));
        assert!(report.dependencies["subtotal"].contains("price"));
        assert!(!report.dependencies.contains_key("label"));

        let dependents: Vec<String> = report.dependents_of("price").into_iter().collect();
        assert_eq!(dependents, vec!["subtotal", "total"]);
    }
}
