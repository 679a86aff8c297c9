//! Binding pass benchmarks: chains of bindings reading each other and wide
//! pages of independent bindings over a shared scope.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

use toolpad_eval::runner::api::{eval_bindings, evaluate_expressions};
use toolpad_eval::runner::ds::object::JsObject;
use toolpad_eval::runner::ds::value::JsValue;
use toolpad_eval::runner::sandbox::Sandbox;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// `n` bindings where each one reads the previous.
fn chain(n: usize) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let mut expressions = BTreeMap::new();
    let mut paths = BTreeMap::new();
    for i in 0..n {
        let id = format!("b{}", i);
        let source = if i == 0 {
            "1".to_string()
        } else {
            format!("page.v{} + 1", i - 1)
        };
        expressions.insert(id.clone(), source);
        paths.insert(format!("page.v{}", i), id);
    }
    (expressions, paths)
}

/// `n` independent bindings that all read the same table.
fn wide(n: usize) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
    let mut expressions = BTreeMap::new();
    let mut paths = BTreeMap::new();
    for i in 0..n {
        let id = format!("w{}", i);
        expressions.insert(
            id.clone(),
            format!("rows.filter(r => r.qty > {}).map(r => r.name).join(', ')", i % 10),
        );
        paths.insert(format!("cells.c{}", i), id);
    }
    (expressions, paths)
}

fn table_scope() -> JsObject {
    let rows: Vec<serde_json::Value> = (0..50)
        .map(|i| json!({"name": format!("item-{}", i), "qty": i % 13}))
        .collect();
    vec![("rows", JsValue::from(json!(rows)))].into_iter().collect()
}

// ============================================================================
// BENCHMARKS
// ============================================================================

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("binding_chain");
    let sandbox = Sandbox::new();
    for n in [10, 50, 100] {
        let (expressions, paths) = chain(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                eval_bindings(
                    &sandbox,
                    &JsObject::new(),
                    BTreeMap::new(),
                    black_box(expressions.clone()),
                    paths.clone(),
                )
            })
        });
    }
    group.finish();
}

fn bench_wide_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("binding_wide");
    let sandbox = Sandbox::new();
    let scope = table_scope();
    for n in [10, 100] {
        let (expressions, paths) = wide(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                eval_bindings(
                    &sandbox,
                    &scope,
                    BTreeMap::new(),
                    black_box(expressions.clone()),
                    paths.clone(),
                )
            })
        });
    }
    group.finish();
}

fn bench_expressions(c: &mut Criterion) {
    let sandbox = Sandbox::new();
    let scope = table_scope();
    let sources = [
        "rows.length",
        "rows.reduce((sum, r) => sum + r.qty, 0)",
        "`${rows[0].name}: ${rows[0].qty.toFixed(2)}`",
        "JSON.stringify(rows.slice(0, 5))",
    ];
    c.bench_function("evaluate_expressions", |b| {
        b.iter(|| evaluate_expressions(&sandbox, black_box(&sources[..]), &scope))
    });
}

// ============================================================================
// CRITERION CONFIGURATION
// ============================================================================

criterion_group!(benches, bench_chain, bench_wide_page, bench_expressions);

criterion_main!(benches);
