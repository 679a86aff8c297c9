//! Entry points used by the page runtime.
//!
//! Two flavours exist. [`evaluate_expressions`] runs independent expressions
//! against a plain scope. [`eval_bindings`] and its variants run a whole
//! binding pass: bound scope paths are computed lazily, memoized for the
//! pass, and checked for cycles.

use std::collections::BTreeMap;

use tracing::debug_span;
use uuid::Uuid;

use crate::runner::binding::graph::BindingGraph;
use crate::runner::binding::resolver::BindingResolver;
use crate::runner::binding::types::{BindingReport, ParsedBinding};
use crate::runner::ds::error::{EvalError, JErrorType};
use crate::runner::ds::object::JsObject;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::scope::StaticScope;
use crate::runner::eval::types::EvalOutcome;
use crate::runner::sandbox::Sandbox;

/// Evaluates each expression against `scope`, independently of the others.
///
/// There are no bindings here, so a loading signal can only come from a
/// host plugin. It is reported as an error.
pub fn evaluate_expressions(
    sandbox: &Sandbox,
    expressions: &[&str],
    scope: &JsObject,
) -> Vec<Result<JsValue, EvalError>> {
    let _span = debug_span!("evaluate_expressions", sandbox = %sandbox.id(), count = expressions.len()).entered();
    expressions
        .iter()
        .map(|source| {
            let mut resolver = StaticScope::new(scope);
            match sandbox.evaluate(source, &mut resolver) {
                EvalOutcome::Value(v) => Ok(v),
                EvalOutcome::Error(e) => Err(e),
                EvalOutcome::Loading => Err(EvalError::new(JErrorType::Error(
                    "Value is still loading".to_string(),
                ))),
            }
        })
        .collect()
}

/// Runs one binding pass.
///
/// The result has an entry for every binding id with an expression or a
/// precomputed value. Each expression runs at most once.
pub fn eval_bindings(
    sandbox: &Sandbox,
    scope: &JsObject,
    precomputed: BTreeMap<String, EvalOutcome>,
    expressions: BTreeMap<String, String>,
    path_to_binding: BTreeMap<String, String>,
) -> BTreeMap<String, EvalOutcome> {
    let graph = BindingGraph::new(precomputed, expressions, path_to_binding);
    eval_bindings_with_report(sandbox, scope, &graph).results
}

/// Runs one binding pass over bindings in the form the page runtime keeps
/// them.
pub fn eval_parsed_bindings(
    sandbox: &Sandbox,
    scope: &JsObject,
    bindings: &BTreeMap<String, ParsedBinding>,
) -> BTreeMap<String, EvalOutcome> {
    let graph = BindingGraph::from_parsed(bindings);
    eval_bindings_with_report(sandbox, scope, &graph).results
}

/// Runs one binding pass and also reports which bindings read which.
pub fn eval_bindings_with_report(sandbox: &Sandbox, scope: &JsObject, graph: &BindingGraph) -> BindingReport {
    let pass = Uuid::new_v4();
    let _span = debug_span!("eval_bindings", sandbox = %sandbox.id(), pass = %pass).entered();

    let global_scope = graph.build_global_scope(scope);
    let mut resolver = BindingResolver::new(graph, global_scope);
    let mut results = BTreeMap::new();
    for id in graph.binding_ids() {
        let outcome = resolver.outcome(id, sandbox);
        results.insert(id.to_string(), outcome);
    }
    BindingReport {
        results,
        dependencies: resolver.into_dependencies(),
    }
}
