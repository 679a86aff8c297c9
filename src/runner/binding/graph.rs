//! The binding declarations of a page, indexed for one evaluation pass.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::runner::ds::object::JsObject;
use crate::runner::ds::operations::object::array_index;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::EvalOutcome;

use super::types::ParsedBinding;

/// Bindings keyed by id, plus the scope paths they populate.
///
/// Ordered maps keep passes deterministic and make "is anything bound below
/// this path" a range query.
#[derive(Debug, Clone, Default)]
pub struct BindingGraph {
    precomputed: BTreeMap<String, EvalOutcome>,
    expressions: BTreeMap<String, String>,
    /// Ids declared without expression or value. They read as `undefined`.
    declared: BTreeSet<String>,
    path_to_binding: BTreeMap<String, String>,
    binding_to_path: HashMap<String, String>,
}

impl BindingGraph {
    pub fn new(
        precomputed: BTreeMap<String, EvalOutcome>,
        expressions: BTreeMap<String, String>,
        path_to_binding: BTreeMap<String, String>,
    ) -> Self {
        let binding_to_path = path_to_binding
            .iter()
            .map(|(path, id)| (id.clone(), path.clone()))
            .collect();
        BindingGraph {
            precomputed,
            expressions,
            declared: BTreeSet::new(),
            path_to_binding,
            binding_to_path,
        }
    }

    /// Builds the graph from per-binding records.
    pub fn from_parsed(bindings: &BTreeMap<String, ParsedBinding>) -> Self {
        let mut graph = BindingGraph::default();
        for (id, binding) in bindings {
            if let Some(path) = &binding.scope_path {
                graph.path_to_binding.insert(path.clone(), id.clone());
                graph.binding_to_path.insert(id.clone(), path.clone());
            }
            if let Some(expression) = &binding.expression {
                graph.expressions.insert(id.clone(), expression.clone());
            }
            if let Some(result) = &binding.result {
                graph.precomputed.insert(id.clone(), result.clone());
            }
            if binding.expression.is_none() && binding.result.is_none() {
                graph.declared.insert(id.clone());
            }
        }
        graph
    }

    /// Ids that get an entry in the pass results: those with an expression
    /// or a precomputed value.
    pub fn binding_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .expressions
            .keys()
            .chain(self.precomputed.keys())
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn is_known(&self, id: &str) -> bool {
        self.expressions.contains_key(id)
            || self.precomputed.contains_key(id)
            || self.declared.contains(id)
    }

    pub fn expression(&self, id: &str) -> Option<&str> {
        self.expressions.get(id).map(String::as_str)
    }

    pub fn precomputed(&self, id: &str) -> Option<&EvalOutcome> {
        self.precomputed.get(id)
    }

    pub fn binding_for_path(&self, path: &str) -> Option<&str> {
        self.path_to_binding.get(path).map(String::as_str)
    }

    pub fn scope_path(&self, id: &str) -> Option<&str> {
        self.binding_to_path.get(id).map(String::as_str)
    }

    /// Whether some bound path lies strictly below `path`.
    pub fn has_bound_descendant(&self, path: &str) -> bool {
        let prefix = format!("{}.", path);
        self.path_to_binding
            .range(prefix.clone()..)
            .next()
            .map_or(false, |(p, _)| p.starts_with(&prefix))
    }

    /// Copies `base` and writes every bound path into it: the precomputed
    /// value when there is one and no expression, `undefined` otherwise.
    /// Missing intermediate objects are created, and a primitive sitting on
    /// the way to a bound path is replaced by an object.
    pub fn build_global_scope(&self, base: &JsObject) -> JsObject {
        let mut scope = base.clone();
        for (path, id) in &self.path_to_binding {
            let value = match (self.expressions.contains_key(id), self.precomputed.get(id)) {
                (false, Some(outcome)) => outcome.value_or_undefined(),
                _ => JsValue::Undefined,
            };
            let segments: Vec<&str> = path.split('.').collect();
            set_path(&mut scope, &segments, value);
        }
        scope
    }
}

fn set_path(object: &mut JsObject, segments: &[&str], value: JsValue) {
    match segments {
        [] => {}
        [last] => object.insert(*last, value),
        [first, rest @ ..] => {
            let current = object.get(first).cloned().unwrap_or(JsValue::Undefined);
            object.insert(*first, set_below(&current, rest, value));
        }
    }
}

/// A copy of `current` with `value` written at `segments`.
fn set_below(current: &JsValue, segments: &[&str], value: JsValue) -> JsValue {
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return value,
    };
    match (current, array_index(first)) {
        (JsValue::Array(items), Some(idx)) => {
            let mut items = items.to_vec();
            if items.len() <= idx {
                items.resize(idx + 1, JsValue::Undefined);
            }
            let updated = set_below(&items[idx], rest, value);
            items[idx] = updated;
            JsValue::array(items)
        }
        _ => {
            let mut object = match current {
                JsValue::Object(o) => JsObject::clone(o),
                _ => JsObject::new(),
            };
            set_path(&mut object, segments, value);
            JsValue::object(object)
        }
    }
}
