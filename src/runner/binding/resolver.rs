//! Lazy, memoized resolution of bound scope paths.
//!
//! [`BindingResolver`] is the scope every binding expression of a pass sees.
//! Reading a bound path evaluates that binding's expression on demand, at
//! most once per pass. A binding that is read while it is still on the
//! evaluation stack closes a cycle and fails with a cycle error instead of
//! recursing.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::JsObject;
use crate::runner::ds::operations::object::get_property;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::scope::ScopeResolver;
use crate::runner::eval::types::{Abrupt, EvalOutcome, ValueResult};
use crate::runner::sandbox::Sandbox;

use super::graph::BindingGraph;
use super::types::ComputationStatus;

pub struct BindingResolver<'g> {
    graph: &'g BindingGraph,
    scope: JsObject,
    statuses: HashMap<String, ComputationStatus>,
    /// Bindings being computed, outermost first.
    stack: Vec<String>,
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl<'g> BindingResolver<'g> {
    /// `scope` should already contain every bound path, see
    /// [`BindingGraph::build_global_scope`].
    pub fn new(graph: &'g BindingGraph, scope: JsObject) -> Self {
        BindingResolver {
            graph,
            scope,
            statuses: HashMap::new(),
            stack: Vec::new(),
            dependencies: BTreeMap::new(),
        }
    }

    /// Final outcome of binding `id` for this pass, computing it if needed.
    pub fn outcome(&mut self, id: &str, sandbox: &Sandbox) -> EvalOutcome {
        if self.graph.expression(id).is_some() {
            return EvalOutcome::from_result(self.evaluate_binding(id, sandbox));
        }
        match self.graph.precomputed(id) {
            Some(outcome) => outcome.clone(),
            None => EvalOutcome::Value(JsValue::Undefined),
        }
    }

    pub fn dependencies(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.dependencies
    }

    pub fn into_dependencies(self) -> BTreeMap<String, BTreeSet<String>> {
        self.dependencies
    }

    /// Value of the binding bound at `path`.
    fn read_binding(&mut self, path: &str, id: &str, sandbox: &Sandbox) -> ValueResult {
        if let Some(current) = self.stack.last() {
            self.dependencies
                .entry(current.clone())
                .or_default()
                .insert(id.to_string());
        }
        if !self.graph.is_known(id) {
            return Err(JErrorType::Error(format!("No binding for \"{}\"", id)).into());
        }
        if self.graph.expression(id).is_some() {
            return self.evaluate_binding(id, sandbox);
        }
        match self.graph.precomputed(id) {
            Some(outcome) => {
                trace!(binding = id, path, "precomputed binding read");
                outcome.clone().into_result()
            }
            None => Ok(JsValue::Undefined),
        }
    }

    fn evaluate_binding(&mut self, id: &str, sandbox: &Sandbox) -> ValueResult {
        let path = self.graph.scope_path(id).unwrap_or(id).to_string();
        match self.statuses.get(id) {
            Some(ComputationStatus::Computing) => {
                debug!(binding = id, path = %path, "binding cycle detected");
                return Err(JErrorType::CycleError(path).into());
            }
            Some(ComputationStatus::Resolved(outcome)) => {
                trace!(binding = id, "binding cache hit");
                return outcome.clone().into_result();
            }
            None => {}
        }

        let source = self.graph.expression(id).unwrap_or_default().to_string();
        trace!(binding = id, path = %path, source = %source, "evaluating binding");
        self.statuses.insert(id.to_string(), ComputationStatus::Computing);
        self.stack.push(id.to_string());

        let result = sandbox
            .parse(&source)
            .map_err(Abrupt::from)
            .and_then(|ast| sandbox.evaluate_ast(&ast, self));
        let result = result.map_err(|abrupt| match abrupt {
            Abrupt::Throw(mut e) => {
                e.stack.push(format!("at {} ({})", path, source.trim()));
                Abrupt::Throw(e)
            }
            Abrupt::Loading => Abrupt::Loading,
        });

        self.stack.pop();
        let outcome = EvalOutcome::from_result(result);
        match &outcome {
            EvalOutcome::Error(e) => debug!(binding = id, path = %path, error = %e.error, "binding failed"),
            EvalOutcome::Loading => trace!(binding = id, path = %path, "binding loading"),
            EvalOutcome::Value(_) => trace!(binding = id, path = %path, "binding resolved"),
        }
        self.statuses
            .insert(id.to_string(), ComputationStatus::Resolved(outcome.clone()));
        outcome.into_result()
    }

    /// Copy of `value` (found at `path`) with every bound descendant
    /// replaced by its computed value.
    fn resolve_descendants(&mut self, path: &str, value: JsValue, sandbox: &Sandbox) -> ValueResult {
        if !self.graph.has_bound_descendant(path) {
            return Ok(value);
        }
        match &value {
            JsValue::Object(o) => {
                let mut resolved = JsObject::new();
                for (key, child) in o.entries() {
                    let child_path = format!("{}.{}", path, key);
                    let child = self.resolve_child(&child_path, child.clone(), sandbox)?;
                    resolved.insert(key.as_str(), child);
                }
                Ok(JsValue::object(resolved))
            }
            JsValue::Array(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for (idx, child) in items.iter().enumerate() {
                    let child_path = format!("{}.{}", path, idx);
                    resolved.push(self.resolve_child(&child_path, child.clone(), sandbox)?);
                }
                Ok(JsValue::array(resolved))
            }
            _ => Ok(value),
        }
    }

    fn resolve_child(&mut self, path: &str, value: JsValue, sandbox: &Sandbox) -> ValueResult {
        match self.graph.binding_for_path(path) {
            Some(id) => {
                let id = id.to_string();
                let computed = self.read_binding(path, &id, sandbox)?;
                self.resolve_descendants(path, computed, sandbox)
            }
            None => self.resolve_descendants(path, value, sandbox),
        }
    }
}

impl ScopeResolver for BindingResolver<'_> {
    fn has(&self, name: &str) -> bool {
        self.scope.has(name) || self.graph.binding_for_path(name).is_some()
    }

    fn get(&mut self, name: &str, sandbox: &Sandbox) -> ValueResult {
        match self.graph.binding_for_path(name) {
            Some(id) => {
                let id = id.to_string();
                self.read_binding(name, &id, sandbox)
            }
            None => Ok(self.scope.get(name).cloned().unwrap_or(JsValue::Undefined)),
        }
    }

    fn get_member(&mut self, path: &str, target: &JsValue, key: &str, sandbox: &Sandbox) -> ValueResult {
        match self.graph.binding_for_path(path) {
            Some(id) => {
                let id = id.to_string();
                self.read_binding(path, &id, sandbox)
            }
            None => Ok(get_property(target, key, sandbox)?),
        }
    }

    fn materialize(&mut self, path: &str, value: JsValue, sandbox: &Sandbox) -> ValueResult {
        self.resolve_descendants(path, value, sandbox)
    }
}
