//! Records exchanged with the page runtime.

use std::collections::{BTreeMap, BTreeSet};

use crate::runner::eval::types::EvalOutcome;

/// A binding as the page runtime stores it: where it lives in the scope,
/// how to compute it, and what it currently holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBinding {
    /// Dotted scope path the binding populates, e.g. `form.total`.
    pub scope_path: Option<String>,
    /// Source of the expression computing the value.
    pub expression: Option<String>,
    /// Value supplied from outside (a query result, a component state).
    pub result: Option<EvalOutcome>,
}

impl ParsedBinding {
    pub fn expression(scope_path: impl Into<String>, expression: impl Into<String>) -> Self {
        ParsedBinding {
            scope_path: Some(scope_path.into()),
            expression: Some(expression.into()),
            result: None,
        }
    }

    pub fn value(scope_path: impl Into<String>, result: EvalOutcome) -> Self {
        ParsedBinding {
            scope_path: Some(scope_path.into()),
            expression: None,
            result: Some(result),
        }
    }
}

/// Per-pass state of a binding with an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputationStatus {
    /// On the evaluation stack right now. Reading it again is a cycle.
    Computing,
    Resolved(EvalOutcome),
}

/// Results of one pass together with the dependency edges observed while
/// computing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingReport {
    pub results: BTreeMap<String, EvalOutcome>,
    /// Binding id to the ids it read.
    pub dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl BindingReport {
    /// Every binding that reads `id`, directly or through other bindings.
    pub fn dependents_of(&self, id: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut pending = vec![id.to_string()];
        while let Some(current) = pending.pop() {
            for (dependent, deps) in &self.dependencies {
                if deps.contains(&current) && found.insert(dependent.clone()) {
                    pending.push(dependent.clone());
                }
            }
        }
        found.remove(id);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &[&str])]) -> BTreeMap<String, BTreeSet<String>> {
        pairs
            .iter()
            .map(|(k, deps)| (k.to_string(), deps.iter().map(|d| d.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_dependents_are_transitive() {
        let report = BindingReport {
            results: BTreeMap::new(),
            dependencies: edges(&[("b", &["a"]), ("c", &["b"]), ("d", &["x"])]),
        };
        let dependents: Vec<String> = report.dependents_of("a").into_iter().collect();
        assert_eq!(dependents, vec!["b", "c"]);
        assert!(report.dependents_of("c").is_empty());
    }

    #[test]
    fn test_dependents_terminate_on_cycles() {
        let report = BindingReport {
            results: BTreeMap::new(),
            dependencies: edges(&[("x", &["y"]), ("y", &["x"])]),
        };
        let dependents: Vec<String> = report.dependents_of("x").into_iter().collect();
        assert_eq!(dependents, vec!["y"]);
    }
}
