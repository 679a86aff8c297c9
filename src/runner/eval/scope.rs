//! How the evaluator reads names that are not arrow function locals.
//!
//! Values reached from the scope keep track of the dotted path they were read
//! from (`form.total`), so a resolver can intercept nested reads the same way
//! it intercepts top-level ones.

use crate::runner::ds::object::JsObject;
use crate::runner::ds::operations::object::get_property;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::ValueResult;
use crate::runner::sandbox::Sandbox;

pub trait ScopeResolver {
    /// Whether a top-level name is in scope.
    fn has(&self, name: &str) -> bool;

    /// Read a top-level name. Only called when `has(name)` is true.
    fn get(&mut self, name: &str, sandbox: &Sandbox) -> ValueResult;

    /// Read `key` of `target`, a scope-derived value. `path` is the full
    /// dotted path of the member being read.
    fn get_member(&mut self, path: &str, target: &JsValue, key: &str, sandbox: &Sandbox) -> ValueResult {
        let _ = path;
        Ok(get_property(target, key, sandbox)?)
    }

    /// Called when a scope-derived value found at `path` leaves the scope as
    /// a plain value, so anything computed lazily below it gets filled in.
    fn materialize(&mut self, path: &str, value: JsValue, sandbox: &Sandbox) -> ValueResult {
        let _ = (path, sandbox);
        Ok(value)
    }
}

/// A scope without bindings: names map straight to values.
pub struct StaticScope<'s> {
    scope: &'s JsObject,
}

impl<'s> StaticScope<'s> {
    pub fn new(scope: &'s JsObject) -> Self {
        StaticScope { scope }
    }
}

impl ScopeResolver for StaticScope<'_> {
    fn has(&self, name: &str) -> bool {
        self.scope.has(name)
    }

    fn get(&mut self, name: &str, _sandbox: &Sandbox) -> ValueResult {
        Ok(self.scope.get(name).cloned().unwrap_or(JsValue::Undefined))
    }
}
