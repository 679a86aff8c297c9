//! Plugin resolver trait for lazy, dynamic resolution of super-global objects.
//!
//! Plugins implement `PluginResolver` to provide globals (like `Math`, `console`
//! or a host's own helpers) that binding expressions can reference. Globals are
//! resolved lazily, only when an expression actually references them.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::JsValue;

/// A plugin resolver that can dynamically provide named globals.
///
/// Resolvers are queried in registration order when a name lookup reaches the
/// super-global scope. The first resolver that claims a name wins.
pub trait PluginResolver {
    /// Does this resolver provide a global with the given name?
    ///
    /// This should be a cheap check (e.g. a `HashSet::contains`).
    /// It must NOT allocate or materialize the value.
    fn has_binding(&self, name: &str) -> bool;

    /// Materialize the value for the given name.
    ///
    /// Called only after `has_binding` returns `true`.
    /// The returned `JsValue` is cached by the sandbox, so this is called at
    /// most once per name per sandbox.
    fn resolve(&self, name: &str) -> Result<JsValue, JErrorType>;

    /// A method reachable from values of a built-in type, e.g. `map` on
    /// `"Array"`. Most plugins only provide globals and keep the default.
    fn prototype_method(&self, _type_name: &str, _method: &str) -> Option<JsValue> {
        None
    }

    /// Human-readable name for this resolver (for debugging/logging).
    fn name(&self) -> &str;
}
