//! Core plugin resolver: wraps the `BuiltInRegistry` as a `PluginResolver`.
//!
//! This makes all built-in globals (Math, console, String, etc.) available
//! through the super-global scope's lazy resolution mechanism.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function::JsFunction;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::resolver::PluginResolver;

/// Wraps a `BuiltInRegistry` as a `PluginResolver`.
pub struct CorePluginResolver {
    registry: BuiltInRegistry,
}

impl CorePluginResolver {
    pub fn new(registry: BuiltInRegistry) -> Self {
        CorePluginResolver { registry }
    }
}

impl PluginResolver for CorePluginResolver {
    fn has_binding(&self, name: &str) -> bool {
        self.registry.has_object(name)
    }

    fn resolve(&self, name: &str) -> Result<JsValue, JErrorType> {
        self.registry
            .materialize(name)
            .ok_or_else(|| JErrorType::ReferenceError(format!("{} is not defined", name)))
    }

    fn prototype_method(&self, type_name: &str, method: &str) -> Option<JsValue> {
        self.registry
            .get_prototype_method(type_name, method)
            .map(|f| JsValue::function(JsFunction::native(method, f)))
    }

    fn name(&self) -> &str {
        "core"
    }
}
