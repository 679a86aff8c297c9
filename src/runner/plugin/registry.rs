//! Built-in registry for managing built-in globals.

use std::collections::HashMap;

use super::types::{BuiltInObject, NativeFn};
use crate::runner::ds::value::JsValue;
use crate::runner::std_lib::register_core_builtins;

/// Registry for built-in globals.
/// Holds objects like `Math` with their methods, plus plain global values
/// like `NaN`.
pub struct BuiltInRegistry {
    /// All registered built-in objects.
    objects: HashMap<String, BuiltInObject>,

    /// Globals that are plain values.
    values: HashMap<String, JsValue>,
}

impl BuiltInRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        BuiltInRegistry {
            objects: HashMap::new(),
            values: HashMap::new(),
        }
    }

    /// Create a registry with the standard library installed.
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        register_core_builtins(&mut registry);
        registry
    }

    /// Register a built-in object (programmatic API).
    pub fn register_object(&mut self, obj: BuiltInObject) {
        self.objects.insert(obj.name.clone(), obj);
    }

    /// Register a global whose value is fixed.
    pub fn register_value(&mut self, name: impl Into<String>, value: JsValue) {
        self.values.insert(name.into(), value);
    }

    /// Get a registered object by name.
    pub fn get_object(&self, name: &str) -> Option<&BuiltInObject> {
        self.objects.get(name)
    }

    /// Check if a global exists in the registry.
    pub fn has_object(&self, name: &str) -> bool {
        self.objects.contains_key(name) || self.values.contains_key(name)
    }

    /// Remove a global. Prototype methods of a removed object go with it.
    pub fn remove(&mut self, name: &str) -> bool {
        let removed_object = self.objects.remove(name).is_some();
        let removed_value = self.values.remove(name).is_some();
        removed_object || removed_value
    }

    /// Materialize the value a global name resolves to.
    pub fn materialize(&self, name: &str) -> Option<JsValue> {
        match self.objects.get(name) {
            Some(obj) => Some(obj.materialize()),
            None => self.values.get(name).cloned(),
        }
    }

    /// Get a prototype method for values of the given built-in type.
    pub fn get_prototype_method(&self, type_name: &str, method: &str) -> Option<NativeFn> {
        self.objects
            .get(type_name)
            .and_then(|obj| obj.prototype_methods.get(method))
            .copied()
    }

    /// Names of every registered global, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .objects
            .keys()
            .chain(self.values.keys())
            .map(|s| s.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl Default for BuiltInRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_registry_has_expected_globals() {
        let registry = BuiltInRegistry::with_core();
        for name in &["Math", "JSON", "Object", "Array", "String", "Number", "console", "NaN"] {
            assert!(registry.has_object(name), "{}", name);
        }
        assert!(registry.get_prototype_method("Array", "map").is_some());
        assert!(registry.get_prototype_method("Array", "push").is_none());
        assert!(registry.get_object("Math").unwrap().methods.contains_key("max"));
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = BuiltInRegistry::new();
        registry.register_value("b", JsValue::Null);
        registry.register_value("a", JsValue::Null);
        registry.register_object(BuiltInObject::new("C"));
        assert_eq!(registry.names(), vec!["C", "a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut registry = BuiltInRegistry::with_core();
        assert!(registry.remove("Math"));
        assert!(!registry.has_object("Math"));
        assert!(!registry.remove("Math"));
    }
}
