//! Super-global environment, the bottom of the scope chain.
//!
//! This environment sits below the binding scope and lazily resolves
//! built-in and plugin-provided globals on first access. Values are
//! cached after first resolution so each name is materialized at most once
//! per sandbox.
//!
//! ## How It Works
//!
//! ```text
//! Expression: Math.abs(-5)
//!      ↓
//! 1. Check arrow function locals → not found
//! 2. Check binding scope → not found
//! 3. Check denied host globals → not denied
//! 4. Check super-global → "Math" found!
//!      ↓
//! 5. Query resolvers: Does anyone provide "Math"?
//! 6. CorePluginResolver says "yes"
//! 7. Cache the materialized object
//! ```
//!
//! Prototype methods (`[1, 2].map`) go through the same cache under a
//! `Type.prototype.method` key.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::trace;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::JsValue;
use crate::runner::plugin::resolver::PluginResolver;

/// The super-global environment for lazy resolution of built-in globals.
///
/// Resolution takes `&self`: the caches sit behind `RefCell`, which keeps a
/// sandbox shareable across nested evaluations while staying single-threaded.
pub struct SuperGlobalEnvironment {
    /// Registered plugin resolvers, queried in order.
    resolvers: Vec<Box<dyn PluginResolver>>,
    /// Cache of already-resolved bindings (name → value).
    cache: RefCell<HashMap<String, JsValue>>,
    /// Cache of which resolver index owns which name.
    resolver_map: RefCell<HashMap<String, usize>>,
}

impl SuperGlobalEnvironment {
    pub fn new() -> Self {
        SuperGlobalEnvironment {
            resolvers: Vec::new(),
            cache: RefCell::new(HashMap::new()),
            resolver_map: RefCell::new(HashMap::new()),
        }
    }

    /// Register a plugin resolver. Resolvers are queried in registration order.
    pub fn add_resolver(&mut self, resolver: Box<dyn PluginResolver>) {
        self.resolvers.push(resolver);
    }

    /// Find which resolver (if any) provides the given name.
    fn find_resolver_index(&self, name: &str) -> Option<usize> {
        if let Some(&idx) = self.resolver_map.borrow().get(name) {
            return Some(idx);
        }
        self.resolvers.iter().position(|r| r.has_binding(name))
    }

    /// Check if any resolver provides the given name.
    pub fn has_name(&self, name: &str) -> bool {
        self.cache.borrow().contains_key(name) || self.find_resolver_index(name).is_some()
    }

    /// Resolve a name, caching the result.
    pub fn resolve_binding(&self, name: &str) -> Result<JsValue, JErrorType> {
        if let Some(val) = self.cache.borrow().get(name) {
            return Ok(val.clone());
        }

        match self.find_resolver_index(name) {
            Some(idx) => {
                let resolver = &self.resolvers[idx];
                trace!(global = name, resolver = resolver.name(), "materializing global");
                let value = resolver.resolve(name)?;
                self.cache.borrow_mut().insert(name.to_string(), value.clone());
                self.resolver_map.borrow_mut().insert(name.to_string(), idx);
                Ok(value)
            }
            None => Err(JErrorType::ReferenceError(format!("{} is not defined", name))),
        }
    }

    /// Look up a prototype method, e.g. `("Array", "map")`.
    pub fn prototype_method(&self, type_name: &str, method: &str) -> Option<JsValue> {
        let key = format!("{}.prototype.{}", type_name, method);
        if let Some(val) = self.cache.borrow().get(&key) {
            return Some(val.clone());
        }
        let value = self
            .resolvers
            .iter()
            .find_map(|r| r.prototype_method(type_name, method))?;
        self.cache.borrow_mut().insert(key, value.clone());
        Some(value)
    }
}

impl Default for SuperGlobalEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
