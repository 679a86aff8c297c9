//! Plugin architecture and super-global scope.
//!
//! This module implements the **super-global scope** - the lazily resolved
//! layer of globals (`Math`, `JSON`, `console`, host helpers) that binding
//! expressions can reference without them being part of the page scope.
//!
//! ```text
//! Name Lookup Order:
//! 1. Arrow function locals
//! 2. Binding scope (page state, bound paths)
//! 3. Denied host globals → ReferenceError
//! 4. Super-global scope ← Built-ins and plugins live here
//! ```
//!
//! ### Key Components
//!
//! - **[`PluginResolver`]**: Trait for providing globals dynamically
//! - **[`SuperGlobalEnvironment`]**: Container holding multiple resolvers with caching
//! - **[`CorePluginResolver`]**: Adapter wrapping [`BuiltInRegistry`] as a resolver
//! - **[`SandboxConfig`]**: TOML configuration for a sandbox
//!
//! ## Example: Custom Plugin
//!
//! ```
//! use toolpad_eval::runner::plugin::resolver::PluginResolver;
//! use toolpad_eval::runner::ds::function::JsFunction;
//! use toolpad_eval::runner::ds::value::JsValue;
//! use toolpad_eval::runner::ds::error::JErrorType;
//! use toolpad_eval::runner::sandbox::Sandbox;
//! use toolpad_eval::runner::eval::scope::StaticScope;
//! use toolpad_eval::runner::ds::object::JsObject;
//!
//! struct UtilsPlugin;
//!
//! impl PluginResolver for UtilsPlugin {
//!     fn has_binding(&self, name: &str) -> bool {
//!         name == "double"
//!     }
//!
//!     fn resolve(&self, _name: &str) -> Result<JsValue, JErrorType> {
//!         Ok(JsValue::function(JsFunction::plugin("double", |_ctx, _this, args| {
//!             let n = args.first().and_then(|v| v.as_f64()).unwrap_or(0.0);
//!             Ok(JsValue::from(n * 2.0))
//!         })))
//!     }
//!
//!     fn name(&self) -> &str { "utils_plugin" }
//! }
//!
//! let mut sandbox = Sandbox::new();
//! sandbox.add_resolver(Box::new(UtilsPlugin));
//! let scope = JsObject::new();
//! let outcome = sandbox.evaluate("double(21)", &mut StaticScope::new(&scope));
//! assert_eq!(outcome.value(), Some(&JsValue::from(42)));
//! ```

pub mod config;
pub mod core_resolver;
pub mod registry;
pub mod resolver;
pub mod super_global;
pub mod types;

pub use config::{ConfigError, SandboxConfig};
pub use core_resolver::CorePluginResolver;
pub use registry::BuiltInRegistry;
pub use resolver::PluginResolver;
pub use super_global::SuperGlobalEnvironment;
pub use types::{BuiltInObject, EvalContext, HostFn, NativeFn};
