//! # toolpad-eval - Binding Evaluation Engine
//!
//! Evaluates the JavaScript expressions that low-code pages attach to their
//! component properties, in a sandbox, against a page scope whose entries
//! may themselves be computed by other expressions:
//! - PEG parser for the JavaScript expression subset, producing an ESTree-like AST
//! - Tree-walking evaluator over immutable, reference-counted values
//! - Owned sandbox with lazily resolved built-ins and pluggable host globals
//! - Lazy dependency resolver with per-pass memoization and cycle detection
//!
//! ## Quick Start
//!
//! ### Evaluating an expression
//!
//! ```
//! use toolpad_eval::runner::ds::object::JsObject;
//! use toolpad_eval::runner::ds::value::JsValue;
//! use toolpad_eval::runner::eval::scope::StaticScope;
//! use toolpad_eval::runner::sandbox::Sandbox;
//!
//! let sandbox = Sandbox::new();
//! let mut scope = JsObject::new();
//! scope.insert("price", JsValue::from(20));
//! scope.insert("qty", JsValue::from(3));
//!
//! let outcome = sandbox.evaluate("`Total: ${price * qty}`", &mut StaticScope::new(&scope));
//! assert_eq!(outcome.value(), Some(&JsValue::from("Total: 60")));
//! ```
//!
//! ### Running a binding pass
//!
//! ```
//! use std::collections::BTreeMap;
//! use toolpad_eval::runner::api::eval_bindings;
//! use toolpad_eval::runner::ds::object::JsObject;
//! use toolpad_eval::runner::ds::value::JsValue;
//! use toolpad_eval::runner::eval::types::EvalOutcome;
//! use toolpad_eval::runner::sandbox::Sandbox;
//!
//! let sandbox = Sandbox::new();
//! let mut expressions = BTreeMap::new();
//! expressions.insert("b1".to_string(), "form.price * 2".to_string());
//! let mut precomputed = BTreeMap::new();
//! precomputed.insert("b2".to_string(), EvalOutcome::Value(JsValue::from(21)));
//! let mut paths = BTreeMap::new();
//! paths.insert("form.total".to_string(), "b1".to_string());
//! paths.insert("form.price".to_string(), "b2".to_string());
//!
//! let results = eval_bindings(&sandbox, &JsObject::new(), precomputed, expressions, paths);
//! assert_eq!(results["b1"], EvalOutcome::Value(JsValue::from(42)));
//! ```
//!
//! ## Lazy Dependency Resolution
//!
//! Binding expressions read the page scope through the
//! [`runner::eval::scope::ScopeResolver`] trait rather than through a plain
//! object.
//!
//! ### How It Works
//!
//! 1. **Scope paths**: Every value read from the scope remembers the dotted
//!    path it came from, so `user.profile.name` is seen by the resolver as a
//!    read of that path even though `user` and `user.profile` are ordinary
//!    objects.
//!
//! 2. **On-demand evaluation**: When a read hits a path bound to an
//!    expression, the resolver evaluates that expression first, with itself
//!    as the scope, and hands back the result.
//!
//! 3. **Memoization**: Outcomes are cached for the rest of the pass. A
//!    binding read by ten others still runs once.
//!
//! 4. **Cycle detection**: A binding being computed is marked as such. A
//!    second read before it finishes is a cycle and fails with an error
//!    naming the path.
//!
//! 5. **Loading**: Values that have not arrived yet are a distinct outcome,
//!    not an error. Anything that reads them is loading too.
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG parser and AST types
//! - **[`runner`]** - Evaluation runtime
//!   - **[`runner::sandbox`]** - The owned evaluation context
//!   - **[`runner::binding`]** - Binding graph and lazy resolver
//!   - **[`runner::plugin`]** - Plugin system, super-global scope and sandbox config
//!   - **[`runner::ds`]** - Values, objects, errors and JS conversions
//!   - **[`runner::eval`]** - Tree-walking evaluator
//!   - **[`runner::std_lib`]** - Built-in globals
//!   - **[`runner::api`]** - Entry points for the page runtime

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;

pub use runner::api::{
    eval_bindings, eval_bindings_with_report, eval_parsed_bindings, evaluate_expressions,
};
pub use runner::ds::error::{EvalError, JErrorType};
pub use runner::ds::value::JsValue;
pub use runner::eval::types::EvalOutcome;
pub use runner::sandbox::Sandbox;
