//! Evaluation module for executing expression ASTs.
//!
//! This module contains the tree-walking evaluator and the [`scope::ScopeResolver`]
//! seam through which it reads the binding scope.

pub mod expression;
pub mod function;
pub mod scope;
pub mod types;

pub use scope::{ScopeResolver, StaticScope};
pub use types::{Abrupt, EvalOutcome, ValueResult};
