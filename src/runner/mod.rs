//! Evaluation runtime: values, the expression evaluator, the sandbox and
//! the binding resolver.

pub mod api;
pub mod binding;
pub mod ds;
pub mod eval;
pub mod plugin;
pub mod sandbox;
pub mod std_lib;
