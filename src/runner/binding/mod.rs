//! Dependency-aware evaluation of page bindings.
//!
//! A binding ties a scope path (`form.total`) to an expression computing it.
//! One evaluation pass builds the global scope from the base scope and the
//! declared paths, then resolves bindings lazily through [`BindingResolver`],
//! so a binding is computed when something first reads it and never twice.

pub mod graph;
pub mod resolver;
pub mod types;

pub use graph::BindingGraph;
pub use resolver::BindingResolver;
pub use types::{BindingReport, ComputationStatus, ParsedBinding};
