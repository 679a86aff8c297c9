//! The evaluation sandbox.
//!
//! A [`Sandbox`] is an owned, isolated evaluation context. Expressions run
//! inside it see only three kinds of names: arrow function locals, names the
//! supplied [`ScopeResolver`] knows, and the sandbox built-ins. Host globals
//! such as `window` or `fetch` never resolve, whatever plugins are installed.
//!
//! A sandbox is cheap to keep around and should be reused across passes:
//! built-ins are materialized lazily and cached for its whole lifetime. It is
//! not `Sync`; give each thread its own.

use std::cell::Cell;
use std::collections::HashSet;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::parser::ast::ExpressionType;
use crate::parser::ExprParser;
use crate::runner::ds::error::{EvalError, JErrorType};
use crate::runner::ds::value::JsValue;
use crate::runner::eval::expression::evaluate_expression;
use crate::runner::eval::scope::ScopeResolver;
use crate::runner::eval::types::{Abrupt, EvalOutcome, ValueResult};
use crate::runner::plugin::config::SandboxConfig;
use crate::runner::plugin::core_resolver::CorePluginResolver;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::resolver::PluginResolver;
use crate::runner::plugin::super_global::SuperGlobalEnvironment;
use crate::runner::plugin::types::EvalContext;

lazy_static! {
    /// Browser and runtime globals that must stay unreachable from
    /// expressions.
    static ref HOST_GLOBALS: HashSet<&'static str> = [
        "window",
        "document",
        "globalThis",
        "self",
        "location",
        "navigator",
        "localStorage",
        "sessionStorage",
        "indexedDB",
        "fetch",
        "XMLHttpRequest",
        "WebSocket",
        "parent",
        "top",
        "frames",
        "opener",
        "eval",
        "Function",
        "process",
        "require",
        "module",
        "importScripts",
    ]
    .iter()
    .copied()
    .collect();
}

/// Owned evaluation context replacing a shared, process-wide one.
pub struct Sandbox {
    id: Uuid,
    config: SandboxConfig,
    super_global: SuperGlobalEnvironment,
    depth: Cell<usize>,
}

/// Releases one level of the sandbox's depth counter when dropped.
pub struct DepthGuard<'s> {
    depth: &'s Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl Sandbox {
    pub fn new() -> Self {
        Self::with_config(SandboxConfig::default())
    }

    pub fn with_config(config: SandboxConfig) -> Self {
        let id = Uuid::new_v4();
        let mut registry = BuiltInRegistry::with_core();
        for name in &config.disabled_globals {
            if !registry.remove(name) {
                warn!(sandbox = %id, global = %name, "disabled global is not a built-in");
            }
        }
        let mut super_global = SuperGlobalEnvironment::new();
        super_global.add_resolver(Box::new(CorePluginResolver::new(registry)));
        debug!(sandbox = %id, max_depth = config.max_depth, "sandbox created");
        Sandbox {
            id,
            config,
            super_global,
            depth: Cell::new(0),
        }
    }

    /// Unique id, attached to log events for correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Registers extra globals, consulted after the core built-ins.
    pub fn add_resolver(&mut self, resolver: Box<dyn PluginResolver>) {
        debug!(sandbox = %self.id, resolver = resolver.name(), "resolver added");
        self.super_global.add_resolver(resolver);
    }

    /// Whether `name` is a host global that expressions may not see.
    pub fn is_denied(&self, name: &str) -> bool {
        HOST_GLOBALS.contains(name) || self.config.denied_globals.iter().any(|d| d == name)
    }

    pub fn has_global(&self, name: &str) -> bool {
        !self.is_denied(name) && self.super_global.has_name(name)
    }

    /// Resolves a built-in or plugin global. Denied names are reported
    /// exactly like undeclared ones.
    pub fn resolve_global(&self, name: &str) -> Result<JsValue, JErrorType> {
        if self.is_denied(name) {
            return Err(JErrorType::ReferenceError(format!("{} is not defined", name)));
        }
        self.super_global.resolve_binding(name)
    }

    /// Method available on values of a built-in type, e.g. `("Array", "map")`.
    pub fn prototype_method(&self, type_name: &str, method: &str) -> Option<JsValue> {
        self.super_global.prototype_method(type_name, method)
    }

    pub fn parse(&self, source: &str) -> Result<ExpressionType, EvalError> {
        ExprParser::parse_to_ast_from_str(source)
            .map_err(|e| EvalError::new(JErrorType::SyntaxError(e.to_string())))
    }

    /// Parses and evaluates `source` against `scope`. Never panics: parse
    /// failures and thrown errors both come back as [`EvalOutcome::Error`].
    pub fn evaluate(&self, source: &str, scope: &mut dyn ScopeResolver) -> EvalOutcome {
        let result = self
            .parse(source)
            .map_err(Abrupt::from)
            .and_then(|ast| self.evaluate_ast(&ast, scope));
        EvalOutcome::from_result(result.map_err(|abrupt| match abrupt {
            Abrupt::Throw(mut e) => {
                if e.stack.is_empty() {
                    e.stack.push(format!("at <expression> ({})", source.trim()));
                }
                Abrupt::Throw(e)
            }
            Abrupt::Loading => Abrupt::Loading,
        }))
    }

    /// Evaluates an already parsed expression. Counts as one level of
    /// nesting.
    pub fn evaluate_ast(&self, ast: &ExpressionType, scope: &mut dyn ScopeResolver) -> ValueResult {
        let _guard = self.enter()?;
        let mut ctx = EvalContext::new(self, scope);
        evaluate_expression(ast, &mut ctx)
    }

    /// Claims one level of nesting, failing with a `RangeError` once
    /// `max_depth` levels are active.
    pub fn enter(&self) -> Result<DepthGuard<'_>, Abrupt> {
        let depth = self.depth.get();
        if depth >= self.config.max_depth {
            debug!(sandbox = %self.id, depth, "maximum depth exceeded");
            return Err(JErrorType::RangeError("Maximum call stack size exceeded".to_string()).into());
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}
