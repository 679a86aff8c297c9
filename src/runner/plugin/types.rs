//! Core types for the plugin architecture.

use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function::JsFunction;
use crate::runner::ds::object::JsObject;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::function::call_function;
use crate::runner::eval::scope::ScopeResolver;
use crate::runner::eval::types::ValueResult;
use crate::runner::sandbox::Sandbox;

/// Execution context threaded through every evaluation step and handed to
/// native functions.
pub struct EvalContext<'a> {
    /// Sandbox supplying globals, configuration and the depth guard.
    pub sandbox: &'a Sandbox,

    /// Resolves names that are not locals: the binding scope.
    pub scope: &'a mut dyn ScopeResolver,

    /// Arrow function parameter frames, innermost last.
    frames: Vec<Vec<(String, JsValue)>>,
}

impl<'a> EvalContext<'a> {
    pub fn new(sandbox: &'a Sandbox, scope: &'a mut dyn ScopeResolver) -> Self {
        EvalContext {
            sandbox,
            scope,
            frames: Vec::new(),
        }
    }

    pub fn get_local(&self, name: &str) -> Option<&JsValue> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn push_frame(&mut self, frame: Vec<(String, JsValue)>) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Every local visible right now, outermost first, for closures to
    /// capture.
    pub fn captured_locals(&self) -> Vec<(String, JsValue)> {
        self.frames.iter().flatten().cloned().collect()
    }

    /// Calls `f` if it is a function value.
    pub fn call(&mut self, f: &JsValue, this: JsValue, args: Vec<JsValue>) -> ValueResult {
        match f {
            JsValue::Function(func) => call_function(func, this, args, self),
            other => Err(JErrorType::TypeError(format!("{} is not a function", other)).into()),
        }
    }
}

/// Function signature for built-in methods.
/// Native functions receive the evaluation context, `this` value, and arguments.
pub type NativeFn = fn(ctx: &mut EvalContext<'_>, this: JsValue, args: Vec<JsValue>) -> ValueResult;

/// Closure signature for host-provided functions.
pub type HostFn = Rc<dyn Fn(&mut EvalContext<'_>, JsValue, Vec<JsValue>) -> ValueResult>;

/// Built-in object definition.
/// Represents a global like `Math`, `JSON` or the callable `Number`.
pub struct BuiltInObject {
    /// Name of the global (e.g., "Array", "Object", "Math").
    pub name: String,

    /// Static methods, e.g. `Object.keys`.
    pub methods: HashMap<String, NativeFn>,

    /// Static properties, e.g. `Math.PI`.
    pub properties: HashMap<String, JsValue>,

    /// Methods reachable from values of this type, e.g. `[].map`.
    pub prototype_methods: HashMap<String, NativeFn>,

    /// Behavior when the global itself is called, e.g. `String(x)`.
    pub call: Option<NativeFn>,
}

impl BuiltInObject {
    /// Create a new built-in object with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        BuiltInObject {
            name: name.into(),
            methods: HashMap::new(),
            properties: HashMap::new(),
            prototype_methods: HashMap::new(),
            call: None,
        }
    }

    /// Add a static native method.
    pub fn add_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.methods.insert(name.into(), func);
        self
    }

    /// Add a static property.
    pub fn add_property(mut self, name: impl Into<String>, value: JsValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Add a method visible on values of this type.
    pub fn add_prototype_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.prototype_methods.insert(name.into(), func);
        self
    }

    /// Make the global callable.
    pub fn with_call(mut self, call: NativeFn) -> Self {
        self.call = Some(call);
        self
    }

    /// Builds the JS value exposed under this global's name: a function when
    /// callable, otherwise a plain object. Statics are laid out in name order.
    pub fn materialize(&self) -> JsValue {
        let mut statics = JsObject::new();
        let mut names: Vec<&String> = self.properties.keys().chain(self.methods.keys()).collect();
        names.sort();
        for name in names {
            if let Some(value) = self.properties.get(name) {
                statics.insert(name.as_str(), value.clone());
            } else if let Some(method) = self.methods.get(name) {
                statics.insert(
                    name.as_str(),
                    JsValue::function(JsFunction::native(name.as_str(), *method)),
                );
            }
        }
        match self.call {
            Some(call) => {
                JsValue::function(JsFunction::native(self.name.as_str(), call).with_properties(statics))
            }
            None => JsValue::object(statics),
        }
    }
}
