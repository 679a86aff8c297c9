use std::rc::Rc;

use crate::parser::ast::ArrowFunctionData;
use crate::runner::ds::object::JsObject;
use crate::runner::ds::value::JsValue;
use crate::runner::eval::types::ValueResult;
use crate::runner::plugin::types::{EvalContext, HostFn, NativeFn};

/// How a function value executes when called.
#[derive(Clone)]
pub enum FunctionKind {
    /// Compiled-in built-in.
    Native(NativeFn),

    /// Closure supplied by a host plugin.
    Plugin(HostFn),

    /// Arrow function written inside an expression, with the locals it
    /// closed over.
    Arrow(ArrowClosure),
}

#[derive(Clone)]
pub struct ArrowClosure {
    pub data: Rc<ArrowFunctionData>,
    pub captured: Vec<(String, JsValue)>,
}

/// A callable value.
pub struct JsFunction {
    pub name: String,
    pub kind: FunctionKind,
    /// Static members, e.g. `Number.isInteger`.
    pub properties: JsObject,
}

impl JsFunction {
    pub fn native(name: impl Into<String>, f: NativeFn) -> Self {
        JsFunction {
            name: name.into(),
            kind: FunctionKind::Native(f),
            properties: JsObject::new(),
        }
    }

    pub fn plugin<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut EvalContext<'_>, JsValue, Vec<JsValue>) -> ValueResult + 'static,
    {
        JsFunction {
            name: name.into(),
            kind: FunctionKind::Plugin(Rc::new(f)),
            properties: JsObject::new(),
        }
    }

    pub fn arrow(data: Rc<ArrowFunctionData>, captured: Vec<(String, JsValue)>) -> Self {
        JsFunction {
            name: String::new(),
            kind: FunctionKind::Arrow(ArrowClosure { data, captured }),
            properties: JsObject::new(),
        }
    }

    pub fn with_properties(mut self, properties: JsObject) -> Self {
        self.properties = properties;
        self
    }

    /// Declared parameter count; natives report zero.
    pub fn arity(&self) -> usize {
        match &self.kind {
            FunctionKind::Arrow(closure) => closure.data.params.len(),
            _ => 0,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(anonymous)"
        } else {
            &self.name
        }
    }
}
