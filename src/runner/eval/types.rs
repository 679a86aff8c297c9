//! Core types for the evaluation engine.

use crate::runner::ds::error::{EvalError, JErrorType};
use crate::runner::ds::value::JsValue;

/// Why an evaluation stopped before producing a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Abrupt {
    /// An error was thrown.
    Throw(EvalError),
    /// A binding the expression depends on has not arrived yet. Propagates
    /// through every dependent expression unchanged.
    Loading,
}

impl From<JErrorType> for Abrupt {
    fn from(error: JErrorType) -> Self {
        Abrupt::Throw(EvalError::new(error))
    }
}

impl From<EvalError> for Abrupt {
    fn from(error: EvalError) -> Self {
        Abrupt::Throw(error)
    }
}

pub type ValueResult = Result<JsValue, Abrupt>;

/// Final state of a single evaluated expression or binding.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalOutcome {
    Value(JsValue),
    Error(EvalError),
    Loading,
}

impl EvalOutcome {
    pub fn from_result(result: ValueResult) -> Self {
        match result {
            Ok(v) => EvalOutcome::Value(v),
            Err(Abrupt::Throw(e)) => EvalOutcome::Error(e),
            Err(Abrupt::Loading) => EvalOutcome::Loading,
        }
    }

    /// Re-raises the outcome inside a dependent evaluation.
    pub fn into_result(self) -> ValueResult {
        match self {
            EvalOutcome::Value(v) => Ok(v),
            EvalOutcome::Error(e) => Err(Abrupt::Throw(e)),
            EvalOutcome::Loading => Err(Abrupt::Loading),
        }
    }

    pub fn value(&self) -> Option<&JsValue> {
        match self {
            EvalOutcome::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&EvalError> {
        match self {
            EvalOutcome::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, EvalOutcome::Loading)
    }

    /// The value a dependent scope sees for this outcome: errors and
    /// pending values read as `undefined`.
    pub fn value_or_undefined(&self) -> JsValue {
        self.value().cloned().unwrap_or(JsValue::Undefined)
    }
}

impl From<JsValue> for EvalOutcome {
    fn from(value: JsValue) -> Self {
        EvalOutcome::Value(value)
    }
}
