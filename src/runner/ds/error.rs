use std::fmt;
use std::fmt::{Display, Formatter};

/// Error raised while evaluating an expression, named after the JS error
/// class a browser would throw for the same failure.
#[derive(Debug, Clone, PartialEq)]
pub enum JErrorType {
    ReferenceError(String),
    TypeError(String),
    RangeError(String),
    SyntaxError(String),
    /// A binding was read while it was still being computed. Carries the
    /// scope path (or binding id) of the binding that closed the cycle.
    CycleError(String),
    Error(String),
}

impl JErrorType {
    /// JS class name, e.g. `TypeError`.
    pub fn name(&self) -> &'static str {
        match self {
            JErrorType::ReferenceError(_) => "ReferenceError",
            JErrorType::TypeError(_) => "TypeError",
            JErrorType::RangeError(_) => "RangeError",
            JErrorType::SyntaxError(_) => "SyntaxError",
            JErrorType::CycleError(_) | JErrorType::Error(_) => "Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            JErrorType::ReferenceError(m)
            | JErrorType::TypeError(m)
            | JErrorType::RangeError(m)
            | JErrorType::SyntaxError(m)
            | JErrorType::Error(m) => m.to_string(),
            JErrorType::CycleError(path) => format!("Cycle detected \"{}\"", path),
        }
    }
}

impl Display for JErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

/// An error together with the chain of bindings it travelled through.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub error: JErrorType,
    /// Innermost frame first, e.g. `at form.total`.
    pub stack: Vec<String>,
}

impl EvalError {
    pub fn new(error: JErrorType) -> Self {
        EvalError {
            error,
            stack: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.error.name()
    }

    pub fn message(&self) -> String {
        self.error.message()
    }

    pub fn with_stack(mut self, stack: Vec<String>) -> Self {
        self.stack = stack;
        self
    }
}

impl From<JErrorType> for EvalError {
    fn from(error: JErrorType) -> Self {
        EvalError::new(error)
    }
}

impl Display for EvalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        for frame in &self.stack {
            write!(f, "\n    {}", frame)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_message() {
        let e = JErrorType::CycleError("form.total".to_string());
        assert_eq!(e.message(), "Cycle detected \"form.total\"");
        assert_eq!(e.to_string(), "Error: Cycle detected \"form.total\"");
    }

    #[test]
    fn test_display_includes_stack() {
        let e = EvalError::new(JErrorType::ReferenceError("x is not defined".to_string()))
            .with_stack(vec!["at a".to_string(), "at b".to_string()]);
        assert_eq!(
            e.to_string(),
            "ReferenceError: x is not defined\n    at a\n    at b"
        );
    }
}
