//! Error types for the formula language.
//!
//! Two channels, kept strictly apart: `ParseError` describes malformed
//! formula text (data, reported inside validation results), `EvalError`
//! describes a failed execution against concrete field values. Both
//! render to stable, user-facing strings -- consumers surface them
//! verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

// ──────────────────────────────────────────────
// ParseError
// ──────────────────────────────────────────────

/// A lexical or syntactic error in formula text.
///
/// `position` is the 1-based character offset of the offending token
/// within the formula string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParseError {
    pub position: u32,
    pub message: String,
}

impl ParseError {
    pub fn at(position: u32, message: impl Into<String>) -> Self {
        ParseError {
            position,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at position {}: {}", self.position, self.message)
    }
}

impl std::error::Error for ParseError {}

// ──────────────────────────────────────────────
// EvalError
// ──────────────────────────────────────────────

/// Errors that can occur while executing a parsed formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A referenced field has no entry in the supplied value map.
    UnknownField { name: String },
    /// A called function is neither a built-in nor provided by the caller.
    UnknownFunction { name: String },
    /// A built-in function was called with the wrong number of arguments.
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
    /// Operand or argument types do not fit the operation.
    TypeError { message: String },
    /// Division by zero.
    DivisionByZero,
    /// Numeric overflow during arithmetic.
    Overflow { message: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnknownField { name } => {
                write!(f, "no value for field '{}'", name)
            }
            EvalError::UnknownFunction { name } => {
                write!(f, "unknown function '{}'", name)
            }
            EvalError::Arity {
                name,
                expected,
                got,
            } => {
                write!(
                    f,
                    "function '{}' expects {} argument(s), got {}",
                    name, expected, got
                )
            }
            EvalError::TypeError { message } => {
                write!(f, "type error: {}", message)
            }
            EvalError::DivisionByZero => {
                write!(f, "division by zero")
            }
            EvalError::Overflow { message } => {
                write!(f, "numeric overflow: {}", message)
            }
        }
    }
}

impl std::error::Error for EvalError {}
