//! Runtime values and inferred types.
//!
//! All formula numbers use `rust_decimal::Decimal` -- never `f64` --
//! so arithmetic results and comparisons are exact for decimal input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ──────────────────────────────────────────────
// Inferred types
// ──────────────────────────────────────────────

/// The static result type of a formula, as computed by inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExprType {
    Number,
    Text,
    Boolean,
    Unknown,
}

impl ExprType {
    /// Canonical wire name, used verbatim in user-facing messages.
    pub fn name(&self) -> &'static str {
        match self {
            ExprType::Number => "NUMBER",
            ExprType::Text => "TEXT",
            ExprType::Boolean => "BOOLEAN",
            ExprType::Unknown => "UNKNOWN",
        }
    }

    /// Map a schema field-type name into the formula type system.
    ///
    /// The schema's type vocabulary is open; anything unrecognized
    /// infers `Unknown` rather than erroring.
    pub fn from_schema_type(name: &str) -> ExprType {
        match name.to_ascii_lowercase().as_str() {
            "number" | "decimal" | "integer" | "int" | "float" | "currency" => ExprType::Number,
            "text" | "string" => ExprType::Text,
            "boolean" | "bool" | "checkbox" => ExprType::Boolean,
            _ => ExprType::Unknown,
        }
    }
}

impl fmt::Display for ExprType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A concrete field value supplied to (or produced by) execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Number(Decimal),
    Text(String),
    Bool(bool),
    Null,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "NUMBER",
            Value::Text(_) => "TEXT",
            Value::Bool(_) => "BOOLEAN",
            Value::Null => "NULL",
        }
    }

    /// Boolean coercion used by the previewer: `Bool` passes through,
    /// anything else is truthiness (non-zero number, non-empty text).
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::Text(s) => !s.is_empty(),
            Value::Null => false,
        }
    }

    /// Convert a JSON value into a runtime value.
    ///
    /// Numbers go through their decimal string form so `12.5` arrives
    /// as an exact `Decimal`, not a binary float. Arrays and objects
    /// have no formula representation and yield `None`.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => {
                Decimal::from_str(&n.to_string()).ok().map(Value::Number)
            }
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Number(n) => serde_json::Value::String(n.normalize().to_string()),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Null => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Value {
    /// Text rendering used by `concat`. Numbers are normalized so
    /// `12.50` renders as "12.5"; `Null` renders empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n.normalize()),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => Ok(()),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
