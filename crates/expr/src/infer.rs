//! Result-type inference.
//!
//! Walks the AST with a field-type environment and computes the
//! formula's static result type. Type mismatches never hard-fail:
//! a definitely wrong operand (TEXT or BOOLEAN where arithmetic needs
//! NUMBER) downgrades the result to UNKNOWN and appends one warning;
//! an UNKNOWN operand propagates UNKNOWN silently. Hard errors
//! (unknown fields, unknown functions) are the validator's concern.

use std::collections::BTreeMap;

use crate::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use crate::functions::{self, ReturnRule};
use crate::types::ExprType;

/// Infer the result type of `expr`.
///
/// `field_types` maps field ids to their mapped formula types; fields
/// absent from the map infer UNKNOWN. Warnings are appended in
/// evaluation order.
pub fn infer_type(
    expr: &Expr,
    field_types: &BTreeMap<String, ExprType>,
    warnings: &mut Vec<String>,
) -> ExprType {
    match expr {
        Expr::Number(_) => ExprType::Number,
        Expr::Text(_) => ExprType::Text,

        Expr::FieldRef(name) => field_types
            .get(name)
            .copied()
            .unwrap_or(ExprType::Unknown),

        Expr::Unary { op, operand } => {
            let t = infer_type(operand, field_types, warnings);
            match op {
                UnaryOp::Not => ExprType::Boolean,
                UnaryOp::Neg => match t {
                    ExprType::Number => ExprType::Number,
                    ExprType::Unknown => ExprType::Unknown,
                    other => {
                        warnings.push(format!(
                            "operand of unary '-' is {}, expected NUMBER",
                            other.name()
                        ));
                        ExprType::Unknown
                    }
                },
            }
        }

        Expr::Binary { op, left, right } => {
            let lt = infer_type(left, field_types, warnings);
            let rt = infer_type(right, field_types, warnings);
            arithmetic_type(*op, lt, rt, warnings)
        }

        Expr::Logical { left, right, .. } => {
            // and/or are BOOLEAN regardless of operand types.
            infer_type(left, field_types, warnings);
            infer_type(right, field_types, warnings);
            ExprType::Boolean
        }

        Expr::Compare { left, right, .. } => {
            // Comparisons are BOOLEAN regardless of operand types.
            infer_type(left, field_types, warnings);
            infer_type(right, field_types, warnings);
            ExprType::Boolean
        }

        Expr::Call { name, args } => {
            let arg_types: Vec<ExprType> = args
                .iter()
                .map(|a| infer_type(a, field_types, warnings))
                .collect();
            match functions::builtin(name) {
                Some(def) => match def.returns {
                    ReturnRule::Fixed(t) => t,
                    ReturnRule::BranchAgreement => {
                        if arg_types.len() == 3 {
                            agreement(&arg_types[1..])
                        } else {
                            ExprType::Unknown
                        }
                    }
                    ReturnRule::ArgAgreement => agreement(&arg_types),
                },
                // The validator reports the unknown name as an error.
                None => ExprType::Unknown,
            }
        }
    }
}

fn arithmetic_type(
    op: BinaryOp,
    left: ExprType,
    right: ExprType,
    warnings: &mut Vec<String>,
) -> ExprType {
    let mut mismatched = false;
    for (side, t) in [("left", left), ("right", right)] {
        match t {
            ExprType::Number | ExprType::Unknown => {}
            other => {
                warnings.push(format!(
                    "{} operand of '{}' is {}, expected NUMBER",
                    side,
                    op.symbol(),
                    other.name()
                ));
                mismatched = true;
            }
        }
    }
    if mismatched || left == ExprType::Unknown || right == ExprType::Unknown {
        ExprType::Unknown
    } else {
        ExprType::Number
    }
}

/// Common type of a non-empty slice, UNKNOWN when the types disagree.
fn agreement(types: &[ExprType]) -> ExprType {
    let first = match types.first() {
        Some(t) => *t,
        None => return ExprType::Unknown,
    };
    if first != ExprType::Unknown && types.iter().all(|t| *t == first) {
        first
    } else {
        ExprType::Unknown
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
