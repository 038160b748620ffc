//! Formula executor.
//!
//! Evaluates a parsed expression against a field-value map, plus an
//! optional caller-supplied function provider. Evaluation is strict:
//! both operands of `and`/`or` and every call argument are evaluated
//! before the operation applies, so a missing field is detected
//! regardless of operand order.
//!
//! Execution never mutates its inputs and produces no persisted state.
//! All failure modes are structured `EvalError`s; nothing panics on
//! malformed data.

use std::collections::BTreeMap;

use crate::ast::{BinaryOp, CompareOp, Expr, LogicalOp, UnaryOp};
use crate::error::EvalError;
use crate::functions::{self, FunctionProvider};
use crate::types::Value;

/// Evaluate `expr` against `values`.
///
/// `functions` extends the built-in registry with caller-supplied
/// functions; built-ins shadow provided names.
pub fn evaluate(
    expr: &Expr,
    values: &BTreeMap<String, Value>,
    functions: Option<&dyn FunctionProvider>,
) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),

        Expr::FieldRef(name) => values
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UnknownField { name: name.clone() }),

        Expr::Unary { op, operand } => {
            let v = evaluate(operand, values, functions)?;
            match op {
                UnaryOp::Neg => match v {
                    Value::Number(n) => Ok(Value::Number(-n)),
                    other => Err(EvalError::TypeError {
                        message: format!(
                            "operand of unary '-' must be NUMBER, got {}",
                            other.type_name()
                        ),
                    }),
                },
                UnaryOp::Not => match v {
                    Value::Bool(b) => Ok(Value::Bool(!b)),
                    other => Err(EvalError::TypeError {
                        message: format!(
                            "operand of 'not' must be BOOLEAN, got {}",
                            other.type_name()
                        ),
                    }),
                },
            }
        }

        Expr::Binary { op, left, right } => {
            let l = evaluate(left, values, functions)?;
            let r = evaluate(right, values, functions)?;
            eval_arithmetic(*op, &l, &r)
        }

        Expr::Logical { op, left, right } => {
            let l = as_bool(&evaluate(left, values, functions)?, op_word(*op))?;
            let r = as_bool(&evaluate(right, values, functions)?, op_word(*op))?;
            Ok(Value::Bool(match op {
                LogicalOp::And => l && r,
                LogicalOp::Or => l || r,
            }))
        }

        Expr::Compare { op, left, right } => {
            let l = evaluate(left, values, functions)?;
            let r = evaluate(right, values, functions)?;
            eval_compare(*op, &l, &r)
        }

        Expr::Call { name, args } => {
            let mut argv = Vec::with_capacity(args.len());
            for arg in args {
                argv.push(evaluate(arg, values, functions)?);
            }
            if let Some(def) = functions::builtin(name) {
                if !def.arity.admits(argv.len()) {
                    return Err(EvalError::Arity {
                        name: name.clone(),
                        expected: def.arity.to_string(),
                        got: argv.len(),
                    });
                }
                return (def.eval)(&argv);
            }
            match functions.and_then(|p| p.call(name, &argv)) {
                Some(result) => result,
                None => Err(EvalError::UnknownFunction { name: name.clone() }),
            }
        }
    }
}

fn op_word(op: LogicalOp) -> &'static str {
    match op {
        LogicalOp::And => "and",
        LogicalOp::Or => "or",
    }
}

fn as_bool(value: &Value, op: &str) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(EvalError::TypeError {
            message: format!(
                "operand of '{}' must be BOOLEAN, got {}",
                op,
                other.type_name()
            ),
        }),
    }
}

fn eval_arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (l, r) = match (left, right) {
        (Value::Number(l), Value::Number(r)) => (*l, *r),
        (l, r) => {
            return Err(EvalError::TypeError {
                message: format!(
                    "operator '{}' requires NUMBER operands, got {} and {}",
                    op.symbol(),
                    l.type_name(),
                    r.type_name()
                ),
            })
        }
    };
    let result = match op {
        BinaryOp::Add => l.checked_add(r),
        BinaryOp::Sub => l.checked_sub(r),
        BinaryOp::Mul => l.checked_mul(r),
        BinaryOp::Div => {
            if r.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            l.checked_div(r)
        }
    };
    let n = result.ok_or_else(|| EvalError::Overflow {
        message: format!("'{}' result out of range", op.symbol()),
    })?;
    Ok(Value::Number(n))
}

fn eval_compare(op: CompareOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    // Equality is defined per type; ordering only for numbers and text.
    let result = match (op, left, right) {
        (CompareOp::Eq, l, r) => equatable(op, l, r).map(|_| l == r),
        (CompareOp::Ne, l, r) => equatable(op, l, r).map(|_| l != r),
        (_, Value::Number(l), Value::Number(r)) => Ok(ordered(op, l.cmp(r))),
        (_, Value::Text(l), Value::Text(r)) => Ok(ordered(op, l.cmp(r))),
        (_, l, r) => Err(EvalError::TypeError {
            message: format!(
                "cannot compare {} with {} using '{}'",
                l.type_name(),
                r.type_name(),
                op.symbol()
            ),
        }),
    }?;
    Ok(Value::Bool(result))
}

fn equatable(op: CompareOp, left: &Value, right: &Value) -> Result<(), EvalError> {
    let compatible = matches!(
        (left, right),
        (Value::Number(_), Value::Number(_))
            | (Value::Text(_), Value::Text(_))
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Null, _)
            | (_, Value::Null)
    );
    if compatible {
        Ok(())
    } else {
        Err(EvalError::TypeError {
            message: format!(
                "cannot compare {} with {} using '{}'",
                left.type_name(),
                right.type_name(),
                op.symbol()
            ),
        })
    }
}

fn ordered(op: CompareOp, ordering: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::*;
    match op {
        CompareOp::Lt => ordering == Less,
        CompareOp::Le => ordering != Greater,
        CompareOp::Gt => ordering == Greater,
        CompareOp::Ge => ordering != Less,
        // Eq and Ne are handled before ordering comparisons.
        CompareOp::Eq => ordering == Equal,
        CompareOp::Ne => ordering != Equal,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::StaticFunctionProvider;
    use crate::parser::parse;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn num(s: &str) -> Value {
        Value::Number(Decimal::from_str(s).unwrap())
    }

    fn run(formula: &str, values: &[(&str, Value)]) -> Result<Value, EvalError> {
        let expr = parse(formula).unwrap();
        let map: BTreeMap<String, Value> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        evaluate(&expr, &map, None)
    }

    #[test]
    fn multiplies_quantity_by_unit_price() {
        let v = run(
            "quantity * unit_price",
            &[("quantity", num("3")), ("unit_price", num("12.5"))],
        )
        .unwrap();
        assert_eq!(v, num("37.5"));
    }

    #[test]
    fn boolean_condition_over_fields() {
        let v = run(
            "is_active and quantity > 0",
            &[("is_active", Value::Bool(true)), ("quantity", num("0"))],
        )
        .unwrap();
        assert_eq!(v, Value::Bool(false));
    }

    #[test]
    fn missing_field_is_reported_even_when_other_operand_decides() {
        let err = run("is_active and quantity > 0", &[("is_active", Value::Bool(false))])
            .unwrap_err();
        assert_eq!(
            err,
            EvalError::UnknownField {
                name: "quantity".to_string()
            }
        );
    }

    #[test]
    fn division_by_zero_is_structured() {
        let err = run("a / b", &[("a", num("1")), ("b", num("0"))]).unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero);
    }

    #[test]
    fn arithmetic_on_text_is_a_type_error() {
        let err = run("a + b", &[("a", Value::Text("x".into())), ("b", num("1"))]).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn mixed_type_ordering_is_a_type_error() {
        let err = run("a < b", &[("a", num("1")), ("b", Value::Text("x".into()))]).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn equality_with_null_never_errors() {
        assert_eq!(
            run("a == b", &[("a", Value::Null), ("b", num("1"))]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            run("a == b", &[("a", Value::Null), ("b", Value::Null)]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn unary_minus_negates() {
        assert_eq!(run("-a", &[("a", num("4"))]).unwrap(), num("-4"));
    }

    #[test]
    fn wrong_arity_is_reported_before_the_builtin_runs() {
        let err = run("abs(1, 2)", &[]).unwrap_err();
        assert_eq!(
            err,
            EvalError::Arity {
                name: "abs".to_string(),
                expected: "exactly 1".to_string(),
                got: 2,
            }
        );
    }

    #[test]
    fn nested_builtin_calls() {
        let v = run("if_else(a > 10, upper(\"big\"), lower(\"SMALL\"))", &[("a", num("3"))])
            .unwrap();
        assert_eq!(v, Value::Text("small".into()));
    }

    #[test]
    fn provider_functions_resolve_after_builtins() {
        let mut provider = StaticFunctionProvider::new();
        provider.insert("double", |args: &[Value]| match &args[0] {
            Value::Number(n) => Ok(Value::Number(*n + *n)),
            other => Err(EvalError::TypeError {
                message: format!("double wants NUMBER, got {}", other.type_name()),
            }),
        });
        // Shadowing: a provider "abs" must not replace the built-in.
        provider.insert("abs", |_args: &[Value]| Ok(Value::Null));

        let expr = parse("double(abs(a))").unwrap();
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), num("-21"));
        let v = evaluate(&expr, &map, Some(&provider)).unwrap();
        assert_eq!(v, num("42"));
    }

    #[test]
    fn unknown_function_without_provider() {
        let err = run("lookup(a)", &[("a", num("1"))]).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnknownFunction {
                name: "lookup".to_string()
            }
        );
    }
}
