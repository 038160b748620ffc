//! Built-in function registry and caller-supplied function providers.
//!
//! One static table maps each built-in name to its arity, result-type
//! rule and evaluator, so adding a function is a single-place change:
//! the validator checks membership, the inferencer reads the result
//! rule, the executor checks arity and invokes the evaluator.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::EvalError;
use crate::types::{ExprType, Value};

// ──────────────────────────────────────────────
// Registry
// ──────────────────────────────────────────────

/// Accepted argument count for a built-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn admits(&self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == *k,
            Arity::AtLeast(k) => n >= *k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(k) => write!(f, "exactly {}", k),
            Arity::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

/// How a built-in's result type is derived during inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnRule {
    Fixed(ExprType),
    /// `if_else`: the common type of the two branch arguments, else UNKNOWN.
    BranchAgreement,
    /// `coalesce`: the common type of all arguments, else UNKNOWN.
    ArgAgreement,
}

/// A built-in function: name, arity, inference rule, evaluator.
pub struct FunctionDef {
    pub name: &'static str,
    pub arity: Arity,
    pub returns: ReturnRule,
    pub eval: fn(&[Value]) -> Result<Value, EvalError>,
}

pub const BUILTINS: &[FunctionDef] = &[
    FunctionDef {
        name: "abs",
        arity: Arity::Exactly(1),
        returns: ReturnRule::Fixed(ExprType::Number),
        eval: eval_abs,
    },
    FunctionDef {
        name: "min",
        arity: Arity::AtLeast(1),
        returns: ReturnRule::Fixed(ExprType::Number),
        eval: eval_min,
    },
    FunctionDef {
        name: "max",
        arity: Arity::AtLeast(1),
        returns: ReturnRule::Fixed(ExprType::Number),
        eval: eval_max,
    },
    FunctionDef {
        name: "round",
        arity: Arity::Exactly(1),
        returns: ReturnRule::Fixed(ExprType::Number),
        eval: eval_round,
    },
    FunctionDef {
        name: "sum",
        arity: Arity::AtLeast(1),
        returns: ReturnRule::Fixed(ExprType::Number),
        eval: eval_sum,
    },
    FunctionDef {
        name: "pow",
        arity: Arity::Exactly(2),
        returns: ReturnRule::Fixed(ExprType::Number),
        eval: eval_pow,
    },
    FunctionDef {
        name: "concat",
        arity: Arity::AtLeast(1),
        returns: ReturnRule::Fixed(ExprType::Text),
        eval: eval_concat,
    },
    FunctionDef {
        name: "upper",
        arity: Arity::Exactly(1),
        returns: ReturnRule::Fixed(ExprType::Text),
        eval: eval_upper,
    },
    FunctionDef {
        name: "lower",
        arity: Arity::Exactly(1),
        returns: ReturnRule::Fixed(ExprType::Text),
        eval: eval_lower,
    },
    FunctionDef {
        name: "if_else",
        arity: Arity::Exactly(3),
        returns: ReturnRule::BranchAgreement,
        eval: eval_if_else,
    },
    FunctionDef {
        name: "coalesce",
        arity: Arity::AtLeast(1),
        returns: ReturnRule::ArgAgreement,
        eval: eval_coalesce,
    },
    FunctionDef {
        name: "is_empty",
        arity: Arity::Exactly(1),
        returns: ReturnRule::Fixed(ExprType::Boolean),
        eval: eval_is_empty,
    },
];

/// Look up a built-in by name.
pub fn builtin(name: &str) -> Option<&'static FunctionDef> {
    BUILTINS.iter().find(|def| def.name == name)
}

pub fn is_builtin(name: &str) -> bool {
    builtin(name).is_some()
}

// ──────────────────────────────────────────────
// Caller-supplied functions
// ──────────────────────────────────────────────

/// Synchronous provider of caller-supplied functions for execution.
///
/// Consulted by the executor for call names outside the built-in
/// registry (built-ins always shadow provided functions). `call`
/// returns `None` when the provider does not know the name.
pub trait FunctionProvider {
    fn call(&self, name: &str, args: &[Value]) -> Option<Result<Value, EvalError>>;
}

/// Boxed function stored in a [`StaticFunctionProvider`].
pub type ExtraFn = Box<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// A function provider backed by a fixed name-to-function map.
#[derive(Default)]
pub struct StaticFunctionProvider {
    functions: BTreeMap<String, ExtraFn>,
}

impl StaticFunctionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        function: impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    ) {
        self.functions.insert(name.into(), Box::new(function));
    }
}

impl FunctionProvider for StaticFunctionProvider {
    fn call(&self, name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
        self.functions.get(name).map(|f| f(args))
    }
}

// ──────────────────────────────────────────────
// Built-in evaluators
// ──────────────────────────────────────────────

fn expect_number(name: &str, index: usize, value: &Value) -> Result<Decimal, EvalError> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(EvalError::TypeError {
            message: format!(
                "argument {} of '{}' must be NUMBER, got {}",
                index + 1,
                name,
                other.type_name()
            ),
        }),
    }
}

fn expect_text<'a>(name: &str, index: usize, value: &'a Value) -> Result<&'a str, EvalError> {
    match value {
        Value::Text(s) => Ok(s),
        other => Err(EvalError::TypeError {
            message: format!(
                "argument {} of '{}' must be TEXT, got {}",
                index + 1,
                name,
                other.type_name()
            ),
        }),
    }
}

fn eval_abs(args: &[Value]) -> Result<Value, EvalError> {
    let n = expect_number("abs", 0, &args[0])?;
    Ok(Value::Number(n.abs()))
}

fn eval_min(args: &[Value]) -> Result<Value, EvalError> {
    let mut best = expect_number("min", 0, &args[0])?;
    for (i, arg) in args.iter().enumerate().skip(1) {
        let n = expect_number("min", i, arg)?;
        if n < best {
            best = n;
        }
    }
    Ok(Value::Number(best))
}

fn eval_max(args: &[Value]) -> Result<Value, EvalError> {
    let mut best = expect_number("max", 0, &args[0])?;
    for (i, arg) in args.iter().enumerate().skip(1) {
        let n = expect_number("max", i, arg)?;
        if n > best {
            best = n;
        }
    }
    Ok(Value::Number(best))
}

fn eval_round(args: &[Value]) -> Result<Value, EvalError> {
    let n = expect_number("round", 0, &args[0])?;
    Ok(Value::Number(n.round_dp_with_strategy(
        0,
        RoundingStrategy::MidpointAwayFromZero,
    )))
}

fn eval_sum(args: &[Value]) -> Result<Value, EvalError> {
    let mut total = Decimal::ZERO;
    for (i, arg) in args.iter().enumerate() {
        let n = expect_number("sum", i, arg)?;
        total = total.checked_add(n).ok_or_else(|| EvalError::Overflow {
            message: "addition overflow in sum".to_string(),
        })?;
    }
    Ok(Value::Number(total))
}

fn eval_pow(args: &[Value]) -> Result<Value, EvalError> {
    let base = expect_number("pow", 0, &args[0])?;
    let exp = expect_number("pow", 1, &args[1])?;
    if !exp.fract().is_zero() {
        return Err(EvalError::TypeError {
            message: "exponent of 'pow' must be an integer".to_string(),
        });
    }
    let e = exp.to_i64().ok_or_else(|| EvalError::Overflow {
        message: format!("exponent {} out of range", exp),
    })?;
    // Bounded: Decimal overflows near 1e29 for any base above 1.
    if e.unsigned_abs() > 128 {
        return Err(EvalError::Overflow {
            message: format!("exponent {} out of range", exp),
        });
    }
    let mut result = Decimal::ONE;
    for _ in 0..e.unsigned_abs() {
        result = result.checked_mul(base).ok_or_else(|| EvalError::Overflow {
            message: "multiplication overflow in pow".to_string(),
        })?;
    }
    if e < 0 {
        if result.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        result = Decimal::ONE
            .checked_div(result)
            .ok_or_else(|| EvalError::Overflow {
                message: "division overflow in pow".to_string(),
            })?;
    }
    Ok(Value::Number(result))
}

fn eval_concat(args: &[Value]) -> Result<Value, EvalError> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.to_string());
    }
    Ok(Value::Text(out))
}

fn eval_upper(args: &[Value]) -> Result<Value, EvalError> {
    let s = expect_text("upper", 0, &args[0])?;
    Ok(Value::Text(s.to_uppercase()))
}

fn eval_lower(args: &[Value]) -> Result<Value, EvalError> {
    let s = expect_text("lower", 0, &args[0])?;
    Ok(Value::Text(s.to_lowercase()))
}

fn eval_if_else(args: &[Value]) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Bool(true) => Ok(args[1].clone()),
        Value::Bool(false) => Ok(args[2].clone()),
        other => Err(EvalError::TypeError {
            message: format!(
                "condition of 'if_else' must be BOOLEAN, got {}",
                other.type_name()
            ),
        }),
    }
}

fn eval_coalesce(args: &[Value]) -> Result<Value, EvalError> {
    for arg in args {
        if *arg != Value::Null {
            return Ok(arg.clone());
        }
    }
    Ok(Value::Null)
}

fn eval_is_empty(args: &[Value]) -> Result<Value, EvalError> {
    let empty = match &args[0] {
        Value::Null => true,
        Value::Text(s) => s.is_empty(),
        _ => false,
    };
    Ok(Value::Bool(empty))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn num(s: &str) -> Value {
        Value::Number(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn registry_covers_the_allow_list() {
        for name in [
            "abs", "min", "max", "round", "sum", "pow", "concat", "upper", "lower", "if_else",
            "coalesce", "is_empty",
        ] {
            assert!(is_builtin(name), "missing built-in {}", name);
        }
        assert!(!is_builtin("lookup"));
    }

    #[test]
    fn round_is_half_away_from_zero() {
        assert_eq!(eval_round(&[num("2.5")]).unwrap(), num("3"));
        assert_eq!(eval_round(&[num("-2.5")]).unwrap(), num("-3"));
        assert_eq!(eval_round(&[num("2.4")]).unwrap(), num("2"));
    }

    #[test]
    fn pow_handles_negative_integer_exponents() {
        assert_eq!(eval_pow(&[num("2"), num("10")]).unwrap(), num("1024"));
        assert_eq!(eval_pow(&[num("2"), num("-2")]).unwrap(), num("0.25"));
    }

    #[test]
    fn pow_rejects_fractional_exponents() {
        let err = eval_pow(&[num("2"), num("0.5")]).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn concat_renders_mixed_values() {
        let v = eval_concat(&[
            Value::Text("total: ".into()),
            num("12.50"),
            Value::Null,
        ])
        .unwrap();
        assert_eq!(v, Value::Text("total: 12.5".into()));
    }

    #[test]
    fn coalesce_returns_first_non_null() {
        let v = eval_coalesce(&[Value::Null, num("1"), num("2")]).unwrap();
        assert_eq!(v, num("1"));
        assert_eq!(eval_coalesce(&[Value::Null]).unwrap(), Value::Null);
    }

    #[test]
    fn is_empty_covers_null_and_empty_text() {
        assert_eq!(eval_is_empty(&[Value::Null]).unwrap(), Value::Bool(true));
        assert_eq!(
            eval_is_empty(&[Value::Text("".into())]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(eval_is_empty(&[num("0")]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn static_provider_dispatches_by_name() {
        let mut provider = StaticFunctionProvider::new();
        provider.insert("double", |args: &[Value]| {
            let n = expect_number("double", 0, &args[0])?;
            Ok(Value::Number(n + n))
        });
        let result = provider.call("double", &[num("21")]).unwrap().unwrap();
        assert_eq!(result, num("42"));
        assert!(provider.call("triple", &[]).is_none());
    }

    #[test]
    fn type_mismatch_names_argument_and_function() {
        let err = eval_abs(&[Value::Text("x".into())]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type error: argument 1 of 'abs' must be NUMBER, got TEXT"
        );
    }
}
