//! Control-effect evaluation.
//!
//! Rules are evaluated in descending priority order (stable on ties,
//! input order as tiebreak). Disabled rules are skipped silently. A
//! rule whose condition fails to parse, fails to evaluate, or does
//! not produce a boolean contributes one rule-tagged error and no
//! effect. Conflict resolution keeps the first effect per target
//! field, which under priority ordering means the highest-priority
//! effect wins.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use proviso_expr::{evaluate, parse, FunctionProvider, Value};

use crate::model::{ControlEffect, EvaluationResult, RuntimeRule};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Why a single rule produced no outcome. Renders to exactly the
/// rule-tagged strings collected by [`evaluate_rules`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("rule '{rule_id}': {message}")]
    Parse { rule_id: String, message: String },
    #[error("rule '{rule_id}': {message}")]
    Eval { rule_id: String, message: String },
    #[error("rule '{rule_id}': condition did not produce a boolean, got {got}")]
    NotBoolean { rule_id: String, got: String },
}

// ──────────────────────────────────────────────
// Evaluation
// ──────────────────────────────────────────────

/// Evaluate all rules against `field_values` and collect the effects
/// of those whose condition is true, in priority order.
pub fn evaluate_rules(
    rules: &[RuntimeRule],
    field_values: &BTreeMap<String, Value>,
    functions: Option<&dyn FunctionProvider>,
) -> EvaluationResult {
    let mut order: Vec<usize> = (0..rules.len()).collect();
    // Stable sort: equal priorities keep their input order.
    order.sort_by_key(|&i| Reverse(rules[i].priority));

    let mut effects = Vec::new();
    let mut errors = Vec::new();
    for &i in &order {
        let rule = &rules[i];
        if !rule.enabled {
            continue;
        }
        match eval_condition(rule, field_values, functions) {
            Ok(true) => effects.push(rule.effect.clone()),
            Ok(false) => {}
            Err(err) => errors.push(err.to_string()),
        }
    }
    EvaluationResult { effects, errors }
}

/// Evaluate a single rule's condition. A disabled rule is `Ok(false)`
/// without its condition being looked at.
pub fn evaluate_rule(
    rule: &RuntimeRule,
    field_values: &BTreeMap<String, Value>,
    functions: Option<&dyn FunctionProvider>,
) -> Result<bool, RuleError> {
    if !rule.enabled {
        return Ok(false);
    }
    eval_condition(rule, field_values, functions)
}

fn eval_condition(
    rule: &RuntimeRule,
    field_values: &BTreeMap<String, Value>,
    functions: Option<&dyn FunctionProvider>,
) -> Result<bool, RuleError> {
    let expr = parse(&rule.condition).map_err(|err| RuleError::Parse {
        rule_id: rule.id.clone(),
        message: err.to_string(),
    })?;
    let value = evaluate(&expr, field_values, functions).map_err(|err| RuleError::Eval {
        rule_id: rule.id.clone(),
        message: err.to_string(),
    })?;
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(RuleError::NotBoolean {
            rule_id: rule.id.clone(),
            got: other.type_name().to_string(),
        }),
    }
}

/// Keep only the first effect per target field.
///
/// The input is already priority-ordered, so this is "highest
/// priority wins per field". Idempotent.
pub fn resolve_conflicts(effects: Vec<ControlEffect>) -> Vec<ControlEffect> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    effects
        .into_iter()
        .filter(|effect| seen.insert(effect.target_field_id.clone()))
        .collect()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
