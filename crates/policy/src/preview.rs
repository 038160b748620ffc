//! Control-rule preview.
//!
//! The one place where design-time validation meets execution: an
//! ALLOWED rule is run against caller-supplied field values and its
//! result coerced to a boolean. Strictly in-memory; nothing is
//! persisted and no input is mutated, so repeated previews with the
//! same inputs return the same result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use proviso_expr::{evaluate, parse, Value};

use crate::control::{
    validate_control_rule, ControlRule, ControlRuleKind, ControlRuleStatus, RuleDiagnostics,
};
use crate::validation::FieldSpec;

/// Outcome of previewing a candidate control rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResult {
    pub status: ControlRuleStatus,
    pub rule: Option<ControlRule>,
    pub block_reason: Option<String>,
    /// Boolean outcome of execution; `None` when the rule was not
    /// executed or execution failed.
    pub execution_result: Option<bool>,
    pub execution_error: Option<String>,
    pub diagnostics: RuleDiagnostics,
}

/// Validate a candidate rule and, if ALLOWED, execute it against
/// `field_values`.
///
/// BLOCKED and CLEARED return immediately with no execution. An
/// execution failure leaves the status ALLOWED and reports the error;
/// a successful execution coerces the value to boolean (pass-through
/// for booleans, truthiness otherwise).
pub fn preview_control_rule(
    kind: ControlRuleKind,
    target_field_id: &str,
    formula_text: &str,
    schema_fields: &[FieldSpec],
    field_values: &BTreeMap<String, Value>,
) -> PreviewResult {
    let validated =
        validate_control_rule(kind, target_field_id, formula_text, schema_fields, None);

    let mut preview = PreviewResult {
        status: validated.status,
        rule: validated.rule,
        block_reason: validated.block_reason,
        execution_result: None,
        execution_error: None,
        diagnostics: validated.diagnostics,
    };
    if preview.status != ControlRuleStatus::Allowed {
        return preview;
    }

    // An ALLOWED rule always has a parseable formula; a parse failure
    // here would be an engine defect, reported like any execution error.
    match parse(formula_text) {
        Ok(expr) => match evaluate(&expr, field_values, None) {
            Ok(value) => preview.execution_result = Some(value.truthy()),
            Err(err) => preview.execution_error = Some(err.to_string()),
        },
        Err(err) => preview.execution_error = Some(err.to_string()),
    }
    preview
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
