//! Control-rule validation.
//!
//! Classifies a candidate control rule as ALLOWED, BLOCKED or CLEARED.
//! On top of plain formula validation and governance this layer
//! enforces the boolean gate: a control rule's formula must infer
//! BOOLEAN, whatever else is right about it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use proviso_expr::ExprType;

use crate::cycles::{detect_cycles, CycleResult};
use crate::governance::{evaluate_governance, GovernanceResult, GovernanceStatus};
use crate::validation::{validate, DependencyResult, FieldSpec, ValidationResult};

// ──────────────────────────────────────────────
// Closed enumerations
// ──────────────────────────────────────────────

/// What a control rule governs on its target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlRuleKind {
    Visibility,
    Enabled,
    Required,
}

impl ControlRuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            ControlRuleKind::Visibility => "VISIBILITY",
            ControlRuleKind::Enabled => "ENABLED",
            ControlRuleKind::Required => "REQUIRED",
        }
    }
}

/// An unrecognized rule-kind string at the boundary. This is the
/// programmer-error channel: calling code passed a value outside the
/// closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown control rule kind '{0}'")]
pub struct UnknownRuleKind(pub String);

impl std::str::FromStr for ControlRuleKind {
    type Err = UnknownRuleKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VISIBILITY" => Ok(ControlRuleKind::Visibility),
            "ENABLED" => Ok(ControlRuleKind::Enabled),
            "REQUIRED" => Ok(ControlRuleKind::Required),
            other => Err(UnknownRuleKind(other.to_string())),
        }
    }
}

impl TryFrom<&str> for ControlRuleKind {
    type Error = UnknownRuleKind;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ──────────────────────────────────────────────
// DTOs
// ──────────────────────────────────────────────

/// The design-time control rule as the command layer persists it.
/// Identity is `(target_field_id, kind)`; uniqueness is the command
/// layer's invariant, not this engine's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRule {
    pub kind: ControlRuleKind,
    pub target_field_id: String,
    pub formula_text: String,
}

/// Classification of a candidate rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlRuleStatus {
    Allowed,
    Blocked,
    Cleared,
}

/// Everything the policy layer looked at while classifying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDiagnostics {
    pub validation: ValidationResult,
    pub dependencies: DependencyResult,
    /// `None` when cycle checking was skipped for this call.
    pub cycle: Option<CycleResult>,
    pub governance: GovernanceResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRuleResult {
    pub status: ControlRuleStatus,
    /// The reconstructed rule; present only when ALLOWED.
    pub rule: Option<ControlRule>,
    pub block_reason: Option<String>,
    pub diagnostics: RuleDiagnostics,
}

// ──────────────────────────────────────────────
// Classification
// ──────────────────────────────────────────────

/// Validate a candidate control rule.
///
/// Empty formula clears the rule. Otherwise the formula runs through
/// validation, reference extraction, optional cycle detection and
/// governance; an INVALID verdict or a non-BOOLEAN inferred type
/// blocks the rule. When a schema-wide dependency map is supplied,
/// the candidate's own references replace the target field's entry
/// first, so the cycle verdict reflects the schema as it would be
/// after accepting the rule.
pub fn validate_control_rule(
    kind: ControlRuleKind,
    target_field_id: &str,
    formula_text: &str,
    schema_fields: &[FieldSpec],
    dependencies: Option<&BTreeMap<String, Vec<String>>>,
) -> ControlRuleResult {
    let validation = validate(formula_text, schema_fields);
    let extracted = DependencyResult {
        field_references: validation.field_references.clone(),
    };

    if formula_text.trim().is_empty() {
        let governance = evaluate_governance(formula_text, &validation, None);
        return ControlRuleResult {
            status: ControlRuleStatus::Cleared,
            rule: None,
            block_reason: None,
            diagnostics: RuleDiagnostics {
                validation,
                dependencies: extracted,
                cycle: None,
                governance,
            },
        };
    }

    let cycle = dependencies.map(|map| {
        let mut overlaid = map.clone();
        overlaid.insert(
            target_field_id.to_string(),
            extracted.field_references.iter().cloned().collect(),
        );
        detect_cycles(&overlaid)
    });

    let governance = evaluate_governance(formula_text, &validation, cycle.as_ref());

    if governance.status == GovernanceStatus::Invalid {
        let reason = format!(
            "Formula has errors: {}",
            governance.blocking_reasons.join("; ")
        );
        return ControlRuleResult {
            status: ControlRuleStatus::Blocked,
            rule: None,
            block_reason: Some(reason),
            diagnostics: RuleDiagnostics {
                validation,
                dependencies: extracted,
                cycle,
                governance,
            },
        };
    }

    if validation.inferred_type != ExprType::Boolean {
        let reason = format!(
            "{} rule formula must be BOOLEAN, inferred type is {}",
            kind.name(),
            validation.inferred_type.name()
        );
        return ControlRuleResult {
            status: ControlRuleStatus::Blocked,
            rule: None,
            block_reason: Some(reason),
            diagnostics: RuleDiagnostics {
                validation,
                dependencies: extracted,
                cycle,
                governance,
            },
        };
    }

    ControlRuleResult {
        status: ControlRuleStatus::Allowed,
        rule: Some(ControlRule {
            kind,
            target_field_id: target_field_id.to_string(),
            formula_text: formula_text.to_string(),
        }),
        block_reason: None,
        diagnostics: RuleDiagnostics {
            validation,
            dependencies: extracted,
            cycle,
            governance,
        },
    }
}

/// Lighter classification: same verdict logic without cycle checking
/// and without reconstructing a rule object.
pub fn can_apply_control_rule(
    kind: ControlRuleKind,
    target_field_id: &str,
    formula_text: &str,
    schema_fields: &[FieldSpec],
) -> ControlRuleResult {
    let mut result =
        validate_control_rule(kind, target_field_id, formula_text, schema_fields, None);
    result.rule = None;
    result
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
