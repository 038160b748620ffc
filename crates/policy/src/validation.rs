//! Formula validation.
//!
//! Orchestrates parse, name resolution, type inference and reference
//! extraction into one structured result. Malformed formula text is
//! data, not a caller bug: every failure mode lands in the result's
//! `errors`, never in a panic or an abnormal return.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use proviso_expr::{call_names, field_refs, infer_type, is_builtin, parse, ExprType};

// ──────────────────────────────────────────────
// Field snapshot
// ──────────────────────────────────────────────

/// One field of the schema snapshot supplied per call.
///
/// `field_type` is the schema's own type name (open vocabulary); it is
/// mapped into the formula type system during validation. The snapshot
/// is read per call and never retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field_id: String,
    pub field_type: String,
    pub label: String,
}

impl FieldSpec {
    pub fn new(
        field_id: impl Into<String>,
        field_type: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        FieldSpec {
            field_id: field_id.into(),
            field_type: field_type.into(),
            label: label.into(),
        }
    }
}

// ──────────────────────────────────────────────
// Results
// ──────────────────────────────────────────────

/// Outcome of validating one formula against a field snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub field_references: BTreeSet<String>,
    pub inferred_type: ExprType,
}

/// Field references of a formula, without the rest of validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyResult {
    pub field_references: BTreeSet<String>,
}

// ──────────────────────────────────────────────
// Validation
// ──────────────────────────────────────────────

/// Validate `formula` against the supplied field snapshot.
///
/// An empty or whitespace-only formula is valid with type UNKNOWN and
/// no references. A parse failure yields exactly one syntax error and
/// no further analysis. Otherwise every unknown field and every
/// unknown function is reported (all of them, in sorted order), and
/// type inference runs regardless so warnings are available even on
/// invalid formulas.
pub fn validate(formula: &str, schema_fields: &[FieldSpec]) -> ValidationResult {
    if formula.trim().is_empty() {
        return ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            field_references: BTreeSet::new(),
            inferred_type: ExprType::Unknown,
        };
    }

    let expr = match parse(formula) {
        Ok(expr) => expr,
        Err(err) => {
            return ValidationResult {
                is_valid: false,
                errors: vec![err.to_string()],
                warnings: Vec::new(),
                field_references: BTreeSet::new(),
                inferred_type: ExprType::Unknown,
            }
        }
    };

    let field_types: BTreeMap<String, ExprType> = schema_fields
        .iter()
        .map(|f| {
            (
                f.field_id.clone(),
                ExprType::from_schema_type(&f.field_type),
            )
        })
        .collect();

    let references = field_refs(&expr);
    let mut errors = Vec::new();
    for name in &references {
        if !field_types.contains_key(name) {
            errors.push(format!("unknown field '{}'", name));
        }
    }
    for name in call_names(&expr) {
        if !is_builtin(&name) {
            errors.push(format!("unknown function '{}'", name));
        }
    }

    let mut warnings = Vec::new();
    let inferred_type = infer_type(&expr, &field_types, &mut warnings);

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        field_references: references,
        inferred_type,
    }
}

/// Extract the field references of `formula` without full validation.
///
/// A malformed formula yields an empty set; reporting the syntax error
/// is [`validate`]'s job.
pub fn extract_dependencies(formula: &str) -> DependencyResult {
    let field_references = match parse(formula) {
        Ok(expr) => field_refs(&expr),
        Err(_) => BTreeSet::new(),
    };
    DependencyResult { field_references }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("quantity", "number", "Quantity"),
            FieldSpec::new("unit_price", "decimal", "Unit price"),
            FieldSpec::new("status", "text", "Status"),
            FieldSpec::new("is_active", "boolean", "Active"),
            FieldSpec::new("attachment", "file", "Attachment"),
        ]
    }

    #[test]
    fn empty_formula_is_valid_and_unknown() {
        for formula in ["", "   ", "\t"] {
            let result = validate(formula, &snapshot());
            assert!(result.is_valid);
            assert!(result.errors.is_empty());
            assert!(result.field_references.is_empty());
            assert_eq!(result.inferred_type, ExprType::Unknown);
        }
    }

    #[test]
    fn syntax_error_stops_analysis() {
        let result = validate("quantity +", &snapshot());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("syntax error"));
        assert!(result.field_references.is_empty());
        assert_eq!(result.inferred_type, ExprType::Unknown);
    }

    #[test]
    fn unknown_field_is_reported_by_name() {
        let result = validate("missing + 1", &snapshot());
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["unknown field 'missing'".to_string()]);
    }

    #[test]
    fn all_unknown_names_are_reported() {
        let result = validate("foo + bar + baz(quantity)", &snapshot());
        assert_eq!(
            result.errors,
            vec![
                "unknown field 'bar'".to_string(),
                "unknown field 'foo'".to_string(),
                "unknown function 'baz'".to_string(),
            ]
        );
    }

    #[test]
    fn numeric_and_boolean_inference() {
        let result = validate("quantity + unit_price * 2", &snapshot());
        assert!(result.is_valid);
        assert_eq!(result.inferred_type, ExprType::Number);

        let result = validate("quantity > unit_price", &snapshot());
        assert_eq!(result.inferred_type, ExprType::Boolean);
    }

    #[test]
    fn text_in_arithmetic_warns_but_stays_valid() {
        let result = validate("status + 1", &snapshot());
        assert!(result.is_valid);
        assert_eq!(result.inferred_type, ExprType::Unknown);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("TEXT"));
    }

    #[test]
    fn unmapped_schema_type_infers_unknown_without_error() {
        let result = validate("attachment", &snapshot());
        assert!(result.is_valid);
        assert_eq!(result.inferred_type, ExprType::Unknown);
    }

    #[test]
    fn references_are_collected_in_sorted_order() {
        let result = validate("unit_price * quantity", &snapshot());
        let refs: Vec<&String> = result.field_references.iter().collect();
        assert_eq!(refs, vec!["quantity", "unit_price"]);
    }

    #[test]
    fn validation_is_deterministic() {
        let a = validate("quantity * unit_price > 100", &snapshot());
        let b = validate("quantity * unit_price > 100", &snapshot());
        assert_eq!(a, b);
    }

    #[test]
    fn dependencies_without_validation() {
        let deps = extract_dependencies("quantity * unit_price");
        let refs: Vec<&String> = deps.field_references.iter().collect();
        assert_eq!(refs, vec!["quantity", "unit_price"]);
    }

    #[test]
    fn dependencies_of_malformed_formula_are_empty() {
        assert!(extract_dependencies("a +").field_references.is_empty());
    }
}
