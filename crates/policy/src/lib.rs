//! proviso-policy: design-time rule validation and governance.
//!
//! Consumes the formula core (`proviso-expr`) and decides what a
//! schema will accept: plain formula validation against a field
//! snapshot, dependency-cycle detection over a schema-wide map, a
//! governance verdict folding both signals, and the control-rule
//! layer that additionally enforces the boolean gate and previews
//! rules against concrete values.
//!
//! Every operation is a pure function of its arguments. Nothing here
//! persists formulas, mutates schema state, or touches project data
//! outside an explicitly invoked preview.

pub mod control;
pub mod cycles;
pub mod governance;
pub mod preview;
pub mod validation;

// ── Convenience re-exports ───────────────────────────────────────────

pub use control::{
    can_apply_control_rule, validate_control_rule, ControlRule, ControlRuleKind,
    ControlRuleResult, ControlRuleStatus, RuleDiagnostics, UnknownRuleKind,
};
pub use cycles::{detect_cycles, CycleResult};
pub use governance::{evaluate_governance, GovernanceResult, GovernanceStatus};
pub use preview::{preview_control_rule, PreviewResult};
pub use validation::{extract_dependencies, validate, DependencyResult, FieldSpec, ValidationResult};
