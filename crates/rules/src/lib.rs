//! proviso-rules: run-time control rule engine.
//!
//! Evaluates prioritized condition/effect rules (conditions in the
//! proviso formula language) against a field-value map, collecting
//! the effects of fired rules and resolving per-field conflicts
//! deterministically. The document layer supplies the values and
//! applies the returned effects; this crate never writes to project
//! state.

pub mod engine;
pub mod model;

// ── Convenience re-exports ───────────────────────────────────────────

pub use engine::{evaluate_rule, evaluate_rules, resolve_conflicts, RuleError};
pub use model::{
    ControlEffect, ControlKind, EvaluationResult, RuntimeRule, UnknownControlKind,
};
