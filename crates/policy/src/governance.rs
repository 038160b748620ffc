//! Governance evaluation.
//!
//! Folds the validation and cycle signals into a single policy
//! verdict. Decision order: empty formula, then validation errors,
//! then cycles, then warnings. INVALID always dominates, and plain
//! validation errors take precedence over the cycle signal so the
//! reported reasons point at the formula itself first.

use serde::{Deserialize, Serialize};

use crate::cycles::CycleResult;
use crate::validation::ValidationResult;

/// Policy verdict over one formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GovernanceStatus {
    Valid,
    ValidWithWarnings,
    Invalid,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceResult {
    pub status: GovernanceStatus,
    pub blocking_reasons: Vec<String>,
}

/// Evaluate the governance verdict for `formula`.
///
/// `cycle` is `None` when cycle checking was skipped for this call;
/// that is "not evaluated", distinct from a run that found no cycle.
pub fn evaluate_governance(
    formula: &str,
    validation: &ValidationResult,
    cycle: Option<&CycleResult>,
) -> GovernanceResult {
    if formula.trim().is_empty() {
        return GovernanceResult {
            status: GovernanceStatus::Empty,
            blocking_reasons: Vec::new(),
        };
    }

    if !validation.errors.is_empty() {
        return GovernanceResult {
            status: GovernanceStatus::Invalid,
            blocking_reasons: validation.errors.clone(),
        };
    }

    if let Some(cycle) = cycle {
        if cycle.has_cycle {
            return GovernanceResult {
                status: GovernanceStatus::Invalid,
                blocking_reasons: vec![cycle_reason(cycle)],
            };
        }
    }

    if !validation.warnings.is_empty() {
        return GovernanceResult {
            status: GovernanceStatus::ValidWithWarnings,
            blocking_reasons: Vec::new(),
        };
    }

    GovernanceResult {
        status: GovernanceStatus::Valid,
        blocking_reasons: Vec::new(),
    }
}

fn cycle_reason(cycle: &CycleResult) -> String {
    let mut path = cycle.cycle_members.join(" -> ");
    if let Some(first) = cycle.cycle_members.first() {
        path.push_str(" -> ");
        path.push_str(first);
    }
    format!("formula dependencies form a cycle: {}", path)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
