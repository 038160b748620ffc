//! Run-time rule model.
//!
//! These types are distinct from the design-time control rules in
//! proviso-policy: a runtime rule carries an arbitrary boolean
//! condition (same formula language) plus the concrete effect to
//! apply when it fires. Effect payloads are opaque JSON; the document
//! layer interprets and applies them.

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Control kinds
// ──────────────────────────────────────────────

/// What a fired rule does to its target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlKind {
    ValueSet,
    Visibility,
    Enable,
    Require,
}

impl ControlKind {
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::ValueSet => "VALUE_SET",
            ControlKind::Visibility => "VISIBILITY",
            ControlKind::Enable => "ENABLE",
            ControlKind::Require => "REQUIRE",
        }
    }
}

/// An unrecognized control-kind string at the boundary -- a caller
/// bug, not formula data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown control kind '{0}'")]
pub struct UnknownControlKind(pub String);

impl std::str::FromStr for ControlKind {
    type Err = UnknownControlKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VALUE_SET" => Ok(ControlKind::ValueSet),
            "VISIBILITY" => Ok(ControlKind::Visibility),
            "ENABLE" => Ok(ControlKind::Enable),
            "REQUIRE" => Ok(ControlKind::Require),
            other => Err(UnknownControlKind(other.to_string())),
        }
    }
}

impl TryFrom<&str> for ControlKind {
    type Error = UnknownControlKind;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ──────────────────────────────────────────────
// Rules and effects
// ──────────────────────────────────────────────

/// A concrete instruction produced by a fired rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlEffect {
    pub kind: ControlKind,
    pub target_field_id: String,
    /// Opaque payload, applied by the document layer.
    pub value: serde_json::Value,
}

/// A run-time control rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeRule {
    pub id: String,
    /// Translation key for presentation; never interpreted here.
    pub name_key: String,
    /// Boolean condition in the formula language.
    pub condition: String,
    pub effect: ControlEffect,
    pub enabled: bool,
    /// Higher fires first; ties keep input order.
    pub priority: i64,
}

/// Outcome of one evaluation run. Fresh per call, never retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Effects of fired rules, in priority order.
    pub effects: Vec<ControlEffect>,
    /// One rule-tagged message per failed rule, in priority order.
    pub errors: Vec<String>,
}
