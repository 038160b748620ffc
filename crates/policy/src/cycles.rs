//! Dependency-cycle detection.
//!
//! Consumes a caller-built map from field id to the fields its formula
//! references, spanning the whole schema. DFS with an explicit
//! current-path stack; the first edge back onto the active path is
//! reported as a cycle with its members in path order. Roots are
//! visited in sorted order so the result is deterministic for a given
//! map.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of a cycle search over the schema dependency map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    pub has_cycle: bool,
    /// Fields participating in the first cycle found, in path order.
    pub cycle_members: Vec<String>,
}

impl CycleResult {
    fn none() -> Self {
        CycleResult {
            has_cycle: false,
            cycle_members: Vec::new(),
        }
    }
}

/// Search `dependencies` for a cycle.
pub fn detect_cycles(dependencies: &BTreeMap<String, Vec<String>>) -> CycleResult {
    let mut done: BTreeSet<&str> = BTreeSet::new();
    let mut path: Vec<&str> = Vec::new();

    for root in dependencies.keys() {
        if done.contains(root.as_str()) {
            continue;
        }
        if let Some(cycle) = visit(root, dependencies, &mut done, &mut path) {
            return CycleResult {
                has_cycle: true,
                cycle_members: cycle,
            };
        }
    }
    CycleResult::none()
}

/// DFS from `node`. Returns the cycle members if a back-edge onto the
/// active path is found below `node`.
fn visit<'a>(
    node: &'a str,
    dependencies: &'a BTreeMap<String, Vec<String>>,
    done: &mut BTreeSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if let Some(start) = path.iter().position(|n| *n == node) {
        return Some(path[start..].iter().map(|n| n.to_string()).collect());
    }
    if done.contains(node) {
        return None;
    }

    path.push(node);
    if let Some(targets) = dependencies.get(node) {
        for target in targets {
            if let Some(cycle) = visit(target, dependencies, done, path) {
                return Some(cycle);
            }
        }
    }
    path.pop();
    done.insert(node);
    None
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn map(edges: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        edges
            .iter()
            .map(|(from, to)| {
                (
                    from.to_string(),
                    to.iter().map(|t| t.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_map_has_no_cycle() {
        let result = detect_cycles(&BTreeMap::new());
        assert!(!result.has_cycle);
        assert!(result.cycle_members.is_empty());
    }

    #[test]
    fn acyclic_chain_has_no_cycle() {
        let deps = map(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);
        assert!(!detect_cycles(&deps).has_cycle);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        // Two paths reaching the same node are fine; only a back-edge
        // onto the active path is a cycle.
        let deps = map(&[("a", &["b", "c"]), ("b", &["d"]), ("c", &["d"]), ("d", &[])]);
        assert!(!detect_cycles(&deps).has_cycle);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let deps = map(&[("a", &["a"])]);
        let result = detect_cycles(&deps);
        assert!(result.has_cycle);
        assert_eq!(result.cycle_members, vec!["a".to_string()]);
    }

    #[test]
    fn two_field_cycle_reports_members_in_path_order() {
        let deps = map(&[("a", &["b"]), ("b", &["a"])]);
        let result = detect_cycles(&deps);
        assert!(result.has_cycle);
        assert_eq!(
            result.cycle_members,
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn cycle_reached_through_a_prefix_excludes_the_prefix() {
        // a feeds into the b-c cycle but is not part of it.
        let deps = map(&[("a", &["b"]), ("b", &["c"]), ("c", &["b"])]);
        let result = detect_cycles(&deps);
        assert!(result.has_cycle);
        assert_eq!(
            result.cycle_members,
            vec!["b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn edges_to_fields_without_formulas_are_allowed() {
        let deps = map(&[("total", &["quantity", "unit_price"])]);
        assert!(!detect_cycles(&deps).has_cycle);
    }

    #[test]
    fn detection_is_deterministic() {
        let deps = map(&[("x", &["y"]), ("y", &["x"]), ("a", &["b"]), ("b", &["a"])]);
        let first = detect_cycles(&deps);
        let second = detect_cycles(&deps);
        assert_eq!(first, second);
        // BTreeMap ordering makes the a-b cycle the first one found.
        assert_eq!(first.cycle_members, vec!["a".to_string(), "b".to_string()]);
    }
}
