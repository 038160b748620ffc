//! Field-reference extraction.
//!
//! Collects every field identifier an expression references, excluding
//! function names and literals. Exposed separately from validation so
//! dependency queries can run without a full validate pass and feed a
//! schema-wide map for cycle detection.

use std::collections::BTreeSet;

use crate::ast::Expr;

/// Collect the field references of `expr` into `out`.
pub fn collect_field_refs(expr: &Expr, out: &mut BTreeSet<String>) {
    match expr {
        Expr::Number(_) | Expr::Text(_) => {}
        Expr::FieldRef(name) => {
            out.insert(name.clone());
        }
        Expr::Unary { operand, .. } => collect_field_refs(operand, out),
        Expr::Binary { left, right, .. }
        | Expr::Logical { left, right, .. }
        | Expr::Compare { left, right, .. } => {
            collect_field_refs(left, out);
            collect_field_refs(right, out);
        }
        Expr::Call { args, .. } => {
            for arg in args {
                collect_field_refs(arg, out);
            }
        }
    }
}

/// The set of field references of `expr`, in sorted order.
pub fn field_refs(expr: &Expr) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_field_refs(expr, &mut out);
    out
}

/// The set of function names called by `expr`, in sorted order.
///
/// The validator checks these against the built-in registry; the
/// parser itself accepts any call name.
pub fn call_names(expr: &Expr) -> BTreeSet<String> {
    fn walk(expr: &Expr, out: &mut BTreeSet<String>) {
        match expr {
            Expr::Number(_) | Expr::Text(_) | Expr::FieldRef(_) => {}
            Expr::Unary { operand, .. } => walk(operand, out),
            Expr::Binary { left, right, .. }
            | Expr::Logical { left, right, .. }
            | Expr::Compare { left, right, .. } => {
                walk(left, out);
                walk(right, out);
            }
            Expr::Call { name, args } => {
                out.insert(name.clone());
                for arg in args {
                    walk(arg, out);
                }
            }
        }
    }
    let mut out = BTreeSet::new();
    walk(expr, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn refs(formula: &str) -> Vec<String> {
        field_refs(&parse(formula).unwrap()).into_iter().collect()
    }

    #[test]
    fn collects_every_reference_once() {
        assert_eq!(refs("a + b * a"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn function_names_are_not_references() {
        assert_eq!(
            refs("if_else(total > limit, total, limit)"),
            vec!["limit".to_string(), "total".to_string()]
        );
    }

    #[test]
    fn literals_have_no_references() {
        assert!(refs("1 + 2 * 3").is_empty());
        assert!(refs("concat(\"a\", \"b\")").is_empty());
    }

    #[test]
    fn references_inside_unary_and_logical_nodes() {
        assert_eq!(
            refs("not hidden and -offset < 0"),
            vec!["hidden".to_string(), "offset".to_string()]
        );
    }

    #[test]
    fn call_names_are_collected_including_nested_calls() {
        let expr = parse("round(custom(a)) + other(b)").unwrap();
        let names: Vec<String> = call_names(&expr).into_iter().collect();
        assert_eq!(
            names,
            vec!["custom".to_string(), "other".to_string(), "round".to_string()]
        );
    }
}
