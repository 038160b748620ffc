//! proviso-expr: formula language core.
//!
//! Parses the formula language used by control rules, infers result
//! types against a field-type environment, extracts field references,
//! and executes parsed formulas against concrete field values.
//!
//! # Public API
//!
//! Key entry points are re-exported at the crate root:
//!
//! - [`parse()`] -- formula text to [`Expr`]
//! - [`infer_type()`] -- static result type plus warnings
//! - [`field_refs()`] -- referenced field ids
//! - [`evaluate()`] -- execute against a field-value map
//! - [`builtin()`] / [`BUILTINS`] -- the function registry
//!
//! Everything here is pure and stateless: each call takes its full
//! input as arguments and returns a fresh result, so concurrent use
//! needs no coordination.

pub mod ast;
pub mod error;
pub mod eval;
pub mod functions;
pub mod infer;
pub mod lexer;
pub mod parser;
pub mod refs;
pub mod types;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::{BinaryOp, CompareOp, Expr, LogicalOp, UnaryOp};
pub use error::{EvalError, ParseError};
pub use eval::evaluate;
pub use functions::{
    builtin, is_builtin, Arity, FunctionDef, FunctionProvider, ReturnRule, StaticFunctionProvider,
    BUILTINS,
};
pub use infer::infer_type;
pub use parser::parse;
pub use refs::{call_names, collect_field_refs, field_refs};
pub use types::{ExprType, Value};
