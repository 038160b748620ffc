//! Formula AST.
//!
//! A closed set of node kinds produced by the parser and consumed by
//! the inference, extraction and execution passes. Each pass matches
//! exhaustively, so adding a node kind forces every pass to handle it.

use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation, `-x`
    Neg,
    /// Logical negation, `not x`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// A parsed formula expression. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Number literal, e.g. `12.5`
    Number(Decimal),
    /// String literal, e.g. `"draft"`
    Text(String),
    /// Bare identifier referencing a schema field
    FieldRef(String),
    /// `-x` or `not x`
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Arithmetic: `a + b`, `a - b`, `a * b`, `a / b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `a and b`, `a or b`
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `a == b`, `a < b`, ...
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Function call, e.g. `if_else(a > b, 1, 2)`
    Call { name: String, args: Vec<Expr> },
}
