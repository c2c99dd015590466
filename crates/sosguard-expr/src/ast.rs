//! Expression tree produced by the grammar.

use crate::functions::Function;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Pow => "**",
        }
    }
}

/// Comparison operators. Word aliases (`LT`, `eq`, ...) map onto the same
/// variants as their symbolic forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    In,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::In => "in",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Boolean, none, integer, float or string literal.
    Literal(Value),
    /// `@dotted.path` with the `@` stripped.
    Variable(String),
    Call {
        function: Function,
        args: Vec<Expr>,
    },
    Sign {
        negative: bool,
        operand: Box<Expr>,
    },
    /// Right-associative `a ** b ** c`.
    Power(Vec<Expr>),
    /// Left fold over `*` and `/`; `operators.len() == operands.len() - 1`.
    MulDiv {
        operands: Vec<Expr>,
        operators: Vec<ArithOp>,
    },
    /// Left fold over `+` and `-`; same shape as `MulDiv`.
    AddSub {
        operands: Vec<Expr>,
        operators: Vec<ArithOp>,
    },
    /// Chained comparison `first op0 rest0 op1 rest1 ...`.
    Compare {
        first: Box<Expr>,
        rest: Vec<(CmpOp, Expr)>,
    },
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub(crate) fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }
}
