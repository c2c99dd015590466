//! Tree-walking evaluator and the public entry point.

use crate::ast::{ArithOp, CmpOp, Expr};
use crate::error::ExprError;
use crate::functions;
use crate::grammar::Grammar;
use crate::resolver::{PropertyRegistry, PropertyResolver};
use crate::state::{NullState, SystemState};
use crate::value::{Num, Value};
use std::cmp::Ordering;
use std::sync::OnceLock;
use tracing::debug;

/// Everything an expression may consult while it is evaluated.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub state: &'a dyn SystemState,
    pub properties: &'a dyn PropertyResolver,
}

static EMPTY_REGISTRY: PropertyRegistry = PropertyRegistry::new();

impl<'a> Context<'a> {
    pub fn new(state: &'a dyn SystemState, properties: &'a dyn PropertyResolver) -> Self {
        Self { state, properties }
    }

    /// No system state and no runtime variables.
    pub fn detached() -> Context<'static> {
        Context {
            state: &NullState,
            properties: &EMPTY_REGISTRY,
        }
    }
}

/// Holds a built grammar and evaluates expressions with it.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    grammar: Grammar,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            grammar: Grammar::new(),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn parse(&self, source: &str) -> Result<Expr, ExprError> {
        self.grammar.parse(source)
    }

    /// Parse and evaluate `source`. A top-level `NotFound` becomes `false`;
    /// this is the only place the sentinel is erased.
    pub fn evaluate(&self, source: &str, ctx: &Context<'_>) -> Result<Value, ExprError> {
        match self.evaluate_raw(source, ctx)? {
            Value::NotFound(what) => {
                debug!(%what, "entity not found; expression is false");
                Ok(Value::Bool(false))
            }
            other => Ok(other),
        }
    }

    /// Like [`Engine::evaluate`] but keeps a top-level `NotFound`.
    pub fn evaluate_raw(&self, source: &str, ctx: &Context<'_>) -> Result<Value, ExprError> {
        let expr = self.grammar.parse(source)?;
        let value = eval(&expr, ctx)?;
        debug!(expression = source, result = %value, "evaluated");
        Ok(value)
    }
}

/// Evaluate `source` with a process-wide grammar built on first use.
pub fn evaluate(source: &str, ctx: &Context<'_>) -> Result<Value, ExprError> {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(Engine::new).evaluate(source, ctx)
}

pub fn eval(expr: &Expr, ctx: &Context<'_>) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Variable(path) => ctx.properties.resolve(path, ctx.state),
        Expr::Call { function, args } => functions::call(*function, args, ctx),
        Expr::Sign { negative, operand } => sign(*negative, eval(operand, ctx)?),
        Expr::Power(operands) => power(operands, ctx),
        Expr::MulDiv {
            operands,
            operators,
        } => left_fold("mul_div", operands, operators, &[ArithOp::Mul, ArithOp::Div], ctx),
        Expr::AddSub {
            operands,
            operators,
        } => left_fold("add_sub", operands, operators, &[ArithOp::Add, ArithOp::Sub], ctx),
        Expr::Compare { first, rest } => compare_chain(first, rest, ctx),
        Expr::Not(operand) => Ok(Value::Bool(!eval(operand, ctx)?.is_truthy())),
        Expr::And(children) => all_truthy(children.iter().map(|c| eval(c, ctx))).map(Value::Bool),
        Expr::Or(children) => any_truthy(children.iter().map(|c| eval(c, ctx))).map(Value::Bool),
    }
}

/// Pulls evaluations until one is falsy; later ones are never produced.
pub(crate) fn all_truthy(
    evaluations: impl Iterator<Item = Result<Value, ExprError>>,
) -> Result<bool, ExprError> {
    for v in evaluations {
        if !v?.is_truthy() {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Pulls evaluations until one is truthy; later ones are never produced.
pub(crate) fn any_truthy(
    evaluations: impl Iterator<Item = Result<Value, ExprError>>,
) -> Result<bool, ExprError> {
    for v in evaluations {
        if v?.is_truthy() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn sign(negative: bool, value: Value) -> Result<Value, ExprError> {
    let op = if negative { "-" } else { "+" };
    let n = value.as_num().ok_or_else(|| {
        ExprError::type_mismatch(
            op,
            format!("bad operand type for unary {op}: {}", value.type_name()),
        )
    })?;
    if !negative {
        return Ok(n.into());
    }
    match n {
        Num::Int(i) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or(ExprError::Arithmetic {
                op,
                reason: "integer overflow",
            }),
        Num::Float(f) => Ok(Value::Float(-f)),
    }
}

fn power(operands: &[Expr], ctx: &Context<'_>) -> Result<Value, ExprError> {
    if operands.len() < 2 {
        return Err(ExprError::NotEnoughParameters {
            name: "**",
            min: 2,
            got: operands.len(),
        });
    }
    // Right-associative: evaluate left to right, combine from the right.
    let values = operands
        .iter()
        .map(|o| eval(o, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let mut iter = values.into_iter().rev();
    let mut acc = iter.next().unwrap_or(Value::None);
    for base in iter {
        acc = arith(ArithOp::Pow, base, acc)?;
    }
    Ok(acc)
}

fn left_fold(
    name: &'static str,
    operands: &[Expr],
    operators: &[ArithOp],
    allowed: &[ArithOp],
    ctx: &Context<'_>,
) -> Result<Value, ExprError> {
    if operands.len() < 2 {
        return Err(ExprError::NotEnoughParameters {
            name,
            min: 2,
            got: operands.len(),
        });
    }
    if operators.len() + 1 != operands.len() {
        return Err(ExprError::UnexpectedParameter {
            name,
            detail: format!(
                "{} operands need {} operators, got {}",
                operands.len(),
                operands.len() - 1,
                operators.len()
            ),
        });
    }
    let mut acc = eval(&operands[0], ctx)?;
    for (op, operand) in operators.iter().zip(&operands[1..]) {
        if !allowed.contains(op) {
            return Err(ExprError::InternalInvariant(format!(
                "operator '{}' reached the {name} fold",
                op.symbol()
            )));
        }
        let rhs = eval(operand, ctx)?;
        acc = arith(*op, acc, rhs)?;
    }
    Ok(acc)
}

fn arith(op: ArithOp, lhs: Value, rhs: Value) -> Result<Value, ExprError> {
    if op == ArithOp::Add
        && let (Value::Str(a), Value::Str(b)) = (&lhs, &rhs)
    {
        return Ok(Value::Str(format!("{a}{b}")));
    }
    let sym = op.symbol();
    let (Some(a), Some(b)) = (lhs.as_num(), rhs.as_num()) else {
        return Err(ExprError::type_mismatch(
            sym,
            format!("{} {sym} {}", lhs.type_name(), rhs.type_name()),
        ));
    };
    let overflow = ExprError::Arithmetic {
        op: sym,
        reason: "integer overflow",
    };
    let value = match (op, a, b) {
        (ArithOp::Div, _, _) => {
            if b.as_f64() == 0.0 {
                return Err(ExprError::Arithmetic {
                    op: sym,
                    reason: "division by zero",
                });
            }
            Value::Float(a.as_f64() / b.as_f64())
        }
        (ArithOp::Add, Num::Int(x), Num::Int(y)) => Value::Int(x.checked_add(y).ok_or(overflow)?),
        (ArithOp::Sub, Num::Int(x), Num::Int(y)) => Value::Int(x.checked_sub(y).ok_or(overflow)?),
        (ArithOp::Mul, Num::Int(x), Num::Int(y)) => Value::Int(x.checked_mul(y).ok_or(overflow)?),
        (ArithOp::Pow, Num::Int(x), Num::Int(y)) if y >= 0 => {
            let exp = u32::try_from(y).map_err(|_| overflow)?;
            Value::Int(x.checked_pow(exp).ok_or(ExprError::Arithmetic {
                op: sym,
                reason: "integer overflow",
            })?)
        }
        (ArithOp::Add, _, _) => Value::Float(a.as_f64() + b.as_f64()),
        (ArithOp::Sub, _, _) => Value::Float(a.as_f64() - b.as_f64()),
        (ArithOp::Mul, _, _) => Value::Float(a.as_f64() * b.as_f64()),
        (ArithOp::Pow, _, _) => {
            if a.as_f64() == 0.0 && b.as_f64() < 0.0 {
                return Err(ExprError::Arithmetic {
                    op: sym,
                    reason: "zero raised to a negative power",
                });
            }
            Value::Float(a.as_f64().powf(b.as_f64()))
        }
    };
    Ok(value)
}

fn compare_chain(
    first: &Expr,
    rest: &[(CmpOp, Expr)],
    ctx: &Context<'_>,
) -> Result<Value, ExprError> {
    let mut left = eval(first, ctx)?;
    for (op, operand) in rest {
        let right = eval(operand, ctx)?;
        if left.is_not_found() || right.is_not_found() {
            return Ok(Value::Bool(false));
        }
        if !compare(*op, &left, &right)? {
            return Ok(Value::Bool(false));
        }
        left = right;
    }
    Ok(Value::Bool(true))
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, ExprError> {
    let sym = op.symbol();
    Ok(match op {
        CmpOp::Eq => left.loose_eq(right),
        CmpOp::Ne => !left.loose_eq(right),
        CmpOp::Lt => left.try_order(right, sym)? == Ordering::Less,
        CmpOp::Le => left.try_order(right, sym)? != Ordering::Greater,
        CmpOp::Gt => left.try_order(right, sym)? == Ordering::Greater,
        CmpOp::Ge => left.try_order(right, sym)? != Ordering::Less,
        CmpOp::In => right.contains(left)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn lazy_and_stops_at_first_falsy() {
        let produced = Cell::new(0);
        let items = [Value::Bool(true), Value::Int(0), Value::Bool(true)];
        let result = all_truthy(items.iter().map(|v| {
            produced.set(produced.get() + 1);
            Ok(v.clone())
        }))
        .unwrap();
        assert!(!result);
        assert_eq!(produced.get(), 2);
    }

    #[test]
    fn lazy_or_stops_at_first_truthy() {
        let produced = Cell::new(0);
        let items = [Value::None, Value::from("x"), Value::Bool(false)];
        let result = any_truthy(items.iter().map(|v| {
            produced.set(produced.get() + 1);
            Ok(v.clone())
        }))
        .unwrap();
        assert!(result);
        assert_eq!(produced.get(), 2);
    }

    #[test]
    fn fold_with_foreign_operator_is_an_invariant_error() {
        let expr = Expr::MulDiv {
            operands: vec![Expr::literal(1i64), Expr::literal(2i64)],
            operators: vec![ArithOp::Add],
        };
        let err = eval(&expr, &Context::detached()).unwrap_err();
        assert!(matches!(err, ExprError::InternalInvariant(_)));
    }

    #[test]
    fn fold_arity_is_checked() {
        let single = Expr::AddSub {
            operands: vec![Expr::literal(1i64)],
            operators: Vec::new(),
        };
        assert!(matches!(
            eval(&single, &Context::detached()),
            Err(ExprError::NotEnoughParameters { name: "add_sub", .. })
        ));

        let mismatched = Expr::AddSub {
            operands: vec![Expr::literal(1i64), Expr::literal(2i64)],
            operators: vec![ArithOp::Add, ArithOp::Sub],
        };
        assert!(matches!(
            eval(&mismatched, &Context::detached()),
            Err(ExprError::UnexpectedParameter { name: "add_sub", .. })
        ));

        let power = Expr::Power(vec![Expr::literal(2i64)]);
        assert!(matches!(
            eval(&power, &Context::detached()),
            Err(ExprError::NotEnoughParameters { name: "**", .. })
        ));
    }

    #[test]
    fn integer_overflow_is_reported() {
        let err = arith(ArithOp::Mul, Value::Int(i64::MAX), Value::Int(2)).unwrap_err();
        assert!(matches!(err, ExprError::Arithmetic { reason: "integer overflow", .. }));
    }

    #[test]
    fn negative_integer_exponent_gives_float() {
        assert_eq!(
            arith(ArithOp::Pow, Value::Int(2), Value::Int(-1)).unwrap(),
            Value::Float(0.5)
        );
    }
}
