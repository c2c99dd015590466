use crate::error::ExprError;
use std::cmp::Ordering;
use std::fmt;

/// A value produced while evaluating an expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    None,
    List(Vec<Value>),
    /// The referenced external entity (file, unit, certificate, ini file) does
    /// not exist. Carries a description of what was looked up.
    NotFound(String),
}

/// Numeric view of a value; booleans count as 0/1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

impl From<Num> for Value {
    fn from(n: Num) -> Self {
        match n {
            Num::Int(i) => Value::Int(i),
            Num::Float(f) => Value::Float(f),
        }
    }
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::None | Value::NotFound(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Value::NotFound(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::None => "none",
            Value::List(_) => "list",
            Value::NotFound(_) => "not_found",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn as_num(&self) -> Option<Num> {
        match self {
            Value::Bool(b) => Some(Num::Int(i64::from(*b))),
            Value::Int(i) => Some(Num::Int(*i)),
            Value::Float(f) => Some(Num::Float(*f)),
            _ => None,
        }
    }

    /// Equality as used by `==`/`!=`: numbers compare by value across int,
    /// float and bool; other kinds only equal their own kind.
    pub(crate) fn loose_eq(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.as_num(), other.as_num()) {
            return match (a, b) {
                (Num::Int(x), Num::Int(y)) => x == y,
                _ => a.as_f64() == b.as_f64(),
            };
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            _ => false,
        }
    }

    /// Ordering as used by `<`, `<=`, `>`, `>=`.
    pub(crate) fn try_order(&self, other: &Value, op: &'static str) -> Result<Ordering, ExprError> {
        if let (Some(a), Some(b)) = (self.as_num(), other.as_num()) {
            let ord = match (a, b) {
                (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
                _ => a.as_f64().partial_cmp(&b.as_f64()),
            };
            // NaN cannot be produced by literals; treat it as incomparable.
            return ord.ok_or(ExprError::Arithmetic {
                op,
                reason: "comparison with NaN",
            });
        }
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    let ord = x.try_order(y, op)?;
                    if ord != Ordering::Equal {
                        return Ok(ord);
                    }
                }
                Ok(a.len().cmp(&b.len()))
            }
            _ => Err(ExprError::type_mismatch(
                op,
                format!("cannot order {} and {}", self.type_name(), other.type_name()),
            )),
        }
    }

    /// Membership test for `needle IN self`.
    pub(crate) fn contains(&self, needle: &Value) -> Result<bool, ExprError> {
        match (self, needle) {
            (Value::Str(hay), Value::Str(n)) => Ok(hay.contains(n.as_str())),
            (Value::Str(_), other) => Err(ExprError::type_mismatch(
                "in",
                format!("left operand must be str when testing a str, got {}", other.type_name()),
            )),
            (Value::List(items), n) => Ok(items.iter().any(|item| item.loose_eq(n))),
            (other, _) => Err(ExprError::type_mismatch(
                "in",
                format!("{} is not a container", other.type_name()),
            )),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "'{s}'"),
            Value::None => f.write_str("none"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::NotFound(what) => write!(f, "<not found: {what}>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::None)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_values() {
        for v in [
            Value::None,
            Value::Bool(false),
            Value::Int(0),
            Value::Float(0.0),
            Value::Str(String::new()),
            Value::List(Vec::new()),
            Value::NotFound("x".to_string()),
        ] {
            assert!(!v.is_truthy(), "{v:?} should be falsy");
        }
        assert!(Value::Str("0".to_string()).is_truthy());
    }

    #[test]
    fn numbers_compare_across_kinds() {
        assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
        assert!(Value::Bool(true).loose_eq(&Value::Int(1)));
        assert!(!Value::Str("1".to_string()).loose_eq(&Value::Int(1)));
        assert!(!Value::None.loose_eq(&Value::Bool(false)));
    }

    #[test]
    fn ordering_rejects_mixed_kinds() {
        let err = Value::None.try_order(&Value::Int(1), "<").unwrap_err();
        assert!(matches!(err, ExprError::TypeMismatch { op: "<", .. }));
    }

    #[test]
    fn display_keeps_float_marker() {
        assert_eq!(Value::Float(5.0).to_string(), "5.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::from("a")]).to_string(),
            "[1, 'a']"
        );
    }
}
