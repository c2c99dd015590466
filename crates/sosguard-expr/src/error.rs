use std::fmt;

/// Boxed error returned by runtime-variable accessors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every failure the expression engine can raise.
///
/// Entity absence (missing file, unknown unit, ...) is never an error; it is
/// carried as [`crate::Value::NotFound`].
#[derive(Debug, thiserror::Error)]
pub enum ExprError {
    #[error("parse error at offset {offset} near '{fragment}': {message}")]
    Parse {
        offset: usize,
        fragment: String,
        message: String,
    },

    #[error("{name}: not enough parameters (expected at least {min}, got {got})")]
    NotEnoughParameters {
        name: &'static str,
        min: usize,
        got: usize,
    },

    #[error("{name}: too many parameters (expected at most {max}, got {got})")]
    TooManyParameters {
        name: &'static str,
        max: usize,
        got: usize,
    },

    #[error("{name}: unexpected parameter: {detail}")]
    UnexpectedParameter { name: &'static str, detail: String },

    #[error("{target} has no property '{property}'")]
    NoSuchProperty { target: String, property: String },

    #[error("invalid {kind} literal: {text}")]
    LiteralFormat { kind: &'static str, text: String },

    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("unsupported operand for {op}: {detail}")]
    TypeMismatch { op: &'static str, detail: String },

    #[error("{op}: {reason}")]
    Arithmetic {
        op: &'static str,
        reason: &'static str,
    },

    #[error("unknown runtime variable '@{path}'")]
    UnknownVariable { path: String },

    #[error("failed to resolve '@{path}'")]
    Resolve {
        path: String,
        #[source]
        source: BoxError,
    },
}

/// Coarse classification of [`ExprError`], stable enough for reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parse,
    Arity,
    NoSuchProperty,
    LiteralFormat,
    InternalInvariant,
    Type,
    Arithmetic,
    Resolve,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Parse => "parse",
            ErrorKind::Arity => "arity",
            ErrorKind::NoSuchProperty => "no_such_property",
            ErrorKind::LiteralFormat => "literal_format",
            ErrorKind::InternalInvariant => "internal_invariant",
            ErrorKind::Type => "type",
            ErrorKind::Arithmetic => "arithmetic",
            ErrorKind::Resolve => "resolve",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ExprError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExprError::Parse { .. } => ErrorKind::Parse,
            ExprError::NotEnoughParameters { .. }
            | ExprError::TooManyParameters { .. }
            | ExprError::UnexpectedParameter { .. } => ErrorKind::Arity,
            ExprError::NoSuchProperty { .. } => ErrorKind::NoSuchProperty,
            ExprError::LiteralFormat { .. } => ErrorKind::LiteralFormat,
            ExprError::InternalInvariant(_) => ErrorKind::InternalInvariant,
            ExprError::TypeMismatch { .. } => ErrorKind::Type,
            ExprError::Arithmetic { .. } => ErrorKind::Arithmetic,
            ExprError::UnknownVariable { .. } | ExprError::Resolve { .. } => ErrorKind::Resolve,
        }
    }

    pub(crate) fn type_mismatch(op: &'static str, detail: impl Into<String>) -> Self {
        ExprError::TypeMismatch {
            op,
            detail: detail.into(),
        }
    }
}
