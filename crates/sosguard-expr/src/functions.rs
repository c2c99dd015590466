//! Built-in functions: the bridge between expressions and system state.

use crate::ast::Expr;
use crate::error::ExprError;
use crate::eval::{eval, Context};
use crate::state::Properties;
use crate::value::Value;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Len,
    Not,
    File,
    Systemd,
    ReadIni,
    ReadCert,
}

impl Function {
    pub const ALL: [Function; 6] = [
        Function::Len,
        Function::Not,
        Function::File,
        Function::Systemd,
        Function::ReadIni,
        Function::ReadCert,
    ];

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Len => "len",
            Function::Not => "not",
            Function::File => "file",
            Function::Systemd => "systemd",
            Function::ReadIni => "read_ini",
            Function::ReadCert => "read_cert",
        }
    }

    /// Inclusive `(min, max)` argument counts.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Function::Len | Function::Not => (1, 1),
            Function::File | Function::Systemd | Function::ReadCert => (1, 2),
            Function::ReadIni => (2, 4),
        }
    }

    fn check_arity(self, got: usize) -> Result<(), ExprError> {
        let (min, max) = self.arity();
        if got < min {
            return Err(ExprError::NotEnoughParameters {
                name: self.name(),
                min,
                got,
            });
        }
        if got > max {
            return Err(ExprError::TooManyParameters {
                name: self.name(),
                max,
                got,
            });
        }
        Ok(())
    }
}

pub(crate) fn call(
    function: Function,
    args: &[Expr],
    ctx: &Context<'_>,
) -> Result<Value, ExprError> {
    function.check_arity(args.len())?;
    match function {
        Function::Len => len(eval(&args[0], ctx)?),
        Function::Not => Ok(Value::Bool(!eval(&args[0], ctx)?.is_truthy())),
        Function::File => {
            let path = string_arg(function, "path", &args[0], ctx)?;
            let prop = optional_string_arg(function, "property", args.get(1), ctx)?;
            trace!(%path, "file lookup");
            entity(&path, ctx.state.file(&path), prop.as_deref())
        }
        Function::Systemd => {
            let unit = string_arg(function, "unit", &args[0], ctx)?;
            let prop = optional_string_arg(function, "property", args.get(1), ctx)?;
            trace!(%unit, "systemd lookup");
            entity(&unit, ctx.state.systemd_unit(&unit), prop.as_deref())
        }
        Function::ReadIni => read_ini(function, args, ctx),
        Function::ReadCert => {
            let path = string_arg(function, "path", &args[0], ctx)?;
            let prop = optional_string_arg(function, "property", args.get(1), ctx)?;
            trace!(%path, "certificate lookup");
            match ctx.state.certificate(&path) {
                Ok(cert) => entity(&path, Some(cert), prop.as_deref()),
                Err(err) => {
                    trace!(%path, error = %err, "certificate unreadable");
                    Ok(Value::NotFound(path))
                }
            }
        }
    }
}

fn len(value: Value) -> Result<Value, ExprError> {
    if !value.is_truthy() {
        return Ok(Value::Int(0));
    }
    let n = match &value {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        other => {
            return Err(ExprError::type_mismatch(
                "len",
                format!("{} has no length", other.type_name()),
            ));
        }
    };
    i64::try_from(n)
        .map(Value::Int)
        .map_err(|_| ExprError::Arithmetic {
            op: "len",
            reason: "length overflows an integer",
        })
}

/// Existence flag, or one property of the record when `prop` is given.
fn entity<T: Properties>(
    key: &str,
    record: Option<T>,
    prop: Option<&str>,
) -> Result<Value, ExprError> {
    let Some(record) = record else {
        return Ok(Value::NotFound(key.to_string()));
    };
    let Some(prop) = prop else {
        return Ok(Value::Bool(true));
    };
    record
        .property(prop)
        .ok_or_else(|| ExprError::NoSuchProperty {
            target: key.to_string(),
            property: prop.to_string(),
        })
}

fn read_ini(function: Function, args: &[Expr], ctx: &Context<'_>) -> Result<Value, ExprError> {
    let path = string_arg(function, "path", &args[0], ctx)?;
    let key = string_arg(function, "key", &args[1], ctx)?;
    let section = match args.get(2) {
        Some(arg) => match eval(arg, ctx)? {
            Value::None => None,
            Value::Str(s) => Some(s),
            other => return Err(unexpected(function, "section", &other)),
        },
        None => None,
    };
    trace!(%path, %key, section = ?section, "ini lookup");

    let Some(doc) = ctx.state.ini(&path) else {
        return Ok(Value::NotFound(path));
    };
    match doc.get(section.as_deref(), &key) {
        Some(v) => Ok(Value::Str(v.to_string())),
        None => match args.get(3) {
            Some(default) => eval(default, ctx),
            None => Ok(Value::None),
        },
    }
}

fn string_arg(
    function: Function,
    what: &str,
    arg: &Expr,
    ctx: &Context<'_>,
) -> Result<String, ExprError> {
    match eval(arg, ctx)? {
        Value::Str(s) => Ok(s),
        other => Err(unexpected(function, what, &other)),
    }
}

fn optional_string_arg(
    function: Function,
    what: &str,
    arg: Option<&Expr>,
    ctx: &Context<'_>,
) -> Result<Option<String>, ExprError> {
    arg.map(|a| string_arg(function, what, a, ctx)).transpose()
}

fn unexpected(function: Function, what: &str, got: &Value) -> ExprError {
    ExprError::UnexpectedParameter {
        name: function.name(),
        detail: format!("{what} must be a string, got {}", got.type_name()),
    }
}
