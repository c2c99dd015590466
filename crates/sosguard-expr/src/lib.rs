//! Expression language embedded in sosguard checks.
//!
//! An expression is parsed into a closed [`Expr`] tree and evaluated once
//! against a [`Context`]: the [`SystemState`] collaborators behind the
//! built-in functions, and a [`PropertyResolver`] for `@runtime.variables`.
//!
//! ```
//! use sosguard_expr::{evaluate, Context, Value};
//!
//! let ctx = Context::detached();
//! assert_eq!(evaluate("1 < 2 < 3", &ctx).unwrap(), Value::Bool(true));
//! assert_eq!(evaluate("3 ** 3 ** 2", &ctx).unwrap(), Value::Int(19683));
//! ```

#![forbid(unsafe_code)]

pub mod ast;
mod error;
mod eval;
mod functions;
mod grammar;
mod lexer;
mod resolver;
mod state;
mod value;


pub use ast::{ArithOp, CmpOp, Expr};
pub use error::{BoxError, ErrorKind, ExprError};
pub use eval::{eval, evaluate, Context, Engine};
pub use functions::Function;
pub use grammar::Grammar;
pub use resolver::{PropertyRegistry, PropertyResolver};
pub use state::{
    Certificate, FileInfo, IniDocument, NullState, Properties, SystemState, SystemdUnit,
    DEFAULT_SECTION,
};
pub use value::Value;

/// Panic-free entry points for fuzzing.
pub mod fuzz {
    /// Tokenize and parse arbitrary text. **Never panics** on any input.
    pub fn parse(text: &str) -> Result<(), crate::ExprError> {
        crate::Grammar::new().parse(text).map(|_| ())
    }
}
