//! Compilation errors.
//!
//! Every error is fatal to the single query compilation and carries the
//! offending fragment or operator so callers can report it verbatim.

use thiserror::Error;

use crate::ast::Op;
use crate::foundation::DataType;
use crate::language::Language;

/// Result alias for expression compilation.
pub type Result<T> = std::result::Result<T, ExprError>;

/// Errors raised while parsing, simplifying, or rendering an expression.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExprError {
    #[error("invalid expression: {fragment}")]
    InvalidExpression { fragment: String },

    #[error("unknown operator: {name}")]
    UnknownOperator { name: String },

    #[error("expecting {expected} value, got {found}")]
    TypeMismatch { expected: DataType, found: String },

    #[error("operator {op} not supported on {language}")]
    UnsupportedOperator { op: Op, language: Language },

    #[error("schema error: {message}")]
    Schema { message: String },
}

impl ExprError {
    /// Shorthand for `InvalidExpression` with a displayable fragment.
    pub fn invalid(fragment: impl ToString) -> Self {
        ExprError::InvalidExpression {
            fragment: fragment.to_string(),
        }
    }

    /// Shorthand for `UnsupportedOperator`.
    pub fn unsupported(op: Op, language: Language) -> Self {
        ExprError::UnsupportedOperator { op, language }
    }
}
