//! Literal values and the canonical `NULL`/`TRUE`/`FALSE` constants.
//!
//! Rewrite rules compare against the canonical constants by value, so the
//! constructor normalizes every null/boolean input to them. This replaces
//! the original's singleton identity checks with plain equality.

use std::fmt;

use crate::foundation::{DataType, JxValue};

/// An immutable JSON-representable value inside an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal(JxValue);

/// The null literal.
pub const NULL: Literal = Literal(JxValue::Null);
/// The boolean true literal.
pub const TRUE: Literal = Literal(JxValue::Bool(true));
/// The boolean false literal.
pub const FALSE: Literal = Literal(JxValue::Bool(false));

impl Literal {
    /// Build a literal, canonicalizing null and booleans.
    pub fn from_value(value: JxValue) -> Literal {
        match value {
            JxValue::Null => NULL,
            JxValue::Bool(true) => TRUE,
            JxValue::Bool(false) => FALSE,
            other => Literal(other),
        }
    }

    /// The stored value.
    pub fn value(&self) -> &JxValue {
        &self.0
    }

    /// Consume into the stored value.
    pub fn into_value(self) -> JxValue {
        self.0
    }

    /// The data type, derived from the stored value.
    pub fn datatype(&self) -> DataType {
        self.0.datatype()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    pub fn is_true(&self) -> bool {
        matches!(self.0, JxValue::Bool(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self.0, JxValue::Bool(false))
    }

    /// Numeric view, if the value is a number.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    /// Text view, if the value is a string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<JxValue> for Literal {
    fn from(value: JxValue) -> Self {
        Literal::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_canonicalizes() {
        assert_eq!(Literal::from_value(JxValue::Null), NULL);
        assert_eq!(Literal::from_value(JxValue::Bool(true)), TRUE);
        assert_eq!(Literal::from_value(JxValue::Bool(false)), FALSE);
    }

    #[test]
    fn datatype_follows_value() {
        assert_eq!(NULL.datatype(), DataType::Null);
        assert_eq!(TRUE.datatype(), DataType::Boolean);
        assert_eq!(
            Literal::from_value(JxValue::Int(7)).datatype(),
            DataType::Integer
        );
    }
}
