//! The data-type lattice used to decide generated code shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::JxValue;

/// Data type of an expression's value.
///
/// `Null` is the type of a variable that resolves to zero schema columns:
/// every comparison against it definitely misses. `Object` is the generic
/// top for multi-typed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// No value can exist at this node
    Null,
    /// true/false
    Boolean,
    /// Whole number
    Integer,
    /// Floating-point number
    Number,
    /// UTF-8 text
    Text,
    /// Generic or multi-typed value
    Object,
    /// Nested (inner-document) value
    Nested,
}

impl DataType {
    /// True for `Integer` and `Number`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Number)
    }

    /// Lowercase name as used in jx type annotations.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Null => "null",
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Number => "number",
            DataType::Text => "string",
            DataType::Object => "object",
            DataType::Nested => "nested",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl JxValue {
    /// Derive the data type from the runtime value alone.
    ///
    /// Invariant: a literal's type is never stored separately from its
    /// value, so the two cannot drift apart.
    pub fn datatype(&self) -> DataType {
        match self {
            JxValue::Null => DataType::Null,
            JxValue::Bool(_) => DataType::Boolean,
            JxValue::Int(_) => DataType::Integer,
            JxValue::Float(_) => DataType::Number,
            JxValue::Text(_) => DataType::Text,
            JxValue::Array(_) | JxValue::Object(_) => DataType::Object,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datatype_derived_from_value() {
        assert_eq!(JxValue::Null.datatype(), DataType::Null);
        assert_eq!(JxValue::Bool(true).datatype(), DataType::Boolean);
        assert_eq!(JxValue::Int(3).datatype(), DataType::Integer);
        assert_eq!(JxValue::Float(3.5).datatype(), DataType::Number);
        assert_eq!(JxValue::Text("x".into()).datatype(), DataType::Text);
    }
}
