//! Typed JSON values.
//!
//! `JxValue` is the sum type the parser matches exhaustively: every shape a
//! jx expression can be encoded in is one of these variants. Conversions to
//! and from `serde_json::Value` sit at the boundary so the rest of the
//! compiler never branches on duck-typed shapes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A JSON-representable value with insertion-ordered objects.
///
/// Numeric equality is cross-variant: `Int(2)` equals `Float(2.0)`. This
/// matters because literal folding may move a value between the two
/// representations without changing its meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JxValue {
    /// JSON null
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON integer
    Int(i64),
    /// JSON floating-point number
    Float(f64),
    /// JSON string
    Text(String),
    /// JSON array
    Array(Vec<JxValue>),
    /// JSON object, insertion order preserved
    Object(IndexMap<String, JxValue>),
}

impl JxValue {
    /// True for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, JxValue::Null)
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JxValue::Int(i) => Some(*i as f64),
            JxValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer view of the value, if exact.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JxValue::Int(i) => Some(*i),
            JxValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// String view of the value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JxValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view of the value, if it is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JxValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Array view of the value, if it is an array.
    pub fn as_array(&self) -> Option<&[JxValue]> {
        match self {
            JxValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Object view of the value, if it is an object.
    pub fn as_object(&self) -> Option<&IndexMap<String, JxValue>> {
        match self {
            JxValue::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl PartialEq for JxValue {
    fn eq(&self, other: &Self) -> bool {
        use JxValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            // Numeric equality crosses the Int/Float boundary.
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl fmt::Display for JxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&serde_json::Value::from(self.clone())) {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str("<unserializable>"),
        }
    }
}

impl From<serde_json::Value> for JxValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JxValue::Null,
            serde_json::Value::Bool(b) => JxValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    JxValue::Int(i)
                } else {
                    JxValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => JxValue::Text(s),
            serde_json::Value::Array(items) => {
                JxValue::Array(items.into_iter().map(JxValue::from).collect())
            }
            serde_json::Value::Object(map) => JxValue::Object(
                map.into_iter().map(|(k, v)| (k, JxValue::from(v))).collect(),
            ),
        }
    }
}

impl From<JxValue> for serde_json::Value {
    fn from(value: JxValue) -> Self {
        match value {
            JxValue::Null => serde_json::Value::Null,
            JxValue::Bool(b) => serde_json::Value::Bool(b),
            JxValue::Int(i) => serde_json::Value::from(i),
            JxValue::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            JxValue::Text(s) => serde_json::Value::String(s),
            JxValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            JxValue::Object(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

impl From<bool> for JxValue {
    fn from(b: bool) -> Self {
        JxValue::Bool(b)
    }
}

impl From<i64> for JxValue {
    fn from(i: i64) -> Self {
        JxValue::Int(i)
    }
}

impl From<i32> for JxValue {
    fn from(i: i32) -> Self {
        JxValue::Int(i64::from(i))
    }
}

impl From<f64> for JxValue {
    fn from(f: f64) -> Self {
        JxValue::Float(f)
    }
}

impl From<&str> for JxValue {
    fn from(s: &str) -> Self {
        JxValue::Text(s.to_string())
    }
}

impl From<String> for JxValue {
    fn from(s: String) -> Self {
        JxValue::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_equality_crosses_variants() {
        assert_eq!(JxValue::Int(2), JxValue::Float(2.0));
        assert_ne!(JxValue::Int(2), JxValue::Float(2.5));
        assert_ne!(JxValue::Int(2), JxValue::Text("2".into()));
    }

    #[test]
    fn json_round_trip() {
        let raw: serde_json::Value =
            serde_json::from_str(r#"{"a": [1, 2.5, "x", null, true]}"#).unwrap();
        let value = JxValue::from(raw.clone());
        assert_eq!(serde_json::Value::from(value), raw);
    }

    #[test]
    fn object_preserves_insertion_order() {
        let raw: serde_json::Value = serde_json::from_str(r#"{"z": 1, "a": 2}"#).unwrap();
        let value = JxValue::from(raw);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
