//! The closed operator catalog.
//!
//! Operator identities are compile-time enum discriminants; the JSON names
//! used in the expression language map to them through [`Op::from_name`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every operator the expression language knows.
///
/// The `Basic*` variants are backend-only: they are synthesized by code
/// generators once null-handling has been proven unnecessary and never
/// appear in freshly parsed trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Literal,
    Date,
    Var,
    And,
    Or,
    Not,
    When,
    Case,
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Floor,
    In,
    Between,
    Prefix,
    Suffix,
    Concat,
    Split,
    Find,
    Left,
    Right,
    NotLeft,
    NotRight,
    Length,
    First,
    Last,
    Tuple,
    Select,
    Leaves,
    Coalesce,
    Missing,
    Exists,
    ToBoolean,
    ToInteger,
    ToNumber,
    ToText,
    IsBoolean,
    IsInteger,
    IsNumber,
    IsText,
    Count,
    Max,
    Min,
    Union,
    RegExp,
    Script,
    BasicEq,
    BasicStartsWith,
    BasicIn,
}

impl Op {
    /// The JSON operator name.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Literal => "literal",
            Op::Date => "date",
            Op::Var => "var",
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
            Op::When => "when",
            Op::Case => "case",
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Mod => "mod",
            Op::Exp => "exp",
            Op::Floor => "floor",
            Op::In => "in",
            Op::Between => "between",
            Op::Prefix => "prefix",
            Op::Suffix => "suffix",
            Op::Concat => "concat",
            Op::Split => "split",
            Op::Find => "find",
            Op::Left => "left",
            Op::Right => "right",
            Op::NotLeft => "not_left",
            Op::NotRight => "not_right",
            Op::Length => "length",
            Op::First => "first",
            Op::Last => "last",
            Op::Tuple => "tuple",
            Op::Select => "select",
            Op::Leaves => "leaves",
            Op::Coalesce => "coalesce",
            Op::Missing => "missing",
            Op::Exists => "exists",
            Op::ToBoolean => "boolean",
            Op::ToInteger => "integer",
            Op::ToNumber => "number",
            Op::ToText => "string",
            Op::IsBoolean => "is_boolean",
            Op::IsInteger => "is_integer",
            Op::IsNumber => "is_number",
            Op::IsText => "is_string",
            Op::Count => "count",
            Op::Max => "max",
            Op::Min => "min",
            Op::Union => "union",
            Op::RegExp => "regexp",
            Op::Script => "script",
            Op::BasicEq => "basic.eq",
            Op::BasicStartsWith => "basic.startsWith",
            Op::BasicIn => "basic.in",
        }
    }

    /// Look an operator up by its JSON name.
    pub fn from_name(name: &str) -> Option<Op> {
        let op = match name {
            "literal" => Op::Literal,
            "date" => Op::Date,
            "var" => Op::Var,
            "and" => Op::And,
            "or" => Op::Or,
            "not" => Op::Not,
            "when" => Op::When,
            "case" => Op::Case,
            "eq" => Op::Eq,
            "ne" => Op::Ne,
            "gt" => Op::Gt,
            "gte" => Op::Gte,
            "lt" => Op::Lt,
            "lte" => Op::Lte,
            "add" | "sum" => Op::Add,
            "sub" | "subtract" | "minus" => Op::Sub,
            "mul" | "mult" | "multiply" => Op::Mul,
            "div" | "divide" => Op::Div,
            "mod" => Op::Mod,
            "exp" => Op::Exp,
            "floor" => Op::Floor,
            "in" => Op::In,
            "between" => Op::Between,
            "prefix" => Op::Prefix,
            "suffix" => Op::Suffix,
            "concat" => Op::Concat,
            "split" => Op::Split,
            "find" => Op::Find,
            "left" => Op::Left,
            "right" => Op::Right,
            "not_left" => Op::NotLeft,
            "not_right" => Op::NotRight,
            "length" => Op::Length,
            "first" => Op::First,
            "last" => Op::Last,
            "tuple" => Op::Tuple,
            "select" => Op::Select,
            "leaves" => Op::Leaves,
            "coalesce" => Op::Coalesce,
            "missing" => Op::Missing,
            "exists" => Op::Exists,
            "boolean" => Op::ToBoolean,
            "integer" => Op::ToInteger,
            "number" => Op::ToNumber,
            "string" => Op::ToText,
            "is_boolean" => Op::IsBoolean,
            "is_integer" => Op::IsInteger,
            "is_number" => Op::IsNumber,
            "is_string" => Op::IsText,
            "count" => Op::Count,
            "max" | "maximum" => Op::Max,
            "min" | "minimum" => Op::Min,
            "union" => Op::Union,
            "regexp" | "regex" => Op::RegExp,
            "script" => Op::Script,
            "basic.eq" => Op::BasicEq,
            "basic.startsWith" => Op::BasicStartsWith,
            "basic.in" => Op::BasicIn,
            _ => return None,
        };
        Some(op)
    }

    /// Operators accepting the `{field: value}` shorthand term.
    pub fn has_simple_form(&self) -> bool {
        matches!(
            self,
            Op::Eq
                | Op::Ne
                | Op::Gt
                | Op::Gte
                | Op::Lt
                | Op::Lte
                | Op::In
                | Op::Between
                | Op::Prefix
                | Op::Suffix
                | Op::Left
                | Op::Right
                | Op::NotLeft
                | Op::NotRight
                | Op::Find
                | Op::RegExp
        )
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for op in [
            Op::And,
            Op::Eq,
            Op::NotLeft,
            Op::ToText,
            Op::IsText,
            Op::Union,
            Op::BasicStartsWith,
        ] {
            assert_eq!(Op::from_name(op.name()), Some(op));
        }
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(Op::from_name("frobnicate"), None);
    }

    #[test]
    fn simple_form_operators() {
        assert!(Op::Eq.has_simple_form());
        assert!(Op::Between.has_simple_form());
        assert!(!Op::And.has_simple_form());
        assert!(!Op::Coalesce.has_simple_form());
    }
}
