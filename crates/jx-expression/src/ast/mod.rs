//! The expression tree.
//!
//! `Expr` is the intermediate representation shared by the parser, the
//! partial evaluator, and every backend. Trees own their children
//! exclusively and are never mutated after construction; rewrites build new
//! trees. Retargeting to a backend never touches the tree either — the
//! backend is passed alongside it — so fully constructed trees are safely
//! shareable across threads.

pub mod literal;
pub mod op;

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::foundation::{DataType, JxValue, Variable};

pub use literal::{Literal, FALSE, NULL, TRUE};
pub use op::Op;

/// Comparison operators sharing one node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    pub fn op(&self) -> Op {
        match self {
            CmpOp::Gt => Op::Gt,
            CmpOp::Gte => Op::Gte,
            CmpOp::Lt => Op::Lt,
            CmpOp::Lte => Op::Lte,
        }
    }

    /// Apply to an ordering of lhs relative to rhs.
    pub fn eval(&self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CmpOp::Gt => ord == Greater,
            CmpOp::Gte => ord != Less,
            CmpOp::Lt => ord == Less,
            CmpOp::Lte => ord != Greater,
        }
    }
}

/// Arithmetic operators sharing one node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
}

impl ArithOp {
    pub fn op(&self) -> Op {
        match self {
            ArithOp::Add => Op::Add,
            ArithOp::Sub => Op::Sub,
            ArithOp::Mul => Op::Mul,
            ArithOp::Div => Op::Div,
            ArithOp::Mod => Op::Mod,
            ArithOp::Exp => Op::Exp,
        }
    }

    /// Whether integer operands produce an integer result.
    pub fn closed_over_integers(&self) -> bool {
        !matches!(self, ArithOp::Div | ArithOp::Exp)
    }
}

/// String-slicing operators sharing one node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceOp {
    Left,
    Right,
    NotLeft,
    NotRight,
}

impl SliceOp {
    pub fn op(&self) -> Op {
        match self {
            SliceOp::Left => Op::Left,
            SliceOp::Right => Op::Right,
            SliceOp::NotLeft => Op::NotLeft,
            SliceOp::NotRight => Op::NotRight,
        }
    }
}

/// Target types for casts and `is_*` tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    Boolean,
    Integer,
    Number,
    Text,
}

impl CastKind {
    pub fn cast_op(&self) -> Op {
        match self {
            CastKind::Boolean => Op::ToBoolean,
            CastKind::Integer => Op::ToInteger,
            CastKind::Number => Op::ToNumber,
            CastKind::Text => Op::ToText,
        }
    }

    pub fn test_op(&self) -> Op {
        match self {
            CastKind::Boolean => Op::IsBoolean,
            CastKind::Integer => Op::IsInteger,
            CastKind::Number => Op::IsNumber,
            CastKind::Text => Op::IsText,
        }
    }

    pub fn datatype(&self) -> DataType {
        match self {
            CastKind::Boolean => DataType::Boolean,
            CastKind::Integer => DataType::Integer,
            CastKind::Number => DataType::Number,
            CastKind::Text => DataType::Text,
        }
    }
}

/// Aggregate markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggOp {
    Count,
    Max,
    Min,
    Union,
}

impl AggOp {
    pub fn op(&self) -> Op {
        match self {
            AggOp::Count => Op::Count,
            AggOp::Max => Op::Max,
            AggOp::Min => Op::Min,
            AggOp::Union => Op::Union,
        }
    }
}

/// One `when`/`then` arm of a `case`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub when: Expr,
    pub then: Expr,
}

/// One named clause of a `select`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub name: String,
    pub value: Expr,
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Variable(Variable),
    Literal(Literal),

    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),

    Eq { lhs: Box<Expr>, rhs: Box<Expr> },
    Ne { lhs: Box<Expr>, rhs: Box<Expr> },
    Cmp { op: CmpOp, lhs: Box<Expr>, rhs: Box<Expr> },

    /// Variadic arithmetic; `default` is the value when the computation is
    /// missing (divisor zero, operand missing). `NULL` when not given.
    Arith { op: ArithOp, terms: Vec<Expr>, default: Box<Expr> },
    /// Round `term` down to a multiple of `modulo`.
    Floor { term: Box<Expr>, modulo: Box<Expr> },

    When { when: Box<Expr>, then: Box<Expr>, els: Box<Expr> },
    Case { clauses: Vec<WhenClause>, els: Box<Expr> },
    Coalesce(Vec<Expr>),

    Missing(Box<Expr>),
    Exists(Box<Expr>),

    In { value: Box<Expr>, superset: Box<Expr> },
    Between { value: Box<Expr>, low: Box<Expr>, high: Box<Expr> },

    Prefix { value: Box<Expr>, prefix: Box<Expr> },
    Suffix { value: Box<Expr>, suffix: Box<Expr> },
    Concat { terms: Vec<Expr>, separator: Box<Expr> },
    Split { value: Box<Expr>, separator: Box<Expr> },
    Find { value: Box<Expr>, find: Box<Expr>, start: Box<Expr>, default: Box<Expr> },
    Slice { op: SliceOp, value: Box<Expr>, length: Box<Expr> },
    Length(Box<Expr>),
    First(Box<Expr>),
    Last(Box<Expr>),

    Tuple(Vec<Expr>),
    Select(Vec<SelectClause>),
    Leaves(Box<Expr>),

    Cast { kind: CastKind, term: Box<Expr> },
    IsType { kind: CastKind, term: Box<Expr> },

    Agg { op: AggOp, terms: Vec<Expr> },

    RegExp { value: Box<Expr>, pattern: Literal },
    Script(String),

    // Backend-only variants: null-handling already proven unnecessary.
    BasicEq { lhs: Box<Expr>, rhs: Box<Expr> },
    BasicStartsWith { value: Box<Expr>, prefix: Box<Expr> },
    BasicIn { value: Box<Expr>, superset: Box<Expr> },
}

impl Expr {
    /// The null literal expression.
    pub const NULL: Expr = Expr::Literal(literal::NULL);
    /// The true literal expression.
    pub const TRUE: Expr = Expr::Literal(literal::TRUE);
    /// The false literal expression.
    pub const FALSE: Expr = Expr::Literal(literal::FALSE);

    // === Constructors ===

    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Variable(Variable::new(name))
    }

    pub fn literal(value: impl Into<JxValue>) -> Expr {
        Expr::Literal(Literal::from_value(value.into()))
    }

    pub fn and(terms: Vec<Expr>) -> Expr {
        Expr::And(terms)
    }

    pub fn or(terms: Vec<Expr>) -> Expr {
        Expr::Or(terms)
    }

    pub fn not(term: Expr) -> Expr {
        Expr::Not(Box::new(term))
    }

    pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Eq {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn cmp(op: CmpOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Cmp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn arith(op: ArithOp, terms: Vec<Expr>) -> Expr {
        Expr::Arith {
            op,
            terms,
            default: Box::new(Expr::NULL),
        }
    }

    pub fn when(when: Expr, then: Expr, els: Expr) -> Expr {
        Expr::When {
            when: Box::new(when),
            then: Box::new(then),
            els: Box::new(els),
        }
    }

    pub fn in_(value: Expr, superset: Expr) -> Expr {
        Expr::In {
            value: Box::new(value),
            superset: Box::new(superset),
        }
    }

    pub fn prefix(value: Expr, prefix: Expr) -> Expr {
        Expr::Prefix {
            value: Box::new(value),
            prefix: Box::new(prefix),
        }
    }

    // === Inspection ===

    /// The operator-catalog kind of this node.
    pub fn op(&self) -> Op {
        match self {
            Expr::Variable(_) => Op::Var,
            Expr::Literal(_) => Op::Literal,
            Expr::And(_) => Op::And,
            Expr::Or(_) => Op::Or,
            Expr::Not(_) => Op::Not,
            Expr::Eq { .. } => Op::Eq,
            Expr::Ne { .. } => Op::Ne,
            Expr::Cmp { op, .. } => op.op(),
            Expr::Arith { op, .. } => op.op(),
            Expr::Floor { .. } => Op::Floor,
            Expr::When { .. } => Op::When,
            Expr::Case { .. } => Op::Case,
            Expr::Coalesce(_) => Op::Coalesce,
            Expr::Missing(_) => Op::Missing,
            Expr::Exists(_) => Op::Exists,
            Expr::In { .. } => Op::In,
            Expr::Between { .. } => Op::Between,
            Expr::Prefix { .. } => Op::Prefix,
            Expr::Suffix { .. } => Op::Suffix,
            Expr::Concat { .. } => Op::Concat,
            Expr::Split { .. } => Op::Split,
            Expr::Find { .. } => Op::Find,
            Expr::Slice { op, .. } => op.op(),
            Expr::Length(_) => Op::Length,
            Expr::First(_) => Op::First,
            Expr::Last(_) => Op::Last,
            Expr::Tuple(_) => Op::Tuple,
            Expr::Select(_) => Op::Select,
            Expr::Leaves(_) => Op::Leaves,
            Expr::Cast { kind, .. } => kind.cast_op(),
            Expr::IsType { kind, .. } => kind.test_op(),
            Expr::Agg { op, .. } => op.op(),
            Expr::RegExp { .. } => Op::RegExp,
            Expr::Script(_) => Op::Script,
            Expr::BasicEq { .. } => Op::BasicEq,
            Expr::BasicStartsWith { .. } => Op::BasicStartsWith,
            Expr::BasicIn { .. } => Op::BasicIn,
        }
    }

    /// The data type of this node's value.
    pub fn datatype(&self) -> DataType {
        match self {
            Expr::Variable(v) => v.datatype(),
            Expr::Literal(l) => l.datatype(),
            Expr::And(_)
            | Expr::Or(_)
            | Expr::Not(_)
            | Expr::Eq { .. }
            | Expr::Ne { .. }
            | Expr::Cmp { .. }
            | Expr::Missing(_)
            | Expr::Exists(_)
            | Expr::In { .. }
            | Expr::Between { .. }
            | Expr::Prefix { .. }
            | Expr::Suffix { .. }
            | Expr::IsType { .. }
            | Expr::RegExp { .. }
            | Expr::BasicEq { .. }
            | Expr::BasicStartsWith { .. }
            | Expr::BasicIn { .. } => DataType::Boolean,
            Expr::Arith { terms, .. } => {
                if terms.iter().all(|t| t.datatype() == DataType::Integer) {
                    DataType::Integer
                } else {
                    DataType::Number
                }
            }
            Expr::Floor { .. } => DataType::Number,
            Expr::When { then, els, .. } => {
                merge_types(then.datatype(), els.datatype())
            }
            Expr::Case { clauses, els } => {
                let mut ty = els.datatype();
                for clause in clauses {
                    ty = merge_types(ty, clause.then.datatype());
                }
                ty
            }
            Expr::Coalesce(terms) => {
                let mut ty = DataType::Null;
                for term in terms {
                    ty = merge_types(ty, term.datatype());
                }
                ty
            }
            Expr::Concat { .. } => DataType::Text,
            Expr::Split { .. } => DataType::Object,
            Expr::Find { .. } => DataType::Integer,
            Expr::Slice { .. } => DataType::Text,
            Expr::Length(_) => DataType::Integer,
            Expr::First(t) | Expr::Last(t) => t.datatype(),
            Expr::Tuple(_) | Expr::Select(_) | Expr::Leaves(_) => DataType::Object,
            Expr::Cast { kind, .. } => kind.datatype(),
            Expr::Agg { op, terms } => match op {
                AggOp::Count => DataType::Integer,
                AggOp::Max | AggOp::Min => DataType::Number,
                AggOp::Union => {
                    let _ = terms;
                    DataType::Object
                }
            },
            Expr::Script(_) => DataType::Object,
        }
    }

    /// Visit this node and all descendants, parents first.
    pub fn walk(&self, visit: &mut impl FnMut(&Expr)) {
        visit(self);
        self.for_each_child(&mut |child| child.walk(visit));
    }

    fn for_each_child(&self, each: &mut impl FnMut(&Expr)) {
        match self {
            Expr::Variable(_) | Expr::Literal(_) | Expr::Script(_) => {}
            Expr::And(terms)
            | Expr::Or(terms)
            | Expr::Tuple(terms)
            | Expr::Coalesce(terms) => terms.iter().for_each(each),
            Expr::Not(t)
            | Expr::Missing(t)
            | Expr::Exists(t)
            | Expr::Length(t)
            | Expr::First(t)
            | Expr::Last(t)
            | Expr::Leaves(t) => each(t),
            Expr::Eq { lhs, rhs }
            | Expr::Ne { lhs, rhs }
            | Expr::Cmp { lhs, rhs, .. }
            | Expr::BasicEq { lhs, rhs } => {
                each(lhs);
                each(rhs);
            }
            Expr::Arith { terms, default, .. } => {
                terms.iter().for_each(&mut *each);
                each(default);
            }
            Expr::Floor { term, modulo } => {
                each(term);
                each(modulo);
            }
            Expr::When { when, then, els } => {
                each(when);
                each(then);
                each(els);
            }
            Expr::Case { clauses, els } => {
                for clause in clauses {
                    each(&clause.when);
                    each(&clause.then);
                }
                each(els);
            }
            Expr::In { value, superset } | Expr::BasicIn { value, superset } => {
                each(value);
                each(superset);
            }
            Expr::Between { value, low, high } => {
                each(value);
                each(low);
                each(high);
            }
            Expr::Prefix { value, prefix } | Expr::BasicStartsWith { value, prefix } => {
                each(value);
                each(prefix);
            }
            Expr::Suffix { value, suffix } => {
                each(value);
                each(suffix);
            }
            Expr::Concat { terms, separator } => {
                terms.iter().for_each(&mut *each);
                each(separator);
            }
            Expr::Split { value, separator } => {
                each(value);
                each(separator);
            }
            Expr::Find {
                value,
                find,
                start,
                default,
            } => {
                each(value);
                each(find);
                each(start);
                each(default);
            }
            Expr::Slice { value, length, .. } => {
                each(value);
                each(length);
            }
            Expr::Select(clauses) => {
                for clause in clauses {
                    each(&clause.value);
                }
            }
            Expr::Cast { term, .. } | Expr::IsType { term, .. } => each(term),
            Expr::Agg { terms, .. } => terms.iter().for_each(each),
            Expr::RegExp { value, .. } => each(value),
        }
    }

    /// Collect the free variables of this expression.
    pub fn vars(&self) -> HashSet<Variable> {
        let mut out = HashSet::new();
        self.walk(&mut |node| {
            if let Expr::Variable(v) = node {
                out.insert(v.clone());
            }
        });
        out
    }

    /// True if this node is the given literal constant.
    pub fn is_literal(&self, lit: &Literal) -> bool {
        matches!(self, Expr::Literal(l) if l == lit)
    }

    /// The literal stored at this node, if any.
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Expr::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// The variable at this node, if any.
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Expr::Variable(v) => Some(v),
            _ => None,
        }
    }

    // === Canonical JSON serialization ===

    /// Serialize to the canonical jx JSON form.
    ///
    /// Parsing the result recovers an equal tree (after simplification,
    /// since simple forms are normalized away).
    pub fn to_json(&self) -> JxValue {
        match self {
            Expr::Variable(v) => wrap(Op::Var, JxValue::Text(v.name().to_string())),
            Expr::Literal(l) => match l.value() {
                v @ (JxValue::Array(_) | JxValue::Object(_)) => wrap(Op::Literal, v.clone()),
                scalar => scalar.clone(),
            },
            Expr::And(terms) => wrap(Op::And, array(terms)),
            Expr::Or(terms) => wrap(Op::Or, array(terms)),
            Expr::Not(t) => wrap(Op::Not, t.to_json()),
            Expr::Eq { lhs, rhs } => wrap(Op::Eq, pair(lhs, rhs)),
            Expr::Ne { lhs, rhs } => wrap(Op::Ne, pair(lhs, rhs)),
            Expr::Cmp { op, lhs, rhs } => wrap(op.op(), pair(lhs, rhs)),
            Expr::Arith { op, terms, default } => {
                let mut map = IndexMap::new();
                map.insert(op.op().name().to_string(), array(terms));
                if !default.is_literal(&NULL) {
                    map.insert("default".to_string(), default.to_json());
                }
                JxValue::Object(map)
            }
            Expr::Floor { term, modulo } => wrap(Op::Floor, pair(term, modulo)),
            Expr::When { when, then, els } => {
                let mut map = IndexMap::new();
                map.insert("when".to_string(), when.to_json());
                map.insert("then".to_string(), then.to_json());
                map.insert("else".to_string(), els.to_json());
                JxValue::Object(map)
            }
            Expr::Case { clauses, els } => {
                let mut items: Vec<JxValue> = clauses
                    .iter()
                    .map(|clause| {
                        let mut map = IndexMap::new();
                        map.insert("when".to_string(), clause.when.to_json());
                        map.insert("then".to_string(), clause.then.to_json());
                        JxValue::Object(map)
                    })
                    .collect();
                if !els.is_literal(&NULL) {
                    items.push(els.to_json());
                }
                wrap(Op::Case, JxValue::Array(items))
            }
            Expr::Coalesce(terms) => wrap(Op::Coalesce, array(terms)),
            Expr::Missing(t) => wrap(Op::Missing, var_or_expr(t)),
            Expr::Exists(t) => wrap(Op::Exists, var_or_expr(t)),
            Expr::In { value, superset } => wrap(Op::In, pair(value, superset)),
            Expr::Between { value, low, high } => wrap(
                Op::Between,
                JxValue::Array(vec![value.to_json(), low.to_json(), high.to_json()]),
            ),
            Expr::Prefix { value, prefix } => wrap(Op::Prefix, pair(value, prefix)),
            Expr::Suffix { value, suffix } => wrap(Op::Suffix, pair(value, suffix)),
            Expr::Concat { terms, separator } => {
                let mut map = IndexMap::new();
                map.insert(Op::Concat.name().to_string(), array(terms));
                if !separator.is_literal(&NULL) {
                    map.insert("separator".to_string(), separator.to_json());
                }
                JxValue::Object(map)
            }
            Expr::Split { value, separator } => wrap(Op::Split, pair(value, separator)),
            Expr::Find {
                value,
                find,
                start,
                default,
            } => {
                let mut map = IndexMap::new();
                map.insert(
                    Op::Find.name().to_string(),
                    JxValue::Array(vec![value.to_json(), find.to_json()]),
                );
                if !start.is_literal(&NULL) {
                    map.insert("start".to_string(), start.to_json());
                }
                if !default.is_literal(&NULL) {
                    map.insert("default".to_string(), default.to_json());
                }
                JxValue::Object(map)
            }
            Expr::Slice { op, value, length } => wrap(op.op(), pair(value, length)),
            Expr::Length(t) => wrap(Op::Length, t.to_json()),
            Expr::First(t) => wrap(Op::First, t.to_json()),
            Expr::Last(t) => wrap(Op::Last, t.to_json()),
            Expr::Tuple(terms) => wrap(Op::Tuple, array(terms)),
            Expr::Select(clauses) => wrap(
                Op::Select,
                JxValue::Array(
                    clauses
                        .iter()
                        .map(|clause| {
                            let mut map = IndexMap::new();
                            map.insert("name".to_string(), JxValue::Text(clause.name.clone()));
                            map.insert("value".to_string(), clause.value.to_json());
                            JxValue::Object(map)
                        })
                        .collect(),
                ),
            ),
            Expr::Leaves(t) => wrap(Op::Leaves, var_or_expr(t)),
            Expr::Cast { kind, term } => wrap(kind.cast_op(), term.to_json()),
            Expr::IsType { kind, term } => wrap(kind.test_op(), term.to_json()),
            Expr::Agg { op, terms } => wrap(op.op(), array(terms)),
            Expr::RegExp { value, pattern } => wrap(
                Op::RegExp,
                JxValue::Array(vec![value.to_json(), pattern.value().clone()]),
            ),
            Expr::Script(source) => wrap(Op::Script, JxValue::Text(source.clone())),
            Expr::BasicEq { lhs, rhs } => wrap(Op::BasicEq, pair(lhs, rhs)),
            Expr::BasicStartsWith { value, prefix } => {
                wrap(Op::BasicStartsWith, pair(value, prefix))
            }
            Expr::BasicIn { value, superset } => wrap(Op::BasicIn, pair(value, superset)),
        }
    }
}

fn merge_types(a: DataType, b: DataType) -> DataType {
    match (a, b) {
        (DataType::Null, other) | (other, DataType::Null) => other,
        (a, b) if a == b => a,
        (a, b) if a.is_numeric() && b.is_numeric() => DataType::Number,
        _ => DataType::Object,
    }
}

fn wrap(op: Op, term: JxValue) -> JxValue {
    let mut map = IndexMap::new();
    map.insert(op.name().to_string(), term);
    JxValue::Object(map)
}

fn array(terms: &[Expr]) -> JxValue {
    JxValue::Array(terms.iter().map(Expr::to_json).collect())
}

fn pair(a: &Expr, b: &Expr) -> JxValue {
    JxValue::Array(vec![a.to_json(), b.to_json()])
}

/// Missing/exists/leaves take a bare variable name in canonical form.
fn var_or_expr(expr: &Expr) -> JxValue {
    match expr {
        Expr::Variable(v) => JxValue::Text(v.name().to_string()),
        other => other.to_json(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_literals() {
        assert!(Expr::NULL.is_literal(&NULL));
        assert!(Expr::TRUE.is_literal(&TRUE));
        assert!(Expr::FALSE.is_literal(&FALSE));
    }

    #[test]
    fn vars_collects_by_path() {
        let expr = Expr::and(vec![
            Expr::eq(Expr::var("a"), Expr::literal(1)),
            Expr::eq(Expr::var("b.c"), Expr::var("a")),
        ]);
        let vars = expr.vars();
        assert_eq!(vars.len(), 2);
        assert!(vars.contains(&Variable::new("a")));
        assert!(vars.contains(&Variable::new("b.c")));
    }

    #[test]
    fn datatype_of_connectives_is_boolean() {
        let expr = Expr::or(vec![Expr::var("x"), Expr::FALSE]);
        assert_eq!(expr.datatype(), DataType::Boolean);
    }

    #[test]
    fn arith_type_follows_operands() {
        let ints = Expr::arith(ArithOp::Add, vec![Expr::literal(1), Expr::literal(2)]);
        assert_eq!(ints.datatype(), DataType::Integer);
        let mixed = Expr::arith(ArithOp::Add, vec![Expr::literal(1), Expr::literal(2.5)]);
        assert_eq!(mixed.datatype(), DataType::Number);
    }

    #[test]
    fn canonical_json_shapes() {
        let expr = Expr::eq(Expr::var("a"), Expr::literal(1));
        let json = serde_json::Value::from(expr.to_json());
        assert_eq!(json, serde_json::json!({"eq": [{"var": "a"}, 1]}));
    }
}
