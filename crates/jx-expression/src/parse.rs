//! Parse JSON-encoded jx expressions into trees.
//!
//! An expression is a scalar literal, a list (tuple), or a map whose first
//! non-parameter key names an operator. Operators with a simple form accept
//! `{field: constant}` shorthand; everything else takes its operands
//! positionally. `eq` gets extra normalization: list right-hand sides
//! become `in`, multiple fields become an `and` of per-field tests.

use tracing::trace;

use crate::ast::{
    AggOp, ArithOp, CastKind, CmpOp, Expr, Literal, Op, SelectClause, SliceOp, WhenClause,
};
use crate::error::{ExprError, Result};
use crate::foundation::{DataType, JxValue, Schema, Variable};

/// Keys that carry named parameters rather than operators.
const PARAM_KEYS: &[&str] = &["default", "separator", "start", "then", "else"];

/// Parse a JSON value into an expression tree.
///
/// When a `schema` is supplied, each variable's data type is resolved from
/// the leaf columns under its path: zero matches means the null type (every
/// comparison definitely misses), exactly one match adopts the column's
/// type, and more than one stays generic.
pub fn parse(value: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    match value {
        JxValue::Null => Ok(Expr::NULL),
        JxValue::Bool(_) | JxValue::Int(_) | JxValue::Float(_) | JxValue::Text(_) => {
            Ok(Expr::Literal(Literal::from_value(value.clone())))
        }
        JxValue::Array(items) => {
            let terms = items
                .iter()
                .map(|item| parse(item, schema))
                .collect::<Result<Vec<_>>>()?;
            Ok(Expr::Tuple(terms))
        }
        JxValue::Object(_) => parse_operator(value, schema),
    }
}

/// Convenience wrapper accepting `serde_json::Value` directly.
pub fn parse_json(value: &serde_json::Value, schema: Option<&dyn Schema>) -> Result<Expr> {
    parse(&JxValue::from(value.clone()), schema)
}

fn parse_operator(value: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    let map = value.as_object().expect("caller checked for object");

    let (op_name, term) = map
        .iter()
        .find(|(key, _)| !PARAM_KEYS.contains(&key.as_str()))
        .ok_or_else(|| ExprError::invalid(value))?;

    let op = Op::from_name(op_name).ok_or_else(|| ExprError::UnknownOperator {
        name: op_name.clone(),
    })?;

    let param = |name: &str| -> Result<Expr> {
        match map.get(name) {
            Some(v) => parse(v, schema),
            None => Ok(Expr::NULL),
        }
    };

    let expr = match op {
        Op::Literal => Expr::Literal(Literal::from_value(term.clone())),
        // Dates are stored as their literal encoding; conversion to unix
        // time is the caller's concern.
        Op::Date => Expr::Literal(Literal::from_value(term.clone())),
        Op::Var => match term {
            JxValue::Text(name) => Expr::Variable(variable(name, schema)),
            other => return Err(ExprError::invalid(other)),
        },
        Op::Script => match term {
            JxValue::Text(source) => Expr::Script(source.clone()),
            other => return Err(ExprError::invalid(other)),
        },

        Op::And => Expr::And(parse_many(term, schema)?),
        Op::Or => Expr::Or(parse_many(term, schema)?),
        Op::Not => Expr::Not(Box::new(parse(term, schema)?)),

        Op::Eq => parse_eq(term, schema, false)?,
        Op::Ne => parse_eq(term, schema, true)?,

        Op::Gt => parse_cmp(CmpOp::Gt, term, schema)?,
        Op::Gte => parse_cmp(CmpOp::Gte, term, schema)?,
        Op::Lt => parse_cmp(CmpOp::Lt, term, schema)?,
        Op::Lte => parse_cmp(CmpOp::Lte, term, schema)?,

        Op::Add => parse_arith(ArithOp::Add, term, param("default")?, schema)?,
        Op::Sub => parse_arith(ArithOp::Sub, term, param("default")?, schema)?,
        Op::Mul => parse_arith(ArithOp::Mul, term, param("default")?, schema)?,
        Op::Div => parse_arith(ArithOp::Div, term, param("default")?, schema)?,
        Op::Mod => parse_arith(ArithOp::Mod, term, param("default")?, schema)?,
        Op::Exp => parse_arith(ArithOp::Exp, term, param("default")?, schema)?,

        Op::Floor => match term {
            JxValue::Array(items) if items.len() == 2 => Expr::Floor {
                term: Box::new(parse(&items[0], schema)?),
                modulo: Box::new(parse(&items[1], schema)?),
            },
            other => Expr::Floor {
                term: Box::new(parse(other, schema)?),
                modulo: Box::new(Expr::literal(1)),
            },
        },

        Op::When => Expr::When {
            when: Box::new(parse(term, schema)?),
            then: Box::new(param("then")?),
            els: Box::new(param("else")?),
        },
        Op::Case => parse_case(term, schema)?,
        Op::Coalesce => Expr::Coalesce(parse_many(term, schema)?),

        Op::Missing => Expr::Missing(Box::new(parse_var_or_expr(term, schema)?)),
        Op::Exists => Expr::Exists(Box::new(parse_var_or_expr(term, schema)?)),

        Op::In => parse_in(term, schema)?,
        Op::Between => parse_between(term, schema)?,

        Op::Prefix => {
            let (value, prefix) = parse_binary(op, term, schema)?;
            Expr::Prefix {
                value: Box::new(value),
                prefix: Box::new(prefix),
            }
        }
        Op::Suffix => {
            let (value, suffix) = parse_binary(op, term, schema)?;
            Expr::Suffix {
                value: Box::new(value),
                suffix: Box::new(suffix),
            }
        }

        Op::Concat => Expr::Concat {
            terms: parse_many(term, schema)?,
            separator: Box::new(param("separator")?),
        },
        Op::Split => {
            let (value, separator) = parse_binary(op, term, schema)?;
            Expr::Split {
                value: Box::new(value),
                separator: Box::new(separator),
            }
        }
        Op::Find => {
            let (value, find) = parse_binary(op, term, schema)?;
            Expr::Find {
                value: Box::new(value),
                find: Box::new(find),
                start: Box::new(param("start")?),
                default: Box::new(param("default")?),
            }
        }
        Op::Left => parse_slice(SliceOp::Left, term, schema)?,
        Op::Right => parse_slice(SliceOp::Right, term, schema)?,
        Op::NotLeft => parse_slice(SliceOp::NotLeft, term, schema)?,
        Op::NotRight => parse_slice(SliceOp::NotRight, term, schema)?,

        Op::Length => Expr::Length(Box::new(parse(term, schema)?)),
        Op::First => Expr::First(Box::new(parse(term, schema)?)),
        Op::Last => Expr::Last(Box::new(parse(term, schema)?)),

        Op::Tuple => Expr::Tuple(parse_many(term, schema)?),
        Op::Select => parse_select(term, schema)?,
        Op::Leaves => Expr::Leaves(Box::new(parse_var_or_expr(term, schema)?)),

        Op::ToBoolean => cast(CastKind::Boolean, term, schema)?,
        Op::ToInteger => cast(CastKind::Integer, term, schema)?,
        Op::ToNumber => cast(CastKind::Number, term, schema)?,
        Op::ToText => cast(CastKind::Text, term, schema)?,
        Op::IsBoolean => is_type(CastKind::Boolean, term, schema)?,
        Op::IsInteger => is_type(CastKind::Integer, term, schema)?,
        Op::IsNumber => is_type(CastKind::Number, term, schema)?,
        Op::IsText => is_type(CastKind::Text, term, schema)?,

        Op::Count => Expr::Agg {
            op: AggOp::Count,
            terms: parse_many(term, schema)?,
        },
        Op::Max => Expr::Agg {
            op: AggOp::Max,
            terms: parse_many(term, schema)?,
        },
        Op::Min => Expr::Agg {
            op: AggOp::Min,
            terms: parse_many(term, schema)?,
        },
        Op::Union => Expr::Agg {
            op: AggOp::Union,
            terms: parse_many(term, schema)?,
        },

        Op::RegExp => parse_regexp(term, schema)?,

        Op::BasicEq => {
            let (lhs, rhs) = parse_binary(op, term, schema)?;
            Expr::BasicEq {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }
        }
        Op::BasicStartsWith => {
            let (value, prefix) = parse_binary(op, term, schema)?;
            Expr::BasicStartsWith {
                value: Box::new(value),
                prefix: Box::new(prefix),
            }
        }
        Op::BasicIn => {
            let (value, superset) = parse_binary(op, term, schema)?;
            Expr::BasicIn {
                value: Box::new(value),
                superset: Box::new(superset),
            }
        }
    };

    Ok(expr)
}

/// Resolve a variable's type against the schema, when one is available.
fn variable(name: &str, schema: Option<&dyn Schema>) -> Variable {
    match schema {
        None => Variable::new(name),
        Some(s) => {
            let leaves = s.leaves(name);
            let typ = match leaves.len() {
                0 => DataType::Null,
                1 => leaves[0].jx_type,
                _ => DataType::Object,
            };
            Variable::with_type(name, typ)
        }
    }
}

/// `null` is the zero-argument application; a non-list term is a single
/// operand.
fn parse_many(term: &JxValue, schema: Option<&dyn Schema>) -> Result<Vec<Expr>> {
    match term {
        JxValue::Null => Ok(Vec::new()),
        JxValue::Array(items) => items.iter().map(|item| parse(item, schema)).collect(),
        single => Ok(vec![parse(single, schema)?]),
    }
}

/// A bare string names a variable in operand position for
/// `missing`/`exists`/`leaves`.
fn parse_var_or_expr(term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    match term {
        JxValue::Text(name) => Ok(Expr::Variable(variable(name, schema))),
        other => parse(other, schema),
    }
}

/// Binary operands: positional pair, or `{field: constant}` simple form.
fn parse_binary(op: Op, term: &JxValue, schema: Option<&dyn Schema>) -> Result<(Expr, Expr)> {
    match term {
        JxValue::Array(items) if items.len() == 2 => {
            Ok((parse(&items[0], schema)?, parse(&items[1], schema)?))
        }
        JxValue::Object(map) if op.has_simple_form() && map.len() == 1 => {
            let (field, constant) = map.iter().next().expect("len checked");
            Ok((
                Expr::Variable(variable(field, schema)),
                Expr::Literal(Literal::from_value(constant.clone())),
            ))
        }
        other => Err(ExprError::invalid(other)),
    }
}

fn parse_eq(term: &JxValue, schema: Option<&dyn Schema>, negated: bool) -> Result<Expr> {
    let expr = match term {
        JxValue::Object(map) => {
            let mut tests = Vec::with_capacity(map.len());
            for (field, constant) in map {
                let var = Expr::Variable(variable(field, schema));
                let test = match constant {
                    // List right-hand side means set membership.
                    JxValue::Array(_) => Expr::in_(
                        var,
                        Expr::Literal(Literal::from_value(constant.clone())),
                    ),
                    scalar => Expr::eq(var, Expr::Literal(Literal::from_value(scalar.clone()))),
                };
                tests.push(test);
            }
            trace!(fields = tests.len(), "normalized eq simple form");
            match tests.len() {
                1 => tests.into_iter().next().expect("len checked"),
                _ => Expr::And(tests),
            }
        }
        JxValue::Array(items) if items.len() == 2 => Expr::eq(
            parse(&items[0], schema)?,
            parse(&items[1], schema)?,
        ),
        other => return Err(ExprError::invalid(other)),
    };

    if negated {
        // `ne` is equality that also requires both sides to exist; keep the
        // dedicated node for the binary form, negate the normalized ones.
        Ok(match expr {
            Expr::Eq { lhs, rhs } => Expr::Ne { lhs, rhs },
            other => Expr::not(other),
        })
    } else {
        Ok(expr)
    }
}

fn parse_cmp(op: CmpOp, term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    let (lhs, rhs) = parse_binary(op.op(), term, schema)?;
    Ok(Expr::cmp(op, lhs, rhs))
}

fn parse_arith(
    op: ArithOp,
    term: &JxValue,
    default: Expr,
    schema: Option<&dyn Schema>,
) -> Result<Expr> {
    Ok(Expr::Arith {
        op,
        terms: parse_many(term, schema)?,
        default: Box::new(default),
    })
}

fn parse_case(term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    let items = match term {
        JxValue::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    let mut clauses = Vec::new();
    let mut els = Expr::NULL;
    for (i, item) in items.iter().enumerate() {
        let is_clause = item
            .as_object()
            .is_some_and(|map| map.contains_key("when") && map.contains_key("then"));
        if is_clause {
            let map = item.as_object().expect("checked");
            clauses.push(WhenClause {
                when: parse(&map["when"], schema)?,
                then: parse(&map["then"], schema)?,
            });
        } else if i + 1 == items.len() {
            els = parse(item, schema)?;
        } else {
            // Only the trailing element may be a bare else expression.
            return Err(ExprError::invalid(item));
        }
    }
    Ok(Expr::Case {
        clauses,
        els: Box::new(els),
    })
}

fn parse_in(term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    let (value, superset) = parse_binary(Op::In, term, schema)?;
    Ok(Expr::in_(value, superset))
}

fn parse_between(term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    match term {
        JxValue::Array(items) if items.len() == 3 => Ok(Expr::Between {
            value: Box::new(parse(&items[0], schema)?),
            low: Box::new(parse(&items[1], schema)?),
            high: Box::new(parse(&items[2], schema)?),
        }),
        JxValue::Object(map) if map.len() == 1 => {
            let (field, range) = map.iter().next().expect("len checked");
            let bounds = range
                .as_array()
                .filter(|a| a.len() == 2)
                .ok_or_else(|| ExprError::invalid(range))?;
            Ok(Expr::Between {
                value: Box::new(Expr::Variable(variable(field, schema))),
                low: Box::new(Expr::Literal(Literal::from_value(bounds[0].clone()))),
                high: Box::new(Expr::Literal(Literal::from_value(bounds[1].clone()))),
            })
        }
        other => Err(ExprError::invalid(other)),
    }
}

fn parse_slice(op: SliceOp, term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    let (value, length) = parse_binary(op.op(), term, schema)?;
    Ok(Expr::Slice {
        op,
        value: Box::new(value),
        length: Box::new(length),
    })
}

fn parse_select(term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    let items = match term {
        JxValue::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    let mut clauses = Vec::with_capacity(items.len());
    for item in items {
        match item {
            JxValue::Text(name) => clauses.push(SelectClause {
                name: name.clone(),
                value: Expr::Variable(variable(name, schema)),
            }),
            JxValue::Object(map) => {
                let name = map
                    .get("name")
                    .and_then(JxValue::as_str)
                    .ok_or_else(|| ExprError::invalid(item))?;
                let value = map
                    .get("value")
                    .ok_or_else(|| ExprError::invalid(item))?;
                clauses.push(SelectClause {
                    name: name.to_string(),
                    value: parse(value, schema)?,
                });
            }
            other => return Err(ExprError::invalid(other)),
        }
    }
    Ok(Expr::Select(clauses))
}

fn parse_regexp(term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    let (value, pattern) = parse_binary(Op::RegExp, term, schema)?;
    let pattern = match pattern {
        Expr::Literal(l) if l.as_str().is_some() => l,
        other => return Err(ExprError::invalid(other.to_json())),
    };
    Ok(Expr::RegExp {
        value: Box::new(value),
        pattern,
    })
}

fn cast(kind: CastKind, term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    Ok(Expr::Cast {
        kind,
        term: Box::new(parse(term, schema)?),
    })
}

fn is_type(kind: CastKind, term: &JxValue, schema: Option<&dyn Schema>) -> Result<Expr> {
    Ok(Expr::IsType {
        kind,
        term: Box::new(parse(term, schema)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::MemorySchema;
    use serde_json::json;

    fn p(value: serde_json::Value) -> Expr {
        parse_json(&value, None).expect("parse")
    }

    #[test]
    fn scalars_are_literals() {
        assert_eq!(p(json!(null)), Expr::NULL);
        assert_eq!(p(json!(true)), Expr::TRUE);
        assert_eq!(p(json!(3)), Expr::literal(3));
        assert_eq!(p(json!("x")), Expr::literal("x"));
    }

    #[test]
    fn sequence_is_tuple() {
        assert_eq!(
            p(json!([1, 2])),
            Expr::Tuple(vec![Expr::literal(1), Expr::literal(2)])
        );
    }

    #[test]
    fn unknown_operator_is_reported() {
        let err = parse_json(&json!({"frobnicate": 1}), None).unwrap_err();
        assert_eq!(
            err,
            ExprError::UnknownOperator {
                name: "frobnicate".into()
            }
        );
    }

    #[test]
    fn and_of_null_is_zero_argument() {
        assert_eq!(p(json!({"and": null})), Expr::And(vec![]));
    }

    #[test]
    fn eq_simple_form() {
        assert_eq!(
            p(json!({"eq": {"a": 1}})),
            Expr::eq(Expr::var("a"), Expr::literal(1))
        );
    }

    #[test]
    fn eq_list_rhs_becomes_in() {
        assert_eq!(
            p(json!({"eq": {"a": [1, 2]}})),
            Expr::in_(
                Expr::var("a"),
                Expr::literal(JxValue::Array(vec![JxValue::Int(1), JxValue::Int(2)]))
            )
        );
    }

    #[test]
    fn eq_multi_field_becomes_and() {
        let expr = p(json!({"eq": {"a": 1, "b": [2, 3]}}));
        let Expr::And(terms) = expr else {
            panic!("expected and, got {expr:?}")
        };
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0], Expr::eq(Expr::var("a"), Expr::literal(1)));
        assert!(matches!(terms[1], Expr::In { .. }));
    }

    #[test]
    fn when_with_named_parameters() {
        let expr = p(json!({"when": {"eq": {"a": 1}}, "then": 1, "else": 2}));
        let Expr::When { then, els, .. } = expr else {
            panic!("expected when")
        };
        assert_eq!(*then, Expr::literal(1));
        assert_eq!(*els, Expr::literal(2));
    }

    #[test]
    fn between_simple_form() {
        let expr = p(json!({"between": {"a": [1, 10]}}));
        let Expr::Between { value, low, high } = expr else {
            panic!("expected between")
        };
        assert_eq!(*value, Expr::var("a"));
        assert_eq!(*low, Expr::literal(1));
        assert_eq!(*high, Expr::literal(10));
    }

    #[test]
    fn missing_takes_bare_variable_name() {
        assert_eq!(
            p(json!({"missing": "a"})),
            Expr::Missing(Box::new(Expr::var("a")))
        );
    }

    #[test]
    fn concat_with_separator() {
        let expr = p(json!({"concat": [{"var": "a"}, {"var": "b"}], "separator": "-"}));
        let Expr::Concat { terms, separator } = expr else {
            panic!("expected concat")
        };
        assert_eq!(terms.len(), 2);
        assert_eq!(*separator, Expr::literal("-"));
    }

    #[test]
    fn case_with_trailing_else() {
        let expr = p(json!({"case": [
            {"when": {"eq": {"a": 1}}, "then": "one"},
            {"when": {"eq": {"a": 2}}, "then": "two"},
            "other"
        ]}));
        let Expr::Case { clauses, els } = expr else {
            panic!("expected case")
        };
        assert_eq!(clauses.len(), 2);
        assert_eq!(*els, Expr::literal("other"));
    }

    #[test]
    fn case_rejects_inner_bare_expression() {
        let result = parse_json(&json!({"case": ["other", {"when": true, "then": 1}]}), None);
        assert!(matches!(
            result,
            Err(ExprError::InvalidExpression { .. })
        ));
    }

    #[test]
    fn invalid_shape_carries_fragment() {
        let err = parse_json(&json!({"gt": 5}), None).unwrap_err();
        let ExprError::InvalidExpression { fragment } = err else {
            panic!("expected invalid expression")
        };
        assert!(fragment.contains('5'));
    }

    #[test]
    fn schema_resolves_variable_types() {
        let schema = MemorySchema::new().with_column("status", "status.~s~", DataType::Text);
        let expr = parse_json(&json!({"eq": {"status": "ok"}}), Some(&schema)).unwrap();
        let Expr::Eq { lhs, .. } = expr else {
            panic!("expected eq")
        };
        assert_eq!(lhs.datatype(), DataType::Text);

        let expr = parse_json(&json!({"missing": "nope"}), Some(&schema)).unwrap();
        let Expr::Missing(inner) = expr else {
            panic!("expected missing")
        };
        assert_eq!(inner.datatype(), DataType::Null);
    }
}
