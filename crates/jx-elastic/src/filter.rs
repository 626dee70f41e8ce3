//! Elasticsearch Query DSL filter generation.
//!
//! Predicates over single columns map onto native filters (`term`,
//! `terms`, `range`, `prefix`, `regexp`, `exists`); boolean connectives
//! map onto `bool` combinators. Anything without a native filter falls
//! back to a `script` filter embedding the Painless rendering, so the
//! result is always a complete executable query.
//!
//! A variable that resolves to no storage column matches nothing rather
//! than failing: filters over unknown fields are a routine consequence of
//! heterogeneous indexes.

use serde_json::{json, Value};
use tracing::trace;

use jx_expression::ast::CmpOp;
use jx_expression::{
    Column, DataType, Expr, ExprError, JxValue, Language, Result, Schema, Variable,
};

use crate::painless::painless;

/// The filter matching every document.
pub fn match_all() -> Value {
    json!({"match_all": {}})
}

/// The filter matching no document.
pub fn match_none() -> Value {
    json!({"bool": {"must_not": {"match_all": {}}}})
}

/// Render an expression as an Elasticsearch filter.
pub fn es_filter(expr: &Expr, schema: &dyn Schema) -> Result<Value> {
    match expr {
        Expr::Literal(l) => {
            if l == &jx_expression::ast::TRUE {
                Ok(match_all())
            } else {
                // `false` and `null` conditions match nothing.
                Ok(match_none())
            }
        }

        Expr::And(terms) => {
            let must = terms
                .iter()
                .map(|t| es_filter(t, schema))
                .collect::<Result<Vec<_>>>()?;
            Ok(json!({"bool": {"must": must}}))
        }
        Expr::Or(terms) => {
            let should = terms
                .iter()
                .map(|t| es_filter(t, schema))
                .collect::<Result<Vec<_>>>()?;
            Ok(json!({"bool": {"should": should}}))
        }
        Expr::Not(t) => Ok(json!({"bool": {"must_not": es_filter(t, schema)?}})),

        Expr::Eq { lhs, rhs } => match (column_of(lhs, schema), rhs.as_literal()) {
            (Resolved::Column(c), Some(l)) if !l.is_null() => {
                Ok(json!({"term": {c.name: Value::from(l.value().clone())}}))
            }
            // Equal to nothing means the field has no value.
            (Resolved::Column(c), Some(l)) if l.is_null() => {
                Ok(json!({"bool": {"must_not": {"exists": {"field": c.name}}}}))
            }
            (Resolved::NoColumn, Some(l)) => {
                // Unknown fields hold no value: only a null test matches.
                if l.is_null() {
                    Ok(match_all())
                } else {
                    Ok(match_none())
                }
            }
            _ => script_filter(expr, schema),
        },
        Expr::Ne { lhs, rhs } => match (column_of(lhs, schema), rhs.as_literal()) {
            (Resolved::Column(c), Some(l)) if !l.is_null() => Ok(json!({"bool": {
                "must": {"exists": {"field": c.name}},
                "must_not": {"term": {c.name: Value::from(l.value().clone())}}
            }})),
            (Resolved::NoColumn, Some(_)) => Ok(match_none()),
            _ => script_filter(expr, schema),
        },

        Expr::In { value, superset } => match (column_of(value, schema), superset.as_literal())
        {
            (Resolved::Column(c), Some(l)) => match l.value() {
                JxValue::Array(items) => {
                    let values: Vec<Value> =
                        items.iter().map(|v| Value::from(v.clone())).collect();
                    Ok(json!({"terms": {c.name: values}}))
                }
                _ => script_filter(expr, schema),
            },
            (Resolved::NoColumn, Some(_)) => Ok(match_none()),
            _ => script_filter(expr, schema),
        },

        Expr::Cmp { op, lhs, rhs } => match (column_of(lhs, schema), rhs.as_literal()) {
            (Resolved::Column(c), Some(l)) if !l.is_null() => {
                let bound = match op {
                    CmpOp::Gt => "gt",
                    CmpOp::Gte => "gte",
                    CmpOp::Lt => "lt",
                    CmpOp::Lte => "lte",
                };
                Ok(json!({"range": {c.name: {bound: Value::from(l.value().clone())}}}))
            }
            (Resolved::NoColumn, Some(_)) => Ok(match_none()),
            _ => script_filter(expr, schema),
        },
        Expr::Between { value, low, high } => {
            match (column_of(value, schema), low.as_literal(), high.as_literal()) {
                (Resolved::Column(c), Some(lo), Some(hi)) if !lo.is_null() && !hi.is_null() => {
                    Ok(json!({"range": {c.name: {
                        "gte": Value::from(lo.value().clone()),
                        "lte": Value::from(hi.value().clone())
                    }}}))
                }
                (Resolved::NoColumn, Some(_), Some(_)) => Ok(match_none()),
                _ => script_filter(expr, schema),
            }
        }

        Expr::Prefix { value, prefix } => match (column_of(value, schema), prefix.as_literal())
        {
            (Resolved::Column(c), Some(p)) if p.as_str().is_some() => {
                Ok(json!({"prefix": {c.name: p.as_str().map(str::to_string)}}))
            }
            (Resolved::NoColumn, Some(_)) => Ok(match_none()),
            _ => script_filter(expr, schema),
        },
        Expr::RegExp { value, pattern } => match column_of(value, schema) {
            Resolved::Column(c) => {
                Ok(json!({"regexp": {c.name: pattern.as_str().map(str::to_string)}}))
            }
            Resolved::NoColumn => Ok(match_none()),
            Resolved::Other => Err(ExprError::unsupported(expr.op(), Language::Es52)),
        },

        // Existence tests keep their meaning for unknown fields.
        Expr::Missing(t) => match column_of(t, schema) {
            Resolved::Column(c) => {
                Ok(json!({"bool": {"must_not": {"exists": {"field": c.name}}}}))
            }
            Resolved::NoColumn => Ok(match_all()),
            Resolved::Other => script_filter(expr, schema),
        },
        Expr::Exists(t) => match column_of(t, schema) {
            Resolved::Column(c) => Ok(json!({"exists": {"field": c.name}})),
            Resolved::NoColumn => Ok(match_none()),
            Resolved::Other => script_filter(expr, schema),
        },

        // Shape-producing operators are not filters.
        Expr::Tuple(_) | Expr::Select(_) | Expr::Leaves(_) | Expr::Agg { .. } => {
            Err(ExprError::unsupported(expr.op(), Language::Es52))
        }

        _ => script_filter(expr, schema),
    }
}

/// How a filter operand resolved against the schema.
enum Resolved {
    Column(Column),
    NoColumn,
    Other,
}

fn column_of(expr: &Expr, schema: &dyn Schema) -> Resolved {
    let Some(v) = expr.as_variable() else {
        return Resolved::Other;
    };
    match single_column(v, schema) {
        Some(c) => Resolved::Column(c),
        None => {
            let any = !schema.leaves(v.name()).is_empty();
            if any {
                Resolved::Other
            } else {
                Resolved::NoColumn
            }
        }
    }
}

fn single_column(v: &Variable, schema: &dyn Schema) -> Option<Column> {
    let columns = schema.values(v.name(), &[DataType::Object, DataType::Nested]);
    match columns.len() {
        1 => columns.into_iter().next(),
        _ => None,
    }
}

/// Fall back to a `script` filter embedding the Painless rendering.
fn script_filter(expr: &Expr, schema: &dyn Schema) -> Result<Value> {
    let script = painless(expr, schema)?;
    trace!(source = %script.expr, "expression fell back to a script filter");
    Ok(json!({"script": {"script": {
        "lang": "painless",
        "source": script.as_bool()
    }}}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jx_expression::{parse_json, MemorySchema};

    fn schema() -> MemorySchema {
        MemorySchema::new()
            .with_column("status", "status.~s~", DataType::Text)
            .with_column("bytes", "bytes.~n~", DataType::Number)
    }

    fn filter(value: serde_json::Value) -> Value {
        let schema = schema();
        let expr = parse_json(&value, Some(&schema)).expect("parse");
        es_filter(&expr, &schema).expect("es_filter")
    }

    #[test]
    fn eq_renders_a_term_filter() {
        assert_eq!(
            filter(json!({"eq": {"status": "ok"}})),
            json!({"term": {"status.~s~": "ok"}})
        );
    }

    #[test]
    fn list_membership_renders_terms() {
        assert_eq!(
            filter(json!({"in": [{"var": "status"}, {"literal": ["a", "b"]}]})),
            json!({"terms": {"status.~s~": ["a", "b"]}})
        );
    }

    #[test]
    fn comparisons_render_ranges() {
        assert_eq!(
            filter(json!({"gt": {"bytes": 100}})),
            json!({"range": {"bytes.~n~": {"gt": 100}}})
        );
        assert_eq!(
            filter(json!({"between": {"bytes": [1, 10]}})),
            json!({"range": {"bytes.~n~": {"gte": 1, "lte": 10}}})
        );
    }

    #[test]
    fn connectives_render_bool_combinators() {
        let f = filter(json!({"and": [{"eq": {"status": "ok"}}, {"gt": {"bytes": 1}}]}));
        assert_eq!(f["bool"]["must"].as_array().map(Vec::len), Some(2));

        let f = filter(json!({"not": {"eq": {"status": "ok"}}}));
        assert_eq!(
            f,
            json!({"bool": {"must_not": {"term": {"status.~s~": "ok"}}}})
        );
    }

    #[test]
    fn unknown_fields_match_nothing_not_error() {
        assert_eq!(filter(json!({"eq": {"nope": 1}})), match_none());
        assert_eq!(filter(json!({"missing": "nope"})), match_all());
        assert_eq!(filter(json!({"exists": "nope"})), match_none());
    }

    #[test]
    fn existence_tests_render_exists() {
        assert_eq!(
            filter(json!({"exists": "status"})),
            json!({"exists": {"field": "status.~s~"}})
        );
        assert_eq!(
            filter(json!({"missing": "status"})),
            json!({"bool": {"must_not": {"exists": {"field": "status.~s~"}}}})
        );
    }

    #[test]
    fn unfiltered_operators_fall_back_to_script() {
        let f = filter(json!({"eq": [
            {"length": {"var": "status"}},
            2
        ]}));
        assert_eq!(f["script"]["script"]["lang"], "painless");
        let source = f["script"]["script"]["source"].as_str().expect("source");
        assert!(source.contains("length()"), "got {source}");
    }

    #[test]
    fn shape_operators_are_unsupported() {
        let schema = schema();
        let expr = parse_json(&json!({"union": [{"var": "status"}]}), Some(&schema)).unwrap();
        let err = es_filter(&expr, &schema).unwrap_err();
        assert_eq!(err.to_string(), "operator union not supported on es52");
    }
}
