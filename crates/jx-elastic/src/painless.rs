//! Painless script generation.
//!
//! Every node renders to an [`EsScript`]: the expression text plus a
//! parallel missing-test and a static type tag. Keeping the missing test
//! as text lets three-valued logic collapse at script-build time when the
//! answer is static (`Never`/`Always`) and fall back to a runtime test
//! only when a document field is involved.
//!
//! Doc values are read as `doc["field"].value` with `doc["field"].empty`
//! as the missing test.

use jx_expression::ast::{ArithOp, CastKind, CmpOp, SliceOp};
use jx_expression::{DataType, Expr, ExprError, JxValue, Language, Literal, Result, Schema, Variable};

/// When a Painless expression has no value.
#[derive(Debug, Clone, PartialEq)]
pub enum MissScript {
    /// Statically known to always have a value.
    Never,
    /// Statically known to never have a value.
    Always,
    /// Runtime boolean expression text.
    Test(String),
}

impl MissScript {
    /// The missing test as a boolean expression.
    pub fn as_expr(&self) -> String {
        match self {
            MissScript::Never => "false".to_string(),
            MissScript::Always => "true".to_string(),
            MissScript::Test(t) => t.clone(),
        }
    }

    fn or(self, other: MissScript) -> MissScript {
        match (self, other) {
            (MissScript::Always, _) | (_, MissScript::Always) => MissScript::Always,
            (MissScript::Never, m) | (m, MissScript::Never) => m,
            (MissScript::Test(a), MissScript::Test(b)) => {
                MissScript::Test(format!("({a} || {b})"))
            }
        }
    }

    fn and(self, other: MissScript) -> MissScript {
        match (self, other) {
            (MissScript::Never, _) | (_, MissScript::Never) => MissScript::Never,
            (MissScript::Always, m) | (m, MissScript::Always) => m,
            (MissScript::Test(a), MissScript::Test(b)) => {
                MissScript::Test(format!("({a} && {b})"))
            }
        }
    }
}

/// A rendered Painless expression.
#[derive(Debug, Clone, PartialEq)]
pub struct EsScript {
    /// Static type of the expression's value.
    pub typ: DataType,
    /// Painless expression text.
    pub expr: String,
    /// When the expression has no value.
    pub miss: MissScript,
    /// Whether the expression can produce more than one value.
    pub many: bool,
}

impl EsScript {
    fn null() -> Self {
        EsScript {
            typ: DataType::Null,
            expr: "null".to_string(),
            miss: MissScript::Always,
            many: false,
        }
    }

    fn value(typ: DataType, expr: impl Into<String>) -> Self {
        EsScript {
            typ,
            expr: expr.into(),
            miss: MissScript::Never,
            many: false,
        }
    }

    fn boolean(expr: impl Into<String>) -> Self {
        Self::value(DataType::Boolean, expr)
    }

    /// As a boolean condition: a missing value does not hold.
    pub fn as_bool(&self) -> String {
        match &self.miss {
            MissScript::Never => self.expr.clone(),
            MissScript::Always => "false".to_string(),
            MissScript::Test(m) => format!("(!({m}) && ({}))", self.expr),
        }
    }

    /// As a value, rendering `null` when missing.
    fn as_value(&self) -> String {
        match &self.miss {
            MissScript::Never => self.expr.clone(),
            MissScript::Always => "null".to_string(),
            MissScript::Test(m) => format!("(({m}) ? null : ({}))", self.expr),
        }
    }

    /// Coerced to text, booleans rendering as `"T"`/`"F"`.
    fn as_text(&self) -> String {
        match self.typ {
            DataType::Text => self.expr.clone(),
            DataType::Boolean => format!("(({}) ? \"T\" : \"F\")", self.expr),
            _ => format!("String.valueOf({})", self.expr),
        }
    }
}

/// Painless double-quoted string literal.
fn quoted(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Render an expression to Painless.
pub fn painless(expr: &Expr, schema: &dyn Schema) -> Result<EsScript> {
    match expr {
        Expr::Literal(l) => Ok(literal_script(l)),
        Expr::Variable(v) => Ok(variable_script(v, schema)),

        Expr::And(terms) => {
            let parts = terms
                .iter()
                .map(|t| Ok(painless(t, schema)?.as_bool()))
                .collect::<Result<Vec<_>>>()?;
            Ok(EsScript::boolean(if parts.is_empty() {
                "true".to_string()
            } else {
                format!("({})", parts.join(" && "))
            }))
        }
        Expr::Or(terms) => {
            let parts = terms
                .iter()
                .map(|t| Ok(painless(t, schema)?.as_bool()))
                .collect::<Result<Vec<_>>>()?;
            Ok(EsScript::boolean(if parts.is_empty() {
                "false".to_string()
            } else {
                format!("({})", parts.join(" || "))
            }))
        }
        Expr::Not(t) => {
            let inner = painless(t, schema)?;
            Ok(EsScript::boolean(format!("!({})", inner.as_bool())))
        }

        Expr::Eq { lhs, rhs } => {
            // Both missing is a match; exactly one missing is not.
            let l = painless(lhs, schema)?;
            let r = painless(rhs, schema)?;
            let lm = l.miss.as_expr();
            let rm = r.miss.as_expr();
            Ok(EsScript::boolean(format!(
                "((({lm}) && ({rm})) || (!({lm}) && !({rm}) && ({} == {})))",
                l.expr, r.expr
            )))
        }
        Expr::Ne { lhs, rhs } => {
            let l = painless(lhs, schema)?;
            let r = painless(rhs, schema)?;
            let lm = l.miss.as_expr();
            let rm = r.miss.as_expr();
            Ok(EsScript::boolean(format!(
                "(!({lm}) && !({rm}) && ({} != {}))",
                l.expr, r.expr
            )))
        }
        Expr::BasicEq { lhs, rhs } => {
            let l = painless(lhs, schema)?;
            let r = painless(rhs, schema)?;
            Ok(EsScript::boolean(format!("({} == {})", l.expr, r.expr)))
        }

        Expr::Cmp { op, lhs, rhs } => {
            let l = painless(lhs, schema)?;
            let r = painless(rhs, schema)?;
            let symbol = match op {
                CmpOp::Gt => ">",
                CmpOp::Gte => ">=",
                CmpOp::Lt => "<",
                CmpOp::Lte => "<=",
            };
            let lm = l.miss.as_expr();
            let rm = r.miss.as_expr();
            Ok(EsScript::boolean(format!(
                "(!({lm}) && !({rm}) && ({} {symbol} {}))",
                l.expr, r.expr
            )))
        }
        Expr::Between { value, low, high } => {
            let v = painless(value, schema)?;
            let lo = painless(low, schema)?;
            let hi = painless(high, schema)?;
            let guard = v.miss.clone().or(lo.miss.clone()).or(hi.miss.clone());
            Ok(EsScript::boolean(format!(
                "(!({}) && ({} <= {}) && ({} <= {}))",
                guard.as_expr(),
                lo.expr,
                v.expr,
                v.expr,
                hi.expr
            )))
        }

        Expr::Arith { op, terms, default } => arith_script(*op, terms, default, schema),
        Expr::Floor { term, modulo } => {
            let t = painless(term, schema)?;
            let m = painless(modulo, schema)?;
            let miss = t.miss.clone().or(m.miss.clone());
            Ok(EsScript {
                typ: DataType::Number,
                expr: format!("(Math.floor(({}) / ({})) * ({}))", t.expr, m.expr, m.expr),
                miss,
                many: false,
            })
        }

        Expr::When { when, then, els } => {
            let cond = painless(when, schema)?.as_bool();
            let t = painless(then, schema)?;
            let e = painless(els, schema)?;
            let miss = match (&t.miss, &e.miss) {
                (MissScript::Never, MissScript::Never) => MissScript::Never,
                (MissScript::Always, MissScript::Always) => MissScript::Always,
                (tm, em) => MissScript::Test(format!(
                    "(({cond}) ? ({}) : ({}))",
                    tm.as_expr(),
                    em.as_expr()
                )),
            };
            Ok(EsScript {
                typ: merge_types(t.typ, e.typ),
                expr: format!("(({cond}) ? ({}) : ({}))", t.as_value(), e.as_value()),
                miss,
                many: t.many || e.many,
            })
        }
        Expr::Case { clauses, els } => {
            // Nested ternaries, innermost-else outward.
            let mut folded = (**els).clone();
            for clause in clauses.iter().rev() {
                folded = Expr::when(clause.when.clone(), clause.then.clone(), folded);
            }
            painless(&folded, schema)
        }
        Expr::Coalesce(terms) => {
            let mut script = EsScript::null();
            for term in terms.iter().rev() {
                let t = painless(term, schema)?;
                script = match &t.miss {
                    MissScript::Never => t,
                    MissScript::Always => script,
                    MissScript::Test(m) => EsScript {
                        typ: merge_types(t.typ, script.typ),
                        expr: format!("(({m}) ? ({}) : ({}))", script.as_value(), t.expr),
                        miss: t.miss.clone().and(script.miss),
                        many: t.many || script.many,
                    },
                };
            }
            Ok(script)
        }

        Expr::Missing(t) => {
            let inner = painless(t, schema)?;
            Ok(EsScript::boolean(inner.miss.as_expr()))
        }
        Expr::Exists(t) => {
            let inner = painless(t, schema)?;
            Ok(EsScript::boolean(format!("!({})", inner.miss.as_expr())))
        }

        Expr::In { value, superset } => {
            let v = painless(value, schema)?;
            let s = list_script(superset, schema)?;
            Ok(EsScript::boolean(format!(
                "(!({}) && ({}).contains({}))",
                v.miss.as_expr(),
                s,
                v.expr
            )))
        }
        Expr::BasicIn { value, superset } => {
            let v = painless(value, schema)?;
            let s = list_script(superset, schema)?;
            Ok(EsScript::boolean(format!("({}).contains({})", s, v.expr)))
        }

        Expr::Prefix { value, prefix } => {
            let v = painless(value, schema)?;
            let p = painless(prefix, schema)?;
            let guard = v.miss.clone().or(p.miss.clone());
            Ok(EsScript::boolean(format!(
                "(!({}) && ({}).startsWith({}))",
                guard.as_expr(),
                v.expr,
                p.expr
            )))
        }
        Expr::BasicStartsWith { value, prefix } => {
            let v = painless(value, schema)?;
            let p = painless(prefix, schema)?;
            Ok(EsScript::boolean(format!(
                "({}).startsWith({})",
                v.expr, p.expr
            )))
        }
        Expr::Suffix { value, suffix } => {
            let v = painless(value, schema)?;
            let s = painless(suffix, schema)?;
            let guard = v.miss.clone().or(s.miss.clone());
            Ok(EsScript::boolean(format!(
                "(!({}) && ({}).endsWith({}))",
                guard.as_expr(),
                v.expr,
                s.expr
            )))
        }

        Expr::Concat { terms, separator } => {
            let sep = match separator.as_literal() {
                Some(l) if l.is_null() => String::new(),
                Some(l) => l.as_str().map(str::to_string).unwrap_or_default(),
                None => {
                    return Err(ExprError::invalid(separator.to_json()));
                }
            };
            let mut parts = Vec::with_capacity(terms.len());
            for (i, term) in terms.iter().enumerate() {
                let t = painless(term, schema)?;
                let text = t.as_text();
                let piece = match (&t.miss, i) {
                    (MissScript::Always, _) => continue,
                    (MissScript::Never, 0) => text,
                    (MissScript::Never, _) => format!("{} + {text}", quoted(&sep)),
                    (MissScript::Test(m), 0) => format!("(({m}) ? \"\" : ({text}))"),
                    (MissScript::Test(m), _) => {
                        format!("(({m}) ? \"\" : ({} + {text}))", quoted(&sep))
                    }
                };
                parts.push(piece);
            }
            if parts.is_empty() {
                return Ok(EsScript::null());
            }
            Ok(EsScript::value(DataType::Text, format!("({})", parts.join(" + "))))
        }

        Expr::Find {
            value,
            find,
            start,
            default,
        } => {
            let v = painless(value, schema)?;
            let f = painless(find, schema)?;
            let s = painless(start, schema)?;
            let d = painless(default, schema)?;
            let from = match s.miss {
                MissScript::Never => s.expr,
                _ => "0".to_string(),
            };
            let guard = v.miss.clone().or(f.miss.clone());
            let index = format!("({}).indexOf({}, {from})", v.expr, f.expr);
            Ok(EsScript {
                typ: DataType::Integer,
                expr: format!(
                    "((({}) || {index} == -1) ? ({}) : {index})",
                    guard.as_expr(),
                    d.as_value()
                ),
                miss: match &d.miss {
                    MissScript::Never => MissScript::Never,
                    _ => MissScript::Test(format!(
                        "((({}) || {index} == -1) && ({}))",
                        guard.as_expr(),
                        d.miss.as_expr()
                    )),
                },
                many: false,
            })
        }
        Expr::Slice { op, value, length } => {
            let v = painless(value, schema)?;
            let n = painless(length, schema)?;
            let miss = v.miss.clone().or(n.miss.clone());
            let len = format!("({}).length()", v.expr);
            let count = format!("(int)Math.min(Math.max({}, 0), {len})", n.expr);
            let expr = match op {
                SliceOp::Left => format!("({}).substring(0, {count})", v.expr),
                SliceOp::NotLeft => format!("({}).substring({count})", v.expr),
                SliceOp::Right => format!("({}).substring({len} - {count})", v.expr),
                SliceOp::NotRight => format!("({}).substring(0, {len} - {count})", v.expr),
            };
            Ok(EsScript {
                typ: DataType::Text,
                expr,
                miss,
                many: false,
            })
        }
        Expr::Length(t) => {
            let inner = painless(t, schema)?;
            Ok(EsScript {
                typ: DataType::Integer,
                expr: format!("({}).length()", inner.expr),
                miss: inner.miss,
                many: false,
            })
        }
        Expr::First(t) => {
            let inner = painless(t, schema)?;
            Ok(EsScript {
                many: false,
                ..inner
            })
        }

        Expr::Cast { kind, term } => cast_script(*kind, term, schema),
        Expr::IsType { kind, term } => {
            let inner = painless(term, schema)?;
            let answer = match (kind, inner.typ) {
                (CastKind::Boolean, DataType::Boolean) => "true",
                (CastKind::Integer, DataType::Integer) => "true",
                (CastKind::Number, t) if t.is_numeric() => "true",
                (CastKind::Text, DataType::Text) => "true",
                // Statically untyped values need a runtime check.
                (CastKind::Text, DataType::Object) => {
                    return Ok(EsScript::boolean(format!(
                        "(({}) instanceof String)",
                        inner.expr
                    )));
                }
                (CastKind::Number, DataType::Object) => {
                    return Ok(EsScript::boolean(format!(
                        "(({}) instanceof Number)",
                        inner.expr
                    )));
                }
                _ => "false",
            };
            Ok(EsScript::boolean(answer))
        }

        Expr::Script(source) => Ok(EsScript {
            typ: DataType::Object,
            expr: source.clone(),
            miss: MissScript::Never,
            many: false,
        }),

        // The remaining operators have no single-expression Painless form.
        Expr::Last(_)
        | Expr::Split { .. }
        | Expr::Tuple(_)
        | Expr::Select(_)
        | Expr::Leaves(_)
        | Expr::RegExp { .. }
        | Expr::Agg { .. } => Err(ExprError::unsupported(expr.op(), Language::Painless)),
    }
}

fn literal_script(l: &Literal) -> EsScript {
    match l.value() {
        JxValue::Null => EsScript::null(),
        JxValue::Bool(b) => EsScript::boolean(b.to_string()),
        JxValue::Int(i) => EsScript::value(DataType::Integer, i.to_string()),
        JxValue::Float(f) => EsScript::value(DataType::Number, f.to_string()),
        JxValue::Text(s) => EsScript::value(DataType::Text, quoted(s)),
        JxValue::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| literal_script(&Literal::from_value(item.clone())).expr)
                .collect();
            EsScript {
                typ: DataType::Object,
                expr: format!("[{}]", parts.join(", ")),
                miss: MissScript::Never,
                many: true,
            }
        }
        JxValue::Object(_) => EsScript {
            typ: DataType::Object,
            expr: serde_json::Value::from(l.value().clone()).to_string(),
            miss: MissScript::Never,
            many: false,
        },
    }
}

fn variable_script(v: &Variable, schema: &dyn Schema) -> EsScript {
    let columns = schema.values(v.name(), &[DataType::Object, DataType::Nested]);
    let columns = if columns.is_empty() {
        schema.leaves(v.name())
    } else {
        columns
    };
    match columns.len() {
        // Unknown column: definitely no value, never an error.
        0 => EsScript::null(),
        1 => column_script(&columns[0]),
        // Multi-typed field: first column with data wins.
        _ => {
            let mut script = EsScript::null();
            for column in columns.iter().rev() {
                let c = column_script(column);
                let MissScript::Test(m) = c.miss.clone() else {
                    continue;
                };
                script = EsScript {
                    typ: merge_types(c.typ, script.typ),
                    expr: format!("(({m}) ? ({}) : ({}))", script.as_value(), c.expr),
                    miss: c.miss.and(script.miss),
                    many: c.many || script.many,
                };
            }
            script
        }
    }
}

fn column_script(column: &jx_expression::Column) -> EsScript {
    let field = quoted(&column.name);
    EsScript {
        typ: column.jx_type,
        expr: format!("doc[{field}].value"),
        miss: MissScript::Test(format!("doc[{field}].empty")),
        many: column.multi,
    }
}

fn arith_script(
    op: ArithOp,
    terms: &[Expr],
    default: &Expr,
    schema: &dyn Schema,
) -> Result<EsScript> {
    let rendered = terms
        .iter()
        .map(|t| painless(t, schema))
        .collect::<Result<Vec<_>>>()?;
    let miss = rendered
        .iter()
        .fold(MissScript::Never, |acc, s| acc.or(s.miss.clone()));

    // A zero divisor has no value, same as a missing operand.
    let miss = match op {
        ArithOp::Div | ArithOp::Mod => {
            let mut zeros: Vec<String> = Vec::new();
            for s in rendered.iter().skip(1) {
                match s.expr.parse::<f64>() {
                    Ok(n) if n != 0.0 => {}
                    Ok(_) => zeros.push("true".to_string()),
                    Err(_) => zeros.push(format!("({}) == 0", s.expr)),
                }
            }
            if zeros.is_empty() {
                miss
            } else {
                miss.or(MissScript::Test(format!("({})", zeros.join(" || "))))
            }
        }
        _ => miss,
    };

    let folded = match op {
        ArithOp::Exp => rendered
            .iter()
            .map(|s| s.expr.clone())
            .reduce(|a, b| format!("Math.pow({a}, {b})"))
            .unwrap_or_else(|| "null".to_string()),
        _ => {
            let symbol = match op {
                ArithOp::Add => "+",
                ArithOp::Sub => "-",
                ArithOp::Mul => "*",
                ArithOp::Div => "/",
                ArithOp::Mod => "%",
                ArithOp::Exp => unreachable!("handled above"),
            };
            format!(
                "({})",
                rendered
                    .iter()
                    .map(|s| format!("({})", s.expr))
                    .collect::<Vec<_>>()
                    .join(&format!(" {symbol} "))
            )
        }
    };

    let typ = if rendered.iter().all(|s| s.typ == DataType::Integer)
        && op.closed_over_integers()
    {
        DataType::Integer
    } else {
        DataType::Number
    };

    match (&miss, default.as_literal()) {
        (MissScript::Never, _) => Ok(EsScript::value(typ, folded)),
        (_, Some(l)) if l.is_null() => Ok(EsScript {
            typ,
            expr: folded,
            miss,
            many: false,
        }),
        _ => {
            let d = painless(default, schema)?;
            Ok(EsScript {
                typ: merge_types(typ, d.typ),
                expr: format!("(({}) ? ({}) : {folded})", miss.as_expr(), d.as_value()),
                miss: d.miss,
                many: false,
            })
        }
    }
}

fn cast_script(kind: CastKind, term: &Expr, schema: &dyn Schema) -> Result<EsScript> {
    let inner = painless(term, schema)?;
    let expr = match (kind, inner.typ) {
        (CastKind::Text, _) => inner.as_text(),
        (CastKind::Boolean, DataType::Boolean) => inner.expr.clone(),
        (CastKind::Boolean, DataType::Text) => {
            format!("(({}) == \"T\" || ({}) == \"true\")", inner.expr, inner.expr)
        }
        (CastKind::Boolean, _) => format!("(({}) != 0)", inner.expr),
        (CastKind::Integer, DataType::Integer) => inner.expr.clone(),
        (CastKind::Integer, DataType::Text) => {
            format!("(int)Double.parseDouble({})", inner.expr)
        }
        (CastKind::Integer, DataType::Boolean) => format!("(({}) ? 1 : 0)", inner.expr),
        (CastKind::Integer, _) => format!("(int)({})", inner.expr),
        (CastKind::Number, t) if t.is_numeric() => inner.expr.clone(),
        (CastKind::Number, DataType::Text) => format!("Double.parseDouble({})", inner.expr),
        (CastKind::Number, DataType::Boolean) => format!("(({}) ? 1 : 0)", inner.expr),
        (CastKind::Number, _) => format!("(double)({})", inner.expr),
    };
    Ok(EsScript {
        typ: kind.datatype(),
        expr,
        miss: inner.miss,
        many: false,
    })
}

/// Render an expression used in list position (`in` supersets).
fn list_script(expr: &Expr, schema: &dyn Schema) -> Result<String> {
    match expr {
        Expr::Literal(l) => match l.value() {
            JxValue::Array(_) => Ok(literal_script(l).expr),
            scalar => Ok(format!(
                "[{}]",
                literal_script(&Literal::from_value(scalar.clone())).expr
            )),
        },
        Expr::Variable(v) => {
            let columns = schema.values(v.name(), &[DataType::Object, DataType::Nested]);
            match columns.first() {
                Some(c) => Ok(format!("doc[{}]", quoted(&c.name))),
                None => Ok("[]".to_string()),
            }
        }
        other => Ok(format!("[{}]", painless(other, schema)?.expr)),
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

#[cfg(test)]
mod tests {
    use super::*;
    use jx_expression::{parse_json, MemorySchema};
    use serde_json::json;

    fn schema() -> MemorySchema {
        MemorySchema::new()
            .with_column("status", "status.~s~", DataType::Text)
            .with_column("bytes", "bytes.~n~", DataType::Number)
    }

    fn script(value: serde_json::Value) -> EsScript {
        let schema = schema();
        let expr = parse_json(&value, Some(&schema)).expect("parse");
        painless(&expr, &schema).expect("painless")
    }

    #[test]
    fn variable_reads_doc_values() {
        let s = script(json!({"var": "bytes"}));
        assert_eq!(s.expr, "doc[\"bytes.~n~\"].value");
        assert_eq!(s.miss, MissScript::Test("doc[\"bytes.~n~\"].empty".into()));
        assert_eq!(s.typ, DataType::Number);
        assert!(!s.many);
    }

    #[test]
    fn unknown_variable_is_always_missing() {
        let s = script(json!({"var": "nope"}));
        assert_eq!(s.miss, MissScript::Always);
        assert_eq!(s.expr, "null");
    }

    #[test]
    fn literals_render_directly() {
        assert_eq!(script(json!(3)).expr, "3");
        assert_eq!(script(json!("x")).expr, "\"x\"");
        assert_eq!(script(json!(true)).expr, "true");
        assert_eq!(script(json!({"literal": [1, 2]})).expr, "[1, 2]");
    }

    #[test]
    fn boolean_to_text_uses_t_and_f() {
        let s = script(json!({"string": {"gt": {"bytes": 10}}}));
        assert!(s.expr.contains("? \"T\" : \"F\""), "got {}", s.expr);
        assert_eq!(s.typ, DataType::Text);
    }

    #[test]
    fn eq_uses_three_way_missing_form() {
        let s = script(json!({"eq": [{"var": "status"}, {"var": "status"}]}));
        assert!(s.expr.contains("doc[\"status.~s~\"].empty"), "got {}", s.expr);
        assert!(s.expr.contains("=="), "got {}", s.expr);
        assert_eq!(s.miss, MissScript::Never);
    }

    #[test]
    fn coalesce_guards_with_miss_tests() {
        let s = script(json!({"coalesce": [{"var": "status"}, "none"]}));
        assert!(s.expr.contains("doc[\"status.~s~\"].empty"), "got {}", s.expr);
        assert!(s.expr.contains("\"none\""), "got {}", s.expr);
        assert_eq!(s.miss, MissScript::Never);
    }

    #[test]
    fn division_guards_zero_divisors() {
        let s = script(json!({"div": [1, {"var": "bytes"}], "default": -1}));
        assert!(s.expr.contains("== 0"), "got {}", s.expr);
        assert!(s.expr.contains("-1"), "got {}", s.expr);
        assert_eq!(s.miss, MissScript::Never);

        // Without a default the hazard rides along as a miss test.
        let s = script(json!({"mod": [{"var": "bytes"}, {"var": "bytes"}]}));
        assert!(s.miss.as_expr().contains("== 0"), "got {}", s.miss.as_expr());

        // A nonzero literal divisor needs no guard.
        let s = script(json!({"div": [{"var": "bytes"}, 2], "default": -1}));
        assert!(!s.expr.contains("== 0"), "got {}", s.expr);
    }

    #[test]
    fn missing_renders_the_miss_test() {
        let s = script(json!({"missing": "status"}));
        assert_eq!(s.expr, "doc[\"status.~s~\"].empty");
        assert_eq!(s.typ, DataType::Boolean);
    }

    #[test]
    fn aggregates_are_unsupported() {
        let schema = schema();
        let expr = parse_json(&json!({"union": [{"var": "status"}]}), Some(&schema)).unwrap();
        let err = painless(&expr, &schema).unwrap_err();
        assert_eq!(err.to_string(), "operator union not supported on painless");
    }
}
