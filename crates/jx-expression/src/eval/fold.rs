//! Literal folding and operator-specific shortcuts.
//!
//! Each function receives already-simplified operands and either folds to
//! a literal, rewrites to a cheaper equivalent, or rebuilds the node
//! unchanged.

use crate::ast::{literal, AggOp, ArithOp, CastKind, CmpOp, Expr, Literal, SliceOp, WhenClause};
use crate::error::{ExprError, Result};
use crate::eval::missing;
use crate::foundation::{DataType, JxValue};

/// Equality with the list-oriented document model quirk: a scalar equals
/// the singleton list containing it.
pub(crate) fn values_eq(a: &JxValue, b: &JxValue) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (JxValue::Array(items), other) | (other, JxValue::Array(items)) => {
            items.len() == 1 && &items[0] == other
        }
        _ => false,
    }
}

/// Byte index of the `chars`-th character, clamped to the end of `s`.
fn byte_of_char(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}

/// Character index of `needle` at or after the `start`-th character.
fn find_from(haystack: &str, needle: &str, start: usize) -> Option<usize> {
    let from = byte_of_char(haystack, start);
    haystack[from..]
        .find(needle)
        .map(|i| haystack[..from + i].chars().count())
}

pub(super) fn simplify_eq(lhs: Expr, rhs: Expr) -> Result<Expr> {
    // Re-apply eq/in normalization: a nested expression may fold into a
    // list literal only after constant folding.
    if let Expr::Literal(l) = &rhs {
        if matches!(l.value(), JxValue::Array(_)) {
            return simplify_in(lhs, rhs);
        }
    }
    match (&lhs, &rhs) {
        (Expr::Literal(a), Expr::Literal(b)) => {
            // Two missing values compare possibly-true.
            if a.is_null() && b.is_null() {
                Ok(Expr::TRUE)
            } else if a.is_null() || b.is_null() {
                Ok(Expr::FALSE)
            } else {
                Ok(bool_literal(values_eq(a.value(), b.value())))
            }
        }
        _ if lhs == rhs => Ok(Expr::TRUE),
        _ => Ok(Expr::eq(lhs, rhs)),
    }
}

pub(super) fn simplify_ne(lhs: Expr, rhs: Expr) -> Result<Expr> {
    match (&lhs, &rhs) {
        // `ne` requires both sides to exist.
        (Expr::Literal(a), _) if a.is_null() => Ok(Expr::FALSE),
        (_, Expr::Literal(b)) if b.is_null() => Ok(Expr::FALSE),
        (Expr::Literal(a), Expr::Literal(b)) => Ok(bool_literal(!values_eq(a.value(), b.value()))),
        _ => Ok(Expr::Ne {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }),
    }
}

pub(super) fn simplify_cmp(op: CmpOp, lhs: Expr, rhs: Expr) -> Result<Expr> {
    match (&lhs, &rhs) {
        // A comparison against a missing value never holds.
        (Expr::Literal(a), _) if a.is_null() => Ok(Expr::FALSE),
        (_, Expr::Literal(b)) if b.is_null() => Ok(Expr::FALSE),
        (Expr::Literal(a), Expr::Literal(b)) => match compare(a, b) {
            Some(ord) => Ok(bool_literal(op.eval(ord))),
            None => Ok(Expr::FALSE),
        },
        _ => Ok(Expr::cmp(op, lhs, rhs)),
    }
}

fn compare(a: &Literal, b: &Literal) -> Option<std::cmp::Ordering> {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y),
        _ => match (a.as_str(), b.as_str()) {
            (Some(x), Some(y)) => Some(x.cmp(y)),
            _ => None,
        },
    }
}

pub(super) fn simplify_arith(op: ArithOp, terms: Vec<Expr>, default: Expr) -> Result<Expr> {
    if terms.is_empty() {
        return Ok(default);
    }
    if terms.len() == 1 && matches!(op, ArithOp::Add | ArithOp::Mul) {
        return Ok(terms.into_iter().next().expect("len checked"));
    }

    let literals: Option<Vec<&Literal>> = terms.iter().map(Expr::as_literal).collect();
    let Some(literals) = literals else {
        return Ok(Expr::Arith {
            op,
            terms,
            default: Box::new(default),
        });
    };

    // A missing operand makes the whole computation fall back to default.
    if literals.iter().any(|l| l.is_null()) {
        return Ok(default);
    }

    let numbers: Option<Vec<f64>> = literals.iter().map(|l| l.as_f64()).collect();
    let Some(numbers) = numbers else {
        return Err(ExprError::TypeMismatch {
            expected: DataType::Number,
            found: terms
                .iter()
                .find(|t| t.as_literal().is_some_and(|l| l.as_f64().is_none()))
                .map(|t| t.to_json().to_string())
                .unwrap_or_default(),
        });
    };

    let all_integer = literals
        .iter()
        .all(|l| l.datatype() == DataType::Integer);

    let folded = fold_numbers(op, &numbers);
    match folded {
        // Division by zero (and friends) falls back to default.
        None => Ok(default),
        Some(result) => {
            if all_integer && op.closed_over_integers() && result.fract() == 0.0 {
                Ok(Expr::literal(result as i64))
            } else {
                Ok(Expr::literal(result))
            }
        }
    }
}

fn fold_numbers(op: ArithOp, numbers: &[f64]) -> Option<f64> {
    let mut iter = numbers.iter().copied();
    let first = iter.next()?;
    iter.try_fold(first, |acc, n| match op {
        ArithOp::Add => Some(acc + n),
        ArithOp::Sub => Some(acc - n),
        ArithOp::Mul => Some(acc * n),
        ArithOp::Div => {
            if n == 0.0 {
                None
            } else {
                Some(acc / n)
            }
        }
        ArithOp::Mod => {
            if n == 0.0 {
                None
            } else {
                Some(acc.rem_euclid(n))
            }
        }
        ArithOp::Exp => Some(acc.powf(n)),
    })
}

pub(super) fn simplify_floor(term: Expr, modulo: Expr) -> Result<Expr> {
    match (term.as_literal(), modulo.as_literal()) {
        (Some(t), Some(m)) => {
            if t.is_null() || m.is_null() {
                return Ok(Expr::NULL);
            }
            match (t.as_f64(), m.as_f64()) {
                (Some(value), Some(step)) if step != 0.0 => {
                    let floored = (value / step).floor() * step;
                    if floored.fract() == 0.0 {
                        Ok(Expr::literal(floored as i64))
                    } else {
                        Ok(Expr::literal(floored))
                    }
                }
                _ => Ok(Expr::NULL),
            }
        }
        _ => Ok(Expr::Floor {
            term: Box::new(term),
            modulo: Box::new(modulo),
        }),
    }
}

pub(super) fn simplify_when(when: Expr, then: Expr, els: Expr) -> Result<Expr> {
    match &when {
        Expr::Literal(l) => {
            if *l == literal::TRUE {
                Ok(then)
            } else if *l == literal::FALSE || l.is_null() {
                Ok(els)
            } else {
                Err(ExprError::TypeMismatch {
                    expected: DataType::Boolean,
                    found: l.to_string(),
                })
            }
        }
        _ if then == els => Ok(then),
        _ => Ok(Expr::When {
            when: Box::new(when),
            then: Box::new(then),
            els: Box::new(els),
        }),
    }
}

pub(super) fn simplify_case(clauses: Vec<WhenClause>, els: Expr) -> Result<Expr> {
    let mut remaining = Vec::with_capacity(clauses.len());
    let mut els = els;
    for clause in clauses {
        match &clause.when {
            Expr::Literal(l) => {
                if *l == literal::FALSE || l.is_null() {
                    continue;
                } else if *l == literal::TRUE {
                    // Every earlier clause was statically false.
                    els = clause.then;
                    break;
                } else {
                    return Err(ExprError::TypeMismatch {
                        expected: DataType::Boolean,
                        found: l.to_string(),
                    });
                }
            }
            _ => remaining.push(clause),
        }
    }
    Ok(match remaining.len() {
        0 => els,
        1 => {
            let clause = remaining.into_iter().next().expect("len checked");
            Expr::when(clause.when, clause.then, els)
        }
        _ => Expr::Case {
            clauses: remaining,
            els: Box::new(els),
        },
    })
}

pub(super) fn simplify_coalesce(terms: Vec<Expr>) -> Result<Expr> {
    let mut out: Vec<Expr> = Vec::with_capacity(terms.len());
    for term in terms {
        match term {
            // Nested coalesce flattens.
            Expr::Coalesce(inner) => out.extend(inner),
            Expr::Literal(l) if l.is_null() => continue,
            other => {
                // A term proven to always have a value ends the search.
                let decided = missing::missing(&other).is_literal(&literal::FALSE);
                out.push(other);
                if decided {
                    break;
                }
            }
        }
    }
    Ok(match out.len() {
        0 => Expr::NULL,
        1 => out.into_iter().next().expect("len checked"),
        _ => Expr::Coalesce(out),
    })
}

pub(super) fn simplify_in(value: Expr, superset: Expr) -> Result<Expr> {
    match &superset {
        Expr::Literal(l) => match l.value() {
            JxValue::Null => Ok(Expr::FALSE),
            JxValue::Array(items) => {
                if items.is_empty() {
                    return Ok(Expr::FALSE);
                }
                if items.len() == 1 {
                    return simplify_eq(
                        value,
                        Expr::Literal(Literal::from_value(items[0].clone())),
                    );
                }
                match &value {
                    Expr::Literal(v) => {
                        Ok(bool_literal(items.iter().any(|item| values_eq(item, v.value()))))
                    }
                    _ => Ok(Expr::in_(value, superset.clone())),
                }
            }
            // A scalar superset is a single-candidate membership test.
            _ => simplify_eq(value, superset.clone()),
        },
        _ => Ok(Expr::in_(value, superset)),
    }
}

pub(super) fn simplify_prefix(value: Expr, prefix: Expr) -> Result<Expr> {
    match (&value, &prefix) {
        // Everything begins with the empty string, including nothing.
        (_, Expr::Literal(p)) if p.is_null() || p.as_str() == Some("") => Ok(Expr::TRUE),
        (Expr::Literal(v), Expr::Literal(_)) if v.is_null() => Ok(Expr::FALSE),
        (Expr::Literal(v), Expr::Literal(p)) => match (v.as_str(), p.as_str()) {
            (Some(v), Some(p)) => Ok(bool_literal(v.starts_with(p))),
            _ => Ok(Expr::FALSE),
        },
        _ => Ok(Expr::prefix(value, prefix)),
    }
}

pub(super) fn simplify_suffix(value: Expr, suffix: Expr) -> Result<Expr> {
    match (&value, &suffix) {
        (_, Expr::Literal(s)) if s.is_null() || s.as_str() == Some("") => Ok(Expr::TRUE),
        (Expr::Literal(v), Expr::Literal(_)) if v.is_null() => Ok(Expr::FALSE),
        (Expr::Literal(v), Expr::Literal(s)) => match (v.as_str(), s.as_str()) {
            (Some(v), Some(s)) => Ok(bool_literal(v.ends_with(s))),
            _ => Ok(Expr::FALSE),
        },
        _ => Ok(Expr::Suffix {
            value: Box::new(value),
            suffix: Box::new(suffix),
        }),
    }
}

pub(super) fn simplify_concat(terms: Vec<Expr>, separator: Expr) -> Result<Expr> {
    let all_literal = terms.iter().all(|t| t.as_literal().is_some());
    let sep_text = match &separator {
        Expr::Literal(l) if l.is_null() => Some(String::new()),
        Expr::Literal(l) => l.as_str().map(str::to_string),
        _ => None,
    };
    match (all_literal, sep_text) {
        (true, Some(sep)) => {
            // Missing terms are skipped, not rendered.
            let parts: Vec<String> = terms
                .iter()
                .filter_map(|t| t.as_literal())
                .filter(|l| !l.is_null())
                .map(literal_text)
                .collect();
            if parts.is_empty() {
                Ok(Expr::NULL)
            } else {
                Ok(Expr::literal(parts.join(&sep)))
            }
        }
        _ => Ok(Expr::Concat {
            terms,
            separator: Box::new(separator),
        }),
    }
}

fn literal_text(l: &Literal) -> String {
    match l.value() {
        JxValue::Text(s) => s.clone(),
        JxValue::Bool(b) => b.to_string(),
        JxValue::Int(i) => i.to_string(),
        JxValue::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

pub(super) fn simplify_find(value: Expr, find: Expr, start: Expr, default: Expr) -> Result<Expr> {
    match (&value, &find, &start) {
        (Expr::Literal(v), Expr::Literal(f), Expr::Literal(s)) => {
            let (Some(haystack), Some(needle)) = (v.as_str(), f.as_str()) else {
                return Ok(default);
            };
            let start = s.as_f64().unwrap_or(0.0).max(0.0) as usize;
            match find_from(haystack, needle, start) {
                Some(i) => Ok(Expr::literal(i as i64)),
                None => Ok(default),
            }
        }
        _ => Ok(Expr::Find {
            value: Box::new(value),
            find: Box::new(find),
            start: Box::new(start),
            default: Box::new(default),
        }),
    }
}

pub(super) fn simplify_slice(op: SliceOp, value: Expr, length: Expr) -> Result<Expr> {
    match (&value, &length) {
        (Expr::Literal(v), Expr::Literal(n)) => {
            if v.is_null() || n.is_null() {
                return Ok(Expr::NULL);
            }
            let (Some(text), Some(count)) = (v.as_str(), n.as_f64()) else {
                return Ok(Expr::NULL);
            };
            // Counts are characters, not bytes.
            let total = text.chars().count();
            let count = (count.max(0.0) as usize).min(total);
            let split = match op {
                SliceOp::Left | SliceOp::NotLeft => byte_of_char(text, count),
                SliceOp::Right | SliceOp::NotRight => byte_of_char(text, total - count),
            };
            let keep_front = matches!(op, SliceOp::Left | SliceOp::NotRight);
            let slice = if keep_front {
                &text[..split]
            } else {
                &text[split..]
            };
            Ok(Expr::literal(slice.to_string()))
        }
        _ => Ok(Expr::Slice {
            op,
            value: Box::new(value),
            length: Box::new(length),
        }),
    }
}

pub(super) fn simplify_length(term: Expr) -> Result<Expr> {
    match &term {
        Expr::Literal(l) => {
            if l.is_null() {
                Ok(Expr::NULL)
            } else {
                match l.as_str() {
                    Some(s) => Ok(Expr::literal(s.chars().count() as i64)),
                    None => Ok(Expr::NULL),
                }
            }
        }
        _ => Ok(Expr::Length(Box::new(term))),
    }
}

pub(super) fn simplify_first(term: Expr) -> Result<Expr> {
    match &term {
        Expr::Literal(l) => match l.value() {
            JxValue::Array(items) => Ok(items
                .first()
                .map(|v| Expr::Literal(Literal::from_value(v.clone())))
                .unwrap_or(Expr::NULL)),
            _ => Ok(term),
        },
        Expr::Tuple(items) => Ok(items.first().cloned().unwrap_or(Expr::NULL)),
        _ => Ok(Expr::First(Box::new(term))),
    }
}

pub(super) fn simplify_last(term: Expr) -> Result<Expr> {
    match &term {
        Expr::Literal(l) => match l.value() {
            JxValue::Array(items) => Ok(items
                .last()
                .map(|v| Expr::Literal(Literal::from_value(v.clone())))
                .unwrap_or(Expr::NULL)),
            _ => Ok(term),
        },
        Expr::Tuple(items) => Ok(items.last().cloned().unwrap_or(Expr::NULL)),
        _ => Ok(Expr::Last(Box::new(term))),
    }
}

pub(super) fn simplify_cast(kind: CastKind, term: Expr) -> Result<Expr> {
    let Expr::Literal(l) = &term else {
        return Ok(Expr::Cast {
            kind,
            term: Box::new(term),
        });
    };
    if l.is_null() {
        return Ok(Expr::NULL);
    }
    let folded = match kind {
        CastKind::Boolean => match l.value() {
            JxValue::Bool(_) => Some(term.clone()),
            JxValue::Int(i) => Some(Expr::literal(*i != 0)),
            JxValue::Float(f) => Some(Expr::literal(*f != 0.0)),
            JxValue::Text(s) => match s.as_str() {
                "true" | "T" => Some(Expr::TRUE),
                "false" | "F" => Some(Expr::FALSE),
                _ => None,
            },
            _ => None,
        },
        CastKind::Integer => match l.value() {
            JxValue::Bool(b) => Some(Expr::literal(i64::from(*b))),
            JxValue::Int(_) => Some(term.clone()),
            JxValue::Float(f) => Some(Expr::literal(f.trunc() as i64)),
            JxValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(f) => Some(Expr::literal(f.trunc() as i64)),
                // An unparseable cast has no value.
                Err(_) => Some(Expr::NULL),
            },
            _ => None,
        },
        CastKind::Number => match l.value() {
            JxValue::Bool(b) => Some(Expr::literal(i64::from(*b))),
            JxValue::Int(_) | JxValue::Float(_) => Some(term.clone()),
            JxValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(f) => Some(Expr::literal(f)),
                Err(_) => Some(Expr::NULL),
            },
            _ => None,
        },
        CastKind::Text => match l.value() {
            JxValue::Text(_) => Some(term.clone()),
            JxValue::Bool(b) => Some(Expr::literal(b.to_string())),
            JxValue::Int(i) => Some(Expr::literal(i.to_string())),
            JxValue::Float(f) => Some(Expr::literal(f.to_string())),
            _ => None,
        },
    };
    Ok(folded.unwrap_or(Expr::Cast {
        kind,
        term: Box::new(term),
    }))
}

pub(super) fn simplify_is_type(kind: CastKind, term: Expr) -> Result<Expr> {
    match &term {
        Expr::Literal(l) => {
            let matches = match kind {
                CastKind::Boolean => l.datatype() == DataType::Boolean,
                CastKind::Integer => l.datatype() == DataType::Integer,
                CastKind::Number => l.datatype().is_numeric(),
                CastKind::Text => l.datatype() == DataType::Text,
            };
            Ok(bool_literal(matches))
        }
        _ => Ok(Expr::IsType {
            kind,
            term: Box::new(term),
        }),
    }
}

pub(super) fn simplify_agg(op: AggOp, terms: Vec<Expr>) -> Result<Expr> {
    let literals: Option<Vec<&Literal>> = terms.iter().map(Expr::as_literal).collect();
    let Some(literals) = literals else {
        return Ok(Expr::Agg { op, terms });
    };

    match op {
        AggOp::Count => Ok(Expr::literal(
            literals.iter().filter(|l| !l.is_null()).count() as i64,
        )),
        AggOp::Max | AggOp::Min => {
            let numbers: Vec<f64> = literals.iter().filter_map(|l| l.as_f64()).collect();
            if numbers.len() != literals.iter().filter(|l| !l.is_null()).count() {
                return Ok(Expr::Agg { op, terms });
            }
            let folded = numbers.into_iter().reduce(|a, b| {
                if (op == AggOp::Max) == (a > b) {
                    a
                } else {
                    b
                }
            });
            Ok(folded.map(Expr::literal).unwrap_or(Expr::NULL))
        }
        AggOp::Union => {
            let mut out: Vec<JxValue> = Vec::new();
            for l in literals {
                let items: Vec<JxValue> = match l.value() {
                    JxValue::Null => continue,
                    JxValue::Array(items) => items.clone(),
                    scalar => vec![scalar.clone()],
                };
                for item in items {
                    if !out.contains(&item) {
                        out.push(item);
                    }
                }
            }
            Ok(Expr::literal(JxValue::Array(out)))
        }
    }
}

pub(super) fn simplify_basic_eq(lhs: Expr, rhs: Expr) -> Result<Expr> {
    match (&lhs, &rhs) {
        (Expr::Literal(a), Expr::Literal(b)) => Ok(bool_literal(a == b)),
        _ => Ok(Expr::BasicEq {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }),
    }
}

pub(super) fn simplify_basic_starts_with(value: Expr, prefix: Expr) -> Result<Expr> {
    match (&value, &prefix) {
        (Expr::Literal(v), Expr::Literal(p)) => match (v.as_str(), p.as_str()) {
            (Some(v), Some(p)) => Ok(bool_literal(v.starts_with(p))),
            _ => Ok(Expr::FALSE),
        },
        _ => Ok(Expr::BasicStartsWith {
            value: Box::new(value),
            prefix: Box::new(prefix),
        }),
    }
}

pub(super) fn simplify_basic_in(value: Expr, superset: Expr) -> Result<Expr> {
    match (&value, &superset) {
        (Expr::Literal(v), Expr::Literal(s)) => match s.value() {
            JxValue::Array(items) => Ok(bool_literal(items.contains(v.value()))),
            scalar => Ok(bool_literal(scalar == v.value())),
        },
        _ => Ok(Expr::BasicIn {
            value: Box::new(value),
            superset: Box::new(superset),
        }),
    }
}

fn bool_literal(b: bool) -> Expr {
    if b {
        Expr::TRUE
    } else {
        Expr::FALSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::partial_eval;
    use serde_json::json;

    fn pe(value: serde_json::Value) -> Expr {
        let expr = crate::parse::parse_json(&value, None).expect("parse");
        partial_eval(&expr).expect("partial_eval")
    }

    #[test]
    fn division_by_zero_uses_default() {
        assert_eq!(pe(json!({"div": [1, 0], "default": 9})), Expr::literal(9));
        assert_eq!(pe(json!({"div": [1, 0]})), Expr::NULL);
        assert_eq!(pe(json!({"div": [6, 3]})), Expr::literal(2.0));
    }

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(pe(json!({"mul": [2, 3, 4]})), Expr::literal(24));
        assert_eq!(pe(json!({"sub": [2, 3.5]})), Expr::literal(-1.5));
    }

    #[test]
    fn missing_operand_falls_back_to_default() {
        assert_eq!(pe(json!({"add": [1, null]})), Expr::NULL);
        assert_eq!(pe(json!({"add": [1, null], "default": 0})), Expr::literal(0));
    }

    #[test]
    fn comparison_folding() {
        assert_eq!(pe(json!({"gt": [3, 2]})), Expr::TRUE);
        assert_eq!(pe(json!({"lte": [3, 2]})), Expr::FALSE);
        assert_eq!(pe(json!({"gt": [null, 2]})), Expr::FALSE);
    }

    #[test]
    fn eq_of_two_nulls_is_possibly_true() {
        assert_eq!(pe(json!({"eq": [null, null]})), Expr::TRUE);
        assert_eq!(pe(json!({"eq": [null, 2]})), Expr::FALSE);
    }

    #[test]
    fn eq_scalar_matches_singleton_list() {
        assert_eq!(pe(json!({"eq": [5, {"literal": [5]}]})), Expr::TRUE);
    }

    #[test]
    fn when_short_circuits() {
        assert_eq!(
            pe(json!({"when": true, "then": 1, "else": 2})),
            Expr::literal(1)
        );
        assert_eq!(
            pe(json!({"when": false, "then": 1, "else": 2})),
            Expr::literal(2)
        );
    }

    #[test]
    fn case_drops_false_clauses() {
        let expr = pe(json!({"case": [
            {"when": false, "then": 1},
            {"when": {"eq": {"a": 2}}, "then": 2},
            3
        ]}));
        let Expr::When { then, els, .. } = expr else {
            panic!("expected single-clause case to become when, got {expr:?}")
        };
        assert_eq!(*then, Expr::literal(2));
        assert_eq!(*els, Expr::literal(3));
    }

    #[test]
    fn coalesce_stops_at_first_literal() {
        assert_eq!(
            pe(json!({"coalesce": [null, 3, {"var": "a"}]})),
            Expr::literal(3)
        );
        assert_eq!(pe(json!({"coalesce": null})), Expr::NULL);
    }

    #[test]
    fn in_normalizes_to_eq_for_singletons() {
        assert_eq!(
            pe(json!({"in": [{"var": "a"}, {"literal": [1]}]})),
            Expr::eq(Expr::var("a"), Expr::literal(1))
        );
        assert_eq!(pe(json!({"in": [{"var": "a"}, {"literal": []}]})), Expr::FALSE);
    }

    #[test]
    fn null_prefix_rules() {
        assert_eq!(pe(json!({"prefix": [null, "x"]})), Expr::FALSE);
        assert_eq!(pe(json!({"prefix": [null, ""]})), Expr::TRUE);
        assert_eq!(pe(json!({"prefix": ["xyz", "x"]})), Expr::TRUE);
    }

    #[test]
    fn string_helpers_fold() {
        assert_eq!(pe(json!({"length": "hello"})), Expr::literal(5));
        assert_eq!(pe(json!({"left": ["hello", 2]})), Expr::literal("he"));
        assert_eq!(pe(json!({"not_left": ["hello", 2]})), Expr::literal("llo"));
        assert_eq!(pe(json!({"right": ["hello", 2]})), Expr::literal("lo"));
        assert_eq!(pe(json!({"not_right": ["hello", 2]})), Expr::literal("hel"));
        assert_eq!(
            pe(json!({"concat": ["a", null, "b"], "separator": "-"})),
            Expr::literal("a-b")
        );
        assert_eq!(pe(json!({"find": ["hello", "llo"]})), Expr::literal(2));
        assert_eq!(pe(json!({"find": ["hello", "zzz"]})), Expr::NULL);
    }

    #[test]
    fn string_slicing_counts_characters_not_bytes() {
        assert_eq!(pe(json!({"left": ["é!", 1]})), Expr::literal("é"));
        assert_eq!(pe(json!({"not_left": ["é!", 1]})), Expr::literal("!"));
        assert_eq!(pe(json!({"right": ["é!", 1]})), Expr::literal("!"));
        assert_eq!(pe(json!({"not_right": ["é!", 1]})), Expr::literal("é"));
        assert_eq!(pe(json!({"left": ["é!", 99]})), Expr::literal("é!"));
    }

    #[test]
    fn find_start_and_result_are_character_indexes() {
        assert_eq!(pe(json!({"find": ["é!x", "x"], "start": 1})), Expr::literal(2));
        assert_eq!(pe(json!({"find": ["é!x", "é"], "start": 1})), Expr::NULL);
        assert_eq!(pe(json!({"find": ["é!", "!"], "start": 99})), Expr::NULL);
    }

    #[test]
    fn casts_fold() {
        assert_eq!(pe(json!({"integer": "42"})), Expr::literal(42));
        assert_eq!(pe(json!({"number": "2.5"})), Expr::literal(2.5));
        assert_eq!(pe(json!({"string": 7})), Expr::literal("7"));
        assert_eq!(pe(json!({"boolean": 1})), Expr::TRUE);
        assert_eq!(pe(json!({"is_number": 2.5})), Expr::TRUE);
        assert_eq!(pe(json!({"is_string": 2.5})), Expr::FALSE);
    }

    #[test]
    fn aggregates_fold_over_literals() {
        assert_eq!(pe(json!({"count": [1, null, 3]})), Expr::literal(2));
        assert_eq!(pe(json!({"max": [1, 5, 3]})), Expr::literal(5.0));
        assert_eq!(pe(json!({"min": [1, 5, 3]})), Expr::literal(1.0));
    }
}
