//! # Row evaluation backend
//!
//! Compiles an expression into a boxed closure over JSON rows. The
//! closure is the compiled artifact: build it once, run it per row. All
//! operator dispatch happens at compile time; evaluation is a plain walk
//! over captured child closures.
//!
//! Path variables walk nested objects and yield `Null` at any absent
//! step, so a filter over ragged documents never fails at runtime.

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use jx_expression::ast::{AggOp, ArithOp, CastKind, SliceOp, WhenClause};
use jx_expression::{Backend, DataType, Expr, ExprError, JxValue, Language, Result, Schema};

/// A compiled row predicate or projection.
pub type RowFn = Box<dyn Fn(&JxValue) -> JxValue + Send + Sync>;

/// Row-closure backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rows;

impl Backend for Rows {
    type Artifact = RowFn;

    fn language(&self) -> Language {
        Language::Rows
    }

    fn render(&self, expr: &Expr, _schema: &dyn Schema) -> Result<Self::Artifact> {
        debug!(op = %expr.op(), "compiling row closure");
        compile(expr)
    }
}

/// Compile an expression into a row closure.
pub fn compile(expr: &Expr) -> Result<RowFn> {
    let compiled: RowFn = match expr {
        Expr::Literal(l) => {
            let value = l.value().clone();
            Box::new(move |_| value.clone())
        }
        Expr::Variable(v) => {
            let segments: Vec<String> = v.segments().map(str::to_string).collect();
            Box::new(move |row| path_get(row, &segments))
        }

        Expr::And(terms) => {
            let terms = compile_all(terms)?;
            Box::new(move |row| {
                JxValue::Bool(terms.iter().all(|t| is_true(&t(row))))
            })
        }
        Expr::Or(terms) => {
            let terms = compile_all(terms)?;
            Box::new(move |row| {
                JxValue::Bool(terms.iter().any(|t| is_true(&t(row))))
            })
        }
        Expr::Not(t) => {
            let t = compile(t)?;
            Box::new(move |row| JxValue::Bool(!is_true(&t(row))))
        }

        Expr::Eq { lhs, rhs } | Expr::BasicEq { lhs, rhs } => {
            let l = compile(lhs)?;
            let r = compile(rhs)?;
            Box::new(move |row| JxValue::Bool(row_eq(&l(row), &r(row))))
        }
        Expr::Ne { lhs, rhs } => {
            let l = compile(lhs)?;
            let r = compile(rhs)?;
            Box::new(move |row| {
                let (a, b) = (l(row), r(row));
                if a.is_null() || b.is_null() {
                    JxValue::Bool(false)
                } else {
                    JxValue::Bool(!row_eq(&a, &b))
                }
            })
        }
        Expr::Cmp { op, lhs, rhs } => {
            let op = *op;
            let l = compile(lhs)?;
            let r = compile(rhs)?;
            Box::new(move |row| {
                match row_cmp(&l(row), &r(row)) {
                    Some(ord) => JxValue::Bool(op.eval(ord)),
                    None => JxValue::Bool(false),
                }
            })
        }
        Expr::Between { value, low, high } => {
            let v = compile(value)?;
            let lo = compile(low)?;
            let hi = compile(high)?;
            Box::new(move |row| {
                let value = v(row);
                let in_range = matches!(
                    row_cmp(&lo(row), &value),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                ) && matches!(
                    row_cmp(&value, &hi(row)),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                );
                JxValue::Bool(in_range)
            })
        }

        Expr::Arith { op, terms, default } => {
            let op = *op;
            let terms = compile_all(terms)?;
            let default = compile(default)?;
            Box::new(move |row| {
                let values: Vec<JxValue> = terms.iter().map(|t| t(row)).collect();
                arith(op, &values).unwrap_or_else(|| default(row))
            })
        }
        Expr::Floor { term, modulo } => {
            let t = compile(term)?;
            let m = compile(modulo)?;
            Box::new(move |row| {
                match (t(row).as_f64(), m(row).as_f64()) {
                    (Some(v), Some(step)) if step != 0.0 => {
                        number((v / step).floor() * step)
                    }
                    _ => JxValue::Null,
                }
            })
        }

        Expr::When { when, then, els } => {
            let c = compile(when)?;
            let t = compile(then)?;
            let e = compile(els)?;
            Box::new(move |row| if is_true(&c(row)) { t(row) } else { e(row) })
        }
        Expr::Case { clauses, els } => {
            let clauses = clauses
                .iter()
                .map(|WhenClause { when, then }| Ok((compile(when)?, compile(then)?)))
                .collect::<Result<Vec<_>>>()?;
            let els = compile(els)?;
            Box::new(move |row| {
                for (when, then) in &clauses {
                    if is_true(&when(row)) {
                        return then(row);
                    }
                }
                els(row)
            })
        }
        Expr::Coalesce(terms) => {
            let terms = compile_all(terms)?;
            Box::new(move |row| {
                terms
                    .iter()
                    .map(|t| t(row))
                    .find(|v| !v.is_null())
                    .unwrap_or(JxValue::Null)
            })
        }

        Expr::Missing(t) => {
            let t = compile(t)?;
            Box::new(move |row| JxValue::Bool(t(row).is_null()))
        }
        Expr::Exists(t) => {
            let t = compile(t)?;
            Box::new(move |row| JxValue::Bool(!t(row).is_null()))
        }

        Expr::In { value, superset } | Expr::BasicIn { value, superset } => {
            let v = compile(value)?;
            let s = compile(superset)?;
            Box::new(move |row| {
                let value = v(row);
                let member = match s(row) {
                    JxValue::Null => false,
                    JxValue::Array(items) => items.iter().any(|item| row_eq(&value, item)),
                    scalar => row_eq(&value, &scalar),
                };
                JxValue::Bool(member)
            })
        }

        Expr::Prefix { value, prefix } | Expr::BasicStartsWith { value, prefix } => {
            let v = compile(value)?;
            let p = compile(prefix)?;
            Box::new(move |row| {
                JxValue::Bool(match (text_of(&v(row)), text_of(&p(row))) {
                    // Everything begins with the empty prefix.
                    (_, None) => true,
                    (_, Some(p)) if p.is_empty() => true,
                    (Some(v), Some(p)) => v.starts_with(&p),
                    (None, Some(_)) => false,
                })
            })
        }
        Expr::Suffix { value, suffix } => {
            let v = compile(value)?;
            let s = compile(suffix)?;
            Box::new(move |row| {
                JxValue::Bool(match (text_of(&v(row)), text_of(&s(row))) {
                    (_, None) => true,
                    (_, Some(s)) if s.is_empty() => true,
                    (Some(v), Some(s)) => v.ends_with(&s),
                    (None, Some(_)) => false,
                })
            })
        }

        Expr::Concat { terms, separator } => {
            let terms = compile_all(terms)?;
            let separator = compile(separator)?;
            Box::new(move |row| {
                let sep = text_of(&separator(row)).unwrap_or_default();
                let parts: Vec<String> = terms
                    .iter()
                    .map(|t| t(row))
                    .filter(|v| !v.is_null())
                    .filter_map(|v| text_of(&v))
                    .collect();
                if parts.is_empty() {
                    JxValue::Null
                } else {
                    JxValue::Text(parts.join(&sep))
                }
            })
        }
        Expr::Split { value, separator } => {
            let v = compile(value)?;
            let s = compile(separator)?;
            Box::new(move |row| {
                match (text_of(&v(row)), text_of(&s(row))) {
                    (Some(v), Some(s)) if !s.is_empty() => JxValue::Array(
                        v.split(&s).map(|part| JxValue::Text(part.to_string())).collect(),
                    ),
                    _ => JxValue::Null,
                }
            })
        }
        Expr::Find {
            value,
            find,
            start,
            default,
        } => {
            let v = compile(value)?;
            let f = compile(find)?;
            let s = compile(start)?;
            let d = compile(default)?;
            Box::new(move |row| {
                let (Some(haystack), Some(needle)) = (text_of(&v(row)), text_of(&f(row)))
                else {
                    return d(row);
                };
                let start = s(row).as_f64().unwrap_or(0.0).max(0.0) as usize;
                match find_from(&haystack, &needle, start) {
                    Some(i) => JxValue::Int(i as i64),
                    None => d(row),
                }
            })
        }
        Expr::Slice { op, value, length } => {
            let op = *op;
            let v = compile(value)?;
            let n = compile(length)?;
            Box::new(move |row| {
                let (Some(text), Some(count)) = (text_of(&v(row)), n(row).as_f64()) else {
                    return JxValue::Null;
                };
                // Counts are characters, not bytes.
                let total = text.chars().count();
                let count = (count.max(0.0) as usize).min(total);
                let split = match op {
                    SliceOp::Left | SliceOp::NotLeft => byte_of_char(&text, count),
                    SliceOp::Right | SliceOp::NotRight => byte_of_char(&text, total - count),
                };
                let keep_front = matches!(op, SliceOp::Left | SliceOp::NotRight);
                let slice = if keep_front {
                    &text[..split]
                } else {
                    &text[split..]
                };
                JxValue::Text(slice.to_string())
            })
        }
        Expr::Length(t) => {
            let t = compile(t)?;
            Box::new(move |row| match text_of(&t(row)) {
                Some(s) => JxValue::Int(s.chars().count() as i64),
                None => JxValue::Null,
            })
        }
        Expr::First(t) => {
            let t = compile(t)?;
            Box::new(move |row| match t(row) {
                JxValue::Array(items) => items.into_iter().next().unwrap_or(JxValue::Null),
                other => other,
            })
        }
        Expr::Last(t) => {
            let t = compile(t)?;
            Box::new(move |row| match t(row) {
                JxValue::Array(items) => items.into_iter().next_back().unwrap_or(JxValue::Null),
                other => other,
            })
        }

        Expr::Tuple(terms) => {
            let terms = compile_all(terms)?;
            Box::new(move |row| JxValue::Array(terms.iter().map(|t| t(row)).collect()))
        }
        Expr::Select(clauses) => {
            let clauses = clauses
                .iter()
                .map(|clause| Ok((clause.name.clone(), compile(&clause.value)?)))
                .collect::<Result<Vec<_>>>()?;
            Box::new(move |row| {
                let mut out = IndexMap::new();
                for (name, value) in &clauses {
                    out.insert(name.clone(), value(row));
                }
                JxValue::Object(out)
            })
        }
        Expr::Leaves(t) => {
            let t = compile(t)?;
            Box::new(move |row| {
                let mut out = IndexMap::new();
                flatten_leaves("", &t(row), &mut out);
                JxValue::Object(out)
            })
        }

        Expr::Cast { kind, term } => {
            let kind = *kind;
            let t = compile(term)?;
            Box::new(move |row| cast(kind, &t(row)))
        }
        Expr::IsType { kind, term } => {
            let kind = *kind;
            let t = compile(term)?;
            Box::new(move |row| {
                let typ = t(row).datatype();
                JxValue::Bool(match kind {
                    CastKind::Boolean => typ == DataType::Boolean,
                    CastKind::Integer => typ == DataType::Integer,
                    CastKind::Number => typ.is_numeric(),
                    CastKind::Text => typ == DataType::Text,
                })
            })
        }

        Expr::Agg { op, terms } => {
            let op = *op;
            let terms = compile_all(terms)?;
            Box::new(move |row| {
                let values: Vec<JxValue> = terms.iter().map(|t| t(row)).collect();
                aggregate(op, values)
            })
        }

        Expr::RegExp { value, pattern } => {
            let source = pattern.as_str().unwrap_or_default().to_string();
            // Whole-value match, like the store-side regexp filter.
            let regex = Regex::new(&format!("^(?:{source})$"))
                .map_err(|e| ExprError::invalid(format!("{source}: {e}")))?;
            let v = compile(value)?;
            Box::new(move |row| {
                JxValue::Bool(
                    text_of(&v(row))
                        .map(|s| regex.is_match(&s))
                        .unwrap_or(false),
                )
            })
        }

        Expr::Script(_) => return Err(ExprError::unsupported(expr.op(), Language::Rows)),
    };
    Ok(compiled)
}

fn compile_all(terms: &[Expr]) -> Result<Vec<RowFn>> {
    terms.iter().map(compile).collect()
}

/// Walk a dotted path through nested objects; `Null` at any absent step.
fn path_get(row: &JxValue, segments: &[String]) -> JxValue {
    let mut current = row;
    for segment in segments {
        match current {
            JxValue::Object(map) => match map.get(segment) {
                Some(next) => current = next,
                None => return JxValue::Null,
            },
            _ => return JxValue::Null,
        }
    }
    current.clone()
}

fn is_true(value: &JxValue) -> bool {
    matches!(value, JxValue::Bool(true))
}

/// Equality with the document-model quirks: a missing left side never
/// matches, and a scalar equals the singleton list containing it.
fn row_eq(lhs: &JxValue, rhs: &JxValue) -> bool {
    if lhs.is_null() {
        return false;
    }
    if lhs == rhs {
        return true;
    }
    match (lhs, rhs) {
        (JxValue::Array(items), other) | (other, JxValue::Array(items)) => {
            items.len() == 1 && &items[0] == other
        }
        _ => false,
    }
}

fn row_cmp(lhs: &JxValue, rhs: &JxValue) -> Option<std::cmp::Ordering> {
    match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => match (lhs.as_str(), rhs.as_str()) {
            (Some(a), Some(b)) => Some(a.cmp(b)),
            _ => None,
        },
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

fn text_of(value: &JxValue) -> Option<String> {
    match value {
        JxValue::Text(s) => Some(s.clone()),
        JxValue::Bool(b) => Some(b.to_string()),
        JxValue::Int(i) => Some(i.to_string()),
        JxValue::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

fn number(value: f64) -> JxValue {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        JxValue::Int(value as i64)
    } else {
        JxValue::Float(value)
    }
}

/// `None` means the computation is missing and the default applies.
fn arith(op: ArithOp, values: &[JxValue]) -> Option<JxValue> {
    if values.is_empty() {
        return None;
    }
    let numbers: Option<Vec<f64>> = values.iter().map(JxValue::as_f64).collect();
    let numbers = numbers?;

    let mut iter = numbers.iter().copied();
    let first = iter.next()?;
    let folded = iter.try_fold(first, |acc, n| match op {
        ArithOp::Add => Some(acc + n),
        ArithOp::Sub => Some(acc - n),
        ArithOp::Mul => Some(acc * n),
        ArithOp::Div => (n != 0.0).then(|| acc / n),
        ArithOp::Mod => (n != 0.0).then(|| acc.rem_euclid(n)),
        ArithOp::Exp => Some(acc.powf(n)),
    })?;

    let all_integer = values.iter().all(|v| matches!(v, JxValue::Int(_)));
    if all_integer && op.closed_over_integers() && folded.fract() == 0.0 {
        Some(JxValue::Int(folded as i64))
    } else {
        Some(JxValue::Float(folded))
    }
}

fn cast(kind: CastKind, value: &JxValue) -> JxValue {
    if value.is_null() {
        return JxValue::Null;
    }
    match kind {
        CastKind::Boolean => match value {
            JxValue::Bool(_) => value.clone(),
            JxValue::Int(i) => JxValue::Bool(*i != 0),
            JxValue::Float(f) => JxValue::Bool(*f != 0.0),
            JxValue::Text(s) => match s.as_str() {
                "true" | "T" => JxValue::Bool(true),
                "false" | "F" => JxValue::Bool(false),
                _ => JxValue::Null,
            },
            _ => JxValue::Null,
        },
        CastKind::Integer => match value {
            JxValue::Bool(b) => JxValue::Int(i64::from(*b)),
            JxValue::Int(_) => value.clone(),
            JxValue::Float(f) => JxValue::Int(f.trunc() as i64),
            JxValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(f) => JxValue::Int(f.trunc() as i64),
                Err(_) => JxValue::Null,
            },
            _ => JxValue::Null,
        },
        CastKind::Number => match value {
            JxValue::Bool(b) => JxValue::Int(i64::from(*b)),
            JxValue::Int(_) | JxValue::Float(_) => value.clone(),
            JxValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(f) => JxValue::Float(f),
                Err(_) => JxValue::Null,
            },
            _ => JxValue::Null,
        },
        CastKind::Text => match text_of(value) {
            Some(s) => JxValue::Text(s),
            None => JxValue::Null,
        },
    }
}

fn aggregate(op: AggOp, values: Vec<JxValue>) -> JxValue {
    match op {
        AggOp::Count => JxValue::Int(values.iter().filter(|v| !v.is_null()).count() as i64),
        AggOp::Max | AggOp::Min => {
            let numbers: Vec<f64> = values.iter().filter_map(JxValue::as_f64).collect();
            numbers
                .into_iter()
                .reduce(|a, b| if (op == AggOp::Max) == (a > b) { a } else { b })
                .map(number)
                .unwrap_or(JxValue::Null)
        }
        AggOp::Union => {
            let mut out: Vec<JxValue> = Vec::new();
            for value in values {
                let items = match value {
                    JxValue::Null => continue,
                    JxValue::Array(items) => items,
                    scalar => vec![scalar],
                };
                for item in items {
                    if !out.contains(&item) {
                        out.push(item);
                    }
                }
            }
            JxValue::Array(out)
        }
    }
}

/// Flatten nested objects into dotted leaf paths.
fn flatten_leaves(prefix: &str, value: &JxValue, out: &mut IndexMap<String, JxValue>) {
    match value {
        JxValue::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_leaves(&path, child, out);
            }
        }
        JxValue::Null => {}
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jx_expression::{parse_json, partial_eval, MemorySchema};
    use serde_json::json;

    fn row_fn(value: serde_json::Value) -> RowFn {
        let expr = parse_json(&value, None).expect("parse");
        let expr = partial_eval(&expr).expect("partial_eval");
        compile(&expr).expect("compile")
    }

    fn run(expr: serde_json::Value, row: serde_json::Value) -> JxValue {
        row_fn(expr)(&JxValue::from(row))
    }

    #[test]
    fn variables_walk_nested_paths() {
        let row = json!({"build": {"revision": "abc"}});
        assert_eq!(
            run(json!({"var": "build.revision"}), row.clone()),
            JxValue::Text("abc".into())
        );
        assert_eq!(run(json!({"var": "build.nope.deep"}), row), JxValue::Null);
    }

    #[test]
    fn filters_evaluate_per_row() {
        let f = row_fn(json!({"and": [
            {"eq": {"status": "ok"}},
            {"gt": {"bytes": 100}}
        ]}));
        assert_eq!(
            f(&JxValue::from(json!({"status": "ok", "bytes": 200}))),
            JxValue::Bool(true)
        );
        assert_eq!(
            f(&JxValue::from(json!({"status": "ok", "bytes": 10}))),
            JxValue::Bool(false)
        );
        assert_eq!(
            f(&JxValue::from(json!({"bytes": 200}))),
            JxValue::Bool(false)
        );
    }

    #[test]
    fn eq_scalar_matches_singleton_list() {
        let row = json!({"tags": ["a"]});
        assert_eq!(run(json!({"eq": {"tags": "a"}}), row), JxValue::Bool(true));
        let row = json!({"tags": ["a", "b"]});
        assert_eq!(run(json!({"eq": {"tags": "a"}}), row), JxValue::Bool(false));
    }

    #[test]
    fn eq_with_absent_left_side_is_false() {
        assert_eq!(run(json!({"eq": {"nope": "a"}}), json!({})), JxValue::Bool(false));
    }

    #[test]
    fn arithmetic_propagates_null_to_default() {
        assert_eq!(
            run(json!({"add": [{"var": "a"}, 1]}), json!({})),
            JxValue::Null
        );
        assert_eq!(
            run(json!({"add": [{"var": "a"}, 1], "default": 0}), json!({})),
            JxValue::Int(0)
        );
        assert_eq!(
            run(json!({"add": [{"var": "a"}, 1]}), json!({"a": 2})),
            JxValue::Int(3)
        );
    }

    #[test]
    fn division_by_zero_falls_back() {
        assert_eq!(
            run(json!({"div": [{"var": "a"}, {"var": "b"}], "default": -1}),
                json!({"a": 1, "b": 0})),
            JxValue::Int(-1)
        );
    }

    #[test]
    fn coalesce_picks_first_present_value() {
        let expr = json!({"coalesce": [{"var": "a"}, {"var": "b"}, 0]});
        assert_eq!(run(expr.clone(), json!({"b": 7})), JxValue::Int(7));
        assert_eq!(run(expr, json!({})), JxValue::Int(0));
    }

    #[test]
    fn when_selects_branches() {
        let expr = json!({"when": {"exists": "a"}, "then": {"var": "a"}, "else": "none"});
        assert_eq!(run(expr.clone(), json!({"a": 5})), JxValue::Int(5));
        assert_eq!(run(expr, json!({})), JxValue::Text("none".into()));
    }

    #[test]
    fn regexp_matches_whole_values() {
        let expr = json!({"regexp": [{"var": "name"}, "ab+c"]});
        assert_eq!(run(expr.clone(), json!({"name": "abbc"})), JxValue::Bool(true));
        assert_eq!(run(expr.clone(), json!({"name": "xabbc"})), JxValue::Bool(false));
        assert_eq!(run(expr, json!({})), JxValue::Bool(false));
    }

    #[test]
    fn select_builds_named_projections() {
        let expr = json!({"select": ["status", {"name": "kb", "value": {"div": [{"var": "bytes"}, 1024]}}]});
        let out = run(expr, json!({"status": "ok", "bytes": 2048}));
        let JxValue::Object(map) = out else {
            panic!("expected object")
        };
        assert_eq!(map["status"], JxValue::Text("ok".into()));
        assert_eq!(map["kb"], JxValue::Float(2.0));
    }

    #[test]
    fn leaves_flatten_nested_objects() {
        let expr = json!({"leaves": "build"});
        let out = run(expr, json!({"build": {"os": {"name": "linux"}, "rev": 7}}));
        let JxValue::Object(map) = out else {
            panic!("expected object")
        };
        assert_eq!(map["os.name"], JxValue::Text("linux".into()));
        assert_eq!(map["rev"], JxValue::Int(7));
    }

    #[test]
    fn script_is_unsupported() {
        let schema = MemorySchema::new();
        let expr = parse_json(&json!({"script": "doc.x"}), Some(&schema)).unwrap();
        let err = Rows.compile(&expr, &schema).err().expect("script must not compile");
        assert_eq!(err.to_string(), "operator script not supported on rows");
    }

    #[test]
    fn string_slicing_handles_multibyte_text() {
        let row = json!({"a": "é!"});
        assert_eq!(
            run(json!({"left": [{"var": "a"}, 1]}), row.clone()),
            JxValue::Text("é".into())
        );
        assert_eq!(
            run(json!({"not_left": [{"var": "a"}, 1]}), row.clone()),
            JxValue::Text("!".into())
        );
        assert_eq!(
            run(json!({"right": [{"var": "a"}, 1]}), row.clone()),
            JxValue::Text("!".into())
        );
        assert_eq!(
            run(json!({"not_right": [{"var": "a"}, 1]}), row),
            JxValue::Text("é".into())
        );
        assert_eq!(
            run(json!({"find": [{"var": "a"}, "x"], "start": 1}), json!({"a": "é!x"})),
            JxValue::Int(2)
        );
        assert_eq!(
            run(json!({"find": [{"var": "a"}, "!"], "start": 99}), json!({"a": "é!"})),
            JxValue::Null
        );
    }

    #[test]
    fn string_operators_evaluate() {
        assert_eq!(
            run(json!({"prefix": {"name": "ab"}}), json!({"name": "abc"})),
            JxValue::Bool(true)
        );
        assert_eq!(
            run(json!({"concat": [{"var": "a"}, {"var": "b"}], "separator": "-"}),
                json!({"a": "x", "b": "y"})),
            JxValue::Text("x-y".into())
        );
        assert_eq!(
            run(json!({"concat": [{"var": "a"}, {"var": "b"}], "separator": "-"}),
                json!({"b": "y"})),
            JxValue::Text("y".into())
        );
        assert_eq!(
            run(json!({"split": [{"var": "a"}, ","]}), json!({"a": "p,q"})),
            JxValue::Array(vec![JxValue::Text("p".into()), JxValue::Text("q".into())])
        );
    }
}
