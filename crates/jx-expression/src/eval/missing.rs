//! The missing-value predicate.
//!
//! `missing(e)` is an ordinary boolean expression describing when `e`
//! evaluates to no value. Computing it symbolically lets three-valued
//! logic ride on the regular boolean simplifier instead of a separate
//! truth system: backends render the predicate like any other filter.

use crate::ast::{AggOp, Expr};

/// Build the boolean expression that is true exactly when `expr` has no
/// value.
///
/// The result is not simplified; callers run it through the usual
/// rewrite passes.
pub fn missing(expr: &Expr) -> Expr {
    match expr {
        Expr::Literal(l) => {
            if l.is_null() {
                Expr::TRUE
            } else {
                Expr::FALSE
            }
        }
        // Left symbolic: only the store knows whether a column has data.
        Expr::Variable(_) => Expr::Missing(Box::new(expr.clone())),

        // Boolean connectives and predicates always produce a value.
        Expr::And(_)
        | Expr::Or(_)
        | Expr::Not(_)
        | Expr::Eq { .. }
        | Expr::Ne { .. }
        | Expr::In { .. }
        | Expr::Between { .. }
        | Expr::Prefix { .. }
        | Expr::Suffix { .. }
        | Expr::Missing(_)
        | Expr::Exists(_)
        | Expr::IsType { .. }
        | Expr::RegExp { .. }
        | Expr::Script(_)
        | Expr::Tuple(_)
        | Expr::Select(_)
        | Expr::Leaves(_)
        | Expr::BasicEq { .. }
        | Expr::BasicStartsWith { .. }
        | Expr::BasicIn { .. } => Expr::FALSE,

        // Strict operators: missing whenever any operand is missing.
        Expr::Cmp { lhs, rhs, .. } => any_missing(&[lhs.as_ref(), rhs.as_ref()]),
        Expr::Arith { terms, default, .. } => {
            // A default plugs every hole.
            if default.is_literal(&crate::ast::literal::NULL) {
                any_missing(&terms.iter().collect::<Vec<_>>())
            } else {
                Expr::FALSE
            }
        }
        Expr::Floor { term, modulo } => any_missing(&[term.as_ref(), modulo.as_ref()]),
        Expr::Slice { value, length, .. } => any_missing(&[value.as_ref(), length.as_ref()]),
        Expr::Split { value, separator } => any_missing(&[value.as_ref(), separator.as_ref()]),
        Expr::Find {
            value,
            find,
            default,
            ..
        } => {
            if default.is_literal(&crate::ast::literal::NULL) {
                any_missing(&[value.as_ref(), find.as_ref()])
            } else {
                Expr::FALSE
            }
        }
        Expr::Length(term) => missing(term),
        Expr::First(term) => missing(term),
        Expr::Last(term) => missing(term),
        Expr::Cast { term, .. } => missing(term),

        Expr::When { when, then, els } => Expr::Or(vec![
            Expr::And(vec![(**when).clone(), missing(then)]),
            Expr::And(vec![Expr::not((**when).clone()), missing(els)]),
        ]),
        Expr::Case { clauses, els } => {
            // Some branch must be taken and come up empty.
            let mut branches: Vec<Expr> = clauses
                .iter()
                .map(|clause| Expr::And(vec![clause.when.clone(), missing(&clause.then)]))
                .collect();
            branches.push(Expr::And(
                clauses
                    .iter()
                    .map(|clause| Expr::not(clause.when.clone()))
                    .chain(std::iter::once(missing(els)))
                    .collect(),
            ));
            Expr::Or(branches)
        }
        Expr::Coalesce(terms) => Expr::And(terms.iter().map(missing).collect()),
        // Concatenation skips missing parts; it is empty only when all are.
        Expr::Concat { terms, .. } => Expr::And(terms.iter().map(missing).collect()),

        Expr::Agg { op, terms } => match op {
            AggOp::Count => Expr::FALSE,
            AggOp::Max | AggOp::Min | AggOp::Union => {
                Expr::And(terms.iter().map(missing).collect())
            }
        },
    }
}

fn any_missing(terms: &[&Expr]) -> Expr {
    Expr::Or(terms.iter().map(|t| missing(t)).collect())
}

/// Rewrite rule for an explicit `missing` node over a simplified operand.
pub(super) fn simplify_missing(term: Expr) -> Expr {
    match term {
        Expr::Literal(l) => {
            if l.is_null() {
                Expr::TRUE
            } else {
                Expr::FALSE
            }
        }
        Expr::Variable(_) => Expr::Missing(Box::new(term)),
        other => missing(&other),
    }
}

/// Rewrite rule for `exists`, the complement of [`simplify_missing`].
pub(super) fn simplify_exists(term: Expr) -> Expr {
    match term {
        Expr::Literal(l) => {
            if l.is_null() {
                Expr::FALSE
            } else {
                Expr::TRUE
            }
        }
        Expr::Variable(_) => Expr::Exists(Box::new(term)),
        other => Expr::not(missing(&other)),
    }
}
