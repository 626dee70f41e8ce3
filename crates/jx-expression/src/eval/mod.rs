//! Partial evaluation: algebraic simplification without data.
//!
//! `partial_eval` is a fixed-point rewrite over the tree. Each pass
//! simplifies children bottom-up and then applies the node rule; the loop
//! repeats until nothing changes. The pass is pure and rules strictly
//! shrink the tree apart from a bounded number of one-shot expansions
//! (De Morgan push-down, `missing` computation), so it terminates.

mod boolean;
mod fold;
mod missing;

pub use boolean::distribute_and_over_or;
pub use missing::missing;

use tracing::trace;

use crate::ast::{Expr, SelectClause, WhenClause};
use crate::error::Result;

/// Passes before giving up on reaching a fixed point. Rewrites shrink the
/// tree, so this is a safety net, not an expected path.
const MAX_PASSES: usize = 16;

/// Simplify an expression to a semantically equivalent fixed point.
///
/// Idempotent: `partial_eval(partial_eval(e)) == partial_eval(e)`.
pub fn partial_eval(expr: &Expr) -> Result<Expr> {
    let mut current = expr.clone();
    for pass in 0..MAX_PASSES {
        let next = step(&current)?;
        if next == current {
            trace!(passes = pass + 1, "partial_eval reached fixed point");
            return Ok(next);
        }
        current = next;
    }
    Ok(current)
}

/// One bottom-up rewrite pass.
fn step(expr: &Expr) -> Result<Expr> {
    let rebuilt = map_children(expr, &mut step)?;
    simplify_node(rebuilt)
}

/// Apply this node's rewrite rule. Children are already simplified.
fn simplify_node(expr: Expr) -> Result<Expr> {
    match expr {
        Expr::And(terms) => boolean::simplify_and(terms),
        Expr::Or(terms) => boolean::simplify_or(terms),
        Expr::Not(term) => boolean::simplify_not(*term),

        Expr::Eq { lhs, rhs } => fold::simplify_eq(*lhs, *rhs),
        Expr::Ne { lhs, rhs } => fold::simplify_ne(*lhs, *rhs),
        Expr::Cmp { op, lhs, rhs } => fold::simplify_cmp(op, *lhs, *rhs),
        Expr::Arith { op, terms, default } => fold::simplify_arith(op, terms, *default),
        Expr::Floor { term, modulo } => fold::simplify_floor(*term, *modulo),

        Expr::When { when, then, els } => fold::simplify_when(*when, *then, *els),
        Expr::Case { clauses, els } => fold::simplify_case(clauses, *els),
        Expr::Coalesce(terms) => fold::simplify_coalesce(terms),

        Expr::Missing(term) => Ok(missing::simplify_missing(*term)),
        Expr::Exists(term) => Ok(missing::simplify_exists(*term)),

        Expr::In { value, superset } => fold::simplify_in(*value, *superset),
        Expr::Prefix { value, prefix } => fold::simplify_prefix(*value, *prefix),
        Expr::Suffix { value, suffix } => fold::simplify_suffix(*value, *suffix),
        Expr::Concat { terms, separator } => fold::simplify_concat(terms, *separator),
        Expr::Find {
            value,
            find,
            start,
            default,
        } => fold::simplify_find(*value, *find, *start, *default),
        Expr::Slice { op, value, length } => fold::simplify_slice(op, *value, *length),
        Expr::Length(term) => fold::simplify_length(*term),
        Expr::First(term) => fold::simplify_first(*term),
        Expr::Last(term) => fold::simplify_last(*term),

        Expr::Cast { kind, term } => fold::simplify_cast(kind, *term),
        Expr::IsType { kind, term } => fold::simplify_is_type(kind, *term),
        Expr::Agg { op, terms } => fold::simplify_agg(op, terms),

        Expr::BasicEq { lhs, rhs } => fold::simplify_basic_eq(*lhs, *rhs),
        Expr::BasicStartsWith { value, prefix } => {
            fold::simplify_basic_starts_with(*value, *prefix)
        }
        Expr::BasicIn { value, superset } => fold::simplify_basic_in(*value, *superset),

        // Leaves of the rewrite system.
        other => Ok(other),
    }
}

/// Rebuild a node with `f` applied to every direct child.
fn map_children(expr: &Expr, f: &mut impl FnMut(&Expr) -> Result<Expr>) -> Result<Expr> {
    let mapped = match expr {
        Expr::Variable(_) | Expr::Literal(_) | Expr::Script(_) => expr.clone(),

        Expr::And(terms) => Expr::And(map_all(terms, f)?),
        Expr::Or(terms) => Expr::Or(map_all(terms, f)?),
        Expr::Not(t) => Expr::Not(Box::new(f(t)?)),

        Expr::Eq { lhs, rhs } => Expr::Eq {
            lhs: Box::new(f(lhs)?),
            rhs: Box::new(f(rhs)?),
        },
        Expr::Ne { lhs, rhs } => Expr::Ne {
            lhs: Box::new(f(lhs)?),
            rhs: Box::new(f(rhs)?),
        },
        Expr::Cmp { op, lhs, rhs } => Expr::Cmp {
            op: *op,
            lhs: Box::new(f(lhs)?),
            rhs: Box::new(f(rhs)?),
        },
        Expr::Arith { op, terms, default } => Expr::Arith {
            op: *op,
            terms: map_all(terms, f)?,
            default: Box::new(f(default)?),
        },
        Expr::Floor { term, modulo } => Expr::Floor {
            term: Box::new(f(term)?),
            modulo: Box::new(f(modulo)?),
        },
        Expr::When { when, then, els } => Expr::When {
            when: Box::new(f(when)?),
            then: Box::new(f(then)?),
            els: Box::new(f(els)?),
        },
        Expr::Case { clauses, els } => Expr::Case {
            clauses: clauses
                .iter()
                .map(|clause| {
                    Ok(WhenClause {
                        when: f(&clause.when)?,
                        then: f(&clause.then)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            els: Box::new(f(els)?),
        },
        Expr::Coalesce(terms) => Expr::Coalesce(map_all(terms, f)?),
        Expr::Missing(t) => Expr::Missing(Box::new(f(t)?)),
        Expr::Exists(t) => Expr::Exists(Box::new(f(t)?)),
        Expr::In { value, superset } => Expr::In {
            value: Box::new(f(value)?),
            superset: Box::new(f(superset)?),
        },
        Expr::Between { value, low, high } => Expr::Between {
            value: Box::new(f(value)?),
            low: Box::new(f(low)?),
            high: Box::new(f(high)?),
        },
        Expr::Prefix { value, prefix } => Expr::Prefix {
            value: Box::new(f(value)?),
            prefix: Box::new(f(prefix)?),
        },
        Expr::Suffix { value, suffix } => Expr::Suffix {
            value: Box::new(f(value)?),
            suffix: Box::new(f(suffix)?),
        },
        Expr::Concat { terms, separator } => Expr::Concat {
            terms: map_all(terms, f)?,
            separator: Box::new(f(separator)?),
        },
        Expr::Split { value, separator } => Expr::Split {
            value: Box::new(f(value)?),
            separator: Box::new(f(separator)?),
        },
        Expr::Find {
            value,
            find,
            start,
            default,
        } => Expr::Find {
            value: Box::new(f(value)?),
            find: Box::new(f(find)?),
            start: Box::new(f(start)?),
            default: Box::new(f(default)?),
        },
        Expr::Slice { op, value, length } => Expr::Slice {
            op: *op,
            value: Box::new(f(value)?),
            length: Box::new(f(length)?),
        },
        Expr::Length(t) => Expr::Length(Box::new(f(t)?)),
        Expr::First(t) => Expr::First(Box::new(f(t)?)),
        Expr::Last(t) => Expr::Last(Box::new(f(t)?)),
        Expr::Tuple(terms) => Expr::Tuple(map_all(terms, f)?),
        Expr::Select(clauses) => Expr::Select(
            clauses
                .iter()
                .map(|clause| {
                    Ok(SelectClause {
                        name: clause.name.clone(),
                        value: f(&clause.value)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        Expr::Leaves(t) => Expr::Leaves(Box::new(f(t)?)),
        Expr::Cast { kind, term } => Expr::Cast {
            kind: *kind,
            term: Box::new(f(term)?),
        },
        Expr::IsType { kind, term } => Expr::IsType {
            kind: *kind,
            term: Box::new(f(term)?),
        },
        Expr::Agg { op, terms } => Expr::Agg {
            op: *op,
            terms: map_all(terms, f)?,
        },
        Expr::RegExp { value, pattern } => Expr::RegExp {
            value: Box::new(f(value)?),
            pattern: pattern.clone(),
        },
        Expr::BasicEq { lhs, rhs } => Expr::BasicEq {
            lhs: Box::new(f(lhs)?),
            rhs: Box::new(f(rhs)?),
        },
        Expr::BasicStartsWith { value, prefix } => Expr::BasicStartsWith {
            value: Box::new(f(value)?),
            prefix: Box::new(f(prefix)?),
        },
        Expr::BasicIn { value, superset } => Expr::BasicIn {
            value: Box::new(f(value)?),
            superset: Box::new(f(superset)?),
        },
    };
    Ok(mapped)
}

fn map_all(terms: &[Expr], f: &mut impl FnMut(&Expr) -> Result<Expr>) -> Result<Vec<Expr>> {
    terms.iter().map(|t| f(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ArithOp;

    #[test]
    fn idempotent_on_mixed_tree() {
        let expr = Expr::not(Expr::and(vec![
            Expr::eq(Expr::var("a"), Expr::literal(1)),
            Expr::or(vec![Expr::var("b"), Expr::FALSE]),
        ]));
        let once = partial_eval(&expr).unwrap();
        let twice = partial_eval(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn constant_folding_add() {
        let expr = Expr::arith(ArithOp::Add, vec![Expr::literal(2), Expr::literal(3)]);
        assert_eq!(partial_eval(&expr).unwrap(), Expr::literal(5));
    }

    #[test]
    fn de_morgan_equivalence() {
        let a = Expr::eq(Expr::var("a"), Expr::literal(1));
        let b = Expr::cmp(
            crate::ast::CmpOp::Gt,
            Expr::var("b"),
            Expr::literal(2),
        );
        let lhs = partial_eval(&Expr::not(Expr::and(vec![a.clone(), b.clone()]))).unwrap();
        let rhs = partial_eval(&Expr::or(vec![Expr::not(a), Expr::not(b)])).unwrap();
        assert_eq!(lhs, rhs);
    }
}
