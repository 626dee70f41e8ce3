//! Boolean algebra: flattening, identity elements, De Morgan push-down.

use crate::ast::{literal, Expr, Literal};
use crate::error::{ExprError, Result};
use crate::foundation::DataType;

/// Size guard for DNF distribution.
const MAX_DISTRIBUTED_TERMS: usize = 32;

/// `and` over simplified terms.
///
/// Flattens nested `and`s, drops `true`, deduplicates, and collapses to
/// `false` when a term and its syntactic negation are both present. A
/// missing (`null`) condition does not hold, so it behaves as `false`.
pub(super) fn simplify_and(terms: Vec<Expr>) -> Result<Expr> {
    let mut out: Vec<Expr> = Vec::with_capacity(terms.len());
    for term in flatten(terms, is_and) {
        match boolean_value(&term)? {
            Some(true) => continue,
            Some(false) => return Ok(Expr::FALSE),
            None => {
                if !out.contains(&term) {
                    out.push(term);
                }
            }
        }
    }
    if contains_contradiction(&out) {
        return Ok(Expr::FALSE);
    }
    Ok(match out.len() {
        0 => Expr::TRUE,
        1 => out.into_iter().next().expect("len checked"),
        _ => Expr::And(out),
    })
}

/// `or` over simplified terms, dual to [`simplify_and`].
pub(super) fn simplify_or(terms: Vec<Expr>) -> Result<Expr> {
    let mut out: Vec<Expr> = Vec::with_capacity(terms.len());
    for term in flatten(terms, is_or) {
        match boolean_value(&term)? {
            Some(false) => continue,
            Some(true) => return Ok(Expr::TRUE),
            None => {
                if !out.contains(&term) {
                    out.push(term);
                }
            }
        }
    }
    if contains_contradiction(&out) {
        return Ok(Expr::TRUE);
    }
    Ok(match out.len() {
        0 => Expr::FALSE,
        1 => out.into_iter().next().expect("len checked"),
        _ => Expr::Or(out),
    })
}

/// `not` over a simplified term: literal folding plus negation push-down.
pub(super) fn simplify_not(term: Expr) -> Result<Expr> {
    let rewritten = match term {
        Expr::Literal(l) => match boolean_literal(&l)? {
            Some(b) => {
                if b {
                    Expr::FALSE
                } else {
                    Expr::TRUE
                }
            }
            // not(null): the condition does not hold, so its negation does.
            None => Expr::TRUE,
        },
        Expr::Not(inner) => *inner,
        Expr::And(terms) => Expr::Or(terms.into_iter().map(Expr::not).collect()),
        Expr::Or(terms) => Expr::And(terms.into_iter().map(Expr::not).collect()),
        Expr::When { when, then, els } => Expr::When {
            when,
            then: Box::new(Expr::not(*then)),
            els: Box::new(Expr::not(*els)),
        },
        Expr::Missing(inner) => Expr::Exists(inner),
        Expr::Exists(inner) => Expr::Missing(inner),
        other => return Ok(Expr::Not(Box::new(other))),
    };
    Ok(rewritten)
}

/// Distribute `and` over `or` until no `or` sits directly under an `and`.
///
/// Backends that require flat filter lists use this to reach disjunctive
/// normal form. Distribution is skipped when it would blow past
/// [`MAX_DISTRIBUTED_TERMS`].
pub fn distribute_and_over_or(expr: &Expr) -> Expr {
    match expr {
        Expr::And(terms) => {
            let terms: Vec<Expr> = terms.iter().map(distribute_and_over_or).collect();
            let position = terms.iter().position(|t| matches!(t, Expr::Or(_)));
            match position {
                Some(i) => {
                    let Expr::Or(branches) = terms[i].clone() else {
                        unreachable!("position found an or");
                    };
                    if branches.len() * terms.len() > MAX_DISTRIBUTED_TERMS {
                        return Expr::And(terms);
                    }
                    let rest: Vec<Expr> = terms
                        .iter()
                        .enumerate()
                        .filter(|(j, _)| *j != i)
                        .map(|(_, t)| t.clone())
                        .collect();
                    Expr::Or(
                        branches
                            .into_iter()
                            .map(|branch| {
                                let mut conj = vec![branch];
                                conj.extend(rest.iter().cloned());
                                distribute_and_over_or(&Expr::And(conj))
                            })
                            .collect(),
                    )
                }
                None => Expr::And(terms),
            }
        }
        Expr::Or(terms) => Expr::Or(terms.iter().map(distribute_and_over_or).collect()),
        Expr::Not(t) => Expr::Not(Box::new(distribute_and_over_or(t))),
        other => other.clone(),
    }
}

fn is_and(expr: &Expr) -> Option<&[Expr]> {
    match expr {
        Expr::And(terms) => Some(terms),
        _ => None,
    }
}

fn is_or(expr: &Expr) -> Option<&[Expr]> {
    match expr {
        Expr::Or(terms) => Some(terms),
        _ => None,
    }
}

/// Flatten one connective through itself (associativity).
fn flatten(terms: Vec<Expr>, nested: impl Fn(&Expr) -> Option<&[Expr]> + Copy) -> Vec<Expr> {
    let mut out = Vec::with_capacity(terms.len());
    for term in terms {
        match nested(&term) {
            Some(inner) => out.extend(flatten(inner.to_vec(), nested)),
            None => out.push(term),
        }
    }
    out
}

/// A term alongside its syntactic negation decides the whole connective.
fn contains_contradiction(terms: &[Expr]) -> bool {
    terms.iter().any(|term| {
        let negated = match term {
            Expr::Not(inner) => (**inner).clone(),
            other => Expr::not(other.clone()),
        };
        terms.contains(&negated)
    })
}

/// The statically known truth of a term: `None` when undecided.
///
/// A non-boolean literal in boolean position is a hard error, mirroring
/// the "expecting boolean value" checks in the simplifier contract.
fn boolean_value(term: &Expr) -> Result<Option<bool>> {
    match term {
        Expr::Literal(l) => match boolean_literal(l)? {
            Some(b) => Ok(Some(b)),
            // A missing condition does not hold.
            None => Ok(Some(false)),
        },
        _ => Ok(None),
    }
}

fn boolean_literal(l: &Literal) -> Result<Option<bool>> {
    if *l == literal::TRUE {
        Ok(Some(true))
    } else if *l == literal::FALSE {
        Ok(Some(false))
    } else if l.is_null() {
        Ok(None)
    } else {
        Err(ExprError::TypeMismatch {
            expected: DataType::Boolean,
            found: l.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::partial_eval;

    #[test]
    fn empty_and_is_true_empty_or_is_false() {
        assert_eq!(partial_eval(&Expr::And(vec![])).unwrap(), Expr::TRUE);
        assert_eq!(partial_eval(&Expr::Or(vec![])).unwrap(), Expr::FALSE);
    }

    #[test]
    fn and_short_circuits_on_false() {
        let expr = Expr::and(vec![Expr::var("a"), Expr::FALSE, Expr::var("b")]);
        assert_eq!(partial_eval(&expr).unwrap(), Expr::FALSE);
    }

    #[test]
    fn or_short_circuits_on_true() {
        let expr = Expr::or(vec![Expr::var("a"), Expr::TRUE]);
        assert_eq!(partial_eval(&expr).unwrap(), Expr::TRUE);
    }

    #[test]
    fn nested_connectives_flatten_and_dedup() {
        let a = Expr::eq(Expr::var("a"), Expr::literal(1));
        let expr = Expr::and(vec![
            a.clone(),
            Expr::and(vec![a.clone(), Expr::TRUE]),
        ]);
        assert_eq!(partial_eval(&expr).unwrap(), a);
    }

    #[test]
    fn contradiction_collapses_and() {
        let a = Expr::eq(Expr::var("a"), Expr::literal(1));
        let expr = Expr::and(vec![a.clone(), Expr::not(a)]);
        assert_eq!(partial_eval(&expr).unwrap(), Expr::FALSE);
    }

    #[test]
    fn double_negation_cancels() {
        let a = Expr::eq(Expr::var("a"), Expr::literal(1));
        assert_eq!(partial_eval(&Expr::not(Expr::not(a.clone()))).unwrap(), a);
    }

    #[test]
    fn not_of_non_boolean_literal_is_type_error() {
        let result = partial_eval(&Expr::not(Expr::literal(5)));
        assert!(matches!(result, Err(ExprError::TypeMismatch { .. })));
    }

    #[test]
    fn not_missing_becomes_exists() {
        let expr = Expr::not(Expr::Missing(Box::new(Expr::var("a"))));
        assert_eq!(
            partial_eval(&expr).unwrap(),
            Expr::Exists(Box::new(Expr::var("a")))
        );
    }

    #[test]
    fn distribution_reaches_dnf() {
        let a = Expr::var("a");
        let b = Expr::var("b");
        let c = Expr::var("c");
        let expr = Expr::and(vec![Expr::or(vec![a.clone(), b.clone()]), c.clone()]);
        let dnf = distribute_and_over_or(&expr);
        assert_eq!(
            dnf,
            Expr::or(vec![
                Expr::and(vec![a, c.clone()]),
                Expr::and(vec![b, c]),
            ])
        );
    }
}
