//! # Elasticsearch backends
//!
//! Two [`Backend`] implementations over the shared expression tree:
//!
//! - [`Es52`] renders Query DSL filters (`serde_json::Value`), falling
//!   back to embedded script filters where no native filter exists.
//! - [`Painless`] renders [`EsScript`] values: script text with
//!   missing-test and type tracking, for script fields and sort keys.

pub mod filter;
pub mod painless;

pub use filter::{es_filter, match_all, match_none};
pub use painless::{EsScript, MissScript};

use jx_expression::eval::distribute_and_over_or;
use jx_expression::{partial_eval, Backend, Expr, Language, Result, Schema};

/// Query DSL filter backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Es52;

impl Backend for Es52 {
    type Artifact = serde_json::Value;

    fn language(&self) -> Language {
        Language::Es52
    }

    /// Filters want flat conjunction lists, so distribute `and` over `or`
    /// and lower equality to its basic form where null handling is proven
    /// unnecessary.
    fn prepare(&self, expr: &Expr) -> Result<Expr> {
        let simplified = partial_eval(expr)?;
        let distributed = distribute_and_over_or(&simplified);
        partial_eval(&lower_basic(&distributed))
    }

    fn render(&self, expr: &Expr, schema: &dyn Schema) -> Result<Self::Artifact> {
        es_filter(expr, schema)
    }
}

/// Painless script backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Painless;

impl Backend for Painless {
    type Artifact = EsScript;

    fn language(&self) -> Language {
        Language::Painless
    }

    fn render(&self, expr: &Expr, schema: &dyn Schema) -> Result<Self::Artifact> {
        painless::painless(expr, schema)
    }
}

/// Rewrite `eq` to `basic.eq` where neither side can be missing.
fn lower_basic(expr: &Expr) -> Expr {
    match expr {
        Expr::Eq { lhs, rhs } => {
            let lhs = lower_basic(lhs);
            let rhs = lower_basic(rhs);
            let provably_present = jx_expression::missing(&lhs).is_literal(&jx_expression::ast::FALSE)
                && jx_expression::missing(&rhs).is_literal(&jx_expression::ast::FALSE);
            if provably_present {
                Expr::BasicEq {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            } else {
                Expr::eq(lhs, rhs)
            }
        }
        Expr::And(terms) => Expr::And(terms.iter().map(lower_basic).collect()),
        Expr::Or(terms) => Expr::Or(terms.iter().map(lower_basic).collect()),
        Expr::Not(t) => Expr::Not(Box::new(lower_basic(t))),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jx_expression::{parse_json, DataType, MemorySchema};
    use serde_json::json;

    fn schema() -> MemorySchema {
        MemorySchema::new().with_column("status", "status.~s~", DataType::Text)
    }

    #[test]
    fn es52_compiles_the_whole_pipeline() {
        let schema = schema();
        let expr = parse_json(
            &json!({"and": [{"eq": {"status": "ok"}}, true]}),
            Some(&schema),
        )
        .unwrap();
        let query = Es52.compile(&expr, &schema).unwrap();
        assert_eq!(query, json!({"term": {"status.~s~": "ok"}}));
    }

    #[test]
    fn es52_prepare_reaches_disjunctive_normal_form() {
        let schema = schema();
        let expr = parse_json(
            &json!({"and": [
                {"or": [{"eq": {"status": "a"}}, {"eq": {"status": "b"}}]},
                {"exists": "status"}
            ]}),
            Some(&schema),
        )
        .unwrap();
        let prepared = Es52.prepare(&expr).unwrap();
        let Expr::Or(branches) = &prepared else {
            panic!("expected a disjunction, got {prepared:?}")
        };
        assert_eq!(branches.len(), 2);
        assert!(branches.iter().all(|b| matches!(b, Expr::And(_))));
    }

    #[test]
    fn painless_compiles_the_whole_pipeline() {
        let schema = schema();
        let expr = parse_json(&json!({"missing": "status"}), Some(&schema)).unwrap();
        let script = Painless.compile(&expr, &schema).unwrap();
        assert_eq!(script.expr, "doc[\"status.~s~\"].empty");
    }

    #[test]
    fn literal_equality_lowers_to_basic_form() {
        let lowered = lower_basic(&Expr::eq(Expr::literal("a"), Expr::literal("b")));
        assert!(matches!(lowered, Expr::BasicEq { .. }));

        let kept = lower_basic(&Expr::eq(Expr::var("x"), Expr::literal("b")));
        assert!(matches!(kept, Expr::Eq { .. }));
    }
}
