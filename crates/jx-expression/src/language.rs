//! Target languages and the backend contract.
//!
//! A backend owns the specialized behavior for each operator on one target.
//! Dispatch is a single exhaustive match inside each backend's `render`;
//! an operator with no arm is an explicit [`ExprError::UnsupportedOperator`]
//! naming both the operator and the backend. Retargeting a tree is passing
//! it to another backend — the tree itself never changes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ast::Expr;
use crate::error::Result;
use crate::eval::partial_eval;
use crate::foundation::Schema;

/// Identifier of a target language, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// The generic expression language itself
    Jx,
    /// Elasticsearch filter DSL
    Es52,
    /// Painless scripts embedded in Elasticsearch queries
    Painless,
    /// Compiled row-evaluation closures
    Rows,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::Jx => "jx",
            Language::Es52 => "es52",
            Language::Painless => "painless",
            Language::Rows => "rows",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A code generator for one target language.
pub trait Backend {
    /// The backend-native artifact produced from an expression.
    type Artifact;

    /// Which language this backend targets.
    fn language(&self) -> Language;

    /// Backend-aware simplification pass, run after the generic one.
    ///
    /// The default is the generic partial evaluation; backends override to
    /// add rewrites their target requires (e.g. distribution into
    /// disjunctive normal form for flat filter lists).
    fn prepare(&self, expr: &Expr) -> Result<Expr> {
        partial_eval(expr)
    }

    /// Render an already-prepared expression to the target artifact.
    fn render(&self, expr: &Expr, schema: &dyn Schema) -> Result<Self::Artifact>;

    /// Full pipeline: simplify for this backend, then render.
    fn compile(&self, expr: &Expr, schema: &dyn Schema) -> Result<Self::Artifact> {
        let prepared = self.prepare(expr)?;
        tracing::debug!(language = %self.language(), "rendering expression");
        self.render(&prepared, schema)
    }
}
