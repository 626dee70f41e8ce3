//! # jx Expression Compiler
//!
//! JSON-encoded query expressions, compiled for heterogeneous stores.
//!
//! ## Architecture
//!
//! ```text
//! JSON ──parse──▶ Expr ──partial_eval──▶ Expr ──Backend::render──▶ artifact
//! ```
//!
//! - [`parse`] turns a JSON value into an immutable [`Expr`] tree,
//!   normalizing shorthand forms and resolving variable types against an
//!   optional [`Schema`].
//! - [`partial_eval`] simplifies the tree without any data: constant
//!   folding, boolean algebra, and missing-value propagation.
//! - A [`Backend`] renders a prepared tree into its target artifact.
//!   Backends for Elasticsearch filters, Painless scripts, and in-process
//!   row closures live in their own crates.
//!
//! ## Usage
//!
//! ```rust
//! use jx_expression::{parse_json, partial_eval, Expr};
//! use serde_json::json;
//!
//! let expr = parse_json(&json!({"and": [{"eq": {"a": 1}}, true]}), None)?;
//! let simplified = partial_eval(&expr)?;
//! assert_eq!(simplified, Expr::eq(Expr::var("a"), Expr::literal(1)));
//! # Ok::<(), jx_expression::ExprError>(())
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod foundation;
pub mod language;
pub mod parse;

pub use ast::{Expr, Literal, Op};
pub use error::{ExprError, Result};
pub use eval::{missing, partial_eval};
pub use foundation::{Column, DataType, JxValue, MemorySchema, Schema, Variable};
pub use language::{Backend, Language};
pub use parse::{parse, parse_json};
