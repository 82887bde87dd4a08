//! # langsec-sql
//!
//! SQL analysis for LangSec: everything between a raw query string and the
//! resolved form the rule engine judges.
//!
//! The pipeline has three stages, each a pure function of its input and the
//! schema:
//!
//! 1. [`gate::check`] — cheap lexical rejections on the raw string (length,
//!    forbidden keywords, injection heuristics).
//! 2. [`parser::parse`] — the adapter over `sqlparser`, producing the
//!    canonical [`ast`] shape. This module is the only place that names
//!    `sqlparser` types.
//! 3. [`resolver::resolve`] — scope construction and identifier resolution,
//!    producing a [`resolver::ResolvedQuery`] in which every column
//!    reference carries its base table.

pub mod ast;
pub mod gate;
pub mod parser;
pub mod resolver;

mod span;

pub use resolver::{
    AggregateTarget, ColumnRole, ResolvedAggregate, ResolvedColumn, ResolvedJoin, ResolvedQuery,
    ScopeId, ScopeInfo,
};
