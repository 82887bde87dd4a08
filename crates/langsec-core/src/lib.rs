//! # langsec-core
//!
//! Shared model types for LangSec: the declarative [`SecuritySchema`] a query
//! is validated against, the [`GuardConfig`] consumed by the outer façade,
//! and the [`Diagnostic`] value every failed validation produces.
//!
//! The schema is constructed once — from a builder or from YAML — checked for
//! consistency at that point, and treated as read-only afterwards. Validators
//! only ever hold a shared reference to it.

pub mod config;
pub mod diagnostics;
pub mod schema;

pub use config::GuardConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, Location};
pub use schema::{
    Access, AggregationType, ColumnSchema, JoinType, SchemaError, SecuritySchema,
    SecuritySchemaBuilder, SqlOperation, TableSchema,
};
