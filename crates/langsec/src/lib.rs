//! # langsec
//!
//! A policy-enforcement layer that inspects a SQL statement before it is
//! dispatched to a database, approving it only if every table, column,
//! join, aggregation, and structural feature it touches is permitted by a
//! declarative [`SecuritySchema`]. Built for applications that accept SQL
//! from low-trust sources — most prominently LLM-based text-to-SQL — and
//! need a deterministic gate between query generation and execution.
//!
//! ```no_run
//! use langsec::{ColumnSchema, SecuritySchema, SqlSecurityGuard, TableSchema};
//! use std::collections::HashMap;
//!
//! let schema = SecuritySchema::builder()
//!     .table(
//!         "users",
//!         TableSchema {
//!             columns: HashMap::from([
//!                 ("id".to_string(), ColumnSchema::read()),
//!                 ("email".to_string(), ColumnSchema::denied()),
//!             ]),
//!             ..Default::default()
//!         },
//!     )
//!     .build()
//!     .unwrap();
//!
//! let guard = SqlSecurityGuard::new(schema);
//! assert!(guard.check_query("SELECT id FROM users").is_ok());
//! assert!(guard.check_query("SELECT email FROM users").is_err());
//! ```
//!
//! Validation is a pure function of `(schema, query)`: no I/O, no shared
//! mutable state, deterministic outcomes. The guard can therefore be shared
//! freely across threads; the only side effect it can be configured to have
//! is appending to the query log.

use std::sync::Arc;

use thiserror::Error;

pub use langsec_audit::{
    AuditError, FileSink, QueryLogEvent, QueryLogSink, QueryOutcome, TracingSink,
};
pub use langsec_core::{
    Access, AggregationType, ColumnSchema, Diagnostic, DiagnosticKind, GuardConfig, JoinType,
    Location, SchemaError, SecuritySchema, SqlOperation, TableSchema,
};
pub use langsec_policy::{FailureMode, QueryEngine};

/// Errors raised while constructing a guard. Validation failures are not
/// errors of this type — they are [`Diagnostic`] values.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

/// The main entry point: a frozen schema, the façade configuration, and an
/// optional query log sink.
pub struct SqlSecurityGuard {
    schema: SecuritySchema,
    config: GuardConfig,
    sink: Option<Arc<dyn QueryLogSink>>,
}

impl SqlSecurityGuard {
    /// A guard with the default configuration: violations are raised,
    /// nothing is logged.
    pub fn new(schema: SecuritySchema) -> Self {
        Self {
            schema,
            config: GuardConfig::default(),
            sink: None,
        }
    }

    /// A guard with explicit façade configuration. Opens the query log when
    /// `log_queries` is set: a JSON-lines file at `log_path`, or the
    /// `tracing` subscriber when no path is given.
    pub fn with_config(schema: SecuritySchema, config: GuardConfig) -> Result<Self, GuardError> {
        let sink: Option<Arc<dyn QueryLogSink>> = if config.log_queries {
            match &config.log_path {
                Some(path) => Some(Arc::new(FileSink::open(path)?)),
                None => Some(Arc::new(TracingSink)),
            }
        } else {
            None
        };
        Ok(Self {
            schema,
            config,
            sink,
        })
    }

    /// A guard with a caller-provided log sink.
    pub fn with_sink(
        schema: SecuritySchema,
        config: GuardConfig,
        sink: Arc<dyn QueryLogSink>,
    ) -> Self {
        Self {
            schema,
            config,
            sink: Some(sink),
        }
    }

    /// The schema this guard enforces.
    pub fn schema(&self) -> &SecuritySchema {
        &self.schema
    }

    /// Validate a query; the engine result, unfiltered by façade options.
    pub fn check_query(&self, query: &str) -> Result<(), Diagnostic> {
        let result = QueryEngine::new(&self.schema).validate_first(query);
        self.log_outcome(query, result.as_ref().err());
        result
    }

    /// Validate a query in collect-all mode: every validator runs and all
    /// findings are reported. Pass/fail agrees with [`Self::check_query`].
    pub fn check_query_all(&self, query: &str) -> Result<(), Vec<Diagnostic>> {
        let result =
            QueryEngine::with_mode(&self.schema, FailureMode::CollectAll).validate(query);
        self.log_outcome(query, result.as_ref().err().and_then(|d| d.first()));
        result
    }

    /// Validate a query under the façade contract: `Ok(true)` when the
    /// query passes; on failure, `Err(diagnostic)` if `raise_on_violation`
    /// is set, `Ok(false)` otherwise.
    pub fn validate_query(&self, query: &str) -> Result<bool, Diagnostic> {
        match self.check_query(query) {
            Ok(()) => Ok(true),
            Err(diagnostic) if self.config.raise_on_violation => Err(diagnostic),
            Err(_) => Ok(false),
        }
    }

    fn log_outcome(&self, query: &str, diagnostic: Option<&Diagnostic>) {
        let Some(sink) = &self.sink else {
            return;
        };
        let event = match diagnostic {
            None => QueryLogEvent::allowed(query),
            Some(diagnostic) => QueryLogEvent::rejected(query, diagnostic.clone()),
        };
        if let Err(err) = sink.record(&event) {
            // A failing log sink must not turn valid queries invalid.
            tracing::warn!(error = %err, "failed to record query log event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn schema() -> SecuritySchema {
        SecuritySchema::builder()
            .table(
                "users",
                TableSchema {
                    columns: HashMap::from([
                        ("id".to_string(), ColumnSchema::read()),
                        ("email".to_string(), ColumnSchema::denied()),
                    ]),
                    ..Default::default()
                },
            )
            .build()
            .unwrap()
    }

    #[test]
    fn raise_on_violation_surfaces_the_diagnostic() {
        let guard = SqlSecurityGuard::new(schema());
        assert_eq!(guard.validate_query("SELECT id FROM users"), Ok(true));
        let err = guard.validate_query("SELECT email FROM users").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::ColumnAccessError);
    }

    #[test]
    fn boolean_mode_returns_false() {
        let config = GuardConfig {
            raise_on_violation: false,
            ..Default::default()
        };
        let guard = SqlSecurityGuard::with_config(schema(), config).unwrap();
        assert_eq!(guard.validate_query("SELECT email FROM users"), Ok(false));
        assert_eq!(guard.validate_query("SELECT id FROM users"), Ok(true));
    }

    #[test]
    fn facade_options_do_not_change_the_engine_verdict() {
        let raising = SqlSecurityGuard::new(schema());
        let returning = SqlSecurityGuard::with_config(
            schema(),
            GuardConfig {
                raise_on_violation: false,
                ..Default::default()
            },
        )
        .unwrap();
        for query in ["SELECT id FROM users", "SELECT email FROM users"] {
            assert_eq!(
                raising.check_query(query).is_ok(),
                returning.check_query(query).is_ok()
            );
        }
    }
}
