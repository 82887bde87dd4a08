//! The validation engine.

use langsec_core::{Diagnostic, SecuritySchema};
use langsec_sql::{gate, parser, resolver};

use crate::rules;

/// How validator findings are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Stop at the first failing validator and report its first finding.
    #[default]
    FailFast,
    /// Run every validator and report all findings.
    CollectAll,
}

/// Validates queries against a schema. The engine is stateless apart from
/// the shared schema reference, so one engine can serve any number of
/// concurrent callers.
pub struct QueryEngine<'a> {
    schema: &'a SecuritySchema,
    mode: FailureMode,
}

impl<'a> QueryEngine<'a> {
    /// An engine in the default fail-fast mode.
    pub fn new(schema: &'a SecuritySchema) -> Self {
        Self {
            schema,
            mode: FailureMode::FailFast,
        }
    }

    /// An engine with an explicit failure mode.
    pub fn with_mode(schema: &'a SecuritySchema, mode: FailureMode) -> Self {
        Self { schema, mode }
    }

    /// Validate a raw query string.
    ///
    /// Runs the full pipeline: pre-parse gate, parser adapter, resolver,
    /// then the validator list. Gate, parse, and resolution failures are
    /// terminal in either mode — past each of those stages there is nothing
    /// sound to continue with — so the returned list then holds exactly one
    /// diagnostic. On success every rule held for the resolved query.
    pub fn validate(&self, query: &str) -> Result<(), Vec<Diagnostic>> {
        gate::check(query, self.schema).map_err(|d| vec![d])?;
        let statement = parser::parse(query).map_err(|d| vec![d])?;
        let resolved = resolver::resolve(&statement, self.schema).map_err(|d| vec![d])?;

        tracing::debug!(
            scopes = resolved.scopes.len(),
            columns = resolved.columns.len(),
            joins = resolved.join_count,
            subqueries = resolved.subquery_count,
            "query resolved"
        );

        rules::run(self.schema, &resolved, self.mode)
    }

    /// Validate and report at most one diagnostic, regardless of mode.
    pub fn validate_first(&self, query: &str) -> Result<(), Diagnostic> {
        self.validate(query).map_err(|mut diagnostics| {
            debug_assert!(!diagnostics.is_empty());
            diagnostics.swap_remove(0)
        })
    }
}
