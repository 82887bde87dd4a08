//! Subquery validation.
//!
//! When subqueries are permitted there is nothing to do here: the resolver
//! has already flattened every nested scope into the resolved query, so the
//! other validators judge subquery contents exactly like top-level
//! references.

use langsec_core::{Diagnostic, SecuritySchema};
use langsec_sql::ResolvedQuery;

pub fn check(schema: &SecuritySchema, resolved: &ResolvedQuery, out: &mut Vec<Diagnostic>) {
    if !schema.allow_subqueries && resolved.subquery_count > 0 {
        out.push(Diagnostic::subqueries_disabled());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langsec_core::{ColumnSchema, DiagnosticKind, TableSchema};
    use langsec_sql::{parser, resolver};
    use std::collections::HashMap;

    fn schema(allow: bool) -> SecuritySchema {
        SecuritySchema::builder()
            .table(
                "users",
                TableSchema {
                    columns: HashMap::from([("id".to_string(), ColumnSchema::read())]),
                    ..Default::default()
                },
            )
            .allow_subqueries(allow)
            .build()
            .unwrap()
    }

    fn run(sql: &str, schema: &SecuritySchema) -> Vec<Diagnostic> {
        let resolved = resolver::resolve(&parser::parse(sql).unwrap(), schema).unwrap();
        let mut out = Vec::new();
        check(schema, &resolved, &mut out);
        out
    }

    #[test]
    fn derived_table_rejected_when_disabled() {
        let schema = schema(false);
        let out = run("SELECT id FROM (SELECT id FROM users) u", &schema);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiagnosticKind::QueryComplexityError);
    }

    #[test]
    fn predicate_subquery_rejected_when_disabled() {
        let schema = schema(false);
        let out = run("SELECT id FROM users WHERE id IN (SELECT id FROM users)", &schema);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn subqueries_pass_when_enabled() {
        let schema = schema(true);
        assert!(run("SELECT id FROM (SELECT id FROM users) u", &schema).is_empty());
    }

    #[test]
    fn plain_query_passes_either_way() {
        assert!(run("SELECT id FROM users", &schema(false)).is_empty());
    }
}
