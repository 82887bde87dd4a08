//! WHERE-clause requirements.

use langsec_core::{Diagnostic, SecuritySchema};
use langsec_sql::ast::StatementKind;
use langsec_sql::ResolvedQuery;

/// A table with `require_where_clause` may only be read by a scope whose
/// statement carries a WHERE predicate that is not trivially constant.
/// INSERT scopes have no WHERE and are exempt.
pub fn check(schema: &SecuritySchema, resolved: &ResolvedQuery, out: &mut Vec<Diagnostic>) {
    for scope in &resolved.scopes {
        if scope.kind == StatementKind::Insert {
            continue;
        }
        let satisfied = scope.has_where && !scope.where_is_trivial;
        if satisfied {
            continue;
        }
        for table in &scope.tables {
            let Some(table_schema) = schema.table_schema(table) else {
                continue;
            };
            if table_schema.require_where_clause {
                out.push(Diagnostic::where_required(table));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langsec_core::{ColumnSchema, DiagnosticKind, TableSchema};
    use langsec_sql::{parser, resolver};
    use std::collections::HashMap;

    fn schema() -> SecuritySchema {
        SecuritySchema::builder()
            .table(
                "users",
                TableSchema {
                    columns: HashMap::from([("id".to_string(), ColumnSchema::write())]),
                    require_where_clause: true,
                    ..Default::default()
                },
            )
            .table(
                "logs",
                TableSchema {
                    columns: HashMap::from([("id".to_string(), ColumnSchema::read())]),
                    ..Default::default()
                },
            )
            .sql_injection_protection(false)
            .build()
            .unwrap()
    }

    fn run(sql: &str) -> Vec<Diagnostic> {
        let schema = schema();
        let resolved = resolver::resolve(&parser::parse(sql).unwrap(), &schema).unwrap();
        let mut out = Vec::new();
        check(&schema, &resolved, &mut out);
        out
    }

    #[test]
    fn select_with_where_passes() {
        assert!(run("SELECT id FROM users WHERE id = 1").is_empty());
    }

    #[test]
    fn select_without_where_is_rejected() {
        let out = run("SELECT id FROM users");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiagnosticKind::QueryComplexityError);
        assert_eq!(out[0].table.as_deref(), Some("users"));
    }

    #[test]
    fn trivially_constant_where_does_not_count() {
        let out = run("SELECT id FROM users WHERE 1 = 1");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn delete_without_where_is_rejected() {
        let out = run("DELETE FROM users");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn update_with_where_passes() {
        assert!(run("UPDATE users SET id = 1 WHERE id = 2").is_empty());
    }

    #[test]
    fn unconstrained_table_is_unaffected() {
        assert!(run("SELECT id FROM logs").is_empty());
    }

    #[test]
    fn requirement_applies_inside_subqueries() {
        let out = run("SELECT id FROM logs WHERE id IN (SELECT id FROM users)");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].table.as_deref(), Some("users"));
    }
}
