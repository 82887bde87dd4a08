//! Column access validation.
//!
//! Column policies resolve through the schema's default layers, and an
//! explicit entry always wins — in particular an explicit `denied` beats a
//! permissive `default_column_schema`. A column with no policy anywhere is
//! implicitly denied.

use langsec_core::{Diagnostic, SecuritySchema, SqlOperation};
use langsec_sql::ast::StatementKind;
use langsec_sql::{ColumnRole, ResolvedQuery};

fn statement_operation(kind: StatementKind) -> SqlOperation {
    match kind {
        StatementKind::Select => SqlOperation::Select,
        StatementKind::Insert => SqlOperation::Insert,
        StatementKind::Update => SqlOperation::Update,
        StatementKind::Delete => SqlOperation::Delete,
    }
}

/// Every resolved column reference must be permitted for its role, its
/// statement kind, and its table's column policy.
pub fn check(schema: &SecuritySchema, resolved: &ResolvedQuery, out: &mut Vec<Diagnostic>) {
    let operation = statement_operation(resolved.kind);

    for reference in &resolved.columns {
        // A denied table is validator 1's finding; repeating it per column
        // would only bury it.
        if !schema.is_table_allowed(&reference.table) {
            continue;
        }

        let Some(column) = schema.column_schema(&reference.table, &reference.column) else {
            out.push(
                Diagnostic::column_denied(&reference.table, &reference.column)
                    .at_opt(reference.location),
            );
            continue;
        };

        let permitted = match reference.role {
            ColumnRole::AssignTarget => column.allows_write(),
            _ => column.allows_read(),
        };
        if !permitted {
            let diagnostic = if reference.role == ColumnRole::AssignTarget && column.allows_read()
            {
                Diagnostic::write_denied(&reference.table, &reference.column)
            } else {
                Diagnostic::column_denied(&reference.table, &reference.column)
            };
            out.push(diagnostic.at_opt(reference.location));
            continue;
        }

        if !column.allows_operation(operation) {
            out.push(
                Diagnostic::operation_denied(
                    &reference.table,
                    &reference.column,
                    &operation.to_string(),
                )
                .at_opt(reference.location),
            );
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
                    columns: HashMap::from([
                        ("id".to_string(), ColumnSchema::read()),
                        ("username".to_string(), ColumnSchema::write()),
                        ("email".to_string(), ColumnSchema::denied()),
                        (
                            "last_login".to_string(),
                            ColumnSchema::read().with_operations([SqlOperation::Select]),
                        ),
                    ]),
                    ..Default::default()
                },
            )
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
    fn readable_column_passes() {
        assert!(run("SELECT id FROM users").is_empty());
    }

    #[test]
    fn denied_column_is_reported_with_location() {
        let out = run("SELECT email FROM users");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiagnosticKind::ColumnAccessError);
        assert_eq!(out[0].column.as_deref(), Some("email"));
        assert!(out[0].location.is_some());
    }

    #[test]
    fn denied_column_in_predicate_is_reported() {
        let out = run("SELECT id FROM users WHERE email = 'x'");
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn unlisted_column_is_implicitly_denied() {
        let out = run("SELECT password FROM users");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].column.as_deref(), Some("password"));
    }

    #[test]
    fn write_column_is_readable_too() {
        // WRITE subsumes READ.
        assert!(run("SELECT username FROM users").is_empty());
    }

    #[test]
    fn update_target_requires_write() {
        assert!(run("UPDATE users SET username = 'x' WHERE id = 1").is_empty());

        let out = run("UPDATE users SET id = 2 WHERE id = 1");
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains("write access denied"));
    }

    #[test]
    fn insert_target_requires_write() {
        let out = run("INSERT INTO users (id) VALUES (1)");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].column.as_deref(), Some("id"));
    }

    #[test]
    fn allowed_operations_refine_access() {
        assert!(run("SELECT last_login FROM users").is_empty());

        // Readable, but only in SELECT statements.
        let out = run("UPDATE users SET username = 'x' WHERE last_login IS NULL");
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains("UPDATE"));
    }

    #[test]
    fn denied_table_produces_no_column_noise() {
        let out = run("SELECT whatever FROM payments");
        assert!(out.is_empty());
    }
}
