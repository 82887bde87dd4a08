//! Façade behavior: configuration, query logging, YAML-loaded schemas, and
//! the diagnostic wire format.

use langsec::{
    ColumnSchema, DiagnosticKind, GuardConfig, QueryOutcome, SecuritySchema, SqlSecurityGuard,
    TableSchema,
};
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
fn query_log_records_both_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("queries.log");

    let guard = SqlSecurityGuard::with_config(
        schema(),
        GuardConfig {
            log_queries: true,
            log_path: Some(log_path.clone()),
            raise_on_violation: false,
        },
    )
    .unwrap();

    assert_eq!(guard.validate_query("SELECT id FROM users"), Ok(true));
    assert_eq!(guard.validate_query("SELECT email FROM users"), Ok(false));

    let content = std::fs::read_to_string(&log_path).unwrap();
    let events: Vec<langsec::QueryLogEvent> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].outcome, QueryOutcome::Allowed);
    assert_eq!(events[1].outcome, QueryOutcome::Rejected);
    let diagnostic = events[1].diagnostic.as_ref().unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::ColumnAccessError);
}

#[test]
fn logging_disabled_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("queries.log");

    let guard = SqlSecurityGuard::with_config(
        schema(),
        GuardConfig {
            log_queries: false,
            log_path: Some(log_path.clone()),
            raise_on_violation: true,
        },
    )
    .unwrap();
    let _ = guard.validate_query("SELECT id FROM users");

    assert!(!log_path.exists());
}

#[test]
fn schema_loaded_from_yaml_behaves_like_built_schema() {
    let yaml = r#"
max_joins: 2
allow_subqueries: true
max_query_length: 500
forbidden_keywords: [DROP, TRUNCATE]
tables:
  users:
    columns:
      id: { access: read }
      username: { access: read }
      email: { access: denied }
    allowed_joins:
      orders: [inner, left]
  orders:
    columns:
      id: { access: read }
      amount:
        access: read
        allowed_aggregations: [sum, avg, count]
      user_id: { access: read }
    allowed_joins:
      users: [inner, left]
"#;
    let guard = SqlSecurityGuard::new(SecuritySchema::from_yaml(yaml).unwrap());

    assert!(guard.check_query("SELECT id, username FROM users").is_ok());
    assert!(guard
        .check_query("SELECT u.username FROM users u LEFT JOIN orders o ON u.id = o.user_id")
        .is_ok());

    let err = guard.check_query("SELECT email FROM users").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::ColumnAccessError);

    let err = guard
        .check_query("SELECT u.username FROM users u RIGHT JOIN orders o ON u.id = o.user_id")
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::JoinViolationError);

    let err = guard.check_query("TRUNCATE TABLE users").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::SqlInjectionError);
}

#[test]
fn diagnostic_wire_format_is_stable_end_to_end() {
    let err = SqlSecurityGuard::new(schema())
        .check_query("SELECT email FROM users")
        .unwrap_err();
    let json = serde_json::to_value(&err).unwrap();

    assert_eq!(json["kind"], "ColumnAccessError");
    assert_eq!(json["table"], "users");
    assert_eq!(json["column"], "email");
    // `email` starts at byte 7 of the query.
    assert_eq!(json["location"]["start"], 7);
    assert_eq!(json["location"]["end"], 12);
}

#[test]
fn presets_are_usable_end_to_end() {
    let permissive = SqlSecurityGuard::new(SecuritySchema::permissive());
    assert!(permissive
        .check_query("SELECT anything FROM anywhere WHERE x = 1")
        .is_ok());

    let strict = SqlSecurityGuard::new(SecuritySchema::strict());
    // Reads pass; writes are outside the strict profile's operations.
    assert!(strict.check_query("SELECT name FROM products").is_ok());
    let err = strict
        .check_query("UPDATE products SET name = 'x' WHERE id = 1")
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::ColumnAccessError);
}

#[test]
fn constraint_prompt_reflects_the_schema() {
    let prompt = schema().constraint_prompt();
    assert!(prompt.contains("Maximum joins allowed"));
    assert!(prompt.contains("Forbidden keywords"));
}
