//! End-to-end validation scenarios and engine invariants, run through the
//! public guard API.

use langsec::{
    AggregationType, ColumnSchema, DiagnosticKind, JoinType, SecuritySchema, SqlSecurityGuard,
    TableSchema,
};
use std::collections::{HashMap, HashSet};

/// users(id, username readable; email denied), orders(id, user_id readable;
/// amount readable with SUM/AVG/COUNT), users⋈orders INNER/LEFT only,
/// max_joins=2, subqueries allowed, max_query_length=500.
fn scenario_schema() -> SecuritySchema {
    SecuritySchema::builder()
        .table(
            "users",
            TableSchema {
                columns: HashMap::from([
                    ("id".to_string(), ColumnSchema::read()),
                    ("username".to_string(), ColumnSchema::read()),
                    ("email".to_string(), ColumnSchema::denied()),
                ]),
                allowed_joins: HashMap::from([(
                    "orders".to_string(),
                    HashSet::from([JoinType::Inner, JoinType::Left]),
                )]),
                ..Default::default()
            },
        )
        .table(
            "orders",
            TableSchema {
                columns: HashMap::from([
                    ("id".to_string(), ColumnSchema::read()),
                    (
                        "amount".to_string(),
                        ColumnSchema::read().with_aggregations([
                            AggregationType::Sum,
                            AggregationType::Avg,
                            AggregationType::Count,
                        ]),
                    ),
                    ("user_id".to_string(), ColumnSchema::read()),
                ]),
                allowed_joins: HashMap::from([(
                    "users".to_string(),
                    HashSet::from([JoinType::Inner, JoinType::Left]),
                )]),
                ..Default::default()
            },
        )
        .max_joins(2)
        .allow_subqueries(true)
        .max_query_length(500)
        .forbidden_keywords(["DROP", "DELETE", "TRUNCATE"])
        .build()
        .unwrap()
}

fn guard() -> SqlSecurityGuard {
    SqlSecurityGuard::new(scenario_schema())
}

#[test]
fn scenario_1_plain_select_passes() {
    assert!(guard()
        .check_query("SELECT id, username FROM users WHERE id = 1")
        .is_ok());
}

#[test]
fn scenario_2_denied_column() {
    let err = guard().check_query("SELECT email FROM users").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::ColumnAccessError);
    assert_eq!(err.table.as_deref(), Some("users"));
    assert_eq!(err.column.as_deref(), Some("email"));
}

#[test]
fn scenario_3_alias_resolves_to_base_table() {
    assert!(guard().check_query("SELECT u.username FROM users u").is_ok());
}

#[test]
fn scenario_4_permitted_join() {
    assert!(guard()
        .check_query("SELECT u.username FROM users u JOIN orders o ON u.id = o.user_id")
        .is_ok());
}

#[test]
fn scenario_5_right_join_is_not_permitted() {
    let err = guard()
        .check_query("SELECT u.username FROM users u RIGHT JOIN orders o ON u.id = o.user_id")
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::JoinViolationError);
}

#[test]
fn scenario_6_permitted_aggregation() {
    assert!(guard().check_query("SELECT SUM(amount) FROM orders").is_ok());
}

#[test]
fn scenario_7_aggregation_outside_grants() {
    let err = guard()
        .check_query("SELECT MIN(amount) FROM orders")
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::ColumnAccessError);
    assert!(err.message.contains("MIN"));
}

#[test]
fn scenario_8_forbidden_keyword() {
    let err = guard().check_query("DROP TABLE users").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::SqlInjectionError);
}

#[test]
fn scenario_9_tautology() {
    let err = guard()
        .check_query("SELECT id FROM users WHERE 1=1 OR id = 1")
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::SqlInjectionError);
}

#[test]
fn scenario_10_subquery_when_disabled() {
    let schema = SecuritySchema::builder()
        .table(
            "users",
            TableSchema {
                columns: HashMap::from([("id".to_string(), ColumnSchema::read())]),
                ..Default::default()
            },
        )
        .allow_subqueries(false)
        .build()
        .unwrap();
    let err = SqlSecurityGuard::new(schema)
        .check_query("SELECT id FROM (SELECT id FROM users) u")
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::QueryComplexityError);
}

// ---------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------

#[test]
fn determinism_repeated_calls_agree() {
    let guard = guard();
    for query in [
        "SELECT id FROM users",
        "SELECT email FROM users",
        "SELECT u.username FROM users u RIGHT JOIN orders o ON u.id = o.user_id",
    ] {
        let first = guard.check_query(query);
        for _ in 0..3 {
            assert_eq!(guard.check_query(query), first);
        }
    }
}

#[test]
fn implicit_denial_of_unlisted_tables_and_columns() {
    let guard = guard();
    let err = guard.check_query("SELECT id FROM payments").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::TableAccessError);

    let err = guard.check_query("SELECT password FROM users").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::ColumnAccessError);
}

#[test]
fn alias_transparency() {
    let guard = guard();
    // Semantically identical queries under alias renaming agree.
    let pairs = [
        (
            "SELECT username FROM users",
            "SELECT zz.username FROM users zz",
        ),
        (
            "SELECT u.email FROM users u",
            "SELECT allowed.email FROM users AS allowed",
        ),
        (
            "SELECT a.username FROM users a JOIN orders b ON a.id = b.user_id",
            "SELECT x.username FROM users x JOIN orders y ON x.id = y.user_id",
        ),
    ];
    for (left, right) in pairs {
        assert_eq!(
            guard.check_query(left).is_ok(),
            guard.check_query(right).is_ok(),
            "alias renaming changed the verdict: {left} vs {right}"
        );
    }
}

#[test]
fn length_gate_has_primacy() {
    let schema = SecuritySchema::builder()
        .max_query_length(20)
        .build()
        .unwrap();
    // Longer than 20 chars and full of other violations: the length
    // diagnostic must win.
    let err = SqlSecurityGuard::new(schema)
        .check_query("SELECT email FROM users WHERE 1=1; DROP TABLE users")
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::QueryComplexityError);
    assert!(err.message.contains("length"));
}

#[test]
fn monotonicity_removing_a_permission_never_unfails_a_query() {
    // Start from the scenario schema, then remove the SUM grant.
    let mut stricter = scenario_schema();
    stricter
        .tables
        .get_mut("orders")
        .unwrap()
        .columns
        .get_mut("amount")
        .unwrap()
        .allowed_aggregations
        .remove(&AggregationType::Sum);

    let baseline = SqlSecurityGuard::new(scenario_schema());
    let restricted = SqlSecurityGuard::new(stricter);

    for query in [
        "SELECT SUM(amount) FROM orders",
        "SELECT MIN(amount) FROM orders",
        "SELECT email FROM users",
        "SELECT id FROM users",
    ] {
        if baseline.check_query(query).is_err() {
            assert!(
                restricted.check_query(query).is_err(),
                "restricting the schema un-failed: {query}"
            );
        }
    }
}

#[test]
fn subquery_soundness_inner_scopes_are_as_strict_as_outer() {
    let guard = guard();
    // The denied column hides inside a derived table.
    let err = guard
        .check_query("SELECT u.email FROM (SELECT email FROM users) u")
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::ColumnAccessError);
    assert_eq!(err.column.as_deref(), Some("email"));

    // And inside a predicate subquery.
    let err = guard
        .check_query(
            "SELECT id FROM orders WHERE user_id IN (SELECT id FROM users WHERE email = 'x')",
        )
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::ColumnAccessError);
}

#[test]
fn join_budget_spans_scopes() {
    let guard = guard();
    // Two joins total across two scopes: at the budget, passes.
    assert!(guard
        .check_query(
            "SELECT u.username FROM users u JOIN orders o ON u.id = o.user_id \
             WHERE u.id IN (SELECT o2.user_id FROM orders o2 JOIN users u2 ON o2.user_id = u2.id)"
        )
        .is_ok());
    // Three joins — each individually permitted — exceed the budget.
    let err = guard
        .check_query(
            "SELECT u.username FROM users u JOIN orders o ON u.id = o.user_id \
             WHERE u.id IN (SELECT o2.user_id FROM orders o2 JOIN users u2 ON o2.user_id = u2.id) \
             AND EXISTS (SELECT 1 FROM orders o3 JOIN users u3 ON o3.user_id = u3.id)"
        )
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::QueryComplexityError);
}

#[test]
fn update_and_delete_are_validated() {
    let guard = guard();
    // No column in the scenario schema is writable.
    let err = guard
        .check_query("UPDATE users SET username = 'x' WHERE id = 1")
        .unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::ColumnAccessError);

    // DELETE is a forbidden keyword in this schema, caught at the gate.
    let err = guard.check_query("DELETE FROM users WHERE id = 1").unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::SqlInjectionError);
}

#[test]
fn complex_query_with_aliases_and_aggregates_passes() {
    let guard = guard();
    assert!(guard
        .check_query(
            "SELECT u.username, COUNT(o.amount) AS order_count, AVG(o.amount) AS avg_amount \
             FROM users u LEFT JOIN orders o ON u.id = o.user_id \
             WHERE u.id > 0 GROUP BY u.username HAVING COUNT(o.amount) > 5 \
             ORDER BY u.username LIMIT 10"
        )
        .is_ok());
}

#[test]
fn correlated_scalar_subquery_passes() {
    let guard = guard();
    assert!(guard
        .check_query(
            "SELECT u.username, \
             (SELECT COUNT(o.amount) FROM orders o WHERE o.user_id = u.id) AS order_count \
             FROM users u WHERE u.id > 0"
        )
        .is_ok());
}
