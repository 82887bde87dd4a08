//! Join validation: pairing rules and the global join budget.

use langsec_core::{Diagnostic, SecuritySchema};
use langsec_sql::ResolvedQuery;

/// Each join's kind must be permitted by **both** sides. A side's permitted
/// set is its `allowed_joins` entry for the partner unioned with its
/// `default_allowed_join`.
pub fn check_rules(schema: &SecuritySchema, resolved: &ResolvedQuery, out: &mut Vec<Diagnostic>) {
    for join in &resolved.joins {
        // Unknown tables are validator 1's finding.
        let (Some(left), Some(right)) = (
            schema.table_schema(&join.left),
            schema.table_schema(&join.right),
        ) else {
            continue;
        };

        let left_kinds = left.join_kinds_with(&join.right);
        let right_kinds = right.join_kinds_with(&join.left);

        if left_kinds.is_empty() || right_kinds.is_empty() {
            out.push(Diagnostic::join_not_allowed(&join.left, &join.right));
        } else if !left_kinds.contains(&join.kind) || !right_kinds.contains(&join.kind) {
            out.push(Diagnostic::join_kind_not_allowed(
                &join.left, &join.right, join.kind,
            ));
        }
    }
}

/// The sum of JOIN operators across all scopes must not exceed `max_joins`.
pub fn check_count(schema: &SecuritySchema, resolved: &ResolvedQuery, out: &mut Vec<Diagnostic>) {
    if resolved.join_count > schema.max_joins {
        out.push(Diagnostic::too_many_joins(
            resolved.join_count,
            schema.max_joins,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langsec_core::{DiagnosticKind, JoinType, TableSchema};
    use langsec_sql::{parser, resolver};
    use std::collections::{HashMap, HashSet};

    fn schema(max_joins: usize) -> SecuritySchema {
        SecuritySchema::builder()
            .table(
                "users",
                TableSchema {
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
                    allowed_joins: HashMap::from([(
                        "users".to_string(),
                        HashSet::from([JoinType::Inner, JoinType::Left]),
                    )]),
                    ..Default::default()
                },
            )
            .table("products", TableSchema::default())
            .max_joins(max_joins)
            .build()
            .unwrap()
    }

    fn run(sql: &str, schema: &SecuritySchema) -> Vec<Diagnostic> {
        let resolved = resolver::resolve(&parser::parse(sql).unwrap(), schema).unwrap();
        let mut out = Vec::new();
        check_rules(schema, &resolved, &mut out);
        check_count(schema, &resolved, &mut out);
        out
    }

    #[test]
    fn permitted_join_kind_passes() {
        let out = run(
            "SELECT 1 FROM users u JOIN orders o ON u.id = o.user_id",
            &schema(3),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn unlisted_pairing_is_rejected() {
        let out = run(
            "SELECT 1 FROM users u JOIN products p ON u.id = p.id",
            &schema(3),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiagnosticKind::JoinViolationError);
        assert!(out[0].message.contains("not allowed"));
    }

    #[test]
    fn unlisted_kind_is_rejected() {
        let out = run(
            "SELECT 1 FROM users u RIGHT JOIN orders o ON u.id = o.user_id",
            &schema(3),
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].message.contains("RIGHT"));
    }

    #[test]
    fn both_sides_must_permit() {
        // orders permits joining users, but users does not list products —
        // an asymmetric grant is not enough.
        let schema = SecuritySchema::builder()
            .table(
                "users",
                TableSchema {
                    allowed_joins: HashMap::from([(
                        "orders".to_string(),
                        HashSet::from([JoinType::Inner]),
                    )]),
                    ..Default::default()
                },
            )
            .table("orders", TableSchema::default())
            .build()
            .unwrap();
        let out = run("SELECT 1 FROM users u JOIN orders o ON u.id = o.id", &schema);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn default_allowed_join_covers_unlisted_partners() {
        let schema = SecuritySchema::builder()
            .table(
                "users",
                TableSchema {
                    default_allowed_join: Some(HashSet::from([JoinType::Inner])),
                    ..Default::default()
                },
            )
            .table(
                "orders",
                TableSchema {
                    default_allowed_join: Some(HashSet::from([JoinType::Inner])),
                    ..Default::default()
                },
            )
            .build()
            .unwrap();
        let out = run("SELECT 1 FROM users u JOIN orders o ON u.id = o.id", &schema);
        assert!(out.is_empty());

        let out = run(
            "SELECT 1 FROM users u LEFT JOIN orders o ON u.id = o.id",
            &schema,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn join_budget_counts_all_scopes() {
        let schema = schema(1);
        let out = run(
            "SELECT 1 FROM users u JOIN orders o ON u.id = o.user_id \
             WHERE EXISTS (SELECT 1 FROM users u2 JOIN orders o2 ON u2.id = o2.user_id)",
            &schema,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, DiagnosticKind::QueryComplexityError);
        assert!(out[0].message.contains("2"));
    }

    #[test]
    fn join_budget_within_limit_passes() {
        let out = run(
            "SELECT 1 FROM users u JOIN orders o ON u.id = o.user_id",
            &schema(1),
        );
        assert!(out.is_empty());
    }
}
