//! Aggregation validation.

use langsec_core::{AggregationType, Diagnostic, SecuritySchema};
use langsec_sql::{AggregateTarget, ResolvedQuery};

/// Every aggregate call must be permitted by the policy of the column it
/// reads. `COUNT(*)` reads no single column; it is permitted only when each
/// table in the enclosing scope's FROM allows the function on at least one
/// readable column.
pub fn check(schema: &SecuritySchema, resolved: &ResolvedQuery, out: &mut Vec<Diagnostic>) {
    for aggregate in &resolved.aggregates {
        match &aggregate.target {
            AggregateTarget::Column { table, column } => {
                if !schema.is_table_allowed(table) {
                    continue;
                }
                // An unlisted column is the column validator's finding.
                let Some(column_schema) = schema.column_schema(table, column) else {
                    continue;
                };
                if !column_schema.allows_aggregation(aggregate.func) {
                    out.push(
                        Diagnostic::aggregation_not_allowed(aggregate.func, table, column)
                            .at_opt(aggregate.location),
                    );
                }
            }
            AggregateTarget::Star => {
                let scope = &resolved.scopes[aggregate.scope];
                for table in &scope.tables {
                    if !schema.is_table_allowed(table) {
                        continue;
                    }
                    if !allows_star_aggregate(schema, table, aggregate.func) {
                        out.push(
                            Diagnostic::count_star_not_allowed(table).at_opt(aggregate.location),
                        );
                    }
                }
            }
        }
    }
}

/// Whether some readable column of the table permits the function — either
/// an explicitly listed column, or any unlisted column via the schema's
/// column default.
fn allows_star_aggregate(schema: &SecuritySchema, table: &str, func: AggregationType) -> bool {
    let Some(table_schema) = schema.table_schema(table) else {
        return false;
    };
    let explicit = table_schema
        .columns
        .values()
        .any(|c| c.allows_read() && c.allows_aggregation(func));
    let by_default = schema
        .default_column_schema
        .as_ref()
        .is_some_and(|c| c.allows_read() && c.allows_aggregation(func));
    explicit || by_default
}
