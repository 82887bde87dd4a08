//! Table access validation.

use langsec_core::{Diagnostic, SecuritySchema};
use langsec_sql::ResolvedQuery;

/// Every base table referenced in any scope must be listed in the schema or
/// covered by the default table policy.
pub fn check(schema: &SecuritySchema, resolved: &ResolvedQuery, out: &mut Vec<Diagnostic>) {
    let mut reported: Vec<&str> = Vec::new();
    for scope in &resolved.scopes {
        for table in &scope.tables {
            if reported.contains(&table.as_str()) {
                continue;
            }
            if !schema.is_table_allowed(table) {
                reported.push(table);
                out.push(Diagnostic::table_denied(table));
            }
        }
    }
}
