//! Row-limit validation.
//!
//! Advisory by design: a statement with no LIMIT is not synthesized one —
//! enforcing an implicit limit would require rewriting the query or
//! database-side cooperation, both outside this engine's charter. Only an
//! explicit `LIMIT n` is compared against the `max_rows` of the tables in
//! its scope.

use langsec_core::{Diagnostic, SecuritySchema};
use langsec_sql::ResolvedQuery;

pub fn check(schema: &SecuritySchema, resolved: &ResolvedQuery, out: &mut Vec<Diagnostic>) {
    for scope in &resolved.scopes {
        let Some(limit) = scope.limit else {
            continue;
        };
        for table in &scope.tables {
            let Some(max_rows) = schema.table_schema(table).and_then(|t| t.max_rows) else {
                continue;
            };
            if limit > max_rows {
                out.push(Diagnostic::limit_exceeds_max_rows(limit, max_rows, table));
            }
        }
    }
}
