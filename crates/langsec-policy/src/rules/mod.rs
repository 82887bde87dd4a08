//! The validators, in their fixed execution order.
//!
//! | # | Validator | Question |
//! |---|---|---|
//! | 1 | [`tables`] | Is every referenced base table permitted? |
//! | 2 | [`columns`] | Is every column reference permitted for its role? |
//! | 3 | [`joins`] (rules) | Is each join pairing and kind permitted by both sides? |
//! | 4 | [`joins`] (count) | Are there at most `max_joins` JOIN operators? |
//! | 5 | [`aggregations`] | Is every aggregate call permitted for its column? |
//! | 6 | [`subqueries`] | Are nested SELECTs permitted? |
//! | 7 | [`where_clause`] | Do tables that require a WHERE clause have one? |
//! | 8 | [`row_limit`] | Does an explicit LIMIT respect every table's `max_rows`? |
//!
//! The resolver flattens every scope into the resolved query, so each
//! validator sees subquery contents with the same strictness as top-level
//! references — subqueries are not a side door.
//!
//! Every validator always evaluates its whole input and appends all of its
//! findings; the runner decides how much of that to report. This keeps the
//! fail-fast and collect-all outcomes identical by construction.

pub mod aggregations;
pub mod columns;
pub mod joins;
pub mod row_limit;
pub mod subqueries;
pub mod tables;
pub mod where_clause;

use langsec_core::{Diagnostic, SecuritySchema};
use langsec_sql::ResolvedQuery;

use crate::engine::FailureMode;

type Validator = fn(&SecuritySchema, &ResolvedQuery, &mut Vec<Diagnostic>);

const VALIDATORS: [(&str, Validator); 8] = [
    ("table_access", tables::check),
    ("column_access", columns::check),
    ("join_rules", joins::check_rules),
    ("join_count", joins::check_count),
    ("aggregation", aggregations::check),
    ("subquery", subqueries::check),
    ("where_required", where_clause::check),
    ("row_limit", row_limit::check),
];

/// Run the validator list. `Err` carries one diagnostic in fail-fast mode
/// and every finding in collect-all mode; both modes fail exactly when any
/// validator found something.
pub fn run(
    schema: &SecuritySchema,
    resolved: &ResolvedQuery,
    mode: FailureMode,
) -> Result<(), Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for (name, validator) in VALIDATORS {
        let before = diagnostics.len();
        validator(schema, resolved, &mut diagnostics);
        if diagnostics.len() > before {
            tracing::debug!(validator = name, findings = diagnostics.len() - before, "validator failed");
            if mode == FailureMode::FailFast {
                diagnostics.truncate(before + 1);
                return Err(diagnostics);
            }
        }
    }

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}
