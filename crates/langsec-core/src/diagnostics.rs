//! Validation diagnostics.
//!
//! Every failed validation produces exactly one [`Diagnostic`] (or, in
//! collect-all mode, a list of them). The JSON shape is stable:
//!
//! ```json
//! { "kind": "ColumnAccessError",
//!   "message": "access denied to column 'email' in table 'users'",
//!   "table": "users", "column": "email",
//!   "location": { "start": 7, "end": 12 } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::{AggregationType, JoinType};

/// Category of a validation failure. Serialized names are part of the wire
/// format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A referenced table is not permitted by the schema.
    TableAccessError,
    /// A column reference violates its column policy, or could not be
    /// resolved to a base table.
    ColumnAccessError,
    /// A join pairing or join kind is not permitted.
    JoinViolationError,
    /// A structural limit was exceeded (length, joins, subqueries, WHERE
    /// requirement, row limit).
    QueryComplexityError,
    /// The query could not be parsed, or uses unsupported syntax.
    QuerySyntaxError,
    /// The pre-parse gate flagged the raw query.
    #[serde(rename = "SQLInjectionError")]
    SqlInjectionError,
}

/// A half-open byte range in the raw query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

/// The typed result of a failed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Failure category.
    pub kind: DiagnosticKind,
    /// Human-readable description.
    pub message: String,
    /// Offending table, where one is identifiable.
    #[serde(default)]
    pub table: Option<String>,
    /// Offending column, where one is identifiable.
    #[serde(default)]
    pub column: Option<String>,
    /// Source range of the offending identifier, where available.
    #[serde(default)]
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a diagnostic with no table/column/location attribution.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            table: None,
            column: None,
            location: None,
        }
    }

    /// Attach a source location.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach a source location if one is known.
    pub fn at_opt(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    // ------------------------------------------------------------------
    // Pre-parse gate
    // ------------------------------------------------------------------

    /// The raw query exceeds `max_query_length`.
    pub fn query_too_long(len: usize, max: usize) -> Self {
        Self::new(
            DiagnosticKind::QueryComplexityError,
            format!("query length {} exceeds maximum allowed {}", len, max),
        )
    }

    /// A forbidden keyword appears in the query.
    pub fn forbidden_keyword(keyword: &str) -> Self {
        Self::new(
            DiagnosticKind::SqlInjectionError,
            format!("forbidden keyword found: {}", keyword),
        )
    }

    /// A heuristic injection pattern was detected.
    pub fn injection(reason: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::SqlInjectionError, reason)
    }

    // ------------------------------------------------------------------
    // Parser adapter
    // ------------------------------------------------------------------

    /// The query could not be parsed or uses unsupported syntax.
    pub fn syntax(reason: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::QuerySyntaxError, reason)
    }

    // ------------------------------------------------------------------
    // Resolver
    // ------------------------------------------------------------------

    /// A qualifier does not name any table or alias in scope.
    pub fn unresolved_qualifier(qualifier: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::ColumnAccessError,
            format!("unresolved qualifier '{}'", qualifier),
        );
        d.table = Some(qualifier.to_string());
        d
    }

    /// An unqualified column does not resolve to any table in scope.
    pub fn unresolved_column(column: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::ColumnAccessError,
            format!("unresolved column '{}'", column),
        );
        d.column = Some(column.to_string());
        d
    }

    /// An unqualified column resolves to more than one table in scope.
    pub fn ambiguous_column(column: &str, candidates: &[String]) -> Self {
        let mut d = Self::new(
            DiagnosticKind::ColumnAccessError,
            format!(
                "ambiguous column '{}' (could be any of: {})",
                column,
                candidates.join(", ")
            ),
        );
        d.column = Some(column.to_string());
        d
    }

    // ------------------------------------------------------------------
    // Validators
    // ------------------------------------------------------------------

    /// Access to a table is not permitted.
    pub fn table_denied(table: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::TableAccessError,
            format!("access to table '{}' is not allowed", table),
        );
        d.table = Some(table.to_string());
        d
    }

    /// Any reference to a column is denied.
    pub fn column_denied(table: &str, column: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::ColumnAccessError,
            format!("access denied to column '{}' in table '{}'", column, table),
        );
        d.table = Some(table.to_string());
        d.column = Some(column.to_string());
        d
    }

    /// A read-only column is used as an assignment target.
    pub fn write_denied(table: &str, column: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::ColumnAccessError,
            format!(
                "write access denied for column '{}' in table '{}'",
                column, table
            ),
        );
        d.table = Some(table.to_string());
        d.column = Some(column.to_string());
        d
    }

    /// A column is referenced from a statement kind outside its
    /// `allowed_operations`.
    pub fn operation_denied(table: &str, column: &str, operation: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::ColumnAccessError,
            format!(
                "column '{}' in table '{}' may not be used in {} statements",
                column, table, operation
            ),
        );
        d.table = Some(table.to_string());
        d.column = Some(column.to_string());
        d
    }

    /// A join pairing is not permitted at all.
    pub fn join_not_allowed(left: &str, right: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::JoinViolationError,
            format!("join between '{}' and '{}' is not allowed", left, right),
        );
        d.table = Some(left.to_string());
        d
    }

    /// A join pairing is permitted, but not under this kind.
    pub fn join_kind_not_allowed(left: &str, right: &str, kind: JoinType) -> Self {
        let mut d = Self::new(
            DiagnosticKind::JoinViolationError,
            format!(
                "{} join between '{}' and '{}' is not allowed",
                kind, left, right
            ),
        );
        d.table = Some(left.to_string());
        d
    }

    /// The query contains more joins than `max_joins`.
    pub fn too_many_joins(found: usize, max: usize) -> Self {
        Self::new(
            DiagnosticKind::QueryComplexityError,
            format!("number of joins ({}) exceeds maximum allowed ({})", found, max),
        )
    }

    /// An aggregation function is not permitted for a column.
    pub fn aggregation_not_allowed(agg: AggregationType, table: &str, column: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::ColumnAccessError,
            format!(
                "aggregation {} not allowed for column '{}' in table '{}'",
                agg, column, table
            ),
        );
        d.table = Some(table.to_string());
        d.column = Some(column.to_string());
        d
    }

    /// `COUNT(*)` over a table that allows COUNT on no readable column.
    pub fn count_star_not_allowed(table: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::ColumnAccessError,
            format!(
                "COUNT(*) not allowed: table '{}' permits COUNT on no readable column",
                table
            ),
        );
        d.table = Some(table.to_string());
        d
    }

    /// A nested SELECT appears while subqueries are disabled.
    pub fn subqueries_disabled() -> Self {
        Self::new(
            DiagnosticKind::QueryComplexityError,
            "subqueries are not allowed",
        )
    }

    /// A table requiring a WHERE clause is read without one.
    pub fn where_required(table: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::QueryComplexityError,
            format!("table '{}' requires a WHERE clause", table),
        );
        d.table = Some(table.to_string());
        d
    }

    /// An explicit LIMIT exceeds a table's `max_rows`.
    pub fn limit_exceeds_max_rows(limit: u64, max: u64, table: &str) -> Self {
        let mut d = Self::new(
            DiagnosticKind::QueryComplexityError,
            format!(
                "LIMIT {} exceeds max_rows {} for table '{}'",
                limit, max, table
            ),
        );
        d.table = Some(table.to_string());
        d
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_stable() {
        let d = Diagnostic::column_denied("users", "email").at(Location { start: 7, end: 12 });
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "ColumnAccessError");
        assert_eq!(json["table"], "users");
        assert_eq!(json["column"], "email");
        assert_eq!(json["location"]["start"], 7);
        assert_eq!(json["location"]["end"], 12);

        let injection = Diagnostic::injection("tautological condition");
        let json = serde_json::to_value(&injection).unwrap();
        assert_eq!(json["kind"], "SQLInjectionError");
        assert_eq!(json["table"], serde_json::Value::Null);
    }

    #[test]
    fn diagnostics_round_trip() {
        let d = Diagnostic::too_many_joins(4, 2);
        let json = serde_json::to_string(&d).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
