//! The declarative security schema.
//!
//! A [`SecuritySchema`] states which tables a query may touch, which columns
//! of those tables may be read or written, which joins are permitted, and a
//! handful of structural limits (join count, query length, subqueries).
//! Schemas can be built programmatically through [`SecuritySchemaBuilder`]
//! or loaded from YAML (one document per schema).
//!
//! # Schema files
//!
//! ```yaml
//! max_joins: 2
//! allow_subqueries: true
//! max_query_length: 500
//! tables:
//!   users:
//!     columns:
//!       id: { access: read }
//!       email: { access: denied }
//!     allowed_joins:
//!       orders: [inner, left]
//! ```
//!
//! # Consistency
//!
//! Construction is the only time a schema is checked: unknown YAML keys are
//! rejected by serde, contradictory column grants and dangling join partners
//! are rejected by [`SecuritySchema::validate`]. After that the schema is
//! immutable; lookups never fail, they fall back to the configured defaults
//! or to implicit denial.

mod enums;
mod presets;

pub use enums::{Access, AggregationType, JoinType, SqlOperation};

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while constructing or loading a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Reading a schema file failed.
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML document did not match the schema shape.
    #[error("failed to parse schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A denied column also carries positive grants.
    #[error("column '{column}' in table '{table}' is denied but also grants {grant}")]
    ContradictoryColumn {
        table: String,
        column: String,
        grant: &'static str,
    },

    /// A join rule names a table the schema does not know.
    #[error("table '{table}' allows joins with '{partner}', which is not in the schema")]
    UnknownJoinPartner { table: String, partner: String },
}

/// Policy for a single column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSchema {
    /// Access level. Defaults to [`Access::Denied`].
    #[serde(default)]
    pub access: Access,

    /// Statement kinds this column may appear in. Empty means no further
    /// restriction beyond `access`.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub allowed_operations: HashSet<SqlOperation>,

    /// Aggregation functions that may wrap this column. Empty means none.
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub allowed_aggregations: HashSet<AggregationType>,
}

impl ColumnSchema {
    /// A readable column with no aggregation grants.
    pub fn read() -> Self {
        Self {
            access: Access::Read,
            ..Default::default()
        }
    }

    /// A writable column (write subsumes read).
    pub fn write() -> Self {
        Self {
            access: Access::Write,
            ..Default::default()
        }
    }

    /// An explicitly denied column.
    pub fn denied() -> Self {
        Self::default()
    }

    /// Extend with aggregation grants.
    pub fn with_aggregations<I: IntoIterator<Item = AggregationType>>(mut self, aggs: I) -> Self {
        self.allowed_aggregations.extend(aggs);
        self
    }

    /// Extend with statement-kind restrictions.
    pub fn with_operations<I: IntoIterator<Item = SqlOperation>>(mut self, ops: I) -> Self {
        self.allowed_operations.extend(ops);
        self
    }

    /// Whether the column may appear in a read position.
    pub fn allows_read(&self) -> bool {
        matches!(self.access, Access::Read | Access::Write)
    }

    /// Whether the column may be an assignment target.
    pub fn allows_write(&self) -> bool {
        matches!(self.access, Access::Write)
    }

    /// Whether the column may appear in a statement of the given kind.
    pub fn allows_operation(&self, op: SqlOperation) -> bool {
        self.allowed_operations.is_empty() || self.allowed_operations.contains(&op)
    }

    /// Whether the given aggregation function may wrap this column.
    pub fn allows_aggregation(&self, agg: AggregationType) -> bool {
        self.allowed_aggregations.contains(&agg)
    }
}

/// Policy for a single table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSchema {
    /// Column policies, keyed by column name.
    #[serde(default)]
    pub columns: HashMap<String, ColumnSchema>,

    /// Join partners and the join kinds permitted with each.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub allowed_joins: HashMap<String, HashSet<JoinType>>,

    /// Join kinds permitted with partners not listed in `allowed_joins`.
    /// `None` denies joins with unlisted partners.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_allowed_join: Option<HashSet<JoinType>>,

    /// Require a non-trivial WHERE clause on statements reading this table.
    #[serde(default)]
    pub require_where_clause: bool,

    /// Reject an explicit `LIMIT` larger than this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u64>,
}

impl TableSchema {
    /// Join kinds permitted with `partner`: the listed set unioned with the
    /// default set for unlisted partners.
    pub fn join_kinds_with(&self, partner: &str) -> HashSet<JoinType> {
        let mut kinds: HashSet<JoinType> = self
            .allowed_joins
            .get(partner)
            .cloned()
            .unwrap_or_default();
        if let Some(default) = &self.default_allowed_join {
            kinds.extend(default.iter().copied());
        }
        kinds
    }

    /// Whether a join of `kind` with `partner` is permitted from this side.
    pub fn allows_join(&self, partner: &str, kind: JoinType) -> bool {
        self.join_kinds_with(partner).contains(&kind)
    }

    /// Columns that may appear in a read position, sorted for determinism.
    pub fn readable_columns(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = self
            .columns
            .iter()
            .filter(|(_, c)| c.allows_read())
            .map(|(name, _)| name.as_str())
            .collect();
        cols.sort_unstable();
        cols
    }
}

fn default_max_joins() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_forbidden_keywords() -> HashSet<String> {
    [
        "TRUNCATE", "DROP", "ALTER", "GRANT", "REVOKE", "EXECUTE", "EXEC", "SYSADMIN", "DBADMIN",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// The complete security schema a query is validated against.
///
/// Lookups resolve through three layers: an explicit table entry, then
/// `default_table_schema`, then implicit denial; columns resolve through the
/// effective table's entry, then `default_column_schema`, then implicit
/// denial. An explicit entry always wins over a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecuritySchema {
    /// Table policies, keyed by table name. Absent tables are denied unless
    /// `default_table_schema` is set.
    #[serde(default)]
    pub tables: HashMap<String, TableSchema>,

    /// Fallback policy for tables not listed in `tables`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_table_schema: Option<TableSchema>,

    /// Fallback policy for columns not listed within their table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_column_schema: Option<ColumnSchema>,

    /// Upper bound on JOIN operators across all scopes of a query.
    #[serde(default = "default_max_joins")]
    pub max_joins: usize,

    /// Whether nested SELECTs are permitted.
    #[serde(default = "default_true")]
    pub allow_subqueries: bool,

    /// Character-length cap on the raw query. `None` is unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_query_length: Option<usize>,

    /// Whether the heuristic pre-parse injection gate runs.
    #[serde(default = "default_true")]
    pub sql_injection_protection: bool,

    /// Case-insensitive keyword blacklist applied to the raw query.
    #[serde(default = "default_forbidden_keywords")]
    pub forbidden_keywords: HashSet<String>,
}

impl Default for SecuritySchema {
    fn default() -> Self {
        Self {
            tables: HashMap::new(),
            default_table_schema: None,
            default_column_schema: None,
            max_joins: default_max_joins(),
            allow_subqueries: true,
            max_query_length: None,
            sql_injection_protection: true,
            forbidden_keywords: default_forbidden_keywords(),
        }
    }
}

impl SecuritySchema {
    /// Start building a schema.
    pub fn builder() -> SecuritySchemaBuilder {
        SecuritySchemaBuilder::default()
    }

    /// Load a schema from a YAML file, normalizing and validating it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse a schema from YAML content, normalizing and validating it.
    pub fn from_yaml(content: &str) -> Result<Self, SchemaError> {
        let schema: Self = serde_yaml::from_str(content)?;
        schema.into_checked()
    }

    /// Normalize identifier case and run the construction-time consistency
    /// checks. Called by the builder and the YAML loaders.
    fn into_checked(mut self) -> Result<Self, SchemaError> {
        self.tables = self
            .tables
            .into_iter()
            .map(|(name, table)| (name.to_lowercase(), normalize_table(table)))
            .collect();
        self.default_table_schema = self.default_table_schema.map(normalize_table);
        self.forbidden_keywords = self
            .forbidden_keywords
            .into_iter()
            .map(|kw| kw.to_uppercase())
            .collect();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        for (table_name, table) in &self.tables {
            for (column_name, column) in &table.columns {
                if column.access == Access::Denied {
                    let grant = if !column.allowed_aggregations.is_empty() {
                        Some("aggregations")
                    } else if !column.allowed_operations.is_empty() {
                        Some("operations")
                    } else {
                        None
                    };
                    if let Some(grant) = grant {
                        return Err(SchemaError::ContradictoryColumn {
                            table: table_name.clone(),
                            column: column_name.clone(),
                            grant,
                        });
                    }
                }
            }

            // Join partners must be resolvable unless a default table policy
            // can cover them.
            if self.default_table_schema.is_none() {
                for partner in table.allowed_joins.keys() {
                    if !self.tables.contains_key(partner) {
                        return Err(SchemaError::UnknownJoinPartner {
                            table: table_name.clone(),
                            partner: partner.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether the table is covered by the schema at all.
    pub fn is_table_allowed(&self, table: &str) -> bool {
        self.tables.contains_key(table) || self.default_table_schema.is_some()
    }

    /// The effective policy for a table: its entry or the default.
    pub fn table_schema(&self, table: &str) -> Option<&TableSchema> {
        self.tables
            .get(table)
            .or(self.default_table_schema.as_ref())
    }

    /// The effective policy for a column: the effective table's entry for it,
    /// falling back to `default_column_schema`. `None` means implicit denial.
    pub fn column_schema(&self, table: &str, column: &str) -> Option<&ColumnSchema> {
        self.table_schema(table)
            .and_then(|t| t.columns.get(column))
            .or(self.default_column_schema.as_ref())
    }

    /// Whether the table lists `column` explicitly.
    pub fn declares_column(&self, table: &str, column: &str) -> bool {
        self.table_schema(table)
            .map(|t| t.columns.contains_key(column))
            .unwrap_or(false)
    }

    /// Render the schema's structural limits as a plain-text constraint block
    /// suitable for inclusion in a query-generation prompt.
    pub fn constraint_prompt(&self) -> String {
        let mut keywords: Vec<&str> = self.forbidden_keywords.iter().map(String::as_str).collect();
        keywords.sort_unstable();

        let mut prompt = String::from("Generate an SQL query adhering to the following constraints:\n");
        prompt.push_str(&format!("- Maximum joins allowed: {}\n", self.max_joins));
        prompt.push_str(&format!(
            "- Subqueries allowed: {}\n",
            if self.allow_subqueries { "Yes" } else { "No" }
        ));
        prompt.push_str(&format!(
            "- Maximum query length: {}\n",
            self.max_query_length
                .map(|n| n.to_string())
                .unwrap_or_else(|| "Unlimited".to_string())
        ));
        prompt.push_str(&format!(
            "- SQL injection protection: {}\n",
            if self.sql_injection_protection {
                "Enabled"
            } else {
                "Disabled"
            }
        ));
        prompt.push_str(&format!("- Forbidden keywords: {}\n", keywords.join(", ")));
        prompt
    }
}

fn normalize_table(mut table: TableSchema) -> TableSchema {
    table.columns = table
        .columns
        .into_iter()
        .map(|(name, column)| (name.to_lowercase(), column))
        .collect();
    table.allowed_joins = table
        .allowed_joins
        .into_iter()
        .map(|(name, kinds)| (name.to_lowercase(), kinds))
        .collect();
    table
}

/// Builder for [`SecuritySchema`]. `build` runs the same normalization and
/// consistency checks as the YAML loader.
#[derive(Debug, Default)]
pub struct SecuritySchemaBuilder {
    schema: SecuritySchema,
}

impl SecuritySchemaBuilder {
    /// Add a table policy.
    pub fn table(mut self, name: impl Into<String>, table: TableSchema) -> Self {
        self.schema.tables.insert(name.into(), table);
        self
    }

    /// Set the fallback policy for unlisted tables.
    pub fn default_table_schema(mut self, table: TableSchema) -> Self {
        self.schema.default_table_schema = Some(table);
        self
    }

    /// Set the fallback policy for unlisted columns.
    pub fn default_column_schema(mut self, column: ColumnSchema) -> Self {
        self.schema.default_column_schema = Some(column);
        self
    }

    /// Cap the number of JOIN operators per query.
    pub fn max_joins(mut self, max: usize) -> Self {
        self.schema.max_joins = max;
        self
    }

    /// Permit or forbid nested SELECTs.
    pub fn allow_subqueries(mut self, allow: bool) -> Self {
        self.schema.allow_subqueries = allow;
        self
    }

    /// Cap the raw query length.
    pub fn max_query_length(mut self, max: usize) -> Self {
        self.schema.max_query_length = Some(max);
        self
    }

    /// Toggle the heuristic injection gate.
    pub fn sql_injection_protection(mut self, enabled: bool) -> Self {
        self.schema.sql_injection_protection = enabled;
        self
    }

    /// Replace the forbidden-keyword set.
    pub fn forbidden_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema.forbidden_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Normalize, validate, and freeze the schema.
    pub fn build(self) -> Result<SecuritySchema, SchemaError> {
        self.schema.into_checked()
    }
}
