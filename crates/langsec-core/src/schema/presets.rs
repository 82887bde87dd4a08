//! Ready-made schema presets.
//!
//! These mirror the three security tiers shipped with the original guard:
//! a permissive profile for trusted generators, a standard profile, and a
//! strict read-only profile. All three rely on column defaults, so any table
//! name is accepted; tighten with explicit `tables` entries where needed.

use super::{AggregationType, ColumnSchema, SecuritySchema, SqlOperation, TableSchema};

impl SecuritySchema {
    /// Permissive profile: subqueries allowed, generous length cap, all
    /// aggregations readable by default.
    pub fn permissive() -> Self {
        Self::builder()
            .allow_subqueries(true)
            .max_query_length(1000)
            .default_table_schema(TableSchema::default())
            .default_column_schema(ColumnSchema::read().with_aggregations(AggregationType::ALL))
            .build()
            .expect("preset schema is consistent")
    }

    /// Standard profile: no subqueries, moderate length cap, SUM/AVG only.
    pub fn standard() -> Self {
        Self::builder()
            .allow_subqueries(false)
            .max_query_length(500)
            .default_table_schema(TableSchema::default())
            .default_column_schema(
                ColumnSchema::read()
                    .with_aggregations([AggregationType::Sum, AggregationType::Avg]),
            )
            .build()
            .expect("preset schema is consistent")
    }

    /// Strict profile: SELECT-only, short queries, no aggregations.
    pub fn strict() -> Self {
        Self::builder()
            .allow_subqueries(false)
            .max_query_length(200)
            .default_table_schema(TableSchema::default())
            .default_column_schema(ColumnSchema::read().with_operations([SqlOperation::Select]))
            .build()
            .expect("preset schema is consistent")
    }
}
