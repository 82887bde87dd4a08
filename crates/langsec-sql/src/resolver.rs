//! Identifier resolution.
//!
//! Walks the canonical AST and builds per-scope symbol tables: every alias
//! is bound to its base table (or derived scope), and every column reference
//! is annotated with the base table it ultimately reads. Validators only
//! ever see base tables — aliases exist purely as resolution aids.
//!
//! Scopes nest: each SELECT (including every subquery) introduces one, and
//! inner scopes shadow outer ones. Resolution failures are security-relevant
//! — an unresolved qualifier could mask a denied table — so the resolver
//! refuses to guess and reports `ColumnAccessError` diagnostics directly.

use langsec_core::{Diagnostic, Location, SecuritySchema};

use crate::ast::{
    AggregateArg, ColumnRef, DeleteStmt, Expr, FromClause, InsertStmt, Join, JoinCondition,
    Relation, SelectItem, SelectStmt, Statement, StatementKind, UpdateStmt,
};

/// Index of a scope within [`ResolvedQuery::scopes`]. Scope 0 is the
/// top-level statement.
pub type ScopeId = usize;

/// The syntactic position a column reference appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Projection,
    Predicate,
    GroupBy,
    OrderBy,
    AggregateArg,
    AssignTarget,
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Projection => write!(f, "projection"),
            Self::Predicate => write!(f, "predicate"),
            Self::GroupBy => write!(f, "GROUP BY"),
            Self::OrderBy => write!(f, "ORDER BY"),
            Self::AggregateArg => write!(f, "aggregate argument"),
            Self::AssignTarget => write!(f, "assignment target"),
        }
    }
}

/// A column reference annotated with its base table.
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    pub table: String,
    pub column: String,
    pub role: ColumnRole,
    pub scope: ScopeId,
    pub location: Option<Location>,
}

/// A join between two base tables.
#[derive(Debug, Clone)]
pub struct ResolvedJoin {
    pub left: String,
    pub right: String,
    pub kind: langsec_core::JoinType,
    pub scope: ScopeId,
}

/// What an aggregate call was applied to.
#[derive(Debug, Clone)]
pub enum AggregateTarget {
    /// `COUNT(*)`.
    Star,
    Column { table: String, column: String },
}

/// One aggregate application, one entry per referenced column (or one
/// `Star` entry for `COUNT(*)`).
#[derive(Debug, Clone)]
pub struct ResolvedAggregate {
    pub func: langsec_core::AggregationType,
    pub target: AggregateTarget,
    pub scope: ScopeId,
    pub location: Option<Location>,
}

/// Summary of one scope, for the structural validators.
#[derive(Debug, Clone)]
pub struct ScopeInfo {
    pub parent: Option<ScopeId>,
    pub kind: StatementKind,
    /// Base tables referenced by this scope's FROM, first appearance order.
    pub tables: Vec<String>,
    pub has_where: bool,
    /// The WHERE predicate references no column.
    pub where_is_trivial: bool,
    pub limit: Option<u64>,
}

/// The fully resolved query the rule engine judges.
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub kind: StatementKind,
    pub scopes: Vec<ScopeInfo>,
    pub columns: Vec<ResolvedColumn>,
    pub joins: Vec<ResolvedJoin>,
    pub aggregates: Vec<ResolvedAggregate>,
    /// JOIN operators across all scopes, including joins against derived
    /// tables.
    pub join_count: usize,
    /// Nested SELECTs: derived tables plus subqueries in expression
    /// position.
    pub subquery_count: usize,
}

/// Resolve a statement against the schema.
pub fn resolve(statement: &Statement, schema: &SecuritySchema) -> Result<ResolvedQuery, Diagnostic> {
    let mut resolver = Resolver {
        schema,
        scopes: Vec::new(),
        bindings: Vec::new(),
        columns: Vec::new(),
        joins: Vec::new(),
        aggregates: Vec::new(),
        join_count: 0,
        subquery_count: 0,
    };

    match statement {
        Statement::Select(select) => {
            resolver.resolve_select(select, None)?;
        }
        Statement::Insert(insert) => resolver.resolve_insert(insert)?,
        Statement::Update(update) => resolver.resolve_update(update)?,
        Statement::Delete(delete) => resolver.resolve_delete(delete)?,
    }

    Ok(ResolvedQuery {
        kind: statement.kind(),
        scopes: resolver.scopes,
        columns: resolver.columns,
        joins: resolver.joins,
        aggregates: resolver.aggregates,
        join_count: resolver.join_count,
        subquery_count: resolver.subquery_count,
    })
}

/// One exported column of a derived table, by output name, with the base
/// column it passes through (if it is not a computed expression).
#[derive(Debug, Clone)]
struct DerivedOutput {
    name: Option<String>,
    base: Option<(String, String)>,
}

#[derive(Debug, Clone)]
enum BindingTarget {
    Base(String),
    Derived(Vec<DerivedOutput>),
}

#[derive(Debug, Clone)]
struct Binding {
    name: String,
    target: BindingTarget,
}

struct Resolver<'a> {
    schema: &'a SecuritySchema,
    scopes: Vec<ScopeInfo>,
    /// Per-scope bindings, indexed by ScopeId.
    bindings: Vec<Vec<Binding>>,
    columns: Vec<ResolvedColumn>,
    joins: Vec<ResolvedJoin>,
    aggregates: Vec<ResolvedAggregate>,
    join_count: usize,
    subquery_count: usize,
}

impl<'a> Resolver<'a> {
    fn new_scope(&mut self, parent: Option<ScopeId>, kind: StatementKind) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(ScopeInfo {
            parent,
            kind,
            tables: Vec::new(),
            has_where: false,
            where_is_trivial: false,
            limit: None,
        });
        self.bindings.push(Vec::new());
        id
    }

    fn bind_base(&mut self, scope: ScopeId, name: String, table: String) {
        if !self.scopes[scope].tables.contains(&table) {
            self.scopes[scope].tables.push(table.clone());
        }
        self.bindings[scope].push(Binding {
            name,
            target: BindingTarget::Base(table),
        });
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Resolve a SELECT (top level or nested) and return its exported
    /// projection outputs, for use when it appears as a derived table.
    fn resolve_select(
        &mut self,
        select: &SelectStmt,
        parent: Option<ScopeId>,
    ) -> Result<Vec<DerivedOutput>, Diagnostic> {
        let scope = self.new_scope(parent, StatementKind::Select);

        // Pass 1: register every relation so later references can see the
        // whole FROM list.
        for from in &select.from {
            self.register_relation(scope, &from.relation)?;
            for join in &from.joins {
                self.register_relation(scope, &join.relation)?;
            }
        }

        // Pass 2: join pairing, counting, and join conditions.
        for from in &select.from {
            self.resolve_joins(scope, from)?;
        }

        // Pass 3: projection (with wildcard expansion), predicates, and the
        // remaining clauses, in source order.
        let mut outputs = Vec::new();
        for item in &select.projection {
            match item {
                SelectItem::Expr { expr, alias } => {
                    if let Expr::Column(column) = expr {
                        let base =
                            self.resolve_column(scope, column, ColumnRole::Projection)?;
                        outputs.push(DerivedOutput {
                            name: alias.clone().or_else(|| Some(column.column.clone())),
                            base,
                        });
                    } else {
                        self.walk_expr(scope, expr, ColumnRole::Projection)?;
                        outputs.push(DerivedOutput {
                            name: alias.clone().or_else(|| inferred_name(expr)),
                            base: None,
                        });
                    }
                }
                SelectItem::Wildcard => {
                    let bindings = self.bindings[scope].clone();
                    for binding in &bindings {
                        outputs.extend(self.expand_wildcard(scope, binding));
                    }
                }
                SelectItem::QualifiedWildcard(qualifier) => {
                    let binding = self.bindings[scope]
                        .iter()
                        .find(|b| b.name == *qualifier)
                        .cloned()
                        .ok_or_else(|| Diagnostic::unresolved_qualifier(qualifier))?;
                    outputs.extend(self.expand_wildcard(scope, &binding));
                }
            }
        }

        if let Some(where_clause) = &select.where_clause {
            self.scopes[scope].has_where = true;
            self.scopes[scope].where_is_trivial = !where_clause.references_columns();
            self.walk_expr(scope, where_clause, ColumnRole::Predicate)?;
        }
        for expr in &select.group_by {
            self.walk_expr(scope, expr, ColumnRole::GroupBy)?;
        }
        if let Some(having) = &select.having {
            self.walk_expr(scope, having, ColumnRole::Predicate)?;
        }
        for expr in &select.order_by {
            self.walk_expr(scope, expr, ColumnRole::OrderBy)?;
        }
        self.scopes[scope].limit = select.limit;

        Ok(outputs)
    }

    fn resolve_insert(&mut self, insert: &InsertStmt) -> Result<(), Diagnostic> {
        let scope = self.new_scope(None, StatementKind::Insert);
        self.bind_base(scope, insert.table.clone(), insert.table.clone());

        for column in &insert.columns {
            self.resolve_assign_target(scope, column, &insert.table)?;
        }
        for row in &insert.values {
            for expr in row {
                self.walk_expr(scope, expr, ColumnRole::Predicate)?;
            }
        }
        if let Some(source) = &insert.source {
            // INSERT ... SELECT: the source is the statement's primary
            // query, not a nested subquery.
            self.resolve_select(source, None)?;
        }
        Ok(())
    }

    fn resolve_update(&mut self, update: &UpdateStmt) -> Result<(), Diagnostic> {
        let scope = self.new_scope(None, StatementKind::Update);
        let binding_name = update.alias.clone().unwrap_or_else(|| update.table.clone());
        self.bind_base(scope, binding_name, update.table.clone());

        for assignment in &update.assignments {
            self.resolve_assign_target(scope, &assignment.target, &update.table)?;
            self.walk_expr(scope, &assignment.value, ColumnRole::Predicate)?;
        }
        if let Some(where_clause) = &update.where_clause {
            self.scopes[scope].has_where = true;
            self.scopes[scope].where_is_trivial = !where_clause.references_columns();
            self.walk_expr(scope, where_clause, ColumnRole::Predicate)?;
        }
        Ok(())
    }

    fn resolve_delete(&mut self, delete: &DeleteStmt) -> Result<(), Diagnostic> {
        let scope = self.new_scope(None, StatementKind::Delete);
        let binding_name = delete.alias.clone().unwrap_or_else(|| delete.table.clone());
        self.bind_base(scope, binding_name, delete.table.clone());

        if let Some(where_clause) = &delete.where_clause {
            self.scopes[scope].has_where = true;
            self.scopes[scope].where_is_trivial = !where_clause.references_columns();
            self.walk_expr(scope, where_clause, ColumnRole::Predicate)?;
        }
        self.scopes[scope].limit = delete.limit;
        Ok(())
    }

    /// An INSERT column list entry or UPDATE SET target. A qualifier, when
    /// present, must name the statement's own table (or its alias).
    fn resolve_assign_target(
        &mut self,
        scope: ScopeId,
        column: &ColumnRef,
        table: &str,
    ) -> Result<(), Diagnostic> {
        if let Some(qualifier) = &column.qualifier {
            let known = self.bindings[scope]
                .iter()
                .any(|b| b.name == *qualifier);
            if !known {
                return Err(
                    Diagnostic::unresolved_qualifier(qualifier).at_opt(column.location)
                );
            }
        }
        self.columns.push(ResolvedColumn {
            table: table.to_string(),
            column: column.column.clone(),
            role: ColumnRole::AssignTarget,
            scope,
            location: column.location,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // FROM / JOIN
    // ------------------------------------------------------------------

    fn register_relation(
        &mut self,
        scope: ScopeId,
        relation: &Relation,
    ) -> Result<(), Diagnostic> {
        match relation {
            Relation::Table { name, alias, .. } => {
                let binding_name = alias.clone().unwrap_or_else(|| name.clone());
                self.bind_base(scope, binding_name, name.clone());
            }
            Relation::Derived { subquery, alias } => {
                self.subquery_count += 1;
                let outputs = self.resolve_select(subquery, Some(scope))?;
                self.bindings[scope].push(Binding {
                    name: alias.clone().unwrap_or_default(),
                    target: BindingTarget::Derived(outputs),
                });
            }
        }
        Ok(())
    }

    fn resolve_joins(&mut self, scope: ScopeId, from: &FromClause) -> Result<(), Diagnostic> {
        let mut left = base_table_of(&from.relation);
        for join in &from.joins {
            self.join_count += 1;
            let right = base_table_of(&join.relation);

            if let (Some(left_table), Some(right_table)) = (&left, &right) {
                self.joins.push(ResolvedJoin {
                    left: left_table.clone(),
                    right: right_table.clone(),
                    kind: join.kind,
                    scope,
                });
            }

            self.resolve_join_condition(scope, join, &left, &right)?;

            // The next join in the chain pairs against this relation.
            left = right;
        }
        Ok(())
    }

    fn resolve_join_condition(
        &mut self,
        scope: ScopeId,
        join: &Join,
        left: &Option<String>,
        right: &Option<String>,
    ) -> Result<(), Diagnostic> {
        match &join.condition {
            JoinCondition::On(expr) => self.walk_expr(scope, expr, ColumnRole::Predicate),
            JoinCondition::Using(columns) => {
                // USING names a column on both sides; record a predicate
                // reference against each base side so both policies apply.
                for column in columns {
                    for table in [left, right].into_iter().flatten() {
                        self.columns.push(ResolvedColumn {
                            table: table.clone(),
                            column: column.clone(),
                            role: ColumnRole::Predicate,
                            scope,
                            location: None,
                        });
                    }
                }
                Ok(())
            }
            JoinCondition::Natural | JoinCondition::None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Column resolution
    // ------------------------------------------------------------------

    /// Resolve a column reference, record it, and return the `(table,
    /// column)` pair it was annotated with. `Ok(None)` means the reference
    /// lands on a computed expression of a derived table — already validated
    /// inside the subquery's own scope, so policy-exempt here.
    fn resolve_column(
        &mut self,
        scope: ScopeId,
        column: &ColumnRef,
        role: ColumnRole,
    ) -> Result<Option<(String, String)>, Diagnostic> {
        let resolved = match &column.qualifier {
            Some(qualifier) => self.resolve_qualified(scope, qualifier, column)?,
            None => self.resolve_unqualified(scope, column)?,
        };

        if let Some((table, base_column)) = &resolved {
            self.columns.push(ResolvedColumn {
                table: table.clone(),
                column: base_column.clone(),
                role,
                scope,
                location: column.location,
            });
        }
        Ok(resolved)
    }

    fn resolve_qualified(
        &self,
        scope: ScopeId,
        qualifier: &str,
        column: &ColumnRef,
    ) -> Result<Option<(String, String)>, Diagnostic> {
        let binding = self
            .lookup_binding(scope, qualifier)
            .ok_or_else(|| Diagnostic::unresolved_qualifier(qualifier).at_opt(column.location))?;

        match &binding.target {
            BindingTarget::Base(table) => Ok(Some((table.clone(), column.column.clone()))),
            BindingTarget::Derived(outputs) => {
                let output = outputs
                    .iter()
                    .find(|o| o.name.as_deref() == Some(column.column.as_str()))
                    .ok_or_else(|| {
                        Diagnostic::unresolved_column(&column.column).at_opt(column.location)
                    })?;
                Ok(output.base.clone())
            }
        }
    }

    fn resolve_unqualified(
        &self,
        scope: ScopeId,
        column: &ColumnRef,
    ) -> Result<Option<(String, String)>, Diagnostic> {
        // Walk the scope chain innermost-out; the first scope exposing the
        // column wins (shadowing).
        let mut current = Some(scope);
        while let Some(scope_id) = current {
            let exposers: Vec<&Binding> = self.bindings[scope_id]
                .iter()
                .filter(|binding| self.exposes(binding, &column.column))
                .collect();

            match exposers.as_slice() {
                [] => {}
                [binding] => return Ok(self.bind_through(binding, column)),
                many => {
                    let candidates: Vec<String> =
                        many.iter().map(|b| b.name.clone()).collect();
                    return Err(Diagnostic::ambiguous_column(&column.column, &candidates)
                        .at_opt(column.location));
                }
            }
            current = self.scopes[scope_id].parent;
        }

        // No binding exposes the column. A scope with a single table still
        // determines the reference unambiguously; the column policy decides
        // its fate from here.
        if let [binding] = self.bindings[scope].as_slice() {
            if let BindingTarget::Base(table) = &binding.target {
                return Ok(Some((table.clone(), column.column.clone())));
            }
        }

        Err(Diagnostic::unresolved_column(&column.column).at_opt(column.location))
    }

    fn lookup_binding(&self, scope: ScopeId, name: &str) -> Option<&Binding> {
        let mut current = Some(scope);
        while let Some(scope_id) = current {
            if let Some(binding) = self.bindings[scope_id].iter().find(|b| b.name == name) {
                return Some(binding);
            }
            current = self.scopes[scope_id].parent;
        }
        None
    }

    /// Whether a binding exposes a column by name: schema-declared columns
    /// for base tables, projection outputs for derived tables.
    fn exposes(&self, binding: &Binding, column: &str) -> bool {
        match &binding.target {
            BindingTarget::Base(table) => self.schema.declares_column(table, column),
            BindingTarget::Derived(outputs) => outputs
                .iter()
                .any(|o| o.name.as_deref() == Some(column)),
        }
    }

    fn bind_through(&self, binding: &Binding, column: &ColumnRef) -> Option<(String, String)> {
        match &binding.target {
            BindingTarget::Base(table) => Some((table.clone(), column.column.clone())),
            BindingTarget::Derived(outputs) => outputs
                .iter()
                .find(|o| o.name.as_deref() == Some(column.column.as_str()))
                .and_then(|o| o.base.clone()),
        }
    }

    /// Expand `*` or `t.*` for one binding: the readable columns of a base
    /// table, or the exported outputs of a derived table.
    fn expand_wildcard(&mut self, scope: ScopeId, binding: &Binding) -> Vec<DerivedOutput> {
        let mut outputs = Vec::new();
        match &binding.target {
            BindingTarget::Base(table) => {
                if let Some(table_schema) = self.schema.table_schema(table) {
                    for column in table_schema.readable_columns() {
                        self.columns.push(ResolvedColumn {
                            table: table.clone(),
                            column: column.to_string(),
                            role: ColumnRole::Projection,
                            scope,
                            location: None,
                        });
                        outputs.push(DerivedOutput {
                            name: Some(column.to_string()),
                            base: Some((table.clone(), column.to_string())),
                        });
                    }
                }
            }
            BindingTarget::Derived(derived) => {
                for output in derived {
                    if let Some((table, column)) = &output.base {
                        self.columns.push(ResolvedColumn {
                            table: table.clone(),
                            column: column.clone(),
                            role: ColumnRole::Projection,
                            scope,
                            location: None,
                        });
                    }
                    outputs.push(output.clone());
                }
            }
        }
        outputs
    }

    // ------------------------------------------------------------------
    // Expression walking
    // ------------------------------------------------------------------

    fn walk_expr(&mut self, scope: ScopeId, expr: &Expr, role: ColumnRole) -> Result<(), Diagnostic> {
        match expr {
            Expr::Column(column) => {
                self.resolve_column(scope, column, role)?;
            }
            Expr::Literal(_) => {}
            Expr::Unary { expr, .. } | Expr::Cast(expr) | Expr::IsNull { expr, .. } => {
                self.walk_expr(scope, expr, role)?;
            }
            Expr::Binary { left, right, .. } => {
                self.walk_expr(scope, left, role)?;
                self.walk_expr(scope, right, role)?;
            }
            Expr::Aggregate {
                func,
                arg,
                location,
                ..
            } => match arg {
                AggregateArg::Star => {
                    self.aggregates.push(ResolvedAggregate {
                        func: *func,
                        target: AggregateTarget::Star,
                        scope,
                        location: *location,
                    });
                }
                AggregateArg::Expr(inner) => {
                    // Record one aggregate entry per column the argument
                    // reads.
                    let before = self.columns.len();
                    self.walk_expr(scope, inner, ColumnRole::AggregateArg)?;
                    for i in before..self.columns.len() {
                        if self.columns[i].role == ColumnRole::AggregateArg
                            && self.columns[i].scope == scope
                        {
                            self.aggregates.push(ResolvedAggregate {
                                func: *func,
                                target: AggregateTarget::Column {
                                    table: self.columns[i].table.clone(),
                                    column: self.columns[i].column.clone(),
                                },
                                scope,
                                location: self.columns[i].location.or(*location),
                            });
                        }
                    }
                }
            },
            Expr::Function { args, .. } | Expr::Tuple(args) => {
                for arg in args {
                    self.walk_expr(scope, arg, role)?;
                }
            }
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                if let Some(operand) = operand {
                    self.walk_expr(scope, operand, role)?;
                }
                for (condition, result) in branches {
                    self.walk_expr(scope, condition, role)?;
                    self.walk_expr(scope, result, role)?;
                }
                if let Some(else_result) = else_result {
                    self.walk_expr(scope, else_result, role)?;
                }
            }
            Expr::Between { expr, low, high } => {
                self.walk_expr(scope, expr, role)?;
                self.walk_expr(scope, low, role)?;
                self.walk_expr(scope, high, role)?;
            }
            Expr::InList { expr, list } => {
                self.walk_expr(scope, expr, role)?;
                for item in list {
                    self.walk_expr(scope, item, role)?;
                }
            }
            Expr::Like { expr, pattern } => {
                self.walk_expr(scope, expr, role)?;
                self.walk_expr(scope, pattern, role)?;
            }
            Expr::Subquery(select) | Expr::Exists(select) => {
                self.subquery_count += 1;
                self.resolve_select(select, Some(scope))?;
            }
            Expr::InSubquery { expr, subquery } => {
                self.walk_expr(scope, expr, role)?;
                self.subquery_count += 1;
                self.resolve_select(subquery, Some(scope))?;
            }
        }
        Ok(())
    }
}

fn base_table_of(relation: &Relation) -> Option<String> {
    match relation {
        Relation::Table { name, .. } => Some(name.clone()),
        Relation::Derived { .. } => None,
    }
}

/// Output name inferred for an unaliased projection expression.
fn inferred_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Column(column) => Some(column.column.clone()),
        Expr::Function { name, .. } => Some(name.clone()),
        Expr::Aggregate { func, .. } => Some(func.to_string().to_lowercase()),
        _ => None,
    }
}
