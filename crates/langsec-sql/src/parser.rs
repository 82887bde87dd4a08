//! The parser adapter.
//!
//! Wraps `sqlparser` and converts its AST into the canonical [`crate::ast`]
//! shape. This is the only module that names `sqlparser` types. Anything the
//! canonical AST cannot express — set operations, CTEs, window functions,
//! DDL, expression forms outside the supported dialect — is rejected with a
//! `QuerySyntaxError`: a query the engine cannot fully examine is a query it
//! cannot judge.

use langsec_core::{AggregationType, Diagnostic, JoinType, Location};
use sqlparser::ast::{
    CaseWhen, Delete, Distinct, Expr as SqlExpr, FromTable, FunctionArg, FunctionArgExpr,
    FunctionArguments, GroupByExpr, Ident, Insert, Join as SqlJoin, JoinConstraint, JoinOperator,
    LimitClause, ObjectName, ObjectNamePart, OrderByKind, Query, Select,
    SelectItem as SqlSelectItem, SelectItemQualifiedWildcardKind, SetExpr,
    Statement as SqlStatement, TableFactor, TableObject, TableWithJoins, Value,
};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::ast::{
    AggregateArg, Assignment, ColumnRef, DeleteStmt, Expr, FromClause, InsertStmt, Join,
    JoinCondition, Literal, Relation, SelectItem, SelectStmt, Statement, UpdateStmt,
};
use crate::span::LineIndex;

/// Parse a query string into exactly one canonical statement.
pub fn parse(query: &str) -> Result<Statement, Diagnostic> {
    let dialect = PostgreSqlDialect {};
    let statements = Parser::parse_sql(&dialect, query)
        .map_err(|err| Diagnostic::syntax(format!("failed to parse query: {}", err)))?;

    let index = LineIndex::new(query);
    let converter = Converter { index };

    match statements.as_slice() {
        [] => Err(Diagnostic::syntax("empty query")),
        [statement] => converter.convert_statement(statement),
        _ => Err(Diagnostic::syntax("expected exactly one SQL statement")),
    }
}

struct Converter {
    index: LineIndex,
}

impl Converter {
    fn convert_statement(&self, statement: &SqlStatement) -> Result<Statement, Diagnostic> {
        match statement {
            SqlStatement::Query(query) => {
                Ok(Statement::Select(self.convert_query(query)?))
            }
            SqlStatement::Insert(insert) => self.convert_insert(insert),
            SqlStatement::Update {
                table,
                assignments,
                from,
                selection,
                returning,
                ..
            } => self.convert_update(table, assignments, from.is_some(), selection, returning.is_some()),
            SqlStatement::Delete(delete) => self.convert_delete(delete),
            _ => Err(Diagnostic::syntax(
                "unsupported statement type (only SELECT/INSERT/UPDATE/DELETE)",
            )),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    fn convert_query(&self, query: &Query) -> Result<SelectStmt, Diagnostic> {
        if query.with.is_some() {
            return Err(Diagnostic::syntax("WITH clauses are not supported"));
        }

        let mut select = match query.body.as_ref() {
            SetExpr::Select(select) => self.convert_select(select)?,
            SetExpr::Query(inner) => self.convert_query(inner)?,
            SetExpr::SetOperation { .. } => {
                return Err(Diagnostic::syntax(
                    "set operations (UNION/INTERSECT/EXCEPT) are not supported",
                ))
            }
            _ => return Err(Diagnostic::syntax("unsupported query body")),
        };

        if let Some(order_by) = &query.order_by {
            match &order_by.kind {
                OrderByKind::Expressions(exprs) => {
                    for item in exprs {
                        select.order_by.push(self.convert_expr(&item.expr)?);
                    }
                }
                OrderByKind::All(_) => {
                    return Err(Diagnostic::syntax("ORDER BY ALL is not supported"))
                }
            }
        }

        if let Some(limit_clause) = &query.limit_clause {
            let (limit, offset) = match limit_clause {
                LimitClause::LimitOffset {
                    limit,
                    offset,
                    limit_by,
                } => {
                    if !limit_by.is_empty() {
                        return Err(Diagnostic::syntax("LIMIT BY is not supported"));
                    }
                    let limit = limit.as_ref().map(|e| self.literal_u64(e, "LIMIT")).transpose()?;
                    let offset = offset
                        .as_ref()
                        .map(|o| self.literal_u64(&o.value, "OFFSET"))
                        .transpose()?;
                    (limit, offset)
                }
                LimitClause::OffsetCommaLimit { offset, limit } => (
                    Some(self.literal_u64(limit, "LIMIT")?),
                    Some(self.literal_u64(offset, "OFFSET")?),
                ),
            };
            select.limit = limit;
            select.offset = offset;
        }

        Ok(select)
    }

    fn convert_select(&self, select: &Select) -> Result<SelectStmt, Diagnostic> {
        if select.top.is_some()
            || select.into.is_some()
            || select.prewhere.is_some()
            || !select.lateral_views.is_empty()
            || !select.named_window.is_empty()
            || select.qualify.is_some()
            || select.value_table_mode.is_some()
            || select.connect_by.is_some()
            || !select.cluster_by.is_empty()
            || !select.distribute_by.is_empty()
            || !select.sort_by.is_empty()
        {
            return Err(Diagnostic::syntax("unsupported SELECT clause"));
        }

        let distinct = match &select.distinct {
            None => false,
            Some(Distinct::Distinct) => true,
            Some(Distinct::On(_)) => {
                return Err(Diagnostic::syntax("DISTINCT ON is not supported"))
            }
        };

        let mut projection = Vec::with_capacity(select.projection.len());
        for item in &select.projection {
            projection.push(self.convert_select_item(item)?);
        }

        let mut from = Vec::with_capacity(select.from.len());
        for table_with_joins in &select.from {
            from.push(self.convert_table_with_joins(table_with_joins)?);
        }

        let where_clause = select
            .selection
            .as_ref()
            .map(|e| self.convert_expr(e))
            .transpose()?;

        let group_by = match &select.group_by {
            GroupByExpr::Expressions(exprs, modifiers) => {
                if !modifiers.is_empty() {
                    return Err(Diagnostic::syntax("GROUP BY modifiers are not supported"));
                }
                exprs
                    .iter()
                    .map(|e| self.convert_expr(e))
                    .collect::<Result<Vec<_>, _>>()?
            }
            GroupByExpr::All(_) => {
                return Err(Diagnostic::syntax("GROUP BY ALL is not supported"))
            }
        };

        let having = select
            .having
            .as_ref()
            .map(|e| self.convert_expr(e))
            .transpose()?;

        Ok(SelectStmt {
            distinct,
            projection,
            from,
            where_clause,
            group_by,
            having,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        })
    }

    fn convert_select_item(&self, item: &SqlSelectItem) -> Result<SelectItem, Diagnostic> {
        match item {
            SqlSelectItem::UnnamedExpr(expr) => Ok(SelectItem::Expr {
                expr: self.convert_expr(expr)?,
                alias: None,
            }),
            SqlSelectItem::ExprWithAlias { expr, alias } => Ok(SelectItem::Expr {
                expr: self.convert_expr(expr)?,
                alias: Some(alias.value.to_lowercase()),
            }),
            SqlSelectItem::Wildcard(_) => Ok(SelectItem::Wildcard),
            SqlSelectItem::QualifiedWildcard(kind, _) => match kind {
                SelectItemQualifiedWildcardKind::ObjectName(name) => {
                    Ok(SelectItem::QualifiedWildcard(last_part(name)?.0))
                }
                SelectItemQualifiedWildcardKind::Expr(_) => {
                    Err(Diagnostic::syntax("expression-qualified wildcards are not supported"))
                }
            },
        }
    }

    // ------------------------------------------------------------------
    // Relations and joins
    // ------------------------------------------------------------------

    fn convert_table_with_joins(
        &self,
        table_with_joins: &TableWithJoins,
    ) -> Result<FromClause, Diagnostic> {
        let relation = self.convert_table_factor(&table_with_joins.relation)?;
        let mut joins = Vec::with_capacity(table_with_joins.joins.len());
        for join in &table_with_joins.joins {
            joins.push(self.convert_join(join)?);
        }
        Ok(FromClause { relation, joins })
    }

    fn convert_table_factor(&self, factor: &TableFactor) -> Result<Relation, Diagnostic> {
        match factor {
            TableFactor::Table { name, alias, .. } => {
                let (table, location) = last_part_located(name, &self.index)?;
                let alias = match alias {
                    Some(alias) => {
                        if !alias.columns.is_empty() {
                            return Err(Diagnostic::syntax(
                                "column lists on table aliases are not supported",
                            ));
                        }
                        Some(alias.name.value.to_lowercase())
                    }
                    None => None,
                };
                Ok(Relation::Table {
                    name: table,
                    alias,
                    location,
                })
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                let alias = match alias {
                    Some(alias) => {
                        if !alias.columns.is_empty() {
                            return Err(Diagnostic::syntax(
                                "column lists on derived-table aliases are not supported",
                            ));
                        }
                        Some(alias.name.value.to_lowercase())
                    }
                    None => None,
                };
                Ok(Relation::Derived {
                    subquery: Box::new(self.convert_query(subquery)?),
                    alias,
                })
            }
            _ => Err(Diagnostic::syntax("unsupported table reference")),
        }
    }

    fn convert_join(&self, join: &SqlJoin) -> Result<Join, Diagnostic> {
        let relation = self.convert_table_factor(&join.relation)?;
        let (kind, constraint) = match &join.join_operator {
            JoinOperator::Join(c) | JoinOperator::Inner(c) => (JoinType::Inner, Some(c)),
            JoinOperator::Left(c) | JoinOperator::LeftOuter(c) => (JoinType::Left, Some(c)),
            JoinOperator::Right(c) | JoinOperator::RightOuter(c) => (JoinType::Right, Some(c)),
            JoinOperator::FullOuter(c) => (JoinType::Full, Some(c)),
            JoinOperator::CrossJoin => (JoinType::Cross, None),
            _ => return Err(Diagnostic::syntax("unsupported join type")),
        };

        let condition = match constraint {
            None | Some(JoinConstraint::None) => JoinCondition::None,
            Some(JoinConstraint::Natural) => JoinCondition::Natural,
            Some(JoinConstraint::On(expr)) => JoinCondition::On(self.convert_expr(expr)?),
            Some(JoinConstraint::Using(names)) => {
                let mut columns = Vec::with_capacity(names.len());
                for name in names {
                    columns.push(last_part(name)?.0);
                }
                JoinCondition::Using(columns)
            }
        };

        Ok(Join {
            relation,
            kind,
            condition,
        })
    }

    // ------------------------------------------------------------------
    // DML statements
    // ------------------------------------------------------------------

    fn convert_insert(&self, insert: &Insert) -> Result<Statement, Diagnostic> {
        if !insert.assignments.is_empty() {
            return Err(Diagnostic::syntax("INSERT ... SET is not supported"));
        }
        if insert.returning.is_some() {
            return Err(Diagnostic::syntax("INSERT ... RETURNING is not supported"));
        }
        if insert.on.is_some() {
            return Err(Diagnostic::syntax("INSERT ... ON CONFLICT is not supported"));
        }

        let (table, location) = match &insert.table {
            TableObject::TableName(name) => last_part_located(name, &self.index)?,
            _ => return Err(Diagnostic::syntax("INSERT requires a plain table name")),
        };

        let columns = insert
            .columns
            .iter()
            .map(|ident| self.column_from_ident(ident))
            .collect();

        let mut values = Vec::new();
        let mut source = None;
        if let Some(query) = &insert.source {
            if query.with.is_some() {
                return Err(Diagnostic::syntax("WITH clauses are not supported"));
            }
            match query.body.as_ref() {
                SetExpr::Values(rows) => {
                    for row in &rows.rows {
                        let converted = row
                            .iter()
                            .map(|e| self.convert_expr(e))
                            .collect::<Result<Vec<_>, _>>()?;
                        values.push(converted);
                    }
                }
                SetExpr::Select(_) => {
                    source = Some(Box::new(self.convert_query(query)?));
                }
                _ => return Err(Diagnostic::syntax("unsupported INSERT source")),
            }
        }

        Ok(Statement::Insert(InsertStmt {
            table,
            location,
            columns,
            values,
            source,
        }))
    }

    fn convert_update(
        &self,
        table: &TableWithJoins,
        assignments: &[sqlparser::ast::Assignment],
        has_from: bool,
        selection: &Option<SqlExpr>,
        has_returning: bool,
    ) -> Result<Statement, Diagnostic> {
        if has_from {
            return Err(Diagnostic::syntax("UPDATE ... FROM is not supported"));
        }
        if has_returning {
            return Err(Diagnostic::syntax("UPDATE ... RETURNING is not supported"));
        }
        if !table.joins.is_empty() {
            return Err(Diagnostic::syntax("joins in UPDATE are not supported"));
        }

        let (name, alias, location) = match self.convert_table_factor(&table.relation)? {
            Relation::Table {
                name,
                alias,
                location,
            } => (name, alias, location),
            Relation::Derived { .. } => {
                return Err(Diagnostic::syntax("UPDATE requires a plain table name"))
            }
        };

        let mut converted = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let target = match &assignment.target {
                sqlparser::ast::AssignmentTarget::ColumnName(name) => self.column_from_name(name)?,
                sqlparser::ast::AssignmentTarget::Tuple(_) => {
                    return Err(Diagnostic::syntax("tuple assignments are not supported"))
                }
            };
            converted.push(Assignment {
                target,
                value: self.convert_expr(&assignment.value)?,
            });
        }

        let where_clause = selection
            .as_ref()
            .map(|e| self.convert_expr(e))
            .transpose()?;

        Ok(Statement::Update(UpdateStmt {
            table: name,
            alias,
            location,
            assignments: converted,
            where_clause,
        }))
    }

    fn convert_delete(&self, delete: &Delete) -> Result<Statement, Diagnostic> {
        if !delete.tables.is_empty() {
            return Err(Diagnostic::syntax("multi-table DELETE is not supported"));
        }
        if delete.using.is_some() {
            return Err(Diagnostic::syntax("DELETE ... USING is not supported"));
        }
        if delete.returning.is_some() {
            return Err(Diagnostic::syntax("DELETE ... RETURNING is not supported"));
        }
        if !delete.order_by.is_empty() {
            return Err(Diagnostic::syntax("DELETE ... ORDER BY is not supported"));
        }

        let from = match &delete.from {
            FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
        };
        let [table_with_joins] = from.as_slice() else {
            return Err(Diagnostic::syntax("DELETE requires exactly one table"));
        };
        if !table_with_joins.joins.is_empty() {
            return Err(Diagnostic::syntax("joins in DELETE are not supported"));
        }

        let (name, alias, location) = match self.convert_table_factor(&table_with_joins.relation)? {
            Relation::Table {
                name,
                alias,
                location,
            } => (name, alias, location),
            Relation::Derived { .. } => {
                return Err(Diagnostic::syntax("DELETE requires a plain table name"))
            }
        };

        let where_clause = delete
            .selection
            .as_ref()
            .map(|e| self.convert_expr(e))
            .transpose()?;

        let limit = delete
            .limit
            .as_ref()
            .map(|e| self.literal_u64(e, "LIMIT"))
            .transpose()?;

        Ok(Statement::Delete(DeleteStmt {
            table: name,
            alias,
            location,
            where_clause,
            limit,
        }))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn convert_expr(&self, expr: &SqlExpr) -> Result<Expr, Diagnostic> {
        match expr {
            SqlExpr::Identifier(ident) => Ok(Expr::Column(self.column_from_ident(ident))),
            SqlExpr::CompoundIdentifier(idents) => Ok(Expr::Column(
                self.column_from_compound(idents)?,
            )),
            SqlExpr::Value(value) => Ok(Expr::Literal(convert_value(&value.value)?)),
            SqlExpr::Nested(inner) => self.convert_expr(inner),
            SqlExpr::UnaryOp { op, expr } => Ok(Expr::Unary {
                op: op.to_string(),
                expr: Box::new(self.convert_expr(expr)?),
            }),
            SqlExpr::BinaryOp { left, op, right } => Ok(Expr::Binary {
                left: Box::new(self.convert_expr(left)?),
                op: op.to_string(),
                right: Box::new(self.convert_expr(right)?),
            }),
            SqlExpr::Function(function) => self.convert_function(function),
            SqlExpr::Case {
                operand,
                conditions,
                else_result,
                ..
            } => {
                let operand = operand
                    .as_ref()
                    .map(|e| self.convert_expr(e))
                    .transpose()?
                    .map(Box::new);
                let mut branches = Vec::with_capacity(conditions.len());
                for CaseWhen { condition, result } in conditions {
                    branches.push((self.convert_expr(condition)?, self.convert_expr(result)?));
                }
                let else_result = else_result
                    .as_ref()
                    .map(|e| self.convert_expr(e))
                    .transpose()?
                    .map(Box::new);
                Ok(Expr::Case {
                    operand,
                    branches,
                    else_result,
                })
            }
            SqlExpr::Cast { expr, .. } => Ok(Expr::Cast(Box::new(self.convert_expr(expr)?))),
            SqlExpr::IsNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.convert_expr(inner)?),
                negated: false,
            }),
            SqlExpr::IsNotNull(inner) => Ok(Expr::IsNull {
                expr: Box::new(self.convert_expr(inner)?),
                negated: true,
            }),
            SqlExpr::IsTrue(inner)
            | SqlExpr::IsNotTrue(inner)
            | SqlExpr::IsFalse(inner)
            | SqlExpr::IsNotFalse(inner) => Ok(Expr::Unary {
                op: "IS".to_string(),
                expr: Box::new(self.convert_expr(inner)?),
            }),
            SqlExpr::Between {
                expr, low, high, ..
            } => Ok(Expr::Between {
                expr: Box::new(self.convert_expr(expr)?),
                low: Box::new(self.convert_expr(low)?),
                high: Box::new(self.convert_expr(high)?),
            }),
            SqlExpr::InList { expr, list, .. } => Ok(Expr::InList {
                expr: Box::new(self.convert_expr(expr)?),
                list: list
                    .iter()
                    .map(|e| self.convert_expr(e))
                    .collect::<Result<Vec<_>, _>>()?,
            }),
            SqlExpr::Like { expr, pattern, .. } | SqlExpr::ILike { expr, pattern, .. } => {
                Ok(Expr::Like {
                    expr: Box::new(self.convert_expr(expr)?),
                    pattern: Box::new(self.convert_expr(pattern)?),
                })
            }
            SqlExpr::Tuple(items) => Ok(Expr::Tuple(
                items
                    .iter()
                    .map(|e| self.convert_expr(e))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            SqlExpr::Subquery(query) => Ok(Expr::Subquery(Box::new(self.convert_query(query)?))),
            SqlExpr::Exists { subquery, .. } => {
                Ok(Expr::Exists(Box::new(self.convert_query(subquery)?)))
            }
            SqlExpr::InSubquery { expr, subquery, .. } => Ok(Expr::InSubquery {
                expr: Box::new(self.convert_expr(expr)?),
                subquery: Box::new(self.convert_query(subquery)?),
            }),
            other => Err(Diagnostic::syntax(format!(
                "unsupported expression: {}",
                other
            ))),
        }
    }

    fn convert_function(&self, function: &sqlparser::ast::Function) -> Result<Expr, Diagnostic> {
        if function.over.is_some() {
            return Err(Diagnostic::syntax("window functions are not supported"));
        }
        if function.filter.is_some() || !function.within_group.is_empty() {
            return Err(Diagnostic::syntax("FILTER/WITHIN GROUP are not supported"));
        }
        if !matches!(function.parameters, FunctionArguments::None) {
            return Err(Diagnostic::syntax(
                "parameterized function calls are not supported",
            ));
        }

        let name_ident = single_part(&function.name)?;
        let name = name_ident.value.to_lowercase();
        let location = self.index.location(name_ident.span);

        let (args, distinct) = match &function.args {
            FunctionArguments::None => (&[][..], false),
            FunctionArguments::List(list) => {
                if !list.clauses.is_empty() {
                    return Err(Diagnostic::syntax(
                        "function argument clauses are not supported",
                    ));
                }
                (list.args.as_slice(), list.duplicate_treatment.is_some())
            }
            FunctionArguments::Subquery(_) => {
                return Err(Diagnostic::syntax(
                    "subquery function arguments are not supported",
                ))
            }
        };

        let aggregate = match name.as_str() {
            "count" => Some(AggregationType::Count),
            "sum" => Some(AggregationType::Sum),
            "avg" => Some(AggregationType::Avg),
            "min" => Some(AggregationType::Min),
            "max" => Some(AggregationType::Max),
            _ => None,
        };

        if let Some(func) = aggregate {
            let [arg] = args else {
                return Err(Diagnostic::syntax(format!(
                    "{} takes exactly one argument",
                    name.to_uppercase()
                )));
            };
            let arg = match arg {
                FunctionArg::Unnamed(FunctionArgExpr::Wildcard)
                | FunctionArg::Unnamed(FunctionArgExpr::QualifiedWildcard(_)) => {
                    AggregateArg::Star
                }
                FunctionArg::Unnamed(FunctionArgExpr::Expr(expr)) => {
                    AggregateArg::Expr(Box::new(self.convert_expr(expr)?))
                }
                _ => {
                    return Err(Diagnostic::syntax("named function arguments are not supported"))
                }
            };
            return Ok(Expr::Aggregate {
                func,
                distinct,
                arg,
                location,
            });
        }

        if distinct {
            return Err(Diagnostic::syntax(
                "DISTINCT is only supported in aggregate calls",
            ));
        }

        let mut converted = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                FunctionArg::Unnamed(FunctionArgExpr::Expr(expr)) => {
                    converted.push(self.convert_expr(expr)?)
                }
                _ => {
                    return Err(Diagnostic::syntax(format!(
                        "unsupported argument in call to {}",
                        name
                    )))
                }
            }
        }
        Ok(Expr::Function {
            name,
            args: converted,
        })
    }

    // ------------------------------------------------------------------
    // Identifiers and literals
    // ------------------------------------------------------------------

    fn column_from_ident(&self, ident: &Ident) -> ColumnRef {
        ColumnRef {
            qualifier: None,
            column: ident.value.to_lowercase(),
            location: self.index.location(ident.span),
        }
    }

    fn column_from_compound(&self, idents: &[Ident]) -> Result<ColumnRef, Diagnostic> {
        match idents {
            [.., qualifier, column] => Ok(ColumnRef {
                qualifier: Some(qualifier.value.to_lowercase()),
                column: column.value.to_lowercase(),
                location: self.index.location(column.span),
            }),
            _ => Err(Diagnostic::syntax("malformed column reference")),
        }
    }

    fn column_from_name(&self, name: &ObjectName) -> Result<ColumnRef, Diagnostic> {
        let parts: Vec<&Ident> = name
            .0
            .iter()
            .map(|part| match part {
                ObjectNamePart::Identifier(ident) => Ok(ident),
                _ => Err(Diagnostic::syntax("unsupported identifier part")),
            })
            .collect::<Result<_, _>>()?;
        match parts.as_slice() {
            [column] => Ok(self.column_from_ident(column)),
            [.., qualifier, column] => Ok(ColumnRef {
                qualifier: Some(qualifier.value.to_lowercase()),
                column: column.value.to_lowercase(),
                location: self.index.location(column.span),
            }),
            [] => Err(Diagnostic::syntax("empty column reference")),
        }
    }

    fn literal_u64(&self, expr: &SqlExpr, clause: &str) -> Result<u64, Diagnostic> {
        if let SqlExpr::Value(value) = expr {
            if let Value::Number(text, _) = &value.value {
                if let Ok(parsed) = text.parse::<u64>() {
                    return Ok(parsed);
                }
            }
        }
        Err(Diagnostic::syntax(format!(
            "{} must be a non-negative integer literal",
            clause
        )))
    }
}

fn convert_value(value: &Value) -> Result<Literal, Diagnostic> {
    match value {
        Value::Number(text, _) => Ok(Literal::Number(text.clone())),
        Value::SingleQuotedString(text)
        | Value::DoubleQuotedString(text)
        | Value::NationalStringLiteral(text)
        | Value::EscapedStringLiteral(text) => Ok(Literal::String(text.clone())),
        Value::Boolean(b) => Ok(Literal::Bool(*b)),
        Value::Null => Ok(Literal::Null),
        other => Err(Diagnostic::syntax(format!(
            "unsupported literal: {}",
            other
        ))),
    }
}

/// Last segment of a possibly schema-qualified name, lower-cased.
fn last_part(name: &ObjectName) -> Result<(String, &Ident), Diagnostic> {
    match name.0.last() {
        Some(ObjectNamePart::Identifier(ident)) => Ok((ident.value.to_lowercase(), ident)),
        _ => Err(Diagnostic::syntax("unsupported table name")),
    }
}

fn last_part_located(
    name: &ObjectName,
    index: &LineIndex,
) -> Result<(String, Option<Location>), Diagnostic> {
    let (value, ident) = last_part(name)?;
    Ok((value, index.location(ident.span)))
}

/// A function name must be a single unqualified identifier.
fn single_part(name: &ObjectName) -> Result<&Ident, Diagnostic> {
    match name.0.as_slice() {
        [ObjectNamePart::Identifier(ident)] => Ok(ident),
        _ => Err(Diagnostic::syntax("qualified function names are not supported")),
    }
}
