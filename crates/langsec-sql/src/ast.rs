//! The canonical AST the engine validates.
//!
//! This is deliberately smaller than the underlying parser's AST: it covers
//! exactly the supported dialect, and every case is matched exhaustively by
//! the resolver. The parser adapter rejects anything it cannot express here,
//! so syntax outside the dialect can never slip past the validators
//! unexamined.

use langsec_core::{AggregationType, JoinType, Location};

/// Statement kinds the engine validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A single parsed statement.
#[derive(Debug, Clone)]
pub enum Statement {
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Select(_) => StatementKind::Select,
            Self::Insert(_) => StatementKind::Insert,
            Self::Update(_) => StatementKind::Update,
            Self::Delete(_) => StatementKind::Delete,
        }
    }
}

/// A SELECT, at any nesting depth.
#[derive(Debug, Clone)]
pub struct SelectStmt {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Vec<FromClause>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<Expr>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// One comma-separated FROM item: a relation plus its join chain.
#[derive(Debug, Clone)]
pub struct FromClause {
    pub relation: Relation,
    pub joins: Vec<Join>,
}

/// A table reference or derived table.
#[derive(Debug, Clone)]
pub enum Relation {
    Table {
        /// Base table name, lower-cased, schema qualifiers stripped.
        name: String,
        alias: Option<String>,
        location: Option<Location>,
    },
    Derived {
        subquery: Box<SelectStmt>,
        alias: Option<String>,
    },
}

/// A JOIN with explicit kind and condition.
#[derive(Debug, Clone)]
pub struct Join {
    pub relation: Relation,
    pub kind: JoinType,
    pub condition: JoinCondition,
}

#[derive(Debug, Clone)]
pub enum JoinCondition {
    On(Expr),
    /// Column names, lower-cased.
    Using(Vec<String>),
    Natural,
    None,
}

/// One projection entry.
#[derive(Debug, Clone)]
pub enum SelectItem {
    Expr { expr: Expr, alias: Option<String> },
    /// `*`
    Wildcard,
    /// `t.*` — the qualifier, lower-cased.
    QualifiedWildcard(String),
}

#[derive(Debug, Clone)]
pub struct InsertStmt {
    pub table: String,
    pub location: Option<Location>,
    /// Target column list; empty when omitted.
    pub columns: Vec<ColumnRef>,
    /// `INSERT ... VALUES` rows.
    pub values: Vec<Vec<Expr>>,
    /// `INSERT ... SELECT` source.
    pub source: Option<Box<SelectStmt>>,
}

#[derive(Debug, Clone)]
pub struct UpdateStmt {
    pub table: String,
    pub alias: Option<String>,
    pub location: Option<Location>,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expr>,
}

/// `SET target = value`.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub target: ColumnRef,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct DeleteStmt {
    pub table: String,
    pub alias: Option<String>,
    pub location: Option<Location>,
    pub where_clause: Option<Expr>,
    pub limit: Option<u64>,
}

/// A column reference, possibly qualified by a table name or alias.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    pub qualifier: Option<String>,
    pub column: String,
    pub location: Option<Location>,
}

/// Argument of an aggregate call.
#[derive(Debug, Clone)]
pub enum AggregateArg {
    /// `COUNT(*)`
    Star,
    Expr(Box<Expr>),
}

#[derive(Debug, Clone)]
pub enum Literal {
    Number(String),
    String(String),
    Bool(bool),
    Null,
}

/// Expressions of the supported dialect.
#[derive(Debug, Clone)]
pub enum Expr {
    Column(ColumnRef),
    Literal(Literal),
    Unary {
        op: String,
        expr: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    /// `COUNT/SUM/AVG/MIN/MAX`, optionally `DISTINCT`.
    Aggregate {
        func: AggregationType,
        distinct: bool,
        arg: AggregateArg,
        location: Option<Location>,
    },
    /// Any other (scalar) function call.
    Function {
        name: String,
        args: Vec<Expr>,
    },
    Case {
        operand: Option<Box<Expr>>,
        branches: Vec<(Expr, Expr)>,
        else_result: Option<Box<Expr>>,
    },
    Cast(Box<Expr>),
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
    },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
    },
    Tuple(Vec<Expr>),
    /// Scalar subquery.
    Subquery(Box<SelectStmt>),
    Exists(Box<SelectStmt>),
    InSubquery {
        expr: Box<Expr>,
        subquery: Box<SelectStmt>,
    },
}

impl Expr {
    /// Whether the expression references any column. A WHERE clause whose
    /// predicate contains no column reference is considered trivially
    /// constant.
    pub fn references_columns(&self) -> bool {
        match self {
            Expr::Column(_) => true,
            Expr::Literal(_) => false,
            Expr::Unary { expr, .. } | Expr::Cast(expr) | Expr::IsNull { expr, .. } => {
                expr.references_columns()
            }
            Expr::Binary { left, right, .. } => {
                left.references_columns() || right.references_columns()
            }
            Expr::Aggregate { arg, .. } => match arg {
                AggregateArg::Star => false,
                AggregateArg::Expr(expr) => expr.references_columns(),
            },
            Expr::Function { args, .. } | Expr::Tuple(args) => {
                args.iter().any(Expr::references_columns)
            }
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                operand.as_deref().is_some_and(Expr::references_columns)
                    || branches
                        .iter()
                        .any(|(c, r)| c.references_columns() || r.references_columns())
                    || else_result.as_deref().is_some_and(Expr::references_columns)
            }
            Expr::Between { expr, low, high } => {
                expr.references_columns()
                    || low.references_columns()
                    || high.references_columns()
            }
            Expr::InList { expr, list } => {
                expr.references_columns() || list.iter().any(Expr::references_columns)
            }
            Expr::Like { expr, pattern } => {
                expr.references_columns() || pattern.references_columns()
            }
            // A correlated subquery reads columns by definition; treat any
            // subquery-bearing predicate as non-trivial.
            Expr::Subquery(_) | Expr::Exists(_) => true,
            Expr::InSubquery { .. } => true,
        }
    }
}
