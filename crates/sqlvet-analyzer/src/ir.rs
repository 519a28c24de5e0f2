//! The resolved tree
//!
//! Every node carries its type; names are fully resolved to catalog entries
//! or table aliases. Nodes are span-free so structural equality compares
//! meaning only, which the grouping checks rely on.

use sqlvet_catalog::TableDef;
use sqlvet_core::SqlType;
use sqlvet_parser::ast::{BinaryOp, JoinKind, UnaryOp};

/// A literal value after resolution
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// A typed, fully resolved expression
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedExpr {
    Literal {
        value: LiteralValue,
        sql_type: SqlType,
    },

    /// A column of a table in scope, identified by the table's alias
    ColumnRef {
        qualifier: String,
        name: String,
        sql_type: SqlType,
    },

    FunctionCall {
        name: String,
        args: ResolvedArgs,
        sql_type: SqlType,
        aggregate: bool,
    },

    Unary {
        op: UnaryOp,
        operand: Box<ResolvedExpr>,
        sql_type: SqlType,
    },

    Binary {
        op: BinaryOp,
        left: Box<ResolvedExpr>,
        right: Box<ResolvedExpr>,
        sql_type: SqlType,
    },
}

/// Resolved function arguments; `Star` only ever appears under COUNT
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedArgs {
    Star,
    Args(Vec<ResolvedExpr>),
}

impl ResolvedExpr {
    /// The expression's result type
    pub fn sql_type(&self) -> SqlType {
        match self {
            ResolvedExpr::Literal { sql_type, .. }
            | ResolvedExpr::ColumnRef { sql_type, .. }
            | ResolvedExpr::FunctionCall { sql_type, .. }
            | ResolvedExpr::Unary { sql_type, .. }
            | ResolvedExpr::Binary { sql_type, .. } => *sql_type,
        }
    }

    /// Whether any aggregate call occurs in this tree
    pub fn contains_aggregate(&self) -> bool {
        match self {
            ResolvedExpr::Literal { .. } | ResolvedExpr::ColumnRef { .. } => false,
            ResolvedExpr::FunctionCall { aggregate, args, .. } => {
                *aggregate
                    || match args {
                        ResolvedArgs::Star => false,
                        ResolvedArgs::Args(list) => list.iter().any(|a| a.contains_aggregate()),
                    }
            }
            ResolvedExpr::Unary { operand, .. } => operand.contains_aggregate(),
            ResolvedExpr::Binary { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
        }
    }

    /// Whether the tree is built from literals alone
    pub fn is_constant(&self) -> bool {
        match self {
            ResolvedExpr::Literal { .. } => true,
            ResolvedExpr::ColumnRef { .. } | ResolvedExpr::FunctionCall { .. } => false,
            ResolvedExpr::Unary { operand, .. } => operand.is_constant(),
            ResolvedExpr::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
        }
    }
}

/// One column of a query's output schema
#[derive(Debug, Clone, PartialEq)]
pub struct OutputColumn {
    pub name: String,
    pub sql_type: SqlType,
}

impl OutputColumn {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

/// A named output expression of a SELECT list
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOutput {
    pub name: String,
    pub expr: ResolvedExpr,
}

/// One table brought into scope by FROM, with how it was joined
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTableScan {
    /// Catalog name of the table
    pub table: String,
    /// Alias the query refers to it by (the table name when unaliased)
    pub alias: String,
    pub join: Option<ResolvedJoin>,
}

/// Join metadata for every scan after the first
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedJoin {
    pub kind: JoinKind,
    /// Boolean join condition; `None` for CROSS joins
    pub condition: Option<ResolvedExpr>,
}

/// A resolved SELECT block
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSelect {
    pub outputs: Vec<ResolvedOutput>,
    pub scans: Vec<ResolvedTableScan>,
    pub filter: Option<ResolvedExpr>,
    pub group_by: Vec<ResolvedExpr>,
    pub having: Option<ResolvedExpr>,
    pub order_by: Vec<(ResolvedExpr, bool)>,
    pub limit: Option<ResolvedExpr>,
}

impl ResolvedSelect {
    /// Output schema: the outputs' names and types in order
    pub fn schema(&self) -> Vec<OutputColumn> {
        self.outputs
            .iter()
            .map(|o| OutputColumn::new(o.name.clone(), o.expr.sql_type()))
            .collect()
    }
}

/// A resolved query expression
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedQuery {
    Select(ResolvedSelect),
    Union {
        left: Box<ResolvedQuery>,
        right: Box<ResolvedQuery>,
        all: bool,
        schema: Vec<OutputColumn>,
    },
}

impl ResolvedQuery {
    pub fn schema(&self) -> Vec<OutputColumn> {
        match self {
            ResolvedQuery::Select(select) => select.schema(),
            ResolvedQuery::Union { schema, .. } => schema.clone(),
        }
    }
}

/// A resolved INSERT: target columns paired with the row source
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInsert {
    pub table: String,
    /// Target columns in insert order
    pub columns: Vec<OutputColumn>,
    pub source: ResolvedInsertSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedInsertSource {
    Values(Vec<Vec<ResolvedExpr>>),
    Query(ResolvedQuery),
}

/// A resolved CREATE TABLE with the schema it defines
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCreateTable {
    /// The full table definition this statement creates
    pub table: TableDef,
    pub temp: bool,
    /// Present for CREATE TABLE AS
    pub query: Option<ResolvedQuery>,
}

/// A fully analyzed statement
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedStatement {
    Query(ResolvedQuery),
    Insert(ResolvedInsert),
    CreateTable(ResolvedCreateTable),
}

impl ResolvedStatement {
    /// The statement's output schema; empty for statements that return no rows
    pub fn output_schema(&self) -> Vec<OutputColumn> {
        match self {
            ResolvedStatement::Query(query) => query.schema(),
            ResolvedStatement::Insert(_) | ResolvedStatement::CreateTable(_) => Vec::new(),
        }
    }
}

/// Visitor over the resolved tree, mirroring the parse-tree visitor
pub trait IrVisitor {
    fn visit_statement(&mut self, statement: &ResolvedStatement) {
        walk_resolved_statement(self, statement);
    }

    fn visit_query(&mut self, query: &ResolvedQuery) {
        walk_resolved_query(self, query);
    }

    fn visit_select(&mut self, select: &ResolvedSelect) {
        walk_resolved_select(self, select);
    }

    fn visit_scan(&mut self, scan: &ResolvedTableScan) {
        walk_resolved_scan(self, scan);
    }

    fn visit_expr(&mut self, expr: &ResolvedExpr) {
        walk_resolved_expr(self, expr);
    }
}

pub fn walk_resolved_statement<V: IrVisitor + ?Sized>(
    visitor: &mut V,
    statement: &ResolvedStatement,
) {
    match statement {
        ResolvedStatement::Query(query) => visitor.visit_query(query),
        ResolvedStatement::Insert(insert) => match &insert.source {
            ResolvedInsertSource::Values(rows) => {
                for row in rows {
                    for value in row {
                        visitor.visit_expr(value);
                    }
                }
            }
            ResolvedInsertSource::Query(query) => visitor.visit_query(query),
        },
        ResolvedStatement::CreateTable(create) => {
            if let Some(query) = &create.query {
                visitor.visit_query(query);
            }
        }
    }
}

pub fn walk_resolved_query<V: IrVisitor + ?Sized>(visitor: &mut V, query: &ResolvedQuery) {
    match query {
        ResolvedQuery::Select(select) => visitor.visit_select(select),
        ResolvedQuery::Union { left, right, .. } => {
            visitor.visit_query(left);
            visitor.visit_query(right);
        }
    }
}

pub fn walk_resolved_select<V: IrVisitor + ?Sized>(visitor: &mut V, select: &ResolvedSelect) {
    for scan in &select.scans {
        visitor.visit_scan(scan);
    }
    for output in &select.outputs {
        visitor.visit_expr(&output.expr);
    }
    if let Some(filter) = &select.filter {
        visitor.visit_expr(filter);
    }
    for expr in &select.group_by {
        visitor.visit_expr(expr);
    }
    if let Some(having) = &select.having {
        visitor.visit_expr(having);
    }
    for (expr, _) in &select.order_by {
        visitor.visit_expr(expr);
    }
    if let Some(limit) = &select.limit {
        visitor.visit_expr(limit);
    }
}

pub fn walk_resolved_scan<V: IrVisitor + ?Sized>(visitor: &mut V, scan: &ResolvedTableScan) {
    if let Some(join) = &scan.join {
        if let Some(condition) = &join.condition {
            visitor.visit_expr(condition);
        }
    }
}

pub fn walk_resolved_expr<V: IrVisitor + ?Sized>(visitor: &mut V, expr: &ResolvedExpr) {
    match expr {
        ResolvedExpr::Literal { .. } | ResolvedExpr::ColumnRef { .. } => {}
        ResolvedExpr::FunctionCall { args, .. } => {
            if let ResolvedArgs::Args(list) = args {
                for arg in list {
                    visitor.visit_expr(arg);
                }
            }
        }
        ResolvedExpr::Unary { operand, .. } => visitor.visit_expr(operand),
        ResolvedExpr::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
    }
}
