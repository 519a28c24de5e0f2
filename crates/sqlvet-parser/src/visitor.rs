//! Read-only traversal of the syntax tree
//!
//! Implement [`Visitor`] and override the hooks you care about; every default
//! method recurses via the matching `walk_*` function, so overriding one hook
//! never silences the rest of the tree. Call the relevant `walk_*` from an
//! override to keep descending below the node.

use crate::ast::{
    CreateTableDefinition, CreateTableStatement, Expr, FromClause, FunctionArgs, InsertSource,
    InsertStatement, Join, JoinConstraint, QueryExpr, Script, SelectItem, SelectStatement,
    Statement,
};

/// Syntax tree visitor with default depth-first recursion
pub trait Visitor {
    fn visit_script(&mut self, script: &Script) {
        walk_script(self, script);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_query_expr(&mut self, query: &QueryExpr) {
        walk_query_expr(self, query);
    }

    fn visit_select(&mut self, select: &SelectStatement) {
        walk_select(self, select);
    }

    fn visit_select_item(&mut self, item: &SelectItem) {
        walk_select_item(self, item);
    }

    fn visit_from_clause(&mut self, from: &FromClause) {
        walk_from_clause(self, from);
    }

    fn visit_join(&mut self, join: &Join) {
        walk_join(self, join);
    }

    fn visit_insert(&mut self, insert: &InsertStatement) {
        walk_insert(self, insert);
    }

    fn visit_create_table(&mut self, create: &CreateTableStatement) {
        walk_create_table(self, create);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

pub fn walk_script<V: Visitor + ?Sized>(visitor: &mut V, script: &Script) {
    for statement in &script.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Query(query) => visitor.visit_query_expr(query),
        Statement::Insert(insert) => visitor.visit_insert(insert),
        Statement::CreateTable(create) => visitor.visit_create_table(create),
    }
}

pub fn walk_query_expr<V: Visitor + ?Sized>(visitor: &mut V, query: &QueryExpr) {
    match query {
        QueryExpr::Select(select) => visitor.visit_select(select),
        QueryExpr::Union { left, right, .. } => {
            visitor.visit_query_expr(left);
            visitor.visit_query_expr(right);
        }
    }
}

pub fn walk_select<V: Visitor + ?Sized>(visitor: &mut V, select: &SelectStatement) {
    for item in &select.items {
        visitor.visit_select_item(item);
    }
    if let Some(from) = &select.from {
        visitor.visit_from_clause(from);
    }
    if let Some(where_clause) = &select.where_clause {
        visitor.visit_expr(where_clause);
    }
    for expr in &select.group_by {
        visitor.visit_expr(expr);
    }
    if let Some(having) = &select.having {
        visitor.visit_expr(having);
    }
    for item in &select.order_by {
        visitor.visit_expr(&item.expr);
    }
    if let Some(limit) = &select.limit {
        visitor.visit_expr(limit);
    }
}

pub fn walk_select_item<V: Visitor + ?Sized>(visitor: &mut V, item: &SelectItem) {
    if let SelectItem::Expr { expr, .. } = item {
        visitor.visit_expr(expr);
    }
}

pub fn walk_from_clause<V: Visitor + ?Sized>(visitor: &mut V, from: &FromClause) {
    for join in &from.joins {
        visitor.visit_join(join);
    }
}

pub fn walk_join<V: Visitor + ?Sized>(visitor: &mut V, join: &Join) {
    if let JoinConstraint::On(expr) = &join.constraint {
        visitor.visit_expr(expr);
    }
}

pub fn walk_insert<V: Visitor + ?Sized>(visitor: &mut V, insert: &InsertStatement) {
    match &insert.source {
        InsertSource::Values(rows) => {
            for row in rows {
                for value in row {
                    visitor.visit_expr(value);
                }
            }
        }
        InsertSource::Query(query) => visitor.visit_query_expr(query),
    }
}

pub fn walk_create_table<V: Visitor + ?Sized>(visitor: &mut V, create: &CreateTableStatement) {
    if let CreateTableDefinition::Query(query) = &create.definition {
        visitor.visit_query_expr(query);
    }
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::Literal(_) | Expr::Column(_) => {}
        Expr::Function { args, .. } => {
            if let FunctionArgs::Args(list) = args {
                for arg in list {
                    visitor.visit_expr(arg);
                }
            }
        }
        Expr::Unary { operand, .. } => visitor.visit_expr(operand),
        Expr::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
    }
}
