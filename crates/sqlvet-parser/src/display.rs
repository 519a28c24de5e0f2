//! Canonical SQL printing for the syntax tree
//!
//! Printing is deterministic: one space between clauses, keywords upper-case,
//! parentheses only where precedence requires them. Parsing the printed form
//! yields the same tree shape, which is what the round-trip tests rely on.

use std::fmt;

use crate::ast::{
    ColumnDef, CreateTableDefinition, CreateTableStatement, Expr, FromClause, FunctionArgs, Ident,
    InsertSource, InsertStatement, Join, JoinConstraint, JoinKind, Literal, ObjectName,
    OrderByItem, QueryExpr, Script, SelectItem, SelectStatement, Statement, TableRef, UnaryOp,
};

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "`{}`", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(v, _) => write!(f, "{v}"),
            // {:?} keeps a decimal point or exponent, so the value re-lexes
            // as a float rather than an integer
            Literal::Float(v, _) => write!(f, "{v:?}"),
            Literal::String(s, _) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Bool(true, _) => write!(f, "TRUE"),
            Literal::Bool(false, _) => write!(f, "FALSE"),
            Literal::Null(_) => write!(f, "NULL"),
        }
    }
}

/// Print `expr`, parenthesizing when its binding is weaker than the context
fn fmt_child(f: &mut fmt::Formatter<'_>, expr: &Expr, min_prec: u8) -> fmt::Result {
    let needs_parens = match expr {
        Expr::Binary { op, .. } => op.precedence() < min_prec,
        _ => false,
    };
    if needs_parens {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{lit}"),
            Expr::Column(name) => write!(f, "{name}"),
            Expr::Function { name, args, .. } => match args {
                FunctionArgs::Star(_) => write!(f, "{name}(*)"),
                FunctionArgs::Args(list) => {
                    write!(f, "{name}(")?;
                    for (i, arg) in list.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ")")
                }
            },
            Expr::Unary { op, operand, .. } => match op {
                UnaryOp::Neg => {
                    write!(f, "-")?;
                    // Binary operands must be wrapped (-a + b != -(a + b));
                    // a nested minus must not re-lex as a `--` comment
                    if matches!(operand.as_ref(), Expr::Unary { op: UnaryOp::Neg, .. }) {
                        write!(f, "({operand})")
                    } else {
                        fmt_child(f, operand, u8::MAX)
                    }
                }
                UnaryOp::Not => {
                    write!(f, "NOT ")?;
                    // NOT binds tighter than AND/OR, looser than comparison
                    fmt_child(f, operand, 3)
                }
            },
            Expr::Binary {
                left, op, right, ..
            } => {
                let prec = op.precedence();
                fmt_child(f, left, prec)?;
                write!(f, " {} ", op.symbol())?;
                // Same precedence on the right needs parens: left-assoc
                fmt_child(f, right, prec + 1)
            }
        }
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::Wildcard { .. } => write!(f, "*"),
            SelectItem::QualifiedWildcard { qualifier, .. } => write!(f, "{qualifier}.*"),
            SelectItem::Expr { expr, alias } => {
                write!(f, "{expr}")?;
                if let Some(alias) = alias {
                    write!(f, " AS {alias}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::Left => write!(f, "LEFT JOIN"),
            JoinKind::Right => write!(f, "RIGHT JOIN"),
            JoinKind::Full => write!(f, "FULL JOIN"),
            JoinKind::Cross => write!(f, "CROSS JOIN"),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.table)?;
        match &self.constraint {
            JoinConstraint::On(expr) => write!(f, " ON {expr}"),
            JoinConstraint::Using(cols) => {
                write!(f, " USING (")?;
                for (i, col) in cols.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{col}")?;
                }
                write!(f, ")")
            }
            JoinConstraint::None => Ok(()),
        }
    }
}

impl fmt::Display for FromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FROM {}", self.base)?;
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        Ok(())
    }
}

impl fmt::Display for OrderByItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.descending {
            write!(f, " DESC")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        if let Some(from) = &self.from {
            write!(f, " {from}")?;
        }
        if let Some(where_clause) = &self.where_clause {
            write!(f, " WHERE {where_clause}")?;
        }
        if !self.group_by.is_empty() {
            write!(f, " GROUP BY ")?;
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{expr}")?;
            }
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY ")?;
            for (i, item) in self.order_by.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        Ok(())
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryExpr::Select(select) => write!(f, "{select}"),
            QueryExpr::Union {
                left, right, all, ..
            } => {
                let op = if *all { "UNION ALL" } else { "UNION DISTINCT" };
                write!(f, "{left} {op} {right}")
            }
        }
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if !self.columns.is_empty() {
            write!(f, " (")?;
            for (i, col) in self.columns.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{col}")?;
            }
            write!(f, ")")?;
        }
        match &self.source {
            InsertSource::Values(rows) => {
                write!(f, " VALUES ")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "(")?;
                    for (j, value) in row.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{value}")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            InsertSource::Query(query) => write!(f, " {query}"),
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.type_name)
    }
}

impl fmt::Display for CreateTableStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE ")?;
        if self.temp {
            write!(f, "TEMP ")?;
        }
        write!(f, "TABLE {}", self.name)?;
        match &self.definition {
            CreateTableDefinition::Columns(cols) => {
                write!(f, " (")?;
                for (i, col) in cols.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{col}")?;
                }
                write!(f, ")")
            }
            CreateTableDefinition::Query(query) => write!(f, " AS ({query})"),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Query(q) => write!(f, "{q}"),
            Statement::Insert(i) => write!(f, "{i}"),
            Statement::CreateTable(c) => write!(f, "{c}"),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement};")?;
        }
        Ok(())
    }
}
