//! Name resolution and type checking
//!
//! The analyzer validates one statement at a time against a catalog. It
//! builds a name scope from the FROM clause, resolves every expression to a
//! typed node, and enforces the grouping rules. The first violation aborts
//! the statement; there is no error recovery.

use sqlvet_catalog::{Catalog, TableDef};
use sqlvet_core::{Diagnostic, Span, SqlType};
use sqlvet_parser::ast::{
    BinaryOp, CreateTableDefinition, CreateTableStatement, Expr, FromClause, FunctionArgs,
    InsertSource, InsertStatement, JoinConstraint, JoinKind, Literal, ObjectName, QueryExpr,
    SelectItem, SelectStatement, Statement, UnaryOp,
};

use crate::ir::{
    LiteralValue, OutputColumn, ResolvedArgs, ResolvedCreateTable, ResolvedExpr, ResolvedInsert,
    ResolvedInsertSource, ResolvedJoin, ResolvedOutput, ResolvedQuery, ResolvedSelect,
    ResolvedStatement, ResolvedTableScan,
};

/// A semantic error, with the source location it was detected at
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("unresolved name: {name}")]
    UnresolvedName { name: String, line: u32, column: u32 },

    #[error("ambiguous name: {name}")]
    AmbiguousName { name: String, line: u32, column: u32 },

    #[error("no matching signature for function {function} with argument types ({arg_types})")]
    NoMatchingSignature {
        function: String,
        arg_types: String,
        line: u32,
        column: u32,
    },

    #[error("{message}")]
    GroupingError { message: String, line: u32, column: u32 },

    #[error("{message}")]
    TypeMismatch { message: String, line: u32, column: u32 },
}

impl AnalysisError {
    /// Convert into the stable diagnostic shape
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (line, column) = match self {
            AnalysisError::UnresolvedName { line, column, .. }
            | AnalysisError::AmbiguousName { line, column, .. }
            | AnalysisError::NoMatchingSignature { line, column, .. }
            | AnalysisError::GroupingError { line, column, .. }
            | AnalysisError::TypeMismatch { line, column, .. } => (*line, *column),
        };
        Diagnostic::semantic(self.to_string(), line, column)
    }

    fn unresolved(name: impl Into<String>, span: Span) -> Self {
        AnalysisError::UnresolvedName {
            name: name.into(),
            line: span.line,
            column: span.column,
        }
    }

    fn ambiguous(name: impl Into<String>, span: Span) -> Self {
        AnalysisError::AmbiguousName {
            name: name.into(),
            line: span.line,
            column: span.column,
        }
    }

    fn grouping(message: impl Into<String>, span: Span) -> Self {
        AnalysisError::GroupingError {
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }

    fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        AnalysisError::TypeMismatch {
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }
}

/// One table visible to name resolution
#[derive(Debug, Clone)]
struct ScopeTable {
    alias: String,
    columns: Vec<sqlvet_catalog::ColumnDef>,
}

/// The tables a SELECT block can see, in FROM order
#[derive(Debug, Default)]
struct Scope {
    tables: Vec<ScopeTable>,
}

impl Scope {
    fn table(&self, alias: &str) -> Option<&ScopeTable> {
        self.tables
            .iter()
            .find(|t| t.alias.eq_ignore_ascii_case(alias))
    }
}

/// Statement analyzer bound to a catalog
pub struct Analyzer<'a> {
    catalog: &'a Catalog,
}

impl<'a> Analyzer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Resolve and type-check one statement
    pub fn analyze_statement(
        &self,
        statement: &Statement,
    ) -> Result<ResolvedStatement, AnalysisError> {
        match statement {
            Statement::Query(query) => Ok(ResolvedStatement::Query(self.resolve_query(query)?)),
            Statement::Insert(insert) => Ok(ResolvedStatement::Insert(self.resolve_insert(insert)?)),
            Statement::CreateTable(create) => {
                Ok(ResolvedStatement::CreateTable(self.resolve_create_table(create)?))
            }
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    fn resolve_query(&self, query: &QueryExpr) -> Result<ResolvedQuery, AnalysisError> {
        match query {
            QueryExpr::Select(select) => Ok(ResolvedQuery::Select(self.resolve_select(select)?)),
            QueryExpr::Union { left, right, all, span } => {
                let left = self.resolve_query(left)?;
                let right = self.resolve_query(right)?;

                let left_schema = left.schema();
                let right_schema = right.schema();
                if left_schema.len() != right_schema.len() {
                    return Err(AnalysisError::type_mismatch(
                        format!(
                            "UNION inputs have different column counts: {} vs {}",
                            left_schema.len(),
                            right_schema.len()
                        ),
                        *span,
                    ));
                }

                // Output names come from the first input; types are the
                // common super type of each column pair
                let mut schema = Vec::with_capacity(left_schema.len());
                for (l, r) in left_schema.iter().zip(&right_schema) {
                    let Some(common) = l.sql_type.common_super_type(r.sql_type) else {
                        return Err(AnalysisError::type_mismatch(
                            format!(
                                "UNION column {} has incompatible types {} and {}",
                                l.name, l.sql_type, r.sql_type
                            ),
                            *span,
                        ));
                    };
                    schema.push(OutputColumn::new(l.name.clone(), common));
                }

                Ok(ResolvedQuery::Union {
                    left: Box::new(left),
                    right: Box::new(right),
                    all: *all,
                    schema,
                })
            }
        }
    }

    fn resolve_select(&self, select: &SelectStatement) -> Result<ResolvedSelect, AnalysisError> {
        let (scope, scans) = self.build_scope(select.from.as_ref())?;

        // Select list, expanding wildcards against the scope. Each output
        // keeps the span of the item it came from for error reporting.
        let mut outputs = Vec::new();
        let mut output_spans = Vec::new();
        for item in &select.items {
            match item {
                SelectItem::Wildcard { span } => {
                    if scope.tables.is_empty() {
                        return Err(AnalysisError::unresolved("*", *span));
                    }
                    for table in &scope.tables {
                        expand_table(&mut outputs, table);
                    }
                }
                SelectItem::QualifiedWildcard { qualifier, span } => {
                    let alias = qualifier.to_dotted();
                    let Some(table) = scope.table(&alias) else {
                        return Err(AnalysisError::unresolved(alias, *span));
                    };
                    expand_table(&mut outputs, table);
                }
                SelectItem::Expr { expr, alias } => {
                    let resolved = self.resolve_expr(expr, &scope)?;
                    let name = match alias {
                        Some(alias) => alias.value.clone(),
                        None => implicit_name(expr, outputs.len()),
                    };
                    outputs.push(ResolvedOutput { name, expr: resolved });
                }
            }
            while output_spans.len() < outputs.len() {
                output_spans.push(item.span());
            }
        }

        let filter = select
            .where_clause
            .as_ref()
            .map(|expr| self.resolve_expr(expr, &scope))
            .transpose()?;
        if let (Some(filter), Some(expr)) = (&filter, &select.where_clause) {
            if filter.contains_aggregate() {
                return Err(AnalysisError::grouping(
                    "aggregate function is not allowed in WHERE",
                    expr.span(),
                ));
            }
            if !filter.sql_type().coerces_to(SqlType::Bool) {
                return Err(AnalysisError::type_mismatch(
                    format!("WHERE condition has type {}, expected BOOL", filter.sql_type()),
                    expr.span(),
                ));
            }
        }

        // GROUP BY and ORDER BY may name a select-list alias
        let mut group_by = Vec::new();
        for expr in &select.group_by {
            let resolved = self.resolve_with_aliases(expr, &scope, &outputs)?;
            if resolved.contains_aggregate() {
                return Err(AnalysisError::grouping(
                    "aggregate function is not allowed in GROUP BY",
                    expr.span(),
                ));
            }
            group_by.push(resolved);
        }

        let having = select
            .having
            .as_ref()
            .map(|expr| self.resolve_with_aliases(expr, &scope, &outputs))
            .transpose()?;

        let mut order_by = Vec::new();
        for item in &select.order_by {
            let resolved = self.resolve_with_aliases(&item.expr, &scope, &outputs)?;
            if !resolved.sql_type().is_orderable() {
                return Err(AnalysisError::type_mismatch(
                    format!("cannot order by type {}", resolved.sql_type()),
                    item.expr.span(),
                ));
            }
            order_by.push((resolved, item.descending));
        }

        let limit = select
            .limit
            .as_ref()
            .map(|expr| self.resolve_expr(expr, &scope))
            .transpose()?;
        if let (Some(limit), Some(expr)) = (&limit, &select.limit) {
            if limit.sql_type() != SqlType::Int64 {
                return Err(AnalysisError::type_mismatch(
                    format!("LIMIT has type {}, expected INT64", limit.sql_type()),
                    expr.span(),
                ));
            }
        }

        self.check_grouping(
            select,
            &outputs,
            &output_spans,
            &group_by,
            having.as_ref(),
            &order_by,
        )?;

        Ok(ResolvedSelect {
            outputs,
            scans,
            filter,
            group_by,
            having,
            order_by,
            limit,
        })
    }

    /// Enforce the grouping rules when the query aggregates
    fn check_grouping(
        &self,
        select: &SelectStatement,
        outputs: &[ResolvedOutput],
        output_spans: &[Span],
        group_by: &[ResolvedExpr],
        having: Option<&ResolvedExpr>,
        order_by: &[(ResolvedExpr, bool)],
    ) -> Result<(), AnalysisError> {
        let aggregates = outputs.iter().any(|o| o.expr.contains_aggregate())
            || having.is_some_and(|h| h.contains_aggregate());
        if group_by.is_empty() && !aggregates {
            if let Some(having) = &select.having {
                return Err(AnalysisError::grouping(
                    "HAVING requires aggregation or GROUP BY",
                    having.span(),
                ));
            }
            return Ok(());
        }

        for (output, span) in outputs.iter().zip(output_spans) {
            if let Err(message) = grouped_ok(&output.expr, group_by) {
                return Err(AnalysisError::grouping(message, *span));
            }
        }
        if let (Some(having), Some(ast)) = (having, &select.having) {
            if let Err(message) = grouped_ok(having, group_by) {
                return Err(AnalysisError::grouping(message, ast.span()));
            }
        }
        for ((expr, _), ast) in order_by.iter().zip(&select.order_by) {
            if let Err(message) = grouped_ok(expr, group_by) {
                return Err(AnalysisError::grouping(message, ast.expr.span()));
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // FROM clause
    // -------------------------------------------------------------------

    fn build_scope(
        &self,
        from: Option<&FromClause>,
    ) -> Result<(Scope, Vec<ResolvedTableScan>), AnalysisError> {
        let mut scope = Scope::default();
        let mut scans = Vec::new();
        let Some(from) = from else {
            return Ok((scope, scans));
        };

        let base = self.add_table_to_scope(&mut scope, &from.base.name, from.base.alias.as_ref())?;
        scans.push(ResolvedTableScan {
            table: base,
            alias: scope.tables[0].alias.clone(),
            join: None,
        });

        for join in &from.joins {
            let table_name =
                self.add_table_to_scope(&mut scope, &join.table.name, join.table.alias.as_ref())?;
            let joined = scope.tables.last().expect("just added").clone();

            let condition = match &join.constraint {
                JoinConstraint::On(expr) => {
                    let condition = self.resolve_expr(expr, &scope)?;
                    if !condition.sql_type().coerces_to(SqlType::Bool) {
                        return Err(AnalysisError::type_mismatch(
                            format!(
                                "join condition has type {}, expected BOOL",
                                condition.sql_type()
                            ),
                            expr.span(),
                        ));
                    }
                    Some(condition)
                }
                JoinConstraint::Using(columns) => {
                    Some(self.resolve_using(&scope, &joined, columns)?)
                }
                JoinConstraint::None => {
                    debug_assert_eq!(join.kind, JoinKind::Cross);
                    None
                }
            };

            scans.push(ResolvedTableScan {
                table: table_name,
                alias: joined.alias,
                join: Some(ResolvedJoin {
                    kind: join.kind,
                    condition,
                }),
            });
        }

        Ok((scope, scans))
    }

    /// Resolve a FROM table against the catalog and bring it into scope.
    /// Returns the catalog name of the table.
    fn add_table_to_scope(
        &self,
        scope: &mut Scope,
        name: &ObjectName,
        alias: Option<&sqlvet_parser::ast::Ident>,
    ) -> Result<String, AnalysisError> {
        let dotted = name.to_dotted();
        let table = self
            .catalog
            .lookup_table(&dotted)
            .map_err(|_| AnalysisError::unresolved(&dotted, name.span))?;

        let (alias_text, alias_span) = match alias {
            Some(alias) => (alias.value.clone(), alias.span),
            None => (name.last().value.clone(), name.span),
        };
        if scope.table(&alias_text).is_some() {
            return Err(AnalysisError::ambiguous(alias_text, alias_span));
        }

        scope.tables.push(ScopeTable {
            alias: alias_text,
            columns: table.columns.clone(),
        });
        Ok(table.name.clone())
    }

    /// USING(c1, ...) becomes an AND chain of equality conditions between
    /// the joined table and the tables already in scope
    fn resolve_using(
        &self,
        scope: &Scope,
        joined: &ScopeTable,
        columns: &[sqlvet_parser::ast::Ident],
    ) -> Result<ResolvedExpr, AnalysisError> {
        let mut condition: Option<ResolvedExpr> = None;
        for column in columns {
            let Some(right_col) = joined
                .columns
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(&column.value))
            else {
                return Err(AnalysisError::unresolved(&column.value, column.span));
            };

            // The left side is the first earlier table exposing the column
            let left = scope
                .tables
                .iter()
                .filter(|t| !t.alias.eq_ignore_ascii_case(&joined.alias))
                .find_map(|t| {
                    t.columns
                        .iter()
                        .find(|c| c.name.eq_ignore_ascii_case(&column.value))
                        .map(|c| (t.alias.clone(), c.clone()))
                });
            let Some((left_alias, left_col)) = left else {
                return Err(AnalysisError::unresolved(&column.value, column.span));
            };

            if left_col.sql_type.common_super_type(right_col.sql_type).is_none() {
                return Err(AnalysisError::type_mismatch(
                    format!(
                        "USING column {} has incompatible types {} and {}",
                        column.value, left_col.sql_type, right_col.sql_type
                    ),
                    column.span,
                ));
            }

            let eq = ResolvedExpr::Binary {
                op: BinaryOp::Eq,
                left: Box::new(ResolvedExpr::ColumnRef {
                    qualifier: left_alias,
                    name: left_col.name.clone(),
                    sql_type: left_col.sql_type,
                }),
                right: Box::new(ResolvedExpr::ColumnRef {
                    qualifier: joined.alias.clone(),
                    name: right_col.name.clone(),
                    sql_type: right_col.sql_type,
                }),
                sql_type: SqlType::Bool,
            };
            condition = Some(match condition {
                None => eq,
                Some(prev) => ResolvedExpr::Binary {
                    op: BinaryOp::And,
                    left: Box::new(prev),
                    right: Box::new(eq),
                    sql_type: SqlType::Bool,
                },
            });
        }
        Ok(condition.expect("USING has at least one column"))
    }

    // -------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------

    /// Resolve an expression that may instead name a select-list alias
    fn resolve_with_aliases(
        &self,
        expr: &Expr,
        scope: &Scope,
        outputs: &[ResolvedOutput],
    ) -> Result<ResolvedExpr, AnalysisError> {
        if let Expr::Column(name) = expr {
            if !name.is_qualified() {
                let matches: Vec<_> = outputs
                    .iter()
                    .filter(|o| o.name.eq_ignore_ascii_case(&name.last().value))
                    .collect();
                match matches.as_slice() {
                    [single] => return Ok(single.expr.clone()),
                    [] => {}
                    _ => return Err(AnalysisError::ambiguous(name.to_dotted(), name.span)),
                }
            }
        }
        self.resolve_expr(expr, scope)
    }

    fn resolve_expr(&self, expr: &Expr, scope: &Scope) -> Result<ResolvedExpr, AnalysisError> {
        match expr {
            Expr::Literal(literal) => Ok(resolve_literal(literal)),
            Expr::Column(name) => self.resolve_column(name, scope),
            Expr::Function { name, args, span } => self.resolve_function(name, args, *span, scope),
            Expr::Unary { op, operand, span } => {
                let operand = self.resolve_expr(operand, scope)?;
                let sql_type = match op {
                    UnaryOp::Neg => {
                        let t = operand.sql_type();
                        if !t.is_numeric() && t != SqlType::Null {
                            return Err(AnalysisError::type_mismatch(
                                format!("unary minus requires a numeric operand, got {t}"),
                                *span,
                            ));
                        }
                        if t == SqlType::Null {
                            SqlType::Int64
                        } else {
                            t
                        }
                    }
                    UnaryOp::Not => {
                        if !operand.sql_type().coerces_to(SqlType::Bool) {
                            return Err(AnalysisError::type_mismatch(
                                format!("NOT requires a BOOL operand, got {}", operand.sql_type()),
                                *span,
                            ));
                        }
                        SqlType::Bool
                    }
                };
                Ok(ResolvedExpr::Unary {
                    op: *op,
                    operand: Box::new(operand),
                    sql_type,
                })
            }
            Expr::Binary { left, op, right, span } => {
                let left = self.resolve_expr(left, scope)?;
                let right = self.resolve_expr(right, scope)?;
                let sql_type = binary_result_type(*op, &left, &right)
                    .map_err(|message| AnalysisError::type_mismatch(message, *span))?;
                Ok(ResolvedExpr::Binary {
                    op: *op,
                    left: Box::new(left),
                    right: Box::new(right),
                    sql_type,
                })
            }
        }
    }

    /// Resolve a possibly-qualified column reference against the scope.
    /// Ambiguity is checked before existence: a name visible in two tables
    /// is ambiguous even though it clearly exists.
    fn resolve_column(
        &self,
        name: &ObjectName,
        scope: &Scope,
    ) -> Result<ResolvedExpr, AnalysisError> {
        if name.is_qualified() {
            // qualifier.column, where the qualifier may itself be dotted
            let column = name.last();
            let qualifier = name.parts[..name.parts.len() - 1]
                .iter()
                .map(|p| p.value.as_str())
                .collect::<Vec<_>>()
                .join(".");
            let Some(table) = scope.table(&qualifier) else {
                return Err(AnalysisError::unresolved(name.to_dotted(), name.span));
            };
            let Some(col) = table
                .columns
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(&column.value))
            else {
                return Err(AnalysisError::unresolved(name.to_dotted(), name.span));
            };
            return Ok(ResolvedExpr::ColumnRef {
                qualifier: table.alias.clone(),
                name: col.name.clone(),
                sql_type: col.sql_type,
            });
        }

        let column = &name.last().value;
        let mut matches = scope.tables.iter().filter_map(|t| {
            t.columns
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(column))
                .map(|c| (t.alias.clone(), c.clone()))
        });
        let first = matches.next();
        if matches.next().is_some() {
            return Err(AnalysisError::ambiguous(column.clone(), name.span));
        }
        let Some((alias, col)) = first else {
            return Err(AnalysisError::unresolved(column.clone(), name.span));
        };
        Ok(ResolvedExpr::ColumnRef {
            qualifier: alias,
            name: col.name,
            sql_type: col.sql_type,
        })
    }

    fn resolve_function(
        &self,
        name: &sqlvet_parser::ast::Ident,
        args: &FunctionArgs,
        span: Span,
        scope: &Scope,
    ) -> Result<ResolvedExpr, AnalysisError> {
        let function = self
            .catalog
            .lookup_function(&name.value)
            .map_err(|_| AnalysisError::unresolved(&name.value, name.span))?;

        match args {
            FunctionArgs::Star(star_span) => {
                // COUNT(*) is the only star form
                if !function.aggregate || !function.name.eq_ignore_ascii_case("count") {
                    return Err(AnalysisError::NoMatchingSignature {
                        function: function.name.clone(),
                        arg_types: "*".to_string(),
                        line: star_span.line,
                        column: star_span.column,
                    });
                }
                Ok(ResolvedExpr::FunctionCall {
                    name: function.name.clone(),
                    args: ResolvedArgs::Star,
                    sql_type: SqlType::Int64,
                    aggregate: true,
                })
            }
            FunctionArgs::Args(list) => {
                let mut resolved = Vec::with_capacity(list.len());
                for arg in list {
                    resolved.push(self.resolve_expr(arg, scope)?);
                }
                let arg_types: Vec<SqlType> = resolved.iter().map(|a| a.sql_type()).collect();

                // Exact match first, then one-step coercion
                let signature = function
                    .signatures
                    .iter()
                    .find(|s| s.params == arg_types)
                    .or_else(|| {
                        function.signatures.iter().find(|s| {
                            s.params.len() == arg_types.len()
                                && arg_types
                                    .iter()
                                    .zip(&s.params)
                                    .all(|(a, p)| a.coerces_to(*p))
                        })
                    });
                let Some(signature) = signature else {
                    return Err(AnalysisError::NoMatchingSignature {
                        function: function.name.clone(),
                        arg_types: arg_types
                            .iter()
                            .map(|t| t.to_string())
                            .collect::<Vec<_>>()
                            .join(", "),
                        line: span.line,
                        column: span.column,
                    });
                };

                Ok(ResolvedExpr::FunctionCall {
                    name: function.name.clone(),
                    args: ResolvedArgs::Args(resolved),
                    sql_type: signature.result,
                    aggregate: function.aggregate,
                })
            }
        }
    }

    // -------------------------------------------------------------------
    // INSERT
    // -------------------------------------------------------------------

    fn resolve_insert(&self, insert: &InsertStatement) -> Result<ResolvedInsert, AnalysisError> {
        let dotted = insert.table.to_dotted();
        let table = self
            .catalog
            .lookup_table(&dotted)
            .map_err(|_| AnalysisError::unresolved(&dotted, insert.table.span))?;

        // Target columns: the explicit list, or the whole schema in order
        let targets: Vec<OutputColumn> = if insert.columns.is_empty() {
            table
                .columns
                .iter()
                .map(|c| OutputColumn::new(c.name.clone(), c.sql_type))
                .collect()
        } else {
            let mut targets = Vec::with_capacity(insert.columns.len());
            for ident in &insert.columns {
                let Some(col) = table.column(&ident.value) else {
                    return Err(AnalysisError::unresolved(&ident.value, ident.span));
                };
                if targets
                    .iter()
                    .any(|t: &OutputColumn| t.name.eq_ignore_ascii_case(&col.name))
                {
                    return Err(AnalysisError::ambiguous(&ident.value, ident.span));
                }
                targets.push(OutputColumn::new(col.name.clone(), col.sql_type));
            }
            targets
        };

        let source = match &insert.source {
            InsertSource::Values(rows) => {
                let scope = Scope::default();
                let mut resolved_rows = Vec::with_capacity(rows.len());
                for row in rows {
                    if row.len() != targets.len() {
                        let span = row.first().map_or(insert.span, |e| e.span());
                        return Err(AnalysisError::type_mismatch(
                            format!(
                                "INSERT has {} target columns but a row of {} values",
                                targets.len(),
                                row.len()
                            ),
                            span,
                        ));
                    }
                    let mut resolved_row = Vec::with_capacity(row.len());
                    for (value, target) in row.iter().zip(&targets) {
                        let resolved = self.resolve_expr(value, &scope)?;
                        if !resolved.sql_type().coerces_to(target.sql_type) {
                            return Err(AnalysisError::type_mismatch(
                                format!(
                                    "cannot insert {} into column {} of type {}",
                                    resolved.sql_type(),
                                    target.name,
                                    target.sql_type
                                ),
                                value.span(),
                            ));
                        }
                        resolved_row.push(resolved);
                    }
                    resolved_rows.push(resolved_row);
                }
                ResolvedInsertSource::Values(resolved_rows)
            }
            InsertSource::Query(query) => {
                let resolved = self.resolve_query(query)?;
                let schema = resolved.schema();
                if schema.len() != targets.len() {
                    return Err(AnalysisError::type_mismatch(
                        format!(
                            "INSERT has {} target columns but the query produces {}",
                            targets.len(),
                            schema.len()
                        ),
                        query.span(),
                    ));
                }
                for (produced, target) in schema.iter().zip(&targets) {
                    if !produced.sql_type.coerces_to(target.sql_type) {
                        return Err(AnalysisError::type_mismatch(
                            format!(
                                "cannot insert {} into column {} of type {}",
                                produced.sql_type, target.name, target.sql_type
                            ),
                            query.span(),
                        ));
                    }
                }
                ResolvedInsertSource::Query(resolved)
            }
        };

        Ok(ResolvedInsert {
            table: table.name.clone(),
            columns: targets,
            source,
        })
    }

    // -------------------------------------------------------------------
    // CREATE TABLE
    // -------------------------------------------------------------------

    fn resolve_create_table(
        &self,
        create: &CreateTableStatement,
    ) -> Result<ResolvedCreateTable, AnalysisError> {
        let name = create.name.to_dotted();

        let (columns, query) = match &create.definition {
            CreateTableDefinition::Columns(defs) => {
                let mut columns: Vec<sqlvet_catalog::ColumnDef> = Vec::with_capacity(defs.len());
                for def in defs {
                    let Some(sql_type) = SqlType::parse(&def.type_name.value) else {
                        return Err(AnalysisError::type_mismatch(
                            format!("unknown type {}", def.type_name.value),
                            def.type_name.span,
                        ));
                    };
                    if columns
                        .iter()
                        .any(|c| c.name.eq_ignore_ascii_case(&def.name.value))
                    {
                        return Err(AnalysisError::ambiguous(&def.name.value, def.name.span));
                    }
                    columns.push(sqlvet_catalog::ColumnDef::new(def.name.value.clone(), sql_type));
                }
                (columns, None)
            }
            CreateTableDefinition::Query(query_ast) => {
                let resolved = self.resolve_query(query_ast)?;
                let schema = resolved.schema();
                let mut columns: Vec<sqlvet_catalog::ColumnDef> = Vec::with_capacity(schema.len());
                for col in &schema {
                    if columns.iter().any(|c| c.name.eq_ignore_ascii_case(&col.name)) {
                        return Err(AnalysisError::ambiguous(&col.name, query_ast.span()));
                    }
                    columns.push(sqlvet_catalog::ColumnDef::new(col.name.clone(), col.sql_type));
                }
                (columns, Some(resolved))
            }
        };

        Ok(ResolvedCreateTable {
            table: TableDef::new(name, columns),
            temp: create.temp,
            query,
        })
    }
}

/// Wildcard expansion of one scope table into output columns
fn expand_table(outputs: &mut Vec<ResolvedOutput>, table: &ScopeTable) {
    for col in &table.columns {
        outputs.push(ResolvedOutput {
            name: col.name.clone(),
            expr: ResolvedExpr::ColumnRef {
                qualifier: table.alias.clone(),
                name: col.name.clone(),
                sql_type: col.sql_type,
            },
        });
    }
}

/// Output name for an unaliased select item
fn implicit_name(expr: &Expr, index: usize) -> String {
    match expr {
        Expr::Column(name) => name.last().value.clone(),
        _ => format!("$col{}", index + 1),
    }
}

fn resolve_literal(literal: &Literal) -> ResolvedExpr {
    let (value, sql_type) = match literal {
        Literal::Integer(v, _) => (LiteralValue::Int(*v), SqlType::Int64),
        Literal::Float(v, _) => (LiteralValue::Float(*v), SqlType::Float64),
        Literal::String(s, _) => (LiteralValue::Str(s.clone()), SqlType::String),
        Literal::Bool(b, _) => (LiteralValue::Bool(*b), SqlType::Bool),
        Literal::Null(_) => (LiteralValue::Null, SqlType::Null),
    };
    ResolvedExpr::Literal { value, sql_type }
}

/// Result type of a binary operator, or a mismatch message
fn binary_result_type(
    op: BinaryOp,
    left: &ResolvedExpr,
    right: &ResolvedExpr,
) -> Result<SqlType, String> {
    let (l, r) = (left.sql_type(), right.sql_type());
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Mod => {
            match l.common_super_type(r) {
                Some(common) if common.is_numeric() => Ok(common),
                Some(SqlType::Null) => Ok(SqlType::Int64),
                _ => Err(format!("operator {} requires numeric operands, got {l} and {r}", op.symbol())),
            }
        }
        // Division always widens to FLOAT64
        BinaryOp::Div => match l.common_super_type(r) {
            Some(common) if common.is_numeric() || common == SqlType::Null => Ok(SqlType::Float64),
            _ => Err(format!("operator / requires numeric operands, got {l} and {r}")),
        },
        BinaryOp::Concat => {
            if l.coerces_to(SqlType::String) && r.coerces_to(SqlType::String) {
                Ok(SqlType::String)
            } else {
                Err(format!("operator || requires STRING operands, got {l} and {r}"))
            }
        }
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            if l.common_super_type(r).is_some() {
                Ok(SqlType::Bool)
            } else {
                Err(format!("no common type to compare {l} and {r}"))
            }
        }
        BinaryOp::And | BinaryOp::Or => {
            if l.coerces_to(SqlType::Bool) && r.coerces_to(SqlType::Bool) {
                Ok(SqlType::Bool)
            } else {
                Err(format!(
                    "operator {} requires BOOL operands, got {l} and {r}",
                    op.symbol()
                ))
            }
        }
    }
}

/// Check one expression of a grouped query. An expression is valid when it
/// matches a GROUP BY expression, is constant, sits inside an aggregate, or
/// is built from valid pieces.
fn grouped_ok(expr: &ResolvedExpr, group_by: &[ResolvedExpr]) -> Result<(), String> {
    if group_by.contains(expr) || expr.is_constant() {
        return Ok(());
    }
    match expr {
        ResolvedExpr::Literal { .. } => Ok(()),
        ResolvedExpr::ColumnRef { qualifier, name, .. } => Err(format!(
            "column {qualifier}.{name} is neither grouped nor aggregated"
        )),
        ResolvedExpr::FunctionCall { aggregate: true, args, .. } => {
            let nested = match args {
                ResolvedArgs::Star => false,
                ResolvedArgs::Args(list) => list.iter().any(|a| a.contains_aggregate()),
            };
            if nested {
                Err("aggregate function cannot be nested inside another aggregate".to_string())
            } else {
                Ok(())
            }
        }
        ResolvedExpr::FunctionCall { args: ResolvedArgs::Args(list), .. } => {
            for arg in list {
                grouped_ok(arg, group_by)?;
            }
            Ok(())
        }
        ResolvedExpr::FunctionCall { .. } => Ok(()),
        ResolvedExpr::Unary { operand, .. } => grouped_ok(operand, group_by),
        ResolvedExpr::Binary { left, right, .. } => {
            grouped_ok(left, group_by)?;
            grouped_ok(right, group_by)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlvet_catalog::{ColumnDef, FunctionDef, FunctionSignature};
    use sqlvet_core::LanguageOptions;
    use sqlvet_parser::parse_statement;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::with_builtins();
        catalog
            .add_table(TableDef::new(
                "dataset.table",
                vec![
                    ColumnDef::new("column1", SqlType::Int64),
                    ColumnDef::new("column2", SqlType::String),
                ],
            ))
            .unwrap();
        catalog
            .add_table(TableDef::new(
                "table1",
                vec![
                    ColumnDef::new("joincolumn", SqlType::Int64),
                    ColumnDef::new("column1", SqlType::String),
                ],
            ))
            .unwrap();
        catalog
            .add_table(TableDef::new(
                "table2",
                vec![
                    ColumnDef::new("joincolumn", SqlType::Int64),
                    ColumnDef::new("column2", SqlType::String),
                ],
            ))
            .unwrap();
        catalog
    }

    fn analyze(sql: &str, catalog: &Catalog) -> Result<ResolvedStatement, AnalysisError> {
        let options = LanguageOptions::default();
        let statement = parse_statement(sql, &options).unwrap();
        Analyzer::new(catalog).analyze_statement(&statement)
    }

    fn schema_of(sql: &str, catalog: &Catalog) -> Vec<OutputColumn> {
        analyze(sql, catalog).unwrap().output_schema()
    }

    #[test]
    fn literal_select_types_its_output() {
        let catalog = Catalog::new();
        assert_eq!(
            schema_of("SELECT 1 AS column;", &catalog),
            vec![OutputColumn::new("column", SqlType::Int64)]
        );
    }

    #[test]
    fn anonymous_outputs_get_positional_names() {
        let catalog = Catalog::new();
        assert_eq!(
            schema_of("SELECT 1, 'x';", &catalog),
            vec![
                OutputColumn::new("$col1", SqlType::Int64),
                OutputColumn::new("$col2", SqlType::String),
            ]
        );
    }

    #[test]
    fn unregistered_table_is_unresolved() {
        let err = analyze("SELECT * FROM dataset.table;", &Catalog::new()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::UnresolvedName {
                name: "dataset.table".to_string(),
                line: 1,
                column: 15,
            }
        );
    }

    #[test]
    fn registered_table_resolves_and_star_expands() {
        let schema = schema_of("SELECT * FROM dataset.table;", &catalog());
        assert_eq!(
            schema,
            vec![
                OutputColumn::new("column1", SqlType::Int64),
                OutputColumn::new("column2", SqlType::String),
            ]
        );
    }

    #[test]
    fn unknown_column_is_unresolved() {
        let err = analyze("SELECT nocolumn FROM dataset.table;", &catalog()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UnresolvedName { ref name, .. } if name == "nocolumn"
        ));
    }

    #[test]
    fn column_in_two_tables_is_ambiguous_not_unresolved() {
        let err = analyze(
            "SELECT joincolumn FROM table1 CROSS JOIN table2;",
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::AmbiguousName { ref name, .. } if name == "joincolumn"
        ));
    }

    #[test]
    fn qualification_disambiguates() {
        let schema = schema_of(
            "SELECT t1.joincolumn AS j FROM table1 AS t1 INNER JOIN table2 AS t2 USING (joincolumn);",
            &catalog(),
        );
        assert_eq!(schema, vec![OutputColumn::new("j", SqlType::Int64)]);
    }

    #[test]
    fn duplicate_table_alias_is_ambiguous() {
        let err = analyze(
            "SELECT 1 AS c FROM table1 AS t CROSS JOIN table2 AS t;",
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::AmbiguousName { ref name, .. } if name == "t"));
    }

    #[test]
    fn join_condition_must_be_bool() {
        let err = analyze(
            "SELECT t1.column1 AS c FROM table1 AS t1 INNER JOIN table2 AS t2 ON t1.joincolumn + t2.joincolumn;",
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
    }

    #[test]
    fn function_signature_matching_with_coercion() {
        let catalog = catalog();
        // SUM(INT64) exact
        let schema = schema_of(
            "SELECT SUM(joincolumn) AS s FROM table1 GROUP BY column1;",
            &catalog,
        );
        assert_eq!(schema, vec![OutputColumn::new("s", SqlType::Int64)]);

        // LENGTH(INT64) has no signature, even with coercion
        let err = analyze("SELECT LENGTH(joincolumn) AS n FROM table1;", &catalog).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::NoMatchingSignature { ref function, ref arg_types, .. }
                if function == "LENGTH" && arg_types == "INT64"
        ));
    }

    #[test]
    fn unknown_function_is_unresolved() {
        let err = analyze("SELECT NOSUCHFN(1) AS x;", &catalog()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::UnresolvedName { ref name, .. } if name == "NOSUCHFN"
        ));
    }

    #[test]
    fn star_argument_only_works_for_count() {
        let catalog = catalog();
        let schema = schema_of("SELECT COUNT(*) AS n FROM table1;", &catalog);
        assert_eq!(schema, vec![OutputColumn::new("n", SqlType::Int64)]);

        let err = analyze("SELECT SUM(*) AS s FROM table1;", &catalog).unwrap_err();
        assert!(matches!(err, AnalysisError::NoMatchingSignature { .. }));
    }

    #[test]
    fn ungrouped_column_next_to_aggregate_is_a_grouping_error() {
        let err = analyze(
            "SELECT column1, COUNT(*) AS n FROM dataset.table;",
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::GroupingError { ref message, .. }
                if message.contains("neither grouped nor aggregated")
        ));
    }

    #[test]
    fn grouped_query_accepts_grouped_and_aggregated_outputs() {
        let schema = schema_of(
            "SELECT column2, COUNT(*) AS n, SUM(column1) AS total \
             FROM dataset.table GROUP BY column2 HAVING COUNT(*) > 1 \
             ORDER BY n DESC;",
            &catalog(),
        );
        assert_eq!(
            schema,
            vec![
                OutputColumn::new("column2", SqlType::String),
                OutputColumn::new("n", SqlType::Int64),
                OutputColumn::new("total", SqlType::Int64),
            ]
        );
    }

    #[test]
    fn expression_over_grouped_column_is_allowed() {
        let schema = schema_of(
            "SELECT column1 + 1 AS next FROM dataset.table GROUP BY column1;",
            &catalog(),
        );
        assert_eq!(schema, vec![OutputColumn::new("next", SqlType::Int64)]);
    }

    #[test]
    fn constants_are_exempt_from_grouping() {
        let schema = schema_of(
            "SELECT 1 AS one, COUNT(*) AS n FROM dataset.table GROUP BY column2;",
            &catalog(),
        );
        assert_eq!(schema[0], OutputColumn::new("one", SqlType::Int64));
        assert_eq!(schema[1], OutputColumn::new("n", SqlType::Int64));
    }

    #[test]
    fn aggregate_in_where_is_a_grouping_error() {
        let err = analyze(
            "SELECT column1 AS c FROM dataset.table WHERE COUNT(*) > 1;",
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::GroupingError { ref message, .. } if message.contains("WHERE")
        ));
    }

    #[test]
    fn aggregate_in_group_by_is_a_grouping_error() {
        let err = analyze(
            "SELECT COUNT(*) AS n FROM dataset.table GROUP BY COUNT(*);",
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::GroupingError { ref message, .. } if message.contains("GROUP BY")
        ));
    }

    #[test]
    fn nested_aggregate_is_a_grouping_error() {
        let err = analyze(
            "SELECT SUM(COUNT(*)) AS s FROM dataset.table GROUP BY column2;",
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::GroupingError { ref message, .. } if message.contains("nested")
        ));
    }

    #[test]
    fn order_by_alias_resolves_to_the_output() {
        let schema = schema_of(
            "SELECT column1 AS c FROM dataset.table ORDER BY c;",
            &catalog(),
        );
        assert_eq!(schema, vec![OutputColumn::new("c", SqlType::Int64)]);
    }

    #[test]
    fn comparison_requires_a_common_type() {
        let err = analyze(
            "SELECT 1 AS c FROM dataset.table WHERE column2 = 1;",
            &catalog(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
    }

    #[test]
    fn arithmetic_coerces_int_to_float() {
        let schema = schema_of("SELECT 1 + 0.5 AS x;", &Catalog::new());
        assert_eq!(schema, vec![OutputColumn::new("x", SqlType::Float64)]);
    }

    #[test]
    fn division_widens_to_float() {
        let schema = schema_of("SELECT 4 / 2 AS x;", &Catalog::new());
        assert_eq!(schema, vec![OutputColumn::new("x", SqlType::Float64)]);
    }

    #[test]
    fn union_checks_arity_and_types() {
        let catalog = catalog();
        let schema = schema_of(
            "SELECT 1 AS c UNION ALL SELECT 2.5 AS d;",
            &catalog,
        );
        // Names come from the first input, types widen pairwise
        assert_eq!(schema, vec![OutputColumn::new("c", SqlType::Float64)]);

        let err = analyze("SELECT 1 AS c UNION ALL SELECT 1 AS c, 2 AS d;", &catalog).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::TypeMismatch { ref message, .. } if message.contains("column counts")
        ));

        let err = analyze("SELECT 1 AS c UNION ALL SELECT 'x' AS c;", &catalog).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::TypeMismatch { ref message, .. } if message.contains("incompatible")
        ));
    }

    #[test]
    fn insert_values_checks_shape_and_types() {
        let catalog = catalog();
        assert!(analyze(
            "INSERT INTO dataset.table (column1, column2) VALUES (1, 'x');",
            &catalog
        )
        .is_ok());

        let err = analyze(
            "INSERT INTO dataset.table (column1, column2) VALUES (1);",
            &catalog,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::TypeMismatch { ref message, .. } if message.contains("target columns")
        ));

        let err = analyze(
            "INSERT INTO dataset.table (column1) VALUES ('x');",
            &catalog,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::TypeMismatch { ref message, .. } if message.contains("cannot insert")
        ));
    }

    #[test]
    fn insert_unknown_column_and_duplicate_column() {
        let catalog = catalog();
        let err = analyze(
            "INSERT INTO dataset.table (nocolumn) VALUES (1);",
            &catalog,
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::UnresolvedName { .. }));

        let err = analyze(
            "INSERT INTO dataset.table (column1, column1) VALUES (1, 2);",
            &catalog,
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::AmbiguousName { .. }));
    }

    #[test]
    fn insert_from_query_checks_schema() {
        let catalog = catalog();
        assert!(analyze(
            "INSERT INTO table2 SELECT joincolumn, column1 FROM table1;",
            &catalog
        )
        .is_ok());

        let err = analyze("INSERT INTO table2 SELECT joincolumn FROM table1;", &catalog)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
    }

    #[test]
    fn create_table_resolves_column_types() {
        let result = analyze(
            "CREATE TABLE d.t (a INT64, b STRING, c FLOAT64);",
            &Catalog::new(),
        )
        .unwrap();
        let ResolvedStatement::CreateTable(create) = result else {
            panic!("expected create table");
        };
        assert_eq!(create.table.name, "d.t");
        assert_eq!(create.table.columns.len(), 3);
        assert_eq!(create.table.columns[2].sql_type, SqlType::Float64);
        assert!(!create.temp);
    }

    #[test]
    fn create_table_rejects_unknown_types_and_duplicates() {
        let err = analyze("CREATE TABLE t (a GEOGRAPHY);", &Catalog::new()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::TypeMismatch { ref message, .. } if message.contains("unknown type")
        ));

        let err = analyze("CREATE TABLE t (a INT64, A STRING);", &Catalog::new()).unwrap_err();
        assert!(matches!(err, AnalysisError::AmbiguousName { .. }));
    }

    #[test]
    fn create_table_as_takes_the_query_schema() {
        let result = analyze(
            "CREATE TEMP TABLE t AS (SELECT column1 AS a, COUNT(*) AS n \
             FROM dataset.table GROUP BY column1);",
            &catalog(),
        )
        .unwrap();
        let ResolvedStatement::CreateTable(create) = result else {
            panic!("expected create table");
        };
        assert!(create.temp);
        assert_eq!(
            create.table.columns,
            vec![
                ColumnDef::new("a", SqlType::Int64),
                ColumnDef::new("n", SqlType::Int64),
            ]
        );
        assert!(create.query.is_some());
    }

    #[test]
    fn custom_function_with_multiple_signatures() {
        let mut catalog = catalog();
        catalog
            .add_function(FunctionDef::scalar(
                "GREATEST",
                vec![
                    FunctionSignature::new(vec![SqlType::Int64, SqlType::Int64], SqlType::Int64),
                    FunctionSignature::new(
                        vec![SqlType::Float64, SqlType::Float64],
                        SqlType::Float64,
                    ),
                ],
            ))
            .unwrap();

        let schema = schema_of("SELECT GREATEST(1, 2) AS g;", &catalog);
        assert_eq!(schema, vec![OutputColumn::new("g", SqlType::Int64)]);

        // INT64/FLOAT64 mix falls through to the float signature by coercion
        let schema = schema_of("SELECT GREATEST(1, 2.5) AS g;", &catalog);
        assert_eq!(schema, vec![OutputColumn::new("g", SqlType::Float64)]);
    }

    #[test]
    fn error_locations_point_at_the_offending_token() {
        let err = analyze("SELECT nocolumn FROM dataset.table;", &catalog()).unwrap_err();
        let diag = err.to_diagnostic();
        assert_eq!(diag.kind, sqlvet_core::DiagnosticKind::Semantic);
        assert_eq!((diag.line, diag.column), (1, 8));
    }
}
