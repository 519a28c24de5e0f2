//! Recursive-descent SQL parser
//!
//! Three entry points share one statement parser:
//! - [`parse_statement`] for a single statement,
//! - [`parse_script`] for a whole multi-statement script,
//! - [`ParseCursor`] for pulling one statement at a time from a long script.
//!
//! Parsing is fail-fast: the first grammar error aborts with a
//! [`ParseError::Syntax`] carrying the offending line and column. There is no
//! error recovery.

use sqlvet_core::{Diagnostic, LanguageOptions, Span};

use crate::ast::{
    ColumnDef, CreateTableDefinition, CreateTableStatement, Expr, FromClause, FunctionArgs, Ident,
    InsertSource, InsertStatement, Join, JoinConstraint, JoinKind, Literal, ObjectName,
    OrderByItem, QueryExpr, Script, SelectItem, SelectStatement, Statement, TableRef, UnaryOp,
};
use crate::ast::BinaryOp;
use crate::lexer::{Lexer, LexicalError};
use crate::token::{Token, TokenKind};

/// A failure to parse
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The input could not even be tokenized
    #[error(transparent)]
    Lexical(#[from] LexicalError),

    /// The token stream does not match the grammar
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax { message: String, line: u32, column: u32 },

    /// A cursor was asked to parse past the end of the input.
    /// Distinct from a syntax error so callers can tell "done" from
    /// "malformed tail".
    #[error("no statement remaining to parse")]
    EndOfInput,
}

impl ParseError {
    /// Convert into the stable diagnostic shape
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ParseError::Lexical(err) => err.to_diagnostic(),
            ParseError::Syntax { message, line, column } => {
                Diagnostic::syntax(message.clone(), *line, *column)
            }
            ParseError::EndOfInput => Diagnostic::syntax(self.to_string(), 0, 0),
        }
    }
}

/// Parse exactly one statement, with an optional trailing terminator.
/// Anything after it is a syntax error.
pub fn parse_statement(source: &str, options: &LanguageOptions) -> Result<Statement, ParseError> {
    let mut parser = Parser::new(source, options);
    let statement = parser.parse_statement()?;
    parser.eat(&TokenKind::Semicolon)?;
    let tail = parser.peek()?.clone();
    if !tail.is_eof() {
        return Err(parser.unexpected(&tail, "end of input"));
    }
    Ok(statement)
}

/// Parse a whole script: `;`-terminated statements in source order
pub fn parse_script(source: &str, options: &LanguageOptions) -> Result<Script, ParseError> {
    let mut parser = Parser::new(source, options);
    let mut statements = Vec::new();
    let mut span = Span::zero();

    loop {
        if parser.peek()?.is_eof() {
            break;
        }
        let statement = parser.parse_statement()?;
        span = if statements.is_empty() {
            statement.span()
        } else {
            span.merge(statement.span())
        };
        statements.push(statement);

        if !parser.eat(&TokenKind::Semicolon)? {
            let tail = parser.peek()?.clone();
            if !tail.is_eof() {
                return Err(parser.unexpected(&tail, "';' or end of input"));
            }
        }
    }

    Ok(Script { statements, span })
}

/// Resumable cursor over a script: parses one statement per call.
///
/// The byte position strictly advances on every successful parse. Calling
/// [`ParseCursor::parse_next_statement`] once the input is exhausted yields
/// [`ParseError::EndOfInput`].
pub struct ParseCursor<'a> {
    parser: Parser<'a>,
}

impl<'a> ParseCursor<'a> {
    /// Create a cursor at the start of the source
    pub fn new(source: &'a str, options: &'a LanguageOptions) -> Self {
        Self {
            parser: Parser::new(source, options),
        }
    }

    /// Byte offset of the next unconsumed token
    pub fn byte_position(&self) -> usize {
        match &self.parser.peeked {
            Some(tok) => tok.span.start as usize,
            None => self.parser.lexer.position(),
        }
    }

    /// Parse the next statement and advance past its terminator
    pub fn parse_next_statement(&mut self) -> Result<Statement, ParseError> {
        if self.parser.peek()?.is_eof() {
            return Err(ParseError::EndOfInput);
        }
        let statement = self.parser.parse_statement()?;
        if !self.parser.eat(&TokenKind::Semicolon)? {
            let tail = self.parser.peek()?.clone();
            if !tail.is_eof() {
                return Err(self.parser.unexpected(&tail, "';' or end of input"));
            }
        }
        // Prime the next token so byte_position reflects the resume point
        self.parser.peek()?;
        Ok(statement)
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    options: &'a LanguageOptions,
    peeked: Option<Token>,
    /// Span of the most recently consumed token, for node span merges
    last_span: Span,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, options: &'a LanguageOptions) -> Self {
        Self {
            lexer: Lexer::new(source, options),
            options,
            peeked: None,
            last_span: Span::zero(),
        }
    }

    // -------------------------------------------------------------------
    // Token plumbing
    // -------------------------------------------------------------------

    fn peek(&mut self) -> Result<&Token, ParseError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked.as_ref().expect("just filled"))
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let tok = match self.peeked.take() {
            Some(tok) => tok,
            None => self.lexer.next_token()?,
        };
        self.last_span = tok.span;
        Ok(tok)
    }

    /// Consume the next token if it matches; report whether it did
    fn eat(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        if &self.peek()?.kind == kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consume the next token, failing unless it matches
    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        let tok = self.peek()?.clone();
        if &tok.kind == kind {
            self.advance()
        } else {
            Err(self.unexpected(&tok, &kind.describe()))
        }
    }

    fn unexpected(&self, found: &Token, expected: &str) -> ParseError {
        ParseError::Syntax {
            message: format!("expected {}, found {}", expected, found.kind.describe()),
            line: found.span.line,
            column: found.span.column,
        }
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            message: message.into(),
            line: span.line,
            column: span.column,
        }
    }

    // -------------------------------------------------------------------
    // Names
    // -------------------------------------------------------------------

    fn parse_identifier(&mut self) -> Result<Ident, ParseError> {
        let tok = self.peek()?.clone();
        match &tok.kind {
            TokenKind::Id(name) => {
                if self.options.is_reserved(name) {
                    return Err(self.error_at(
                        tok.span,
                        format!("reserved word {name} cannot be used as an identifier"),
                    ));
                }
                let name = name.clone();
                self.advance()?;
                Ok(Ident::new(name, tok.span))
            }
            TokenKind::QuotedId(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(Ident::quoted(name, tok.span))
            }
            _ => Err(self.unexpected(&tok, "an identifier")),
        }
    }

    fn parse_object_name(&mut self) -> Result<ObjectName, ParseError> {
        let first = self.parse_identifier()?;
        let mut span = first.span;
        let mut parts = vec![first];
        while self.eat(&TokenKind::Dot)? {
            let part = self.parse_identifier()?;
            span = span.merge(part.span);
            parts.push(part);
        }
        Ok(ObjectName::new(parts, span))
    }

    /// Optional alias: `AS name` or a bare identifier
    fn parse_optional_alias(&mut self) -> Result<Option<Ident>, ParseError> {
        if self.eat(&TokenKind::KwAs)? {
            return Ok(Some(self.parse_identifier()?));
        }
        match &self.peek()?.kind {
            TokenKind::Id(_) | TokenKind::QuotedId(_) => Ok(Some(self.parse_identifier()?)),
            _ => Ok(None),
        }
    }

    // -------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let tok = self.peek()?.clone();
        match tok.kind {
            TokenKind::KwSelect | TokenKind::LeftParen => {
                Ok(Statement::Query(self.parse_query_expr()?))
            }
            TokenKind::KwInsert => {
                if !self.options.allow_insert {
                    return Err(self.error_at(
                        tok.span,
                        "INSERT statements are not enabled by these language options",
                    ));
                }
                Ok(Statement::Insert(self.parse_insert()?))
            }
            TokenKind::KwCreate => {
                if !self.options.allow_ddl {
                    return Err(self.error_at(
                        tok.span,
                        "DDL statements are not enabled by these language options",
                    ));
                }
                Ok(Statement::CreateTable(self.parse_create_table()?))
            }
            _ => Err(self.unexpected(&tok, "a statement (SELECT, INSERT, or CREATE)")),
        }
    }

    fn parse_insert(&mut self) -> Result<InsertStatement, ParseError> {
        let start = self.expect(&TokenKind::KwInsert)?.span;
        self.expect(&TokenKind::KwInto)?;
        let table = self.parse_object_name()?;

        let mut columns = Vec::new();
        if self.peek()?.kind == TokenKind::LeftParen {
            self.advance()?;
            loop {
                columns.push(self.parse_identifier()?);
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen)?;
        }

        let source = if self.eat(&TokenKind::KwValues)? {
            let mut rows = Vec::new();
            loop {
                self.expect(&TokenKind::LeftParen)?;
                let mut row = Vec::new();
                loop {
                    row.push(self.parse_expr()?);
                    if !self.eat(&TokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(&TokenKind::RightParen)?;
                rows.push(row);
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
            InsertSource::Values(rows)
        } else {
            InsertSource::Query(self.parse_query_expr()?)
        };

        Ok(InsertStatement {
            table,
            columns,
            source,
            span: start.merge(self.last_span),
        })
    }

    fn parse_create_table(&mut self) -> Result<CreateTableStatement, ParseError> {
        let start = self.expect(&TokenKind::KwCreate)?.span;
        let temp =
            self.eat(&TokenKind::KwTemp)? || self.eat(&TokenKind::KwTemporary)?;
        self.expect(&TokenKind::KwTable)?;
        let name = self.parse_object_name()?;

        let definition = if self.eat(&TokenKind::KwAs)? {
            let parenthesized = self.eat(&TokenKind::LeftParen)?;
            let query = self.parse_query_expr()?;
            if parenthesized {
                self.expect(&TokenKind::RightParen)?;
            }
            CreateTableDefinition::Query(query)
        } else {
            self.expect(&TokenKind::LeftParen)?;
            let mut columns = Vec::new();
            loop {
                let col_name = self.parse_identifier()?;
                let type_name = self.parse_identifier()?;
                columns.push(ColumnDef {
                    name: col_name,
                    type_name,
                });
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(&TokenKind::RightParen)?;
            CreateTableDefinition::Columns(columns)
        };

        Ok(CreateTableStatement {
            name,
            temp,
            definition,
            span: start.merge(self.last_span),
        })
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    fn parse_query_expr(&mut self) -> Result<QueryExpr, ParseError> {
        let mut left = self.parse_query_primary()?;
        while self.eat(&TokenKind::KwUnion)? {
            let all = if self.eat(&TokenKind::KwAll)? {
                true
            } else {
                // UNION DISTINCT, written or implied
                self.eat(&TokenKind::KwDistinct)?;
                false
            };
            let right = self.parse_query_primary()?;
            let span = left.span().merge(right.span());
            left = QueryExpr::Union {
                left: Box::new(left),
                right: Box::new(right),
                all,
                span,
            };
        }
        Ok(left)
    }

    fn parse_query_primary(&mut self) -> Result<QueryExpr, ParseError> {
        if self.eat(&TokenKind::LeftParen)? {
            let query = self.parse_query_expr()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(query);
        }
        Ok(QueryExpr::Select(Box::new(self.parse_select()?)))
    }

    fn parse_select(&mut self) -> Result<SelectStatement, ParseError> {
        let start = self.expect(&TokenKind::KwSelect)?.span;

        let mut items = Vec::new();
        loop {
            items.push(self.parse_select_item()?);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }

        let from = if self.peek()?.kind == TokenKind::KwFrom {
            Some(self.parse_from_clause()?)
        } else {
            None
        };

        let where_clause = if self.eat(&TokenKind::KwWhere)? {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut group_by = Vec::new();
        if self.eat(&TokenKind::KwGroup)? {
            self.expect(&TokenKind::KwBy)?;
            loop {
                group_by.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }

        let having = if self.eat(&TokenKind::KwHaving)? {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut order_by = Vec::new();
        if self.eat(&TokenKind::KwOrder)? {
            self.expect(&TokenKind::KwBy)?;
            loop {
                let expr = self.parse_expr()?;
                let descending = if self.eat(&TokenKind::KwDesc)? {
                    true
                } else {
                    self.eat(&TokenKind::KwAsc)?;
                    false
                };
                order_by.push(OrderByItem { expr, descending });
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }

        let limit = if self.eat(&TokenKind::KwLimit)? {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(SelectStatement {
            items,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
            span: start.merge(self.last_span),
        })
    }

    fn parse_select_item(&mut self) -> Result<SelectItem, ParseError> {
        let tok = self.peek()?.clone();

        if tok.kind == TokenKind::Star {
            self.advance()?;
            return Ok(SelectItem::Wildcard { span: tok.span });
        }

        // A leading identifier may turn out to be `qualifier.*`, a column
        // reference, or a function call; disambiguate as we go.
        if matches!(tok.kind, TokenKind::Id(_) | TokenKind::QuotedId(_)) {
            let first = self.parse_identifier()?;
            let mut span = first.span;
            let mut parts = vec![first];

            while self.eat(&TokenKind::Dot)? {
                if self.peek()?.kind == TokenKind::Star {
                    let star = self.advance()?;
                    let qualifier_span = span;
                    return Ok(SelectItem::QualifiedWildcard {
                        qualifier: ObjectName::new(parts, qualifier_span),
                        span: qualifier_span.merge(star.span),
                    });
                }
                let part = self.parse_identifier()?;
                span = span.merge(part.span);
                parts.push(part);
            }

            let primary = if parts.len() == 1
                && !parts[0].quoted
                && self.peek()?.kind == TokenKind::LeftParen
            {
                let name = parts.pop().expect("one part");
                self.parse_function_call(name)?
            } else {
                Expr::Column(ObjectName::new(parts, span))
            };

            let expr = self.parse_binary_rhs(primary, 0)?;
            let alias = self.parse_optional_alias()?;
            return Ok(SelectItem::Expr { expr, alias });
        }

        let expr = self.parse_expr()?;
        let alias = self.parse_optional_alias()?;
        Ok(SelectItem::Expr { expr, alias })
    }

    fn parse_from_clause(&mut self) -> Result<FromClause, ParseError> {
        let start = self.expect(&TokenKind::KwFrom)?.span;
        let base = self.parse_table_ref()?;

        let mut joins = Vec::new();
        loop {
            let join_start = self.peek()?.span;
            let kind = match self.peek()?.kind {
                TokenKind::KwJoin => {
                    self.advance()?;
                    JoinKind::Inner
                }
                TokenKind::KwInner => {
                    self.advance()?;
                    self.expect(&TokenKind::KwJoin)?;
                    JoinKind::Inner
                }
                TokenKind::KwLeft => {
                    self.advance()?;
                    self.eat(&TokenKind::KwOuter)?;
                    self.expect(&TokenKind::KwJoin)?;
                    JoinKind::Left
                }
                TokenKind::KwRight => {
                    self.advance()?;
                    self.eat(&TokenKind::KwOuter)?;
                    self.expect(&TokenKind::KwJoin)?;
                    JoinKind::Right
                }
                TokenKind::KwFull => {
                    self.advance()?;
                    self.eat(&TokenKind::KwOuter)?;
                    self.expect(&TokenKind::KwJoin)?;
                    JoinKind::Full
                }
                TokenKind::KwCross => {
                    self.advance()?;
                    self.expect(&TokenKind::KwJoin)?;
                    JoinKind::Cross
                }
                _ => break,
            };

            let table = self.parse_table_ref()?;

            let constraint = if self.eat(&TokenKind::KwOn)? {
                JoinConstraint::On(self.parse_expr()?)
            } else if self.eat(&TokenKind::KwUsing)? {
                self.expect(&TokenKind::LeftParen)?;
                let mut cols = Vec::new();
                loop {
                    cols.push(self.parse_identifier()?);
                    if !self.eat(&TokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(&TokenKind::RightParen)?;
                JoinConstraint::Using(cols)
            } else {
                JoinConstraint::None
            };

            if kind == JoinKind::Cross && !matches!(constraint, JoinConstraint::None) {
                return Err(self.error_at(join_start, "CROSS JOIN cannot have a join condition"));
            }
            if kind != JoinKind::Cross && matches!(constraint, JoinConstraint::None) {
                return Err(self.error_at(join_start, "expected ON or USING after join"));
            }

            joins.push(Join {
                kind,
                table,
                constraint,
                span: join_start.merge(self.last_span),
            });
        }

        Ok(FromClause {
            base,
            joins,
            span: start.merge(self.last_span),
        })
    }

    fn parse_table_ref(&mut self) -> Result<TableRef, ParseError> {
        let name = self.parse_object_name()?;
        let alias = self.parse_optional_alias()?;
        Ok(TableRef { name, alias })
    }

    // -------------------------------------------------------------------
    // Expressions (precedence climbing)
    // -------------------------------------------------------------------

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_unary()?;
        self.parse_binary_rhs(lhs, 0)
    }

    fn peek_binary_op(&mut self) -> Result<Option<BinaryOp>, ParseError> {
        let op = match self.peek()?.kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Concat => BinaryOp::Concat,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Ne => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::Le => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Ge => BinaryOp::Ge,
            TokenKind::KwAnd => BinaryOp::And,
            TokenKind::KwOr => BinaryOp::Or,
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    fn parse_binary_rhs(&mut self, mut lhs: Expr, min_prec: u8) -> Result<Expr, ParseError> {
        while let Some(op) = self.peek_binary_op()? {
            if op.precedence() < min_prec {
                break;
            }
            self.advance()?;
            let mut rhs = self.parse_unary()?;
            while let Some(next) = self.peek_binary_op()? {
                if next.precedence() > op.precedence() {
                    rhs = self.parse_binary_rhs(rhs, next.precedence())?;
                } else {
                    break;
                }
            }
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek()?.clone();
        match tok.kind {
            TokenKind::KwNot => {
                self.advance()?;
                // NOT binds tighter than AND/OR but looser than comparison
                let inner = self.parse_unary()?;
                let operand = self.parse_binary_rhs(inner, 3)?;
                let span = tok.span.merge(operand.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::Minus => {
                self.advance()?;
                let operand = self.parse_unary()?;
                let span = tok.span.merge(operand.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                    span,
                })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.peek()?.clone();
        match &tok.kind {
            TokenKind::Integer(v) => {
                let v = *v;
                self.advance()?;
                Ok(Expr::Literal(Literal::Integer(v, tok.span)))
            }
            TokenKind::Float(v) => {
                let v = *v;
                self.advance()?;
                Ok(Expr::Literal(Literal::Float(v, tok.span)))
            }
            TokenKind::String(s) => {
                let s = s.clone();
                self.advance()?;
                Ok(Expr::Literal(Literal::String(s, tok.span)))
            }
            TokenKind::KwTrue => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Bool(true, tok.span)))
            }
            TokenKind::KwFalse => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Bool(false, tok.span)))
            }
            TokenKind::KwNull => {
                self.advance()?;
                Ok(Expr::Literal(Literal::Null(tok.span)))
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::Id(_) | TokenKind::QuotedId(_) => {
                let first = self.parse_identifier()?;
                if !first.quoted && self.peek()?.kind == TokenKind::LeftParen {
                    return self.parse_function_call(first);
                }
                let mut span = first.span;
                let mut parts = vec![first];
                while self.eat(&TokenKind::Dot)? {
                    let part = self.parse_identifier()?;
                    span = span.merge(part.span);
                    parts.push(part);
                }
                Ok(Expr::Column(ObjectName::new(parts, span)))
            }
            _ => Err(self.unexpected(&tok, "an expression")),
        }
    }

    /// Parse the argument list of `name(...)`; the name is already consumed
    fn parse_function_call(&mut self, name: Ident) -> Result<Expr, ParseError> {
        let start = name.span;
        self.expect(&TokenKind::LeftParen)?;

        if self.peek()?.kind == TokenKind::Star {
            self.advance()?;
            let star_span = self.last_span;
            self.expect(&TokenKind::RightParen)?;
            return Ok(Expr::Function {
                name,
                args: FunctionArgs::Star(star_span),
                span: start.merge(self.last_span),
            });
        }

        let mut args = Vec::new();
        if self.peek()?.kind != TokenKind::RightParen {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Function {
            name,
            args: FunctionArgs::Args(args),
            span: start.merge(self.last_span),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> LanguageOptions {
        LanguageOptions::default()
    }

    fn stmt(sql: &str) -> Statement {
        let options = options();
        parse_statement(sql, &options).unwrap()
    }

    fn syntax_err(sql: &str) -> ParseError {
        let options = options();
        parse_statement(sql, &options).unwrap_err()
    }

    fn select_of(statement: &Statement) -> &SelectStatement {
        match statement {
            Statement::Query(QueryExpr::Select(select)) => select,
            other => panic!("expected a plain select, got {other:?}"),
        }
    }

    #[test]
    fn select_literal_with_alias() {
        let statement = stmt("SELECT 1 AS column;");
        let select = select_of(&statement);
        assert_eq!(select.items.len(), 1);
        match &select.items[0] {
            SelectItem::Expr { expr, alias } => {
                assert_eq!(expr, &Expr::Literal(Literal::Integer(1, expr.span())));
                assert_eq!(alias.as_ref().unwrap().value, "column");
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn select_star_from_dotted_table() {
        let statement = stmt("SELECT * FROM dataset.table WHERE column1 = 1;");
        let select = select_of(&statement);
        assert!(matches!(select.items[0], SelectItem::Wildcard { .. }));
        let from = select.from.as_ref().unwrap();
        assert_eq!(from.base.name.to_dotted(), "dataset.table");
        assert!(select.where_clause.is_some());
    }

    #[test]
    fn backtick_table_name_stays_one_part() {
        let statement = stmt("SELECT * FROM `dataset.table`;");
        let select = select_of(&statement);
        let name = &select.from.as_ref().unwrap().base.name;
        assert_eq!(name.parts.len(), 1);
        assert!(name.parts[0].quoted);
        assert_eq!(name.to_dotted(), "dataset.table");
    }

    #[test]
    fn joins_with_using_and_on() {
        let statement = stmt(
            "SELECT t1.column1, t2.column2 FROM table1 AS t1 \
             INNER JOIN table2 AS t2 USING (joincolumn);",
        );
        let select = select_of(&statement);
        let from = select.from.as_ref().unwrap();
        assert_eq!(from.joins.len(), 1);
        assert_eq!(from.joins[0].kind, JoinKind::Inner);
        assert!(matches!(from.joins[0].constraint, JoinConstraint::Using(_)));

        let statement = stmt("SELECT a FROM t1 LEFT OUTER JOIN t2 ON t1.id = t2.id;");
        let select = select_of(&statement);
        let join = &select.from.as_ref().unwrap().joins[0];
        assert_eq!(join.kind, JoinKind::Left);
        assert!(matches!(join.constraint, JoinConstraint::On(_)));
    }

    #[test]
    fn cross_join_has_no_condition() {
        let statement = stmt("SELECT a FROM t1 CROSS JOIN t2;");
        let select = select_of(&statement);
        assert_eq!(select.from.as_ref().unwrap().joins[0].kind, JoinKind::Cross);

        let err = syntax_err("SELECT a FROM t1 CROSS JOIN t2 ON t1.id = t2.id;");
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn inner_join_requires_condition() {
        let err = syntax_err("SELECT a FROM t1 JOIN t2;");
        assert!(
            matches!(err, ParseError::Syntax { ref message, .. } if message.contains("ON or USING"))
        );
    }

    #[test]
    fn group_by_having_order_limit() {
        let statement = stmt(
            "SELECT a, SUM(b) AS total FROM t GROUP BY a HAVING SUM(b) > 10 \
             ORDER BY total DESC LIMIT 5;",
        );
        let select = select_of(&statement);
        assert_eq!(select.group_by.len(), 1);
        assert!(select.having.is_some());
        assert!(select.order_by[0].descending);
        assert!(select.limit.is_some());
    }

    #[test]
    fn qualified_wildcard() {
        let statement = stmt("SELECT t1.*, t2.column2 FROM t1 CROSS JOIN t2;");
        let select = select_of(&statement);
        match &select.items[0] {
            SelectItem::QualifiedWildcard { qualifier, .. } => {
                assert_eq!(qualifier.to_dotted(), "t1");
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn count_star() {
        let statement = stmt("SELECT COUNT(*) AS n FROM t;");
        let select = select_of(&statement);
        match &select.items[0] {
            SelectItem::Expr { expr, .. } => {
                assert!(matches!(
                    expr,
                    Expr::Function { args: FunctionArgs::Star(_), .. }
                ));
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn operator_precedence() {
        let statement = stmt("SELECT a + b * 2 = c AND d;");
        let select = select_of(&statement);
        let SelectItem::Expr { expr, .. } = &select.items[0] else {
            panic!("expected expression item");
        };
        // AND at the top, then =, then +, then *
        let Expr::Binary { op: BinaryOp::And, left, .. } = expr else {
            panic!("expected AND at the root, got {expr:?}");
        };
        let Expr::Binary { op: BinaryOp::Eq, left, .. } = left.as_ref() else {
            panic!("expected = under AND");
        };
        let Expr::Binary { op: BinaryOp::Add, right, .. } = left.as_ref() else {
            panic!("expected + under =");
        };
        assert!(matches!(right.as_ref(), Expr::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn union_all_chain() {
        let statement = stmt("SELECT 1 AS c UNION ALL SELECT 2 AS c UNION ALL SELECT 3 AS c;");
        let Statement::Query(QueryExpr::Union { left, all: true, .. }) = &statement else {
            panic!("expected a union");
        };
        // Left-associative: ((s1 UNION ALL s2) UNION ALL s3)
        assert!(matches!(left.as_ref(), QueryExpr::Union { .. }));
    }

    #[test]
    fn insert_values_and_query() {
        let statement = stmt("INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y');");
        let Statement::Insert(insert) = &statement else {
            panic!("expected insert");
        };
        assert_eq!(insert.columns.len(), 2);
        let InsertSource::Values(rows) = &insert.source else {
            panic!("expected VALUES");
        };
        assert_eq!(rows.len(), 2);

        let statement = stmt("INSERT INTO t SELECT a, b FROM s;");
        let Statement::Insert(insert) = &statement else {
            panic!("expected insert");
        };
        assert!(insert.columns.is_empty());
        assert!(matches!(insert.source, InsertSource::Query(_)));
    }

    #[test]
    fn create_table_with_columns() {
        let statement = stmt("CREATE TABLE table1 (joincolumn STRING, column1 STRING);");
        let Statement::CreateTable(create) = &statement else {
            panic!("expected create table");
        };
        assert!(!create.temp);
        let CreateTableDefinition::Columns(cols) = &create.definition else {
            panic!("expected column list");
        };
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].name.value, "joincolumn");
        assert_eq!(cols[0].type_name.value, "STRING");
    }

    #[test]
    fn create_temp_table_as_query() {
        let statement =
            stmt("CREATE TEMP TABLE t AS (SELECT 1 AS column UNION ALL SELECT 2 AS column);");
        let Statement::CreateTable(create) = &statement else {
            panic!("expected create table");
        };
        assert!(create.temp);
        assert!(matches!(
            create.definition,
            CreateTableDefinition::Query(QueryExpr::Union { all: true, .. })
        ));
    }

    #[test]
    fn empty_select_list_is_a_syntax_error() {
        let err = syntax_err("SELECT FROM table1;");
        let ParseError::Syntax { line, column, .. } = err else {
            panic!("expected syntax error, got {err:?}");
        };
        assert_eq!(line, 1);
        assert_eq!(column, 8);
    }

    #[test]
    fn trailing_garbage_is_a_syntax_error() {
        let err = syntax_err("SELECT 1 AS c; SELECT 2 AS c;");
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn ddl_can_be_disabled() {
        let mut options = LanguageOptions::default();
        options.allow_ddl = false;
        let err = parse_statement("CREATE TABLE t (a INT64);", &options).unwrap_err();
        assert!(
            matches!(err, ParseError::Syntax { ref message, .. } if message.contains("not enabled"))
        );
    }

    #[test]
    fn reserved_keyword_rejected_as_identifier() {
        let options = LanguageOptions::default().reserve_keyword("col");
        let err = parse_statement("SELECT 1 AS col;", &options).unwrap_err();
        assert!(
            matches!(err, ParseError::Syntax { ref message, .. } if message.contains("reserved"))
        );
    }

    #[test]
    fn script_preserves_statement_order() {
        let options = options();
        let script = parse_script(
            "CREATE TABLE t (a INT64); INSERT INTO t VALUES (1); SELECT a FROM t;",
            &options,
        )
        .unwrap();
        assert_eq!(script.statements.len(), 3);
        assert!(matches!(script.statements[0], Statement::CreateTable(_)));
        assert!(matches!(script.statements[1], Statement::Insert(_)));
        assert!(matches!(script.statements[2], Statement::Query(_)));
    }

    #[test]
    fn empty_script_is_ok() {
        let options = options();
        let script = parse_script("  -- nothing here\n", &options).unwrap();
        assert!(script.statements.is_empty());
    }

    #[test]
    fn cursor_parses_one_statement_at_a_time() {
        let options = options();
        let source = "SELECT 1 AS a; SELECT 2 AS b;";
        let mut cursor = ParseCursor::new(source, &options);

        let mut positions = vec![cursor.byte_position()];
        let first = cursor.parse_next_statement().unwrap();
        positions.push(cursor.byte_position());
        let second = cursor.parse_next_statement().unwrap();
        positions.push(cursor.byte_position());

        assert!(matches!(first, Statement::Query(_)));
        assert!(matches!(second, Statement::Query(_)));
        // The position strictly advances on every successful parse
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert_eq!(cursor.parse_next_statement(), Err(ParseError::EndOfInput));
    }

    #[test]
    fn cursor_distinguishes_end_from_malformed_tail() {
        let options = options();
        let mut cursor = ParseCursor::new("SELECT 1 AS a; FROM", &options);
        cursor.parse_next_statement().unwrap();
        let err = cursor.parse_next_statement().unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn lexical_error_surfaces_through_parser() {
        let err = syntax_err("SELECT 'unterminated");
        assert!(matches!(err, ParseError::Lexical(_)));
    }

    #[test]
    fn parse_error_to_diagnostic() {
        let err = syntax_err("SELECT FROM t;");
        let diag = err.to_diagnostic();
        assert_eq!(diag.kind, sqlvet_core::DiagnosticKind::Syntax);
        assert_eq!(diag.line, 1);
        assert_eq!(diag.column, 8);
    }
}
