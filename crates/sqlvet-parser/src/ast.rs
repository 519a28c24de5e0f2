//! Untyped syntax tree
//!
//! Closed enums per tree layer so analysis rules and visitors can match
//! exhaustively. Every node carries its source span; children are owned
//! exclusively and nodes never point back at their parents.

use sqlvet_core::Span;

/// A parsed multi-statement script; statement order is significant
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// One SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A query, possibly a UNION chain
    Query(QueryExpr),

    /// INSERT INTO
    Insert(InsertStatement),

    /// CREATE [TEMP] TABLE
    CreateTable(CreateTableStatement),
}

impl Statement {
    /// Source span of the whole statement
    pub fn span(&self) -> Span {
        match self {
            Statement::Query(q) => q.span(),
            Statement::Insert(i) => i.span,
            Statement::CreateTable(c) => c.span,
        }
    }
}

/// A query expression: a single SELECT block or a UNION of two of them
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    Select(Box<SelectStatement>),
    Union {
        left: Box<QueryExpr>,
        right: Box<QueryExpr>,
        /// UNION ALL when true, UNION DISTINCT otherwise
        all: bool,
        span: Span,
    },
}

impl QueryExpr {
    pub fn span(&self) -> Span {
        match self {
            QueryExpr::Select(s) => s.span,
            QueryExpr::Union { span, .. } => *span,
        }
    }
}

/// A single SELECT block with its clauses
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub items: Vec<SelectItem>,
    pub from: Option<FromClause>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Expr>,
    pub span: Span,
}

/// One entry in the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*`
    Wildcard { span: Span },

    /// `qualifier.*`
    QualifiedWildcard { qualifier: ObjectName, span: Span },

    /// An expression with an optional alias
    Expr { expr: Expr, alias: Option<Ident> },
}

impl SelectItem {
    pub fn span(&self) -> Span {
        match self {
            SelectItem::Wildcard { span } | SelectItem::QualifiedWildcard { span, .. } => *span,
            SelectItem::Expr { expr, alias } => match alias {
                Some(a) => expr.span().merge(a.span),
                None => expr.span(),
            },
        }
    }
}

/// FROM clause: a base table followed by zero or more joins
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub base: TableRef,
    pub joins: Vec<Join>,
    pub span: Span,
}

/// A table reference with an optional alias
#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: ObjectName,
    pub alias: Option<Ident>,
}

impl TableRef {
    pub fn span(&self) -> Span {
        match &self.alias {
            Some(a) => self.name.span.merge(a.span),
            None => self.name.span,
        }
    }
}

/// One JOIN attached to a FROM clause
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub constraint: JoinConstraint,
    pub span: Span,
}

/// The join flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// ON / USING / unconstrained (CROSS)
#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<Ident>),
    None,
}

/// ORDER BY entry
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub descending: bool,
}

/// INSERT INTO target [(columns)] VALUES ... | SELECT ...
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: ObjectName,
    /// Explicit target columns; empty means "all columns in order"
    pub columns: Vec<Ident>,
    pub source: InsertSource,
    pub span: Span,
}

/// Where inserted rows come from
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// VALUES (...), (...)
    Values(Vec<Vec<Expr>>),

    /// INSERT INTO t SELECT ...
    Query(QueryExpr),
}

/// CREATE [TEMP] TABLE
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: ObjectName,
    pub temp: bool,
    pub definition: CreateTableDefinition,
    pub span: Span,
}

/// Explicit column list or AS (query)
#[derive(Debug, Clone, PartialEq)]
pub enum CreateTableDefinition {
    Columns(Vec<ColumnDef>),
    Query(QueryExpr),
}

/// One column declaration in DDL; the type name stays raw here and is
/// resolved during analysis
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Ident,
    pub type_name: Ident,
}

/// An identifier as written, with quoting preserved
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub value: String,
    pub quoted: bool,
    pub span: Span,
}

impl Ident {
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            quoted: false,
            span,
        }
    }

    pub fn quoted(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            quoted: true,
            span,
        }
    }
}

/// A possibly-dotted name (`t`, `dataset.table`, `p.dataset.table`)
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectName {
    pub parts: Vec<Ident>,
    pub span: Span,
}

impl ObjectName {
    pub fn new(parts: Vec<Ident>, span: Span) -> Self {
        Self { parts, span }
    }

    /// The dotted text of the name as written
    pub fn to_dotted(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.value.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// The final component (column name for `t.c`, table name for `d.t`)
    pub fn last(&self) -> &Ident {
        self.parts.last().expect("ObjectName has at least one part")
    }

    /// Whether the name has a qualifier prefix
    pub fn is_qualified(&self) -> bool {
        self.parts.len() > 1
    }
}

/// An expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),

    /// A possibly-qualified column reference
    Column(ObjectName),

    /// A function call; `COUNT(*)` uses `FunctionArgs::Star`
    Function {
        name: Ident,
        args: FunctionArgs,
        span: Span,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(lit) => lit.span(),
            Expr::Column(name) => name.span,
            Expr::Function { span, .. } | Expr::Unary { span, .. } | Expr::Binary { span, .. } => {
                *span
            }
        }
    }

    /// Whether the expression tree contains only literals.
    /// Constant expressions are exempt from GROUP BY listing.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Literal(_) => true,
            Expr::Column(_) | Expr::Function { .. } => false,
            Expr::Unary { operand, .. } => operand.is_constant(),
            Expr::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
        }
    }
}

/// Function call arguments
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArgs {
    /// `COUNT(*)`
    Star(Span),

    /// Ordinary argument list, possibly empty
    Args(Vec<Expr>),
}

/// A literal value with its span
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64, Span),
    Float(f64, Span),
    String(String, Span),
    Bool(bool, Span),
    Null(Span),
}

impl Literal {
    pub fn span(&self) -> Span {
        match self {
            Literal::Integer(_, span)
            | Literal::Float(_, span)
            | Literal::String(_, span)
            | Literal::Bool(_, span)
            | Literal::Null(span) => *span,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// Operator text as printed
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => "||",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }

    /// Binding strength; higher binds tighter. Drives both parsing and
    /// minimal parenthesization when printing.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Concat => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
        }
    }
}
