//! Token types produced by the lexer

use sqlvet_core::Span;

/// The kind of a lexed token, with literal payloads where applicable
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Integer(i64),
    Float(f64),
    String(String),

    /// Unquoted identifier
    Id(String),

    /// Backtick-quoted identifier; may contain dots (`` `dataset.table` ``)
    QuotedId(String),

    // Keywords
    KwSelect,
    KwFrom,
    KwWhere,
    KwGroup,
    KwBy,
    KwHaving,
    KwOrder,
    KwAsc,
    KwDesc,
    KwLimit,
    KwAs,
    KwJoin,
    KwInner,
    KwLeft,
    KwRight,
    KwFull,
    KwOuter,
    KwCross,
    KwOn,
    KwUsing,
    KwUnion,
    KwAll,
    KwDistinct,
    KwAnd,
    KwOr,
    KwNot,
    KwNull,
    KwTrue,
    KwFalse,
    KwInsert,
    KwInto,
    KwValues,
    KwCreate,
    KwTable,
    KwTemp,
    KwTemporary,

    // Punctuation and operators
    Comma,
    Dot,
    Semicolon,
    LeftParen,
    RightParen,
    Star,
    Plus,
    Minus,
    Slash,
    Percent,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    /// End of input marker
    Eof,
}

impl TokenKind {
    /// Resolve a bare word to its keyword kind, if it is one.
    /// Keyword matching is case-insensitive.
    pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
        let kind = match word.to_ascii_uppercase().as_str() {
            "SELECT" => TokenKind::KwSelect,
            "FROM" => TokenKind::KwFrom,
            "WHERE" => TokenKind::KwWhere,
            "GROUP" => TokenKind::KwGroup,
            "BY" => TokenKind::KwBy,
            "HAVING" => TokenKind::KwHaving,
            "ORDER" => TokenKind::KwOrder,
            "ASC" => TokenKind::KwAsc,
            "DESC" => TokenKind::KwDesc,
            "LIMIT" => TokenKind::KwLimit,
            "AS" => TokenKind::KwAs,
            "JOIN" => TokenKind::KwJoin,
            "INNER" => TokenKind::KwInner,
            "LEFT" => TokenKind::KwLeft,
            "RIGHT" => TokenKind::KwRight,
            "FULL" => TokenKind::KwFull,
            "OUTER" => TokenKind::KwOuter,
            "CROSS" => TokenKind::KwCross,
            "ON" => TokenKind::KwOn,
            "USING" => TokenKind::KwUsing,
            "UNION" => TokenKind::KwUnion,
            "ALL" => TokenKind::KwAll,
            "DISTINCT" => TokenKind::KwDistinct,
            "AND" => TokenKind::KwAnd,
            "OR" => TokenKind::KwOr,
            "NOT" => TokenKind::KwNot,
            "NULL" => TokenKind::KwNull,
            "TRUE" => TokenKind::KwTrue,
            "FALSE" => TokenKind::KwFalse,
            "INSERT" => TokenKind::KwInsert,
            "INTO" => TokenKind::KwInto,
            "VALUES" => TokenKind::KwValues,
            "CREATE" => TokenKind::KwCreate,
            "TABLE" => TokenKind::KwTable,
            "TEMP" => TokenKind::KwTemp,
            "TEMPORARY" => TokenKind::KwTemporary,
            _ => return None,
        };
        Some(kind)
    }

    /// Short description used in syntax error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Integer(v) => format!("integer literal {v}"),
            TokenKind::Float(v) => format!("float literal {v}"),
            TokenKind::String(s) => format!("string literal '{s}'"),
            TokenKind::Id(name) => format!("identifier {name}"),
            TokenKind::QuotedId(name) => format!("identifier `{name}`"),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::LeftParen => "'('".to_string(),
            TokenKind::RightParen => "')'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Percent => "'%'".to_string(),
            TokenKind::Concat => "'||'".to_string(),
            TokenKind::Eq => "'='".to_string(),
            TokenKind::Ne => "'!='".to_string(),
            TokenKind::Lt => "'<'".to_string(),
            TokenKind::Le => "'<='".to_string(),
            TokenKind::Gt => "'>'".to_string(),
            TokenKind::Ge => "'>='".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            keyword => format!("keyword {}", keyword.keyword_text().unwrap_or("?")),
        }
    }

    /// The canonical spelling of a keyword kind
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::KwSelect => "SELECT",
            TokenKind::KwFrom => "FROM",
            TokenKind::KwWhere => "WHERE",
            TokenKind::KwGroup => "GROUP",
            TokenKind::KwBy => "BY",
            TokenKind::KwHaving => "HAVING",
            TokenKind::KwOrder => "ORDER",
            TokenKind::KwAsc => "ASC",
            TokenKind::KwDesc => "DESC",
            TokenKind::KwLimit => "LIMIT",
            TokenKind::KwAs => "AS",
            TokenKind::KwJoin => "JOIN",
            TokenKind::KwInner => "INNER",
            TokenKind::KwLeft => "LEFT",
            TokenKind::KwRight => "RIGHT",
            TokenKind::KwFull => "FULL",
            TokenKind::KwOuter => "OUTER",
            TokenKind::KwCross => "CROSS",
            TokenKind::KwOn => "ON",
            TokenKind::KwUsing => "USING",
            TokenKind::KwUnion => "UNION",
            TokenKind::KwAll => "ALL",
            TokenKind::KwDistinct => "DISTINCT",
            TokenKind::KwAnd => "AND",
            TokenKind::KwOr => "OR",
            TokenKind::KwNot => "NOT",
            TokenKind::KwNull => "NULL",
            TokenKind::KwTrue => "TRUE",
            TokenKind::KwFalse => "FALSE",
            TokenKind::KwInsert => "INSERT",
            TokenKind::KwInto => "INTO",
            TokenKind::KwValues => "VALUES",
            TokenKind::KwCreate => "CREATE",
            TokenKind::KwTable => "TABLE",
            TokenKind::KwTemp => "TEMP",
            TokenKind::KwTemporary => "TEMPORARY",
            _ => return None,
        };
        Some(text)
    }
}

/// A single token with its raw text and source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was lexed
    pub kind: TokenKind,

    /// The raw source text of the token
    pub text: String,

    /// Where it was lexed from
    pub span: Span,
}

impl Token {
    /// Create a token
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Whether this is the end-of-input marker
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
