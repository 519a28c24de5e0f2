//! Logical SQL type system
//!
//! Types use GoogleSQL-style names (INT64, FLOAT64, ...) since that is the
//! dialect the engine validates. Coercion is deliberately narrow: one step,
//! numeric widening only.

use serde::{Deserialize, Serialize};

/// Logical type of an expression or column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    /// Boolean
    Bool,

    /// 64-bit signed integer
    Int64,

    /// 64-bit floating point
    Float64,

    /// Arbitrary-precision decimal
    Numeric,

    /// Variable-length text
    String,

    /// Calendar date
    Date,

    /// Point in time
    Timestamp,

    /// Type of the bare NULL literal, assignable to anything
    Null,
}

impl SqlType {
    /// Whether a value of `self` may be used where `target` is expected,
    /// either exactly or through one implicit coercion.
    ///
    /// The coercion table: INT64 widens to FLOAT64 or NUMERIC, NUMERIC widens
    /// to FLOAT64, and NULL is assignable to anything. Nothing else coerces
    /// implicitly.
    pub fn coerces_to(self, target: SqlType) -> bool {
        if self == target {
            return true;
        }
        matches!(
            (self, target),
            (SqlType::Null, _)
                | (SqlType::Int64, SqlType::Float64)
                | (SqlType::Int64, SqlType::Numeric)
                | (SqlType::Numeric, SqlType::Float64)
        )
    }

    /// The common type two operands widen to, if any.
    ///
    /// Used for comparison operands and for UNION column reconciliation.
    pub fn common_super_type(self, other: SqlType) -> Option<SqlType> {
        if self == other {
            Some(self)
        } else if self == SqlType::Null {
            Some(other)
        } else if other == SqlType::Null {
            Some(self)
        } else if self.coerces_to(other) {
            Some(other)
        } else if other.coerces_to(self) {
            Some(self)
        } else {
            None
        }
    }

    /// Whether the type participates in arithmetic
    pub fn is_numeric(self) -> bool {
        matches!(self, SqlType::Int64 | SqlType::Float64 | SqlType::Numeric)
    }

    /// Whether values of the type can be compared with `<`/`>`
    pub fn is_orderable(self) -> bool {
        !matches!(self, SqlType::Bool)
    }

    /// Parse a type name as written in DDL (case-insensitive).
    ///
    /// Accepts the GoogleSQL names plus the common aliases the original
    /// examples use (`STRING`, `INT64`, ...).
    pub fn parse(name: &str) -> Option<SqlType> {
        match name.to_ascii_uppercase().as_str() {
            "BOOL" | "BOOLEAN" => Some(SqlType::Bool),
            "INT64" | "INT" | "INTEGER" | "BIGINT" => Some(SqlType::Int64),
            "FLOAT64" | "FLOAT" | "DOUBLE" => Some(SqlType::Float64),
            "NUMERIC" | "DECIMAL" => Some(SqlType::Numeric),
            "STRING" | "TEXT" | "VARCHAR" => Some(SqlType::String),
            "DATE" => Some(SqlType::Date),
            "TIMESTAMP" => Some(SqlType::Timestamp),
            _ => None,
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => write!(f, "BOOL"),
            Self::Int64 => write!(f, "INT64"),
            Self::Float64 => write!(f, "FLOAT64"),
            Self::Numeric => write!(f, "NUMERIC"),
            Self::String => write!(f, "STRING"),
            Self::Date => write!(f, "DATE"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Null => write!(f, "NULL"),
        }
    }
}
