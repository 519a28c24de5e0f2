//! Structured diagnostics for syntax and semantic failures
//!
//! The `Diagnostic` shape is tooling-facing and stable: IDEs and CI linters
//! parse the serialized form, so field names must not change.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Whether a failure was caught by the parser or by the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// The text is not well-formed SQL
    Syntax,

    /// The text is well-formed but invalid against the catalog
    Semantic,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Semantic => write!(f, "semantic"),
        }
    }
}

/// A reported validation failure with its source location
///
/// Diagnostics are self-contained: they carry everything needed to point a
/// user at the offending text without referencing internal error types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Syntax or semantic
    pub kind: DiagnosticKind,

    /// Human-readable description
    pub message: String,

    /// Line of the offending text (1-indexed)
    pub line: u32,

    /// Column of the offending text (1-indexed)
    pub column: u32,

    /// Underlying failure, if this diagnostic wraps one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<Diagnostic>>,
}

impl Diagnostic {
    /// Create a syntax diagnostic
    pub fn syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind: DiagnosticKind::Syntax,
            message: message.into(),
            line,
            column,
            cause: None,
        }
    }

    /// Create a semantic diagnostic
    pub fn semantic(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind: DiagnosticKind::Semantic,
            message: message.into(),
            line,
            column,
            cause: None,
        }
    }

    /// Create a semantic diagnostic located at a span
    pub fn semantic_at(message: impl Into<String>, span: Span) -> Self {
        Self::semantic(message, span.line, span.column)
    }

    /// Attach an underlying cause
    pub fn with_cause(mut self, cause: Diagnostic) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} error at {}:{}: {}",
            self.kind, self.line, self.column, self.message
        )
    }
}

impl std::error::Error for Diagnostic {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| c.as_ref() as _)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let diag = Diagnostic::syntax("unexpected token FROM", 1, 8);
        assert_eq!(diag.to_string(), "syntax error at 1:8: unexpected token FROM");
    }

    #[test]
    fn serialization_is_stable() {
        let diag = Diagnostic::semantic("table not found: dataset.table", 2, 15);
        let json = serde_json::to_value(&diag).unwrap();

        assert_eq!(json["kind"], "semantic");
        assert_eq!(json["message"], "table not found: dataset.table");
        assert_eq!(json["line"], 2);
        assert_eq!(json["column"], 15);
        // Absent cause must not appear in the payload
        assert!(json.get("cause").is_none());
    }

    #[test]
    fn cause_chain_round_trips() {
        let inner = Diagnostic::syntax("unterminated string literal", 3, 4);
        let outer = Diagnostic::semantic("statement 2 failed", 3, 1).with_cause(inner.clone());

        let json = serde_json::to_string(&outer).unwrap();
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cause.as_deref(), Some(&inner));
    }
}
