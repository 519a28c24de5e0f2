//! Language options (dialect configuration)
//!
//! The lexer and parser are pure functions of (text, options); everything
//! dialect-specific is enumerated here so two runs with the same options are
//! always deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Base SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// GoogleSQL as used by BigQuery
    #[default]
    BigQuery,

    /// Generic ANSI SQL
    Ansi,
}

/// Which literal forms the lexer accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteralForms {
    /// `0xFF` style integer literals
    pub hex_integers: bool,

    /// Scientific notation floats (`1e10`)
    pub float_exponents: bool,
}

impl Default for LiteralForms {
    fn default() -> Self {
        Self {
            hex_integers: true,
            float_exponents: true,
        }
    }
}

/// Which comment styles the lexer skips
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentStyles {
    /// `-- ...` to end of line
    pub dash_line: bool,

    /// `# ...` to end of line (BigQuery)
    pub hash_line: bool,

    /// `/* ... */`, non-nesting
    pub block: bool,
}

impl Default for CommentStyles {
    fn default() -> Self {
        Self {
            dash_line: true,
            hash_line: true,
            block: true,
        }
    }
}

/// Full dialect configuration handed to the lexer, parser, and analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageOptions {
    /// Base dialect
    pub dialect: Dialect,

    /// Extra reserved words beyond the grammar's keyword set, lowercase.
    /// A reserved word cannot be used as an identifier or alias.
    pub reserved_keywords: BTreeSet<String>,

    /// Literal grammar switches
    pub literals: LiteralForms,

    /// Comment grammar switches
    pub comments: CommentStyles,

    /// Whether DDL statements (CREATE TABLE) are accepted
    pub allow_ddl: bool,

    /// Whether INSERT statements are accepted
    pub allow_insert: bool,
}

impl Default for LanguageOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::BigQuery,
            reserved_keywords: BTreeSet::new(),
            literals: LiteralForms::default(),
            comments: CommentStyles::default(),
            allow_ddl: true,
            allow_insert: true,
        }
    }
}

impl LanguageOptions {
    /// The BigQuery feature set (the default)
    pub fn bigquery() -> Self {
        Self::default()
    }

    /// A conservative ANSI configuration: no hash comments, no hex literals
    pub fn ansi() -> Self {
        Self {
            dialect: Dialect::Ansi,
            literals: LiteralForms {
                hex_integers: false,
                float_exponents: true,
            },
            comments: CommentStyles {
                dash_line: true,
                hash_line: false,
                block: true,
            },
            ..Self::default()
        }
    }

    /// Mark an extra word as reserved
    pub fn reserve_keyword(mut self, word: impl Into<String>) -> Self {
        self.reserved_keywords.insert(word.into().to_lowercase());
        self
    }

    /// Whether `word` was configured as an extra reserved keyword
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved_keywords.contains(&word.to_lowercase())
    }

    /// Load options from a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, OptionsError> {
        toml::from_str(input).map_err(OptionsError::Parse)
    }
}

/// Errors loading a language-options document
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("invalid options document: {0}")]
    Parse(#[from] toml::de::Error),
}
