//! sqlvet core
//!
//! Shared domain model for the validation engine: source spans, the stable
//! diagnostic type, the logical SQL type system, and language options.

pub mod diagnostic;
pub mod options;
pub mod span;
pub mod types;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use options::{Dialect, LanguageOptions, OptionsError};
pub use span::Span;
pub use types::SqlType;
