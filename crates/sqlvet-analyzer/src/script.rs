//! Script-level analysis
//!
//! [`ScriptAnalyzer`] is a lazy iterator over the statements of a script:
//! nothing is parsed or resolved until the caller pulls, and the catalog
//! effects of DDL become visible to the statements after it. The iterator is
//! fused on error: the first failed statement ends the script, because later
//! statements may depend on catalog state the failed one never produced.
//!
//! The caller's catalog is never mutated; all DDL lands in a private clone.

use sqlvet_catalog::Catalog;
use sqlvet_core::{Diagnostic, LanguageOptions};
use sqlvet_parser::ast::{Script, Statement};
use sqlvet_parser::{ParseCursor, ParseError};

use crate::ir::ResolvedStatement;
use crate::resolver::Analyzer;

/// Where the script's statements come from
enum Statements<'a> {
    /// Parsed on demand from source text
    Cursor(ParseCursor<'a>),
    /// Already parsed
    Parsed(std::vec::IntoIter<Statement>),
}

/// Lazy statement-by-statement analyzer for a SQL script
pub struct ScriptAnalyzer<'a> {
    statements: Statements<'a>,
    catalog: Catalog,
    done: bool,
}

impl<'a> ScriptAnalyzer<'a> {
    /// Start analyzing `source` against a private copy of `catalog`
    pub fn new(source: &'a str, options: &'a LanguageOptions, catalog: &Catalog) -> Self {
        Self {
            statements: Statements::Cursor(ParseCursor::new(source, options)),
            catalog: catalog.clone(),
            done: false,
        }
    }

    /// Analyze an already-parsed script
    pub fn from_script(script: Script, catalog: &Catalog) -> Self {
        Self {
            statements: Statements::Parsed(script.statements.into_iter()),
            catalog: catalog.clone(),
            done: false,
        }
    }

    /// The catalog as of the statements analyzed so far, including any
    /// tables the script created
    pub fn current_catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn pull(&mut self) -> Option<Result<ResolvedStatement, Diagnostic>> {
        let statement = match &mut self.statements {
            Statements::Cursor(cursor) => match cursor.parse_next_statement() {
                Ok(statement) => statement,
                Err(ParseError::EndOfInput) => {
                    self.done = true;
                    return None;
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.to_diagnostic()));
                }
            },
            Statements::Parsed(statements) => match statements.next() {
                Some(statement) => statement,
                None => {
                    self.done = true;
                    return None;
                }
            },
        };

        let resolved = match Analyzer::new(&self.catalog).analyze_statement(&statement) {
            Ok(resolved) => resolved,
            Err(err) => {
                self.done = true;
                return Some(Err(err.to_diagnostic()));
            }
        };

        // DDL effects become visible to the rest of the script
        if let ResolvedStatement::CreateTable(create) = &resolved {
            tracing::debug!(table = %create.table.name, temp = create.temp, "script created table");
            self.catalog.put_table(create.table.clone());
        }

        Some(Ok(resolved))
    }
}

impl Iterator for ScriptAnalyzer<'_> {
    type Item = Result<ResolvedStatement, Diagnostic>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.pull()
    }
}

/// Analyze a single-statement source in one call
pub fn analyze_sql(
    source: &str,
    options: &LanguageOptions,
    catalog: &Catalog,
) -> Result<ResolvedStatement, Diagnostic> {
    let statement =
        sqlvet_parser::parse_statement(source, options).map_err(|e| e.to_diagnostic())?;
    Analyzer::new(catalog)
        .analyze_statement(&statement)
        .map_err(|e| e.to_diagnostic())
}
