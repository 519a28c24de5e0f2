//! Semantic analysis: name resolution, type checking, and script driving
//!
//! The analyzer turns parsed statements into a typed resolved tree, checking
//! every name against a [`sqlvet_catalog::Catalog`] and every expression
//! against the type system. [`ScriptAnalyzer`] runs whole scripts lazily,
//! threading DDL effects from one statement into the next.

pub mod ir;
pub mod resolver;
pub mod script;

pub use ir::{
    IrVisitor, LiteralValue, OutputColumn, ResolvedArgs, ResolvedCreateTable, ResolvedExpr,
    ResolvedInsert, ResolvedInsertSource, ResolvedJoin, ResolvedOutput, ResolvedQuery,
    ResolvedSelect, ResolvedStatement, ResolvedTableScan,
};
pub use resolver::{AnalysisError, Analyzer};
pub use script::{analyze_sql, ScriptAnalyzer};
