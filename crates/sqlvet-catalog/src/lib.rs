//! Schema catalog: the named tables, functions, and procedures a query may
//! reference
//!
//! The catalog is the single source of truth during analysis. It is built up
//! front (by hand or through an async [`SchemaProvider`]) and then consulted
//! read-only while statements are resolved; script-level DDL mutates a
//! per-script copy, never the original.

pub mod catalog;
pub mod provider;

pub use catalog::{
    Catalog, CatalogError, CatalogSnapshot, ColumnDef, FunctionDef, FunctionSignature,
    ProcedureDef, TableDef,
};
pub use provider::{load_namespace, MemoryProvider, ProviderError, SchemaProvider};
