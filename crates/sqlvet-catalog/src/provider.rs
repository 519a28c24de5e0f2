//! Async schema providers
//!
//! A provider answers "what tables exist in this namespace" so a catalog can
//! be populated from an external system before analysis starts. Analysis
//! itself is synchronous; all provider calls happen up front.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::catalog::{Catalog, CatalogError, TableDef};

/// Errors fetching schema metadata
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unknown namespace: {0}")]
    UnknownNamespace(String),

    #[error("schema fetch failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Source of table schemas, keyed by namespace (a dataset or schema name)
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// List every table in `namespace`, with full dotted names
    async fn load_tables(&self, namespace: &str) -> Result<Vec<TableDef>, ProviderError>;

    /// Fetch a single table by its full dotted name; `Ok(None)` means the
    /// provider is reachable but has no such table
    async fn resolve_table(&self, name: &str) -> Result<Option<TableDef>, ProviderError>;
}

/// A provider backed by in-memory fixtures
#[derive(Debug, Default)]
pub struct MemoryProvider {
    namespaces: BTreeMap<String, Vec<TableDef>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table under its namespace, derived from the name's prefix
    pub fn with_table(mut self, namespace: impl Into<String>, table: TableDef) -> Self {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .push(table);
        self
    }
}

#[async_trait]
impl SchemaProvider for MemoryProvider {
    async fn load_tables(&self, namespace: &str) -> Result<Vec<TableDef>, ProviderError> {
        self.namespaces
            .get(namespace)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownNamespace(namespace.to_string()))
    }

    async fn resolve_table(&self, name: &str) -> Result<Option<TableDef>, ProviderError> {
        Ok(self
            .namespaces
            .values()
            .flatten()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}

/// Load every table of `namespace` from the provider into the catalog
pub async fn load_namespace(
    catalog: &mut Catalog,
    provider: &dyn SchemaProvider,
    namespace: &str,
) -> Result<usize, ProviderError> {
    let tables = provider.load_tables(namespace).await?;
    let count = tables.len();
    for table in tables {
        catalog.add_table(table)?;
    }
    tracing::debug!(namespace, count, "loaded namespace into catalog");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnDef;
    use sqlvet_core::SqlType;

    fn provider() -> MemoryProvider {
        MemoryProvider::new()
            .with_table(
                "dataset",
                TableDef::new(
                    "dataset.users",
                    vec![ColumnDef::new("id", SqlType::Int64)],
                ),
            )
            .with_table(
                "dataset",
                TableDef::new(
                    "dataset.orders",
                    vec![ColumnDef::new("user_id", SqlType::Int64)],
                ),
            )
    }

    #[tokio::test]
    async fn loads_a_namespace_into_the_catalog() {
        let mut catalog = Catalog::new();
        let loaded = load_namespace(&mut catalog, &provider(), "dataset")
            .await
            .unwrap();

        assert_eq!(loaded, 2);
        assert!(catalog.table("dataset.users").is_some());
        assert!(catalog.table("dataset.orders").is_some());
    }

    #[tokio::test]
    async fn resolve_single_table() {
        let p = provider();
        let found = p.resolve_table("DATASET.USERS").await.unwrap();
        assert_eq!(found.unwrap().name, "dataset.users");
        assert!(p.resolve_table("dataset.nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_namespace_is_an_error() {
        let mut catalog = Catalog::new();
        let err = load_namespace(&mut catalog, &provider(), "other")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownNamespace(_)));
    }

    #[tokio::test]
    async fn duplicate_load_surfaces_the_catalog_error() {
        let mut catalog = Catalog::new();
        let p = provider();
        load_namespace(&mut catalog, &p, "dataset").await.unwrap();
        let err = load_namespace(&mut catalog, &p, "dataset")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Catalog(_)));
    }
}
