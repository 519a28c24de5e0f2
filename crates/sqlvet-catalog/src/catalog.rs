//! In-memory catalog of tables, functions, and procedures
//!
//! Names are matched case-insensitively but stored as registered, so error
//! messages echo the user's spelling. Table names are dotted paths
//! (`dataset.table`); lookup uses the full path as written in the query.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sqlvet_core::SqlType;

/// One column of a table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: SqlType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

/// A table schema registered under a dotted name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    /// Full dotted name as registered (`dataset.table`)
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Case-insensitive column lookup
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// One callable shape of a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Expected argument types, in order
    pub params: Vec<SqlType>,
    pub result: SqlType,
}

impl FunctionSignature {
    pub fn new(params: Vec<SqlType>, result: SqlType) -> Self {
        Self { params, result }
    }
}

/// A function with one or more signatures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub signatures: Vec<FunctionSignature>,
    /// Aggregates interact with GROUP BY validation and accept `(*)` when
    /// they are COUNT
    pub aggregate: bool,
}

impl FunctionDef {
    pub fn scalar(name: impl Into<String>, signatures: Vec<FunctionSignature>) -> Self {
        Self {
            name: name.into(),
            signatures,
            aggregate: false,
        }
    }

    pub fn aggregate(name: impl Into<String>, signatures: Vec<FunctionSignature>) -> Self {
        Self {
            name: name.into(),
            signatures,
            aggregate: true,
        }
    }
}

/// A stored procedure; tracked by name and arity only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDef {
    pub name: String,
    pub params: Vec<SqlType>,
}

/// Errors mutating or querying a catalog
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("{kind} {name} is already defined")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} {name} is not defined")]
    NotFound { kind: &'static str, name: String },
}

/// The mutable catalog
///
/// Cloning is how script analysis isolates its DDL effects: the script works
/// on a clone and the caller's catalog never changes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Keyed by lowercased dotted name
    tables: BTreeMap<String, TableDef>,
    functions: BTreeMap<String, FunctionDef>,
    procedures: BTreeMap<String, ProcedureDef>,
    /// Namespace prefix tried when an exact table lookup misses
    default_scope: Option<String>,
}

impl Catalog {
    /// An empty catalog with no builtins
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog preloaded with the builtin function library
    pub fn with_builtins() -> Self {
        use SqlType::*;

        let mut catalog = Self::new();
        let add = |catalog: &mut Self, def: FunctionDef| {
            catalog
                .add_function(def)
                .expect("builtin names are distinct");
        };

        // Aggregates. COUNT(*) is handled by the analyzer; these signatures
        // cover the expression-argument forms.
        add(
            &mut catalog,
            FunctionDef::aggregate(
                "COUNT",
                vec![
                    FunctionSignature::new(vec![Int64], Int64),
                    FunctionSignature::new(vec![Float64], Int64),
                    FunctionSignature::new(vec![Numeric], Int64),
                    FunctionSignature::new(vec![String], Int64),
                    FunctionSignature::new(vec![Bool], Int64),
                    FunctionSignature::new(vec![Date], Int64),
                    FunctionSignature::new(vec![Timestamp], Int64),
                ],
            ),
        );
        for name in ["SUM", "AVG", "MIN", "MAX"] {
            let result_of = |param: SqlType| match name {
                "AVG" => Float64,
                "SUM" if param == Int64 => Int64,
                _ => param,
            };
            let mut signatures = vec![
                FunctionSignature::new(vec![Int64], result_of(Int64)),
                FunctionSignature::new(vec![Float64], result_of(Float64)),
                FunctionSignature::new(vec![Numeric], result_of(Numeric)),
            ];
            if matches!(name, "MIN" | "MAX") {
                signatures.push(FunctionSignature::new(vec![String], String));
                signatures.push(FunctionSignature::new(vec![Date], Date));
                signatures.push(FunctionSignature::new(vec![Timestamp], Timestamp));
            }
            add(&mut catalog, FunctionDef::aggregate(name, signatures));
        }

        // Scalar string functions
        add(
            &mut catalog,
            FunctionDef::scalar(
                "CONCAT",
                vec![
                    FunctionSignature::new(vec![String, String], String),
                    FunctionSignature::new(vec![String, String, String], String),
                    FunctionSignature::new(vec![String, String, String, String], String),
                ],
            ),
        );
        for name in ["UPPER", "LOWER"] {
            add(
                &mut catalog,
                FunctionDef::scalar(name, vec![FunctionSignature::new(vec![String], String)]),
            );
        }
        add(
            &mut catalog,
            FunctionDef::scalar("LENGTH", vec![FunctionSignature::new(vec![String], Int64)]),
        );

        catalog
    }

    /// Register a table under its dotted name
    pub fn add_table(&mut self, table: TableDef) -> Result<(), CatalogError> {
        let key = table.name.to_lowercase();
        if self.tables.contains_key(&key) {
            return Err(CatalogError::DuplicateName {
                kind: "table",
                name: table.name,
            });
        }
        tracing::debug!(table = %table.name, columns = table.columns.len(), "registered table");
        self.tables.insert(key, table);
        Ok(())
    }

    /// Register or replace a table, for DDL effects inside a script
    pub fn put_table(&mut self, table: TableDef) {
        self.tables.insert(table.name.to_lowercase(), table);
    }

    /// Remove a table; errors when it does not exist
    pub fn remove_table(&mut self, name: &str) -> Result<TableDef, CatalogError> {
        self.tables
            .remove(&name.to_lowercase())
            .ok_or_else(|| CatalogError::NotFound {
                kind: "table",
                name: name.to_string(),
            })
    }

    /// Set the namespace consulted when an unqualified table lookup misses.
    /// `SELECT * FROM users` with default scope `dataset` also tries
    /// `dataset.users`.
    pub fn set_default_scope(&mut self, scope: impl Into<String>) {
        self.default_scope = Some(scope.into());
    }

    /// Case-insensitive table lookup by dotted name. Exact match first, then
    /// the default scope as a prefix fallback.
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        let key = name.to_lowercase();
        if let Some(table) = self.tables.get(&key) {
            return Some(table);
        }
        let scope = self.default_scope.as_ref()?;
        self.tables.get(&format!("{}.{}", scope.to_lowercase(), key))
    }

    /// Table lookup that reports the failure
    pub fn lookup_table(&self, name: &str) -> Result<&TableDef, CatalogError> {
        self.table(name).ok_or_else(|| CatalogError::NotFound {
            kind: "table",
            name: name.to_string(),
        })
    }

    pub fn add_function(&mut self, function: FunctionDef) -> Result<(), CatalogError> {
        let key = function.name.to_lowercase();
        if self.functions.contains_key(&key) {
            return Err(CatalogError::DuplicateName {
                kind: "function",
                name: function.name,
            });
        }
        self.functions.insert(key, function);
        Ok(())
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_lowercase())
    }

    /// Function lookup that reports the failure
    pub fn lookup_function(&self, name: &str) -> Result<&FunctionDef, CatalogError> {
        self.function(name).ok_or_else(|| CatalogError::NotFound {
            kind: "function",
            name: name.to_string(),
        })
    }

    pub fn add_procedure(&mut self, procedure: ProcedureDef) -> Result<(), CatalogError> {
        let key = procedure.name.to_lowercase();
        if self.procedures.contains_key(&key) {
            return Err(CatalogError::DuplicateName {
                kind: "procedure",
                name: procedure.name,
            });
        }
        self.procedures.insert(key, procedure);
        Ok(())
    }

    pub fn procedure(&self, name: &str) -> Option<&ProcedureDef> {
        self.procedures.get(&name.to_lowercase())
    }

    /// Procedure lookup that reports the failure
    pub fn lookup_procedure(&self, name: &str) -> Result<&ProcedureDef, CatalogError> {
        self.procedure(name).ok_or_else(|| CatalogError::NotFound {
            kind: "procedure",
            name: name.to_string(),
        })
    }

    /// Registered tables in name order
    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    /// Freeze the current contents into a shareable snapshot
    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            inner: Arc::new(self.clone()),
        }
    }
}

/// An immutable, cheaply clonable view of a catalog at a point in time
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    inner: Arc<Catalog>,
}

impl CatalogSnapshot {
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.inner.table(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.inner.function(name)
    }

    pub fn procedure(&self, name: &str) -> Option<&ProcedureDef> {
        self.inner.procedure(name)
    }

    /// Borrow the frozen catalog, for APIs that take `&Catalog`
    pub fn as_catalog(&self) -> &Catalog {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn users_table() -> TableDef {
        TableDef::new(
            "dataset.users",
            vec![
                ColumnDef::new("id", SqlType::Int64),
                ColumnDef::new("name", SqlType::String),
            ],
        )
    }

    #[test]
    fn lookup_is_case_insensitive_and_case_preserving() {
        let mut catalog = Catalog::new();
        catalog.add_table(users_table()).unwrap();

        let found = catalog.table("DATASET.Users").unwrap();
        assert_eq!(found.name, "dataset.users");
        assert_eq!(found.column("ID").unwrap().sql_type, SqlType::Int64);
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let mut catalog = Catalog::new();
        catalog.add_table(users_table()).unwrap();

        let mut dup = users_table();
        dup.name = "Dataset.USERS".to_string();
        let err = catalog.add_table(dup).unwrap_err();
        assert_eq!(
            err,
            CatalogError::DuplicateName {
                kind: "table",
                name: "Dataset.USERS".to_string()
            }
        );
    }

    #[test]
    fn put_table_replaces_without_error() {
        let mut catalog = Catalog::new();
        catalog.add_table(users_table()).unwrap();

        let replacement = TableDef::new(
            "dataset.users",
            vec![ColumnDef::new("id", SqlType::Int64)],
        );
        catalog.put_table(replacement);
        assert_eq!(catalog.table("dataset.users").unwrap().columns.len(), 1);
    }

    #[test]
    fn default_scope_is_a_fallback_not_an_override() {
        let mut catalog = Catalog::new();
        catalog.add_table(users_table()).unwrap();
        catalog
            .add_table(TableDef::new("users", vec![]))
            .unwrap();
        catalog.set_default_scope("dataset");

        // Exact match wins over the scoped fallback
        assert_eq!(catalog.table("users").unwrap().name, "users");
        assert_eq!(
            catalog.lookup_table("dataset.users").unwrap().name,
            "dataset.users"
        );

        catalog.remove_table("users").unwrap();
        // Now the fallback kicks in
        assert_eq!(catalog.table("users").unwrap().name, "dataset.users");
    }

    #[test]
    fn lookup_reports_not_found_per_namespace() {
        let catalog = Catalog::with_builtins();
        assert!(matches!(
            catalog.lookup_table("nope").unwrap_err(),
            CatalogError::NotFound { kind: "table", .. }
        ));
        assert!(matches!(
            catalog.lookup_function("nope").unwrap_err(),
            CatalogError::NotFound { kind: "function", .. }
        ));
        assert!(matches!(
            catalog.lookup_procedure("nope").unwrap_err(),
            CatalogError::NotFound { kind: "procedure", .. }
        ));
        // The namespaces are independent: COUNT is a function, not a table
        assert!(catalog.lookup_table("count").is_err());
        assert!(catalog.lookup_function("count").is_ok());
    }

    #[test]
    fn remove_missing_table_is_not_found() {
        let mut catalog = Catalog::new();
        let err = catalog.remove_table("nope").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { kind: "table", .. }));
    }

    #[test]
    fn builtins_include_aggregates_and_scalars() {
        let catalog = Catalog::with_builtins();

        let count = catalog.function("count").unwrap();
        assert!(count.aggregate);

        let concat = catalog.function("CONCAT").unwrap();
        assert!(!concat.aggregate);
        assert!(concat
            .signatures
            .iter()
            .all(|s| s.result == SqlType::String));

        assert!(catalog.function("nosuchfn").is_none());
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let mut catalog = Catalog::new();
        catalog.add_table(users_table()).unwrap();
        let snapshot = catalog.snapshot();

        catalog
            .add_table(TableDef::new("dataset.extra", vec![]))
            .unwrap();

        assert!(snapshot.table("dataset.users").is_some());
        assert!(snapshot.table("dataset.extra").is_none());
        assert!(catalog.table("dataset.extra").is_some());
    }

    #[test]
    fn clone_isolates_ddl_effects() {
        let mut base = Catalog::new();
        base.add_table(users_table()).unwrap();

        let mut working = base.clone();
        working.put_table(TableDef::new("tmp", vec![]));

        assert!(base.table("tmp").is_none());
        assert!(working.table("tmp").is_some());
    }
}
