//! In-memory database registry
//!
//! The minimal catalog surface DDL executors collaborate with. No
//! persistence and no per-table schema beyond the name: DDL produces no
//! data rows.

use hashbrown::{HashMap, HashSet};

use crate::error::{EngineError, Result};

/// A database: a set of table names. Identity lives in the [`Catalog`]
/// registry key.
#[derive(Debug, Default, Clone)]
pub struct Database {
    tables: HashSet<String>,
}

impl Database {
    pub fn create_table(&mut self, name: impl Into<String>) {
        self.tables.insert(name.into());
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        if !self.tables.remove(name) {
            return Err(EngineError::UnknownTable(name.to_string()));
        }
        Ok(())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains(name)
    }

    /// Table names in sorted order.
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().cloned().collect();
        names.sort();
        names
    }
}

/// Registry of databases, keyed by name.
#[derive(Debug, Default)]
pub struct Catalog {
    databases: HashMap<String, Database>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_database(&mut self, name: impl Into<String>) -> &mut Database {
        self.databases.entry(name.into()).or_default()
    }

    pub fn database(&self, name: &str) -> Result<&Database> {
        self.databases
            .get(name)
            .ok_or_else(|| EngineError::UnknownDatabase(name.to_string()))
    }

    pub fn database_mut(&mut self, name: &str) -> Result<&mut Database> {
        self.databases
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownDatabase(name.to_string()))
    }

    /// Database names in sorted order.
    pub fn databases(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.keys().cloned().collect();
        names.sort();
        names
    }
}
