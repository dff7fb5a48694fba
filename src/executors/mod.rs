//! Statement executors
//!
//! The contract an executor must satisfy to integrate with the core:
//! resolve its collaborators from the [`ExecutorContext`], perform the
//! statement's effect, and return the pipeline that produces its rows.
//! DDL statements produce no rows and therefore return no pipeline.

mod drop_table;

pub use drop_table::{DropTableExecutor, DropTablePlan};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::processors::Processor;

/// Session-scoped state handed to every executor.
#[derive(Debug)]
pub struct ExecutorContext {
    catalog: Catalog,
    current_database: String,
}

impl ExecutorContext {
    pub fn new(catalog: Catalog, current_database: impl Into<String>) -> Self {
        Self {
            catalog,
            current_database: current_database.into(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// The session's current database; the default statement qualifier.
    pub fn current_database(&self) -> &str {
        &self.current_database
    }

    pub fn use_database(&mut self, name: impl Into<String>) {
        self.current_database = name.into();
    }
}

/// A statement executor. `execute` returns the pipeline's terminal
/// processor, or `None` when the statement produces no rows.
pub trait Executor {
    fn name(&self) -> &str;

    fn execute(&mut self) -> Result<Option<Box<dyn Processor>>>;
}
