//! DROP TABLE

use tracing::debug;

use crate::error::Result;
use crate::processors::Processor;

use super::{Executor, ExecutorContext};

/// The planner object for a `DROP TABLE` statement: an optional database
/// qualifier and the table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTablePlan {
    pub qualifier: Option<String>,
    pub table: String,
}

impl DropTablePlan {
    pub fn new(qualifier: Option<String>, table: impl Into<String>) -> Self {
        Self {
            qualifier,
            table: table.into(),
        }
    }
}

/// Drops a table from the qualified database, falling back to the
/// session's current database. Produces no pipeline.
pub struct DropTableExecutor<'a> {
    ctx: &'a mut ExecutorContext,
    plan: DropTablePlan,
}

impl<'a> DropTableExecutor<'a> {
    pub fn new(ctx: &'a mut ExecutorContext, plan: DropTablePlan) -> Self {
        Self { ctx, plan }
    }
}

impl Executor for DropTableExecutor<'_> {
    fn name(&self) -> &str {
        "DropTableExecutor"
    }

    fn execute(&mut self) -> Result<Option<Box<dyn Processor>>> {
        debug!(executor = self.name(), plan = ?self.plan, "executing");
        let schema = self
            .plan
            .qualifier
            .clone()
            .unwrap_or_else(|| self.ctx.current_database().to_string());
        let database = self.ctx.catalog_mut().database_mut(&schema)?;
        database.drop_table(&self.plan.table)?;
        debug!(executor = self.name(), "returning no pipeline");
        Ok(None)
    }
}
