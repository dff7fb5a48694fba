//! Vectorized SQL execution core
//!
//! A single-node, in-memory columnar execution engine: typed SQL values
//! with MySQL-text-compatible encodings, columnar [`DataBlock`]s with
//! virtual reordering, and a processor pipeline with back-pressure,
//! pause/resume, and cancellation.

pub mod catalog;
pub mod datablocks;
pub mod error;
pub mod executors;
pub mod processors;
pub mod types;

// Re-export main types
pub use catalog::{Catalog, Database};
pub use datablocks::{BatchWriter, Column, ColumnValue, DataBlock, DataBlockIterator};
pub use error::{EngineError, Result};
pub use executors::{DropTableExecutor, DropTablePlan, Executor, ExecutorContext};
pub use processors::{
    BaseProcessor, InPort, Message, Metric, OutPort, Processor, SinkProcessor, SourceProcessor,
    StageCounter, StageHandle, TransformProcessor,
};
pub use types::{DataKind, Native, Value, NULL};
