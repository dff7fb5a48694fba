//! Processor pipeline runtime
//!
//! Stages are connected by typed ports into a DAG; each stage runs its own
//! event loop on an independent tokio task, with pause/resume, shared
//! cancellation, and per-stage metrics. Bounded port channels are the
//! back-pressure mechanism.

mod counter;
mod message;
mod port;
mod processor;
mod stages;

pub use counter::{Metric, StageCounter};
pub use message::{ControlSignal, Message};
pub use port::{InPort, OutPort};
pub use processor::{BaseProcessor, Processor, StageHandle, DEFAULT_PORT_CAPACITY};
pub use stages::{SinkProcessor, SourceProcessor, TransformProcessor};

/// Starts a stage's loop on its own task.
pub fn spawn<P: Processor + 'static>(mut processor: P) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move { processor.execute().await })
}
