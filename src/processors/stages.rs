//! Stock stages built on [`BaseProcessor`]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::datablocks::DataBlock;
use crate::error::Result;

use super::message::Message;
use super::processor::{BaseProcessor, Processor};

/// Emits a fixed sequence of blocks, then closes its out-port.
///
/// Terminates early if the context is cancelled or every downstream has
/// gone away; sources never receive, so their in-port stays unused.
pub struct SourceProcessor {
    base: BaseProcessor,
    blocks: Vec<DataBlock>,
}

impl SourceProcessor {
    pub fn new(name: impl Into<String>, blocks: Vec<DataBlock>) -> Self {
        Self {
            base: BaseProcessor::new(name),
            blocks,
        }
    }
}

#[async_trait]
impl Processor for SourceProcessor {
    fn base(&self) -> &BaseProcessor {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseProcessor {
        &mut self.base
    }

    async fn execute(&mut self) {
        let blocks = std::mem::take(&mut self.blocks);
        for block in blocks {
            tokio::select! {
                _ = self.base.token().cancelled() => break,
                sent = self.base.out_port().send(Message::Block(block)) => {
                    if sent.is_err() {
                        break;
                    }
                    self.base.counter().add_messages(1);
                }
            }
        }
        self.base.out_port_mut().close();
    }
}

/// Applies a per-block function, forwarding everything else untouched.
pub struct TransformProcessor {
    base: BaseProcessor,
}

impl TransformProcessor {
    pub fn new(
        name: impl Into<String>,
        mut f: impl FnMut(DataBlock) -> Result<DataBlock> + Send + 'static,
    ) -> Self {
        let mut base = BaseProcessor::new(name);
        base.on_next(move |msg| match msg {
            Message::Block(block) => Ok(vec![Message::Block(f(block)?)]),
            other => Ok(vec![other]),
        });
        Self { base }
    }
}

#[async_trait]
impl Processor for TransformProcessor {
    fn base(&self) -> &BaseProcessor {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseProcessor {
        &mut self.base
    }

    async fn execute(&mut self) {
        self.base.run().await;
    }
}

/// Terminal stage: records every received message for inspection.
pub struct SinkProcessor {
    base: BaseProcessor,
    received: Arc<Mutex<Vec<Message>>>,
}

impl SinkProcessor {
    pub fn new(name: impl Into<String>) -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));
        let mut base = BaseProcessor::new(name);
        let store = Arc::clone(&received);
        base.on_next(move |msg| {
            store.lock().unwrap().push(msg);
            Ok(vec![])
        });
        Self { base, received }
    }

    /// Shared view of the received messages; clone before spawning.
    pub fn received(&self) -> Arc<Mutex<Vec<Message>>> {
        Arc::clone(&self.received)
    }
}

#[async_trait]
impl Processor for SinkProcessor {
    fn base(&self) -> &BaseProcessor {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseProcessor {
        &mut self.base
    }

    async fn execute(&mut self) {
        self.base.run().await;
    }
}
