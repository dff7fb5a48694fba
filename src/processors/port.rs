//! Unidirectional channels between stages

use tokio::sync::mpsc;

use crate::error::{EngineError, Result};

use super::message::Message;

/// Receiving endpoint of a stage.
///
/// Fan-in is the natural shape: every subscribed upstream holds a clone of
/// this port's sender, all feeding one bounded channel. Per-edge FIFO order
/// is preserved; order across edges is arbitrary. The receive stream ends
/// when the last upstream sender has closed.
#[derive(Debug)]
pub struct InPort {
    name: String,
    tx: Option<mpsc::Sender<Message>>,
    rx: mpsc::Receiver<Message>,
}

impl InPort {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            name: name.into(),
            tx: Some(tx),
            rx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribes this port to an upstream out-port.
    pub fn from(&self, out: &mut OutPort) {
        out.to(self);
    }

    /// Awaits the next message; `None` once every upstream has closed.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    pub(crate) fn subscribe_sender(&self) -> Option<mpsc::Sender<Message>> {
        self.tx.clone()
    }

    /// Drops the subscription handle so end-of-stream can propagate once
    /// the upstream senders are gone. Wiring must happen before this.
    pub(crate) fn seal(&mut self) {
        self.tx = None;
    }
}

/// Sending endpoint of a stage.
///
/// Fan-out: [`OutPort::send`] enqueues a clone of the message to every
/// registered downstream, in registration order, so each downstream
/// observes the producer's order.
#[derive(Debug)]
pub struct OutPort {
    name: String,
    senders: Vec<mpsc::Sender<Message>>,
}

impl OutPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            senders: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a downstream in-port.
    pub fn to(&mut self, input: &InPort) {
        match input.subscribe_sender() {
            Some(tx) => self.senders.push(tx),
            None => debug_assert!(false, "in-port {} already sealed", input.name()),
        }
    }

    pub fn num_downstreams(&self) -> usize {
        self.senders.len()
    }

    /// Sends to every downstream, blocking on full channels (back-pressure).
    /// With no downstream registered the message is dropped.
    pub async fn send(&self, msg: Message) -> Result<()> {
        for tx in &self.senders {
            tx.send(msg.clone())
                .await
                .map_err(|_| EngineError::Send(format!("{}: downstream closed", self.name)))?;
        }
        Ok(())
    }

    /// Drops this producer's subscriptions. A downstream's receive stream
    /// ends when its last producer has closed.
    pub fn close(&mut self) {
        self.senders.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datablocks::{BatchWriter, Column, DataBlock};
    use crate::processors::ControlSignal;
    use crate::types::{DataKind, Value};

    fn block_of(v: i64) -> DataBlock {
        let cols = vec![Column::new("a", DataKind::Int64)];
        let mut block = DataBlock::new(cols.clone());
        let mut batch = BatchWriter::new(cols);
        batch.push_row(vec![Value::int64(v)]).unwrap();
        block.write(batch).unwrap();
        block
    }

    fn first_int(msg: &Message) -> i64 {
        msg.as_block()
            .unwrap()
            .iterator("a")
            .unwrap()
            .next()
            .unwrap()
            .parse_i64()
            .unwrap()
    }

    #[tokio::test]
    async fn test_edge_fifo() {
        let mut input = InPort::new("in", 8);
        let mut out = OutPort::new("out");
        out.to(&input);
        input.seal();

        for v in 0..5 {
            out.send(Message::Block(block_of(v))).await.unwrap();
        }
        out.close();

        let mut seen = Vec::new();
        while let Some(msg) = input.recv().await {
            seen.push(first_int(&msg));
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_fan_out_preserves_order() {
        let mut left = InPort::new("left", 8);
        let mut right = InPort::new("right", 8);
        let mut out = OutPort::new("out");
        out.to(&left);
        right.from(&mut out);
        assert_eq!(out.num_downstreams(), 2);
        left.seal();
        right.seal();

        for v in 0..3 {
            out.send(Message::Block(block_of(v))).await.unwrap();
        }
        out.send(Message::Control(ControlSignal::Finish))
            .await
            .unwrap();
        out.close();

        for input in [&mut left, &mut right] {
            let mut seen = Vec::new();
            loop {
                match input.recv().await {
                    Some(Message::Block(block)) => {
                        seen.push(first_int(&Message::Block(block)))
                    }
                    Some(Message::Control(ControlSignal::Finish)) => break,
                    Some(other) => panic!("unexpected message: {other:?}"),
                    None => panic!("stream ended before finish marker"),
                }
            }
            assert_eq!(seen, vec![0, 1, 2]);
        }
    }

    #[tokio::test]
    async fn test_fan_in_closes_after_last_producer() {
        let mut input = InPort::new("in", 8);
        let mut a = OutPort::new("a");
        let mut b = OutPort::new("b");
        a.to(&input);
        b.to(&input);
        input.seal();

        a.send(Message::Block(block_of(1))).await.unwrap();
        a.close();
        // One producer closed; the stream must stay open for the other.
        b.send(Message::Block(block_of(2))).await.unwrap();
        b.close();

        let mut count = 0;
        while input.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_send_without_downstream_is_dropped() {
        let out = OutPort::new("out");
        out.send(Message::Control(ControlSignal::Finish))
            .await
            .unwrap();
    }
}
