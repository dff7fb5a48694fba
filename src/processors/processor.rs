//! The generic stage substrate and its event loop

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{EngineError, Result};

use super::counter::{Metric, StageCounter};
use super::message::Message;
use super::port::{InPort, OutPort};

/// Default bound of a port channel; full channels block the producer.
pub const DEFAULT_PORT_CAPACITY: usize = 64;

type NextFn = Box<dyn FnMut(Message) -> Result<Vec<Message>> + Send>;
type DoneFn = Box<dyn FnOnce() -> Vec<Message> + Send>;
type Ack = oneshot::Sender<()>;

enum Event {
    Cancelled,
    Pause(Ack),
    Resume(Ack),
    Input(Option<Message>),
}

/// The embeddable substrate every concrete stage composes with.
///
/// A stage registers its behavior at two named points: `on_next` runs for
/// each received message (including the one-time delivery of a cancellation
/// error) and returns the messages to emit downstream; `on_done` runs when
/// the upstream is exhausted normally and may emit final messages. The loop
/// owns every await point, so handlers stay synchronous and back-pressure
/// stays in one place.
pub struct BaseProcessor {
    name: String,
    in_port: InPort,
    out_port: OutPort,
    counter: Arc<StageCounter>,
    token: CancellationToken,
    pause_tx: mpsc::Sender<Ack>,
    pause_rx: mpsc::Receiver<Ack>,
    resume_tx: mpsc::Sender<Ack>,
    resume_rx: mpsc::Receiver<Ack>,
    next_handler: Option<NextFn>,
    done_handler: Option<DoneFn>,
}

impl BaseProcessor {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_PORT_CAPACITY)
    }

    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        let name = name.into();
        let (pause_tx, pause_rx) = mpsc::channel(1);
        let (resume_tx, resume_rx) = mpsc::channel(1);
        Self {
            in_port: InPort::new(name.clone(), capacity),
            out_port: OutPort::new(name.clone()),
            counter: Arc::new(StageCounter::new()),
            token: CancellationToken::new(),
            pause_tx,
            pause_rx,
            resume_tx,
            resume_rx,
            next_handler: None,
            done_handler: None,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn in_port(&self) -> &InPort {
        &self.in_port
    }

    pub fn in_port_mut(&mut self) -> &mut InPort {
        &mut self.in_port
    }

    pub fn out_port(&self) -> &OutPort {
        &self.out_port
    }

    pub fn out_port_mut(&mut self) -> &mut OutPort {
        &mut self.out_port
    }

    /// Installs the shared cancellation context.
    pub fn set_token(&mut self, token: CancellationToken) {
        self.token = token;
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn counter(&self) -> &StageCounter {
        &self.counter
    }

    pub fn metric(&self) -> Metric {
        self.counter.metric()
    }

    /// Registers the per-message handler.
    pub fn on_next(&mut self, f: impl FnMut(Message) -> Result<Vec<Message>> + Send + 'static) {
        self.next_handler = Some(Box::new(f));
    }

    /// Registers the end-of-stream handler.
    pub fn on_done(&mut self, f: impl FnOnce() -> Vec<Message> + Send + 'static) {
        self.done_handler = Some(Box::new(f));
    }

    /// External control surface; cloneable, usable while the stage runs.
    pub fn handle(&self) -> StageHandle {
        StageHandle {
            name: self.name.clone(),
            pause: self.pause_tx.clone(),
            resume: self.resume_tx.clone(),
            token: self.token.clone(),
            counter: Arc::clone(&self.counter),
        }
    }

    /// The stage event loop.
    ///
    /// Multiplexes cancellation, pause/resume, and input. While paused only
    /// cancellation and resume are observed, so cancellation always wins.
    /// On cancellation the context error is delivered to `on_next` exactly
    /// once and `on_done` is skipped. Every exit path closes the out-port
    /// and retires the pause/resume channels.
    pub async fn run(&mut self) {
        debug!(stage = %self.name, "stage started");
        self.in_port.seal();
        let mut paused = false;
        let mut t_start = Instant::now();

        loop {
            let event = if paused {
                tokio::select! {
                    _ = self.token.cancelled() => Event::Cancelled,
                    Some(ack) = self.resume_rx.recv() => Event::Resume(ack),
                }
            } else {
                tokio::select! {
                    _ = self.token.cancelled() => Event::Cancelled,
                    Some(ack) = self.pause_rx.recv() => Event::Pause(ack),
                    msg = self.in_port.recv() => Event::Input(msg),
                }
            };

            match event {
                Event::Cancelled => {
                    debug!(stage = %self.name, "stage cancelled");
                    let outputs = self.invoke_next(Message::Error(EngineError::Cancelled));
                    Self::emit(&self.out_port, outputs).await;
                    break;
                }
                Event::Pause(ack) => {
                    paused = true;
                    let _ = ack.send(());
                }
                Event::Resume(ack) => {
                    paused = false;
                    let _ = ack.send(());
                }
                Event::Input(Some(msg)) => {
                    self.counter.add_latency(t_start.elapsed());
                    self.counter.add_messages(1);
                    let handler_start = Instant::now();
                    let outputs = self.invoke_next(msg);
                    self.counter.add_duration(handler_start.elapsed());
                    Self::emit(&self.out_port, outputs).await;
                    t_start = Instant::now();
                }
                Event::Input(None) => {
                    if let Some(f) = self.done_handler.take() {
                        let outputs = f();
                        Self::emit(&self.out_port, outputs).await;
                    }
                    break;
                }
            }
        }

        self.out_port.close();
        self.pause_rx.close();
        self.resume_rx.close();
        debug!(stage = %self.name, "stage stopped");
    }

    fn invoke_next(&mut self, msg: Message) -> Vec<Message> {
        match self.next_handler.as_mut() {
            Some(f) => match f(msg) {
                Ok(outputs) => outputs,
                // Handler failures travel the normal message path.
                Err(e) => vec![Message::Error(e)],
            },
            None => Vec::new(),
        }
    }

    async fn emit(out_port: &OutPort, outputs: Vec<Message>) {
        for msg in outputs {
            if out_port.send(msg).await.is_err() {
                // Downstream gone mid-shutdown; nothing left to notify.
                break;
            }
        }
    }
}

impl std::fmt::Debug for BaseProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseProcessor")
            .field("name", &self.name)
            .field("downstreams", &self.out_port.num_downstreams())
            .finish()
    }
}

/// Cloneable control surface of one stage: pause/resume rendezvous,
/// cancellation, and metric snapshots.
#[derive(Debug, Clone)]
pub struct StageHandle {
    name: String,
    pause: mpsc::Sender<Ack>,
    resume: mpsc::Sender<Ack>,
    token: CancellationToken,
    counter: Arc<StageCounter>,
}

impl StageHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Halts the stage's message consumption. Blocks until the stage's loop
    /// accepts the request; errors once the stage has terminated.
    pub async fn pause(&self) -> Result<()> {
        self.rendezvous(&self.pause, "pause").await
    }

    /// Resumes a paused stage. Blocks until the loop accepts the request.
    pub async fn resume(&self) -> Result<()> {
        self.rendezvous(&self.resume, "resume").await
    }

    /// Cancels the stage's context (shared across the pipeline when wired
    /// from one token).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn metric(&self) -> Metric {
        self.counter.metric()
    }

    async fn rendezvous(&self, channel: &mpsc::Sender<Ack>, what: &str) -> Result<()> {
        let (ack, accepted) = oneshot::channel();
        channel
            .send(ack)
            .await
            .map_err(|_| EngineError::Send(format!("{}: stage terminated before {what}", self.name)))?;
        accepted
            .await
            .map_err(|_| EngineError::Send(format!("{}: stage terminated during {what}", self.name)))
    }
}

/// A pipeline stage: one in-port, one out-port, and an event loop.
#[async_trait]
pub trait Processor: Send {
    fn base(&self) -> &BaseProcessor;

    fn base_mut(&mut self) -> &mut BaseProcessor;

    fn name(&self) -> &str {
        self.base().name()
    }

    /// Fans this stage's output into `downstream`'s input.
    fn to(&mut self, downstream: &dyn Processor)
    where
        Self: Sized,
    {
        let out = self.base_mut().out_port_mut();
        out.to(downstream.base().in_port());
    }

    /// Fans `upstream`'s output into this stage's input.
    fn from(&self, upstream: &mut dyn Processor)
    where
        Self: Sized,
    {
        upstream.base_mut().out_port_mut().to(self.base().in_port());
    }

    /// Runs the stage to completion.
    async fn execute(&mut self);
}

impl std::fmt::Debug for dyn Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor").field("name", &self.name()).finish()
    }
}

#[async_trait]
impl Processor for BaseProcessor {
    fn base(&self) -> &BaseProcessor {
        self
    }

    fn base_mut(&mut self) -> &mut BaseProcessor {
        self
    }

    async fn execute(&mut self) {
        self.run().await;
    }
}
