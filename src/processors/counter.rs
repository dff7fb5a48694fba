//! Per-stage metrics

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Aggregates message count, cumulative handler duration, and cumulative
/// inter-arrival latency for one stage.
///
/// The stage's loop is the only writer; external readers take atomic
/// snapshots via [`StageCounter::metric`].
#[derive(Debug, Default)]
pub struct StageCounter {
    messages: AtomicU64,
    duration_ns: AtomicU64,
    latency_ns: AtomicU64,
}

impl StageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_messages(&self, n: u64) {
        self.messages.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_duration(&self, d: Duration) {
        self.duration_ns
            .fetch_add(d.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn add_latency(&self, d: Duration) {
        self.latency_ns
            .fetch_add(d.as_nanos() as u64, Ordering::Relaxed);
    }

    pub fn metric(&self) -> Metric {
        Metric {
            messages: self.messages.load(Ordering::Relaxed),
            duration: Duration::from_nanos(self.duration_ns.load(Ordering::Relaxed)),
            latency: Duration::from_nanos(self.latency_ns.load(Ordering::Relaxed)),
        }
    }
}

/// Read-only snapshot of a [`StageCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub messages: u64,
    pub duration: Duration,
    pub latency: Duration,
}
