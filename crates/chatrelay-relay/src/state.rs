//! Shared state for the relay server.
//!
//! Connection tasks share nothing mutable except the sink (which serializes
//! its own writes) and a set of atomic counters.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chatrelay_db::MessageSink;
use serde::Serialize;

/// State handed to every connection task.
#[derive(Debug)]
pub struct RelayState<S> {
    /// Where stamped messages are appended.
    pub sink: Arc<S>,
    /// Per-process counters.
    pub stats: RelayStats,
}

impl<S: MessageSink> RelayState<S> {
    /// Create relay state around a sink.
    pub fn new(sink: Arc<S>) -> Self {
        Self {
            sink,
            stats: RelayStats::default(),
        }
    }
}

/// Monotonic counters describing relay activity since startup.
#[derive(Debug, Default)]
pub struct RelayStats {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    received: AtomicU64,
    persisted: AtomicU64,
    rejected: AtomicU64,
    store_failures: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`], served at `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Connections accepted.
    pub connections_opened: u64,
    /// Connections that have ended.
    pub connections_closed: u64,
    /// Payload frames received.
    pub received: u64,
    /// Messages appended to the sink.
    pub persisted: u64,
    /// Payloads dropped as malformed.
    pub rejected: u64,
    /// Appends the sink refused.
    pub store_failures: u64,
}

impl RelayStats {
    /// Record a new connection and return its 1-based id for logging.
    pub fn connection_opened(&self) -> u64 {
        self.connections_opened
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1)
    }

    /// Record a connection ending.
    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a received payload frame.
    pub fn received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful append.
    pub fn persisted(&self) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped malformed payload.
    pub fn rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed append.
    pub fn store_failed(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}
