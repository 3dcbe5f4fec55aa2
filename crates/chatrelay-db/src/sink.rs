//! The append-only sink abstraction.

use std::future::Future;

use chatrelay_types::StoredMessage;
use tokio::sync::Mutex;

use crate::error::DbError;

/// Append-only destination for stored messages.
///
/// Implementations must tolerate concurrent `append` calls from many relay
/// connections; serializing the writes is the sink's job, not the caller's.
pub trait MessageSink: Send + Sync + 'static {
    /// Durably append one record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the record could not be written.
    fn append(&self, record: &StoredMessage) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// A sink that keeps records in process memory.
///
/// Used for local development (`store.backend: memory`) and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<StoredMessage>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, in append order.
    pub async fn records(&self) -> Vec<StoredMessage> {
        self.records.lock().await.clone()
    }

    /// Number of records appended so far.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether nothing has been appended yet.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl MessageSink for MemorySink {
    async fn append(&self, record: &StoredMessage) -> Result<(), DbError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}
