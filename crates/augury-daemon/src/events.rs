//! Audit event bus.
//!
//! The engine appends audit records synchronously; the bus fans them out to
//! async subscribers. Each subscriber has an independent buffer of
//! `bus_capacity` records and lags (dropping the oldest) when it falls
//! behind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use augury_oracle::AuditSink;
use augury_types::AuditRecord;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Event bus for broadcasting audit records to subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuditRecord>,
    published: Arc<AtomicU64>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to records. Returns a receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<AuditRecord> {
        self.sender.subscribe()
    }

    /// Number of records published so far.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::SeqCst)
    }
}

impl AuditSink for EventBus {
    fn publish(&self, record: &AuditRecord) {
        self.published.fetch_add(1, Ordering::SeqCst);
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(record.clone());
    }
}

/// Mirror every record on the bus into the log until the bus closes.
pub async fn log_records(mut rx: broadcast::Receiver<AuditRecord>) {
    loop {
        match rx.recv().await {
            Ok(record) => match serde_json::to_string(&record.event) {
                Ok(json) => info!(
                    target: "augury::audit",
                    sequence = record.sequence,
                    height = record.height,
                    "{json}"
                ),
                Err(e) => warn!("unserializable audit record {}: {}", record.sequence, e),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "audit logger lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
