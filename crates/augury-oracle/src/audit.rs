//! Append-only audit log.
//!
//! Every successful state change appends one or more [`AuditRecord`]s. The
//! log is the only externally observable side channel of the engine; records
//! are also forwarded to registered [`AuditSink`]s.

use std::fmt;
use std::sync::Arc;

use augury_types::{AuditEvent, AuditRecord};

/// Receiver of audit records, e.g. a notification bus.
pub trait AuditSink: Send + Sync {
    /// Called once per appended record, in log order.
    fn publish(&self, record: &AuditRecord);
}

/// In-memory append-only audit log.
#[derive(Default)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink for records appended from now on.
    pub fn add_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.sinks.push(sink);
    }

    /// Append `event` at `height`, returning its sequence number.
    pub fn append(&mut self, height: u64, event: AuditEvent) -> u64 {
        let sequence = self.records.len() as u64;
        tracing::debug!(sequence, height, event = event.name(), "audit");
        let record = AuditRecord {
            sequence,
            height,
            event,
        };
        for sink in &self.sinks {
            sink.publish(&record);
        }
        self.records.push(record);
        sequence
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Records with `sequence >= from`.
    pub fn since(&self, from: u64) -> &[AuditRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    /// At most `limit` records with `sequence >= from`.
    pub fn page(&self, from: u64, limit: usize) -> &[AuditRecord] {
        let records = self.since(from);
        &records[..records.len().min(limit)]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog")
            .field("records", &self.records.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
