//! Per-asset submission buffers.
//!
//! A buffer holds the ordered (reporter, price) pairs of one open round.
//! Buffers are created lazily on the first submission for an asset and
//! removed entirely when the round is finalized or force-reset.

use std::collections::HashMap;

use augury_types::{AssetId, OracleId, PendingSubmission, MAX_SUBMISSIONS};

use crate::{OracleError, Result};

/// Ordered submissions of one open round, capped at [`MAX_SUBMISSIONS`].
///
/// No reporter appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionBuffer {
    submissions: Vec<PendingSubmission>,
}

impl SubmissionBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            submissions: Vec::with_capacity(MAX_SUBMISSIONS),
        }
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.submissions.len() >= MAX_SUBMISSIONS
    }

    /// Whether `reporter` already submitted in this round.
    pub fn contains(&self, reporter: &OracleId) -> bool {
        self.submissions.iter().any(|s| &s.reporter == reporter)
    }

    /// Append a submission, returning the new length.
    ///
    /// # Errors
    ///
    /// - [`OracleError::AlreadySubmitted`] if `reporter` is already present
    /// - [`OracleError::BufferFull`] if the buffer holds [`MAX_SUBMISSIONS`] entries
    pub fn push(&mut self, asset: &AssetId, reporter: OracleId, price: u64) -> Result<usize> {
        if self.contains(&reporter) {
            return Err(OracleError::AlreadySubmitted {
                asset: asset.clone(),
                reporter,
            });
        }
        if self.is_full() {
            return Err(OracleError::BufferFull {
                asset: asset.clone(),
                capacity: MAX_SUBMISSIONS,
            });
        }
        self.submissions.push(PendingSubmission { reporter, price });
        Ok(self.submissions.len())
    }

    /// Submissions in arrival order.
    pub fn submissions(&self) -> &[PendingSubmission] {
        &self.submissions
    }

    /// Reporters in arrival order.
    pub fn reporters(&self) -> impl Iterator<Item = &OracleId> {
        self.submissions.iter().map(|s| &s.reporter)
    }

    /// Prices in arrival order.
    pub fn prices(&self) -> impl Iterator<Item = u64> + '_ {
        self.submissions.iter().map(|s| s.price)
    }
}

/// All open round buffers, keyed by asset.
#[derive(Debug, Clone, Default)]
pub struct BufferTable {
    buffers: HashMap<AssetId, SubmissionBuffer>,
}

impl BufferTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open buffer for `asset`, if any.
    pub fn get(&self, asset: &AssetId) -> Option<&SubmissionBuffer> {
        self.buffers.get(asset)
    }

    /// Append to the buffer for `asset`, creating it on first use.
    ///
    /// A failed append leaves the table unchanged.
    ///
    /// # Errors
    ///
    /// See [`SubmissionBuffer::push`].
    pub fn append(&mut self, asset: &AssetId, reporter: OracleId, price: u64) -> Result<usize> {
        match self.buffers.get_mut(asset) {
            Some(buffer) => buffer.push(asset, reporter, price),
            None => {
                let mut buffer = SubmissionBuffer::new();
                let len = buffer.push(asset, reporter, price)?;
                self.buffers.insert(asset.clone(), buffer);
                Ok(len)
            }
        }
    }

    /// Remove and return the buffer for `asset`.
    pub fn take(&mut self, asset: &AssetId) -> Option<SubmissionBuffer> {
        self.buffers.remove(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset() -> AssetId {
        AssetId::new("X").expect("asset")
    }

    #[test]
    fn test_push_preserves_arrival_order() {
        let mut buffer = SubmissionBuffer::new();
        buffer.push(&asset(), OracleId::new("a"), 100).expect("a");
        buffer.push(&asset(), OracleId::new("b"), 110).expect("b");
        buffer.push(&asset(), OracleId::new("c"), 100).expect("c");

        assert_eq!(buffer.prices().collect::<Vec<_>>(), vec![100, 110, 100]);
        let reporters: Vec<_> = buffer.reporters().map(|r| r.as_str()).collect();
        assert_eq!(reporters, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_reporter_rejected() {
        let mut buffer = SubmissionBuffer::new();
        buffer.push(&asset(), OracleId::new("a"), 100).expect("first");
        let err = buffer
            .push(&asset(), OracleId::new("a"), 105)
            .expect_err("duplicate");
        assert!(matches!(err, OracleError::AlreadySubmitted { .. }));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_capacity_boundary() {
        let mut buffer = SubmissionBuffer::new();
        for i in 0..MAX_SUBMISSIONS {
            buffer
                .push(&asset(), OracleId::new(format!("o{i}")), 100)
                .expect("within capacity");
        }
        assert!(buffer.is_full());
        let err = buffer
            .push(&asset(), OracleId::new("eleventh"), 100)
            .expect_err("full");
        assert!(matches!(err, OracleError::BufferFull { capacity: MAX_SUBMISSIONS, .. }));
        assert_eq!(buffer.len(), MAX_SUBMISSIONS);
    }

    #[test]
    fn test_table_lazy_create_and_take() {
        let mut table = BufferTable::new();
        assert!(table.get(&asset()).is_none());

        assert_eq!(table.append(&asset(), OracleId::new("a"), 1).expect("append"), 1);
        let buffer = table.get(&asset()).expect("created");
        assert!(buffer.contains(&OracleId::new("a")));
        assert!(!buffer.is_empty());

        let taken = table.take(&asset()).expect("buffer");
        assert_eq!(taken.len(), 1);
        assert!(table.get(&asset()).is_none());
    }
}
