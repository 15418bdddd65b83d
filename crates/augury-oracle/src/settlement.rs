//! Settlement seam.
//!
//! Moving value between accounts is the job of an external ledger. The
//! engine tells a [`Settlement`] implementation what to move once an
//! operation has passed all of its checks; [`NoopSettlement`] moves nothing.

use augury_types::OracleId;

/// External ledger collaborator.
pub trait Settlement: Send + Sync {
    /// Collateral `amount` from `oracle` was added to its stake.
    fn lock_stake(&self, oracle: &OracleId, amount: u64);

    /// `amount` of `oracle`'s stake was withdrawn.
    fn release_stake(&self, oracle: &OracleId, amount: u64);

    /// The administrator recovered `amount` while the engine was paused.
    fn recover_funds(&self, admin: &OracleId, amount: u64);
}

/// Settlement that records nothing and moves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSettlement;

impl Settlement for NoopSettlement {
    fn lock_stake(&self, oracle: &OracleId, amount: u64) {
        tracing::trace!(%oracle, amount, "noop settlement: lock");
    }

    fn release_stake(&self, oracle: &OracleId, amount: u64) {
        tracing::trace!(%oracle, amount, "noop settlement: release");
    }

    fn recover_funds(&self, admin: &OracleId, amount: u64) {
        tracing::trace!(%admin, amount, "noop settlement: recover");
    }
}
