//! # augury-oracle
//!
//! Stake-backed price oracle aggregation.
//!
//! Admitted oracles stake collateral and submit per-asset prices into a
//! bounded round buffer. Once the buffer holds at least the consensus
//! threshold of submissions, anyone may finalize the round: the engine
//! publishes the mean as the asset's verified price, rewards every
//! contributing reporter and clears the buffer. Afterwards any observer may
//! accuse an oracle of reporting an outlier; accusations outside the 20%
//! tolerance band slash the accused.
//!
//! ## Modules
//!
//! - [`registry`] — Oracle admission, stake and reputation
//! - [`buffer`] — Per-asset bounded submission buffers
//! - [`consensus`] — Aggregation and round finalization
//! - [`enforcement`] — Reward, slash and outlier arithmetic
//! - [`circuit_breaker`] — Emergency pause
//! - [`admin`] — Owner gating and tunable parameters
//! - [`audit`] — Append-only audit log
//! - [`settlement`] — Seam for the external ledger that moves funds
//! - [`config`] — Engine initialisation parameters
//! - [`state`] — Single-writer oracle state machine
//! - [`engine`] — Thread-safe façade serialising every operation

pub mod admin;
pub mod audit;
pub mod buffer;
pub mod circuit_breaker;
pub mod config;
pub mod consensus;
pub mod engine;
pub mod enforcement;
pub mod registry;
pub mod settlement;
pub mod state;

pub use audit::{AuditLog, AuditSink};
pub use config::EngineConfig;
pub use consensus::Aggregation;
pub use engine::OracleEngine;
pub use settlement::{NoopSettlement, Settlement};
pub use state::OracleState;

use augury_types::{AssetId, OracleId, TypesError};

/// Error types for oracle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// Caller is not the administrator.
    #[error("caller {caller} is not the administrator")]
    OwnerOnly {
        /// The rejected caller.
        caller: OracleId,
    },

    /// Identity has no registry entry.
    #[error("oracle {0} is not authorized")]
    NotAuthorized(OracleId),

    /// Oracle already submitted in the current round for this asset.
    #[error("oracle {reporter} already submitted for {asset} this round")]
    AlreadySubmitted {
        /// The asset of the open round.
        asset: AssetId,
        /// The duplicate reporter.
        reporter: OracleId,
    },

    /// Oracle stake is below the minimum required to submit.
    #[error("insufficient stake: have {stake}, need {required}")]
    InsufficientStake {
        /// Current stake.
        stake: u64,
        /// Minimum stake.
        required: u64,
    },

    /// Stake or withdrawal amount is not acceptable.
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The rejected amount.
        amount: u64,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The round buffer holds fewer reporters than the threshold.
    #[error("consensus not reached: {have} of {need} submissions")]
    ConsensusNotReached {
        /// Buffered submissions.
        have: u32,
        /// Current consensus threshold.
        need: u32,
    },

    /// No buffer or verified price exists for the asset.
    #[error("no data for asset {0}")]
    NoData(AssetId),

    /// The circuit breaker forbids this operation in its current state.
    #[error("circuit breaker forbids this operation (paused = {paused})")]
    ContractPaused {
        /// Pause state at the time of the call.
        paused: bool,
    },

    /// Outlier accusation lies inside the tolerance band.
    #[error("deviation {deviation} is within tolerance {tolerance}")]
    WithinTolerance {
        /// |reported - consensus|.
        deviation: u64,
        /// floor(consensus * 20 / 100).
        tolerance: u64,
    },

    /// The round buffer for the asset is at capacity.
    #[error("submission buffer for {asset} is full ({capacity} entries)")]
    BufferFull {
        /// The asset whose buffer is full.
        asset: AssetId,
        /// Fixed buffer capacity.
        capacity: usize,
    },

    /// Arithmetic overflow.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// A previous operation panicked while holding the state lock.
    #[error("oracle state lock poisoned")]
    LockPoisoned,

    /// Invalid domain value.
    #[error(transparent)]
    Types(#[from] TypesError),
}

impl OracleError {
    /// Stable kebab-case name for machine consumers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::OwnerOnly { .. } => "owner-only",
            Self::NotAuthorized(_) => "not-authorized",
            Self::AlreadySubmitted { .. } => "already-submitted",
            Self::InsufficientStake { .. } => "insufficient-stake",
            Self::InvalidAmount { .. } => "invalid-amount",
            Self::ConsensusNotReached { .. } => "consensus-not-reached",
            Self::NoData(_) => "no-data",
            Self::ContractPaused { .. } => "contract-paused",
            Self::WithinTolerance { .. } => "within-tolerance",
            Self::BufferFull { .. } => "buffer-full",
            Self::Overflow(_) => "overflow",
            Self::LockPoisoned => "lock-poisoned",
            Self::Types(_) => "invalid-input",
        }
    }
}

/// Convenience result type for oracle operations.
pub type Result<T> = std::result::Result<T, OracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            OracleError::OwnerOnly {
                caller: OracleId::new("mallory")
            }
            .code(),
            "owner-only"
        );
        assert_eq!(
            OracleError::ContractPaused { paused: true }.code(),
            "contract-paused"
        );
        assert_eq!(
            OracleError::WithinTolerance {
                deviation: 1,
                tolerance: 20
            }
            .code(),
            "within-tolerance"
        );
    }

    #[test]
    fn test_error_display() {
        let err = OracleError::InsufficientStake {
            stake: 999,
            required: 1000,
        };
        assert_eq!(err.to_string(), "insufficient stake: have 999, need 1000");
    }
}
