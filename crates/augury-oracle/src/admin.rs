//! Administrative control: owner gating and tunable parameters.

use augury_types::OracleId;

use crate::circuit_breaker::CircuitBreaker;
use crate::{OracleError, Result};

/// The designated administrator plus the state only it may change.
#[derive(Debug, Clone)]
pub struct AdminControl {
    owner: OracleId,
    breaker: CircuitBreaker,
    consensus_threshold: u32,
}

impl AdminControl {
    pub fn new(owner: OracleId, consensus_threshold: u32, paused: bool) -> Self {
        Self {
            owner,
            breaker: CircuitBreaker::with_state(paused),
            consensus_threshold,
        }
    }

    /// # Errors
    ///
    /// - [`OracleError::OwnerOnly`] if `caller` is not the administrator
    pub fn ensure_owner(&self, caller: &OracleId) -> Result<()> {
        if caller != &self.owner {
            tracing::debug!(%caller, "rejected non-owner admin call");
            return Err(OracleError::OwnerOnly {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    pub fn owner(&self) -> &OracleId {
        &self.owner
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Owner-gated pause toggle. Returns the previous state.
    ///
    /// # Errors
    ///
    /// - [`OracleError::OwnerOnly`] if `caller` is not the administrator
    pub fn set_paused(&mut self, caller: &OracleId, paused: bool) -> Result<bool> {
        self.ensure_owner(caller)?;
        Ok(self.breaker.set(paused))
    }

    pub fn consensus_threshold(&self) -> u32 {
        self.consensus_threshold
    }

    /// Owner-gated threshold overwrite. Returns the previous threshold.
    ///
    /// Any value is accepted: zero lets a single submission finalize, and a
    /// value above the buffer capacity halts consensus.
    ///
    /// # Errors
    ///
    /// - [`OracleError::OwnerOnly`] if `caller` is not the administrator
    pub fn update_threshold(&mut self, caller: &OracleId, threshold: u32) -> Result<u32> {
        self.ensure_owner(caller)?;
        let previous = self.consensus_threshold;
        self.consensus_threshold = threshold;
        tracing::warn!(previous, threshold, "consensus threshold overwritten");
        Ok(previous)
    }

    /// Preconditions of an emergency withdrawal.
    ///
    /// # Errors
    ///
    /// - [`OracleError::OwnerOnly`] if `caller` is not the administrator
    /// - [`OracleError::ContractPaused`] if the engine is not paused
    pub fn check_emergency(&self, caller: &OracleId) -> Result<()> {
        self.ensure_owner(caller)?;
        self.breaker.check_halted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminControl {
        AdminControl::new(OracleId::new("owner"), 3, false)
    }

    #[test]
    fn test_only_owner_passes() {
        let control = admin();
        control.ensure_owner(&OracleId::new("owner")).expect("owner");
        let err = control
            .ensure_owner(&OracleId::new("mallory"))
            .expect_err("not owner");
        assert!(matches!(err, OracleError::OwnerOnly { .. }));
    }

    #[test]
    fn test_update_threshold_accepts_any_value() {
        let mut control = admin();
        let owner = OracleId::new("owner");
        assert_eq!(control.update_threshold(&owner, 0).expect("zero"), 3);
        assert_eq!(control.consensus_threshold(), 0);
        assert_eq!(control.update_threshold(&owner, u32::MAX).expect("huge"), 0);
        assert_eq!(control.consensus_threshold(), u32::MAX);
    }

    #[test]
    fn test_non_owner_cannot_mutate() {
        let mut control = admin();
        let mallory = OracleId::new("mallory");
        assert!(control.set_paused(&mallory, true).is_err());
        assert!(control.update_threshold(&mallory, 1).is_err());
        assert!(!control.breaker().is_paused());
        assert_eq!(control.consensus_threshold(), 3);
    }

    #[test]
    fn test_emergency_requires_owner_then_pause() {
        let mut control = admin();
        let owner = OracleId::new("owner");

        let err = control
            .check_emergency(&OracleId::new("mallory"))
            .expect_err("owner check first");
        assert!(matches!(err, OracleError::OwnerOnly { .. }));

        let err = control.check_emergency(&owner).expect_err("not paused");
        assert!(matches!(err, OracleError::ContractPaused { paused: false }));

        control.set_paused(&owner, true).expect("pause");
        control.check_emergency(&owner).expect("allowed while paused");
    }
}
