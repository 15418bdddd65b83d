//! Circuit breaker for the oracle engine.
//!
//! While the breaker is tripped, new submissions and round finalization are
//! refused. Administrative operations and reads are unaffected, and the
//! emergency fund recovery path is only open while tripped.

use crate::{OracleError, Result};

/// Emergency pause switch.
#[derive(Debug, Clone, Default)]
pub struct CircuitBreaker {
    /// Whether the engine is paused.
    paused: bool,
}

impl CircuitBreaker {
    /// Create an untripped circuit breaker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a circuit breaker in the given state.
    pub fn with_state(paused: bool) -> Self {
        Self { paused }
    }

    /// Check that the engine is accepting round traffic.
    ///
    /// # Errors
    ///
    /// - [`OracleError::ContractPaused`] if the breaker is tripped
    pub fn check_active(&self) -> Result<()> {
        if self.paused {
            return Err(OracleError::ContractPaused { paused: true });
        }
        Ok(())
    }

    /// Check that the engine is halted, as required for fund recovery.
    ///
    /// # Errors
    ///
    /// - [`OracleError::ContractPaused`] if the breaker is *not* tripped
    pub fn check_halted(&self) -> Result<()> {
        if !self.paused {
            return Err(OracleError::ContractPaused { paused: false });
        }
        Ok(())
    }

    /// Set the pause flag. Returns the previous state.
    pub fn set(&mut self, paused: bool) -> bool {
        let previous = self.paused;
        if paused {
            tracing::warn!("circuit breaker: oracle paused");
        } else {
            tracing::info!("circuit breaker: oracle resumed");
        }
        self.paused = paused;
        previous
    }

    /// Return whether the engine is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
