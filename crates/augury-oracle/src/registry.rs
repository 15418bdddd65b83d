//! Oracle registry: admission, stake and reputation.
//!
//! An identity is authorized iff it has a registry entry, and entries are
//! only ever created by admission. Stake and reputation are independent:
//! reputation gates nothing on its own, stake gates submission.
//!
//! ## Stake minimum
//!
//! Every individual [`Registry::stake`] call must itself be at least the
//! minimum stake, not merely bring the cumulative balance up to it.

use std::collections::HashMap;

use augury_types::{OracleId, RegistryEntry, INITIAL_REPUTATION};

use crate::{OracleError, Result};

/// Result of slashing an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashOutcome {
    /// Stake actually removed (less than the slash amount if the balance was lower).
    pub removed: u64,
    /// Stake left after the slash.
    pub remaining_stake: u64,
}

/// Mapping of oracle identity to reputation and stake.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<OracleId, RegistryEntry>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `target`, or re-admit it.
    ///
    /// Reputation is (re)set to [`INITIAL_REPUTATION`]; an existing stake is
    /// kept.
    pub fn admit(&mut self, target: &OracleId) -> &RegistryEntry {
        let entry = self.entries.entry(target.clone()).or_default();
        entry.reputation = INITIAL_REPUTATION;
        entry
    }

    /// Whether `identity` has a registry entry.
    pub fn is_authorized(&self, identity: &OracleId) -> bool {
        self.entries.contains_key(identity)
    }

    /// Registry entry for `identity`, if admitted.
    pub fn get(&self, identity: &OracleId) -> Option<&RegistryEntry> {
        self.entries.get(identity)
    }

    /// Reputation of `identity`, if admitted.
    pub fn reputation(&self, identity: &OracleId) -> Option<u64> {
        self.entries.get(identity).map(|e| e.reputation)
    }

    /// Stake of `identity`, if admitted.
    pub fn stake_of(&self, identity: &OracleId) -> Option<u64> {
        self.entries.get(identity).map(|e| e.stake)
    }

    /// Number of admitted oracles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no oracle has been admitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add `amount` to the stake of `identity`, returning the new balance.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidAmount`] if `amount` is below `minimum`
    /// - [`OracleError::NotAuthorized`] if `identity` was never admitted
    /// - [`OracleError::Overflow`] if the balance would overflow
    pub fn stake(&mut self, identity: &OracleId, amount: u64, minimum: u64) -> Result<u64> {
        if amount < minimum {
            return Err(OracleError::InvalidAmount {
                amount,
                reason: "each stake must meet the minimum stake",
            });
        }
        let entry = self
            .entries
            .get_mut(identity)
            .ok_or_else(|| OracleError::NotAuthorized(identity.clone()))?;
        entry.stake = entry
            .stake
            .checked_add(amount)
            .ok_or(OracleError::Overflow("stake balance"))?;
        Ok(entry.stake)
    }

    /// Remove `amount` from the stake of `identity`, returning what remains.
    ///
    /// An identity without an entry is treated as holding zero stake. No lock
    /// period applies.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidAmount`] if `amount` exceeds the current stake
    pub fn withdraw(&mut self, identity: &OracleId, amount: u64) -> Result<u64> {
        let current = self.stake_of(identity).unwrap_or(0);
        if amount > current {
            return Err(OracleError::InvalidAmount {
                amount,
                reason: "exceeds current stake",
            });
        }
        let remaining = current - amount;
        if let Some(entry) = self.entries.get_mut(identity) {
            entry.stake = remaining;
        }
        Ok(remaining)
    }

    /// Increment the reputation of `identity` by one.
    ///
    /// Returns the new reputation, or `None` if the identity has no entry; no
    /// entry is created, so a reward can never confer authorization.
    pub fn reward(&mut self, identity: &OracleId) -> Option<u64> {
        let entry = self.entries.get_mut(identity)?;
        entry.reputation = entry.reputation.saturating_add(1);
        Some(entry.reputation)
    }

    /// Remove up to `amount` stake from `identity` and zero its reputation.
    ///
    /// Stake is floored at zero. Unknown identities are left unregistered and
    /// report zero remaining stake.
    pub fn slash(&mut self, identity: &OracleId, amount: u64) -> SlashOutcome {
        match self.entries.get_mut(identity) {
            Some(entry) => {
                let remaining_stake = entry.stake.saturating_sub(amount);
                let removed = entry.stake - remaining_stake;
                entry.stake = remaining_stake;
                entry.reputation = 0;
                SlashOutcome {
                    removed,
                    remaining_stake,
                }
            }
            None => SlashOutcome {
                removed: 0,
                remaining_stake: 0,
            },
        }
    }
}
