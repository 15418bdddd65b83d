//! Single-writer oracle state machine.
//!
//! [`OracleState`] owns the registry, the open round buffers, the verified
//! prices and the parameters, and implements every operation as an
//! all-or-nothing transition: each operation evaluates all of its
//! preconditions before the first mutation, so a failed call leaves no
//! trace, not even in the audit log or the height counter.
//!
//! `OracleState` is not synchronised. Share it through
//! [`OracleEngine`](crate::OracleEngine), which serialises every call.

use std::collections::HashMap;
use std::sync::Arc;

use augury_types::{
    AssetId, AuditEvent, AuditRecord, OracleId, PendingSubmission, RegistryEntry, SystemParams,
    VerifiedPrice,
};

use crate::admin::AdminControl;
use crate::audit::{AuditLog, AuditSink};
use crate::buffer::BufferTable;
use crate::config::EngineConfig;
use crate::consensus::{Aggregation, Sample};
use crate::enforcement;
use crate::registry::{Registry, SlashOutcome};
use crate::settlement::{NoopSettlement, Settlement};
use crate::{OracleError, Result};

/// Result of a finalized round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub asset: AssetId,
    /// Published consensus price.
    pub price: u64,
    /// Rewarded reporters, in submission order.
    pub reporters: Vec<OracleId>,
    /// Height at which the price was committed.
    pub height: u64,
}

/// Complete engine state.
pub struct OracleState {
    admin: AdminControl,
    minimum_stake: u64,
    slash_amount: u64,
    reward_amount: u64,
    aggregation: Aggregation,
    registry: Registry,
    buffers: BufferTable,
    prices: HashMap<AssetId, VerifiedPrice>,
    height: u64,
    audit: AuditLog,
    settlement: Arc<dyn Settlement>,
}

impl OracleState {
    /// Fresh state with a no-op settlement layer.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_settlement(config, Arc::new(NoopSettlement))
    }

    /// Fresh state settling through `settlement`.
    pub fn with_settlement(config: EngineConfig, settlement: Arc<dyn Settlement>) -> Self {
        Self {
            admin: AdminControl::new(
                config.admin,
                config.consensus_threshold,
                config.start_paused,
            ),
            minimum_stake: config.minimum_stake,
            slash_amount: config.slash_amount,
            reward_amount: config.reward_amount,
            aggregation: config.aggregation,
            registry: Registry::new(),
            buffers: BufferTable::new(),
            prices: HashMap::new(),
            height: 0,
            audit: AuditLog::new(),
            settlement,
        }
    }

    /// Forward audit records appended from now on to `sink`.
    pub fn add_audit_sink(&mut self, sink: Arc<dyn AuditSink>) {
        self.audit.add_sink(sink);
    }

    fn advance_height(&mut self) -> u64 {
        self.height = self.height.saturating_add(1);
        self.height
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    /// Admit or re-admit `target` with fresh reputation.
    ///
    /// # Errors
    ///
    /// - [`OracleError::OwnerOnly`] if `caller` is not the administrator
    pub fn add_oracle(&mut self, caller: &OracleId, target: &OracleId) -> Result<()> {
        self.admin.ensure_owner(caller)?;
        let height = self.advance_height();
        let reputation = self.registry.admit(target).reputation;
        tracing::info!(oracle = %target, "oracle admitted");
        self.audit.append(
            height,
            AuditEvent::OracleAdded {
                identity: target.clone(),
                reputation,
            },
        );
        Ok(())
    }

    /// Add `amount` to the caller's stake, returning the new balance.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidAmount`] if `amount` is below the minimum stake
    /// - [`OracleError::NotAuthorized`] if `caller` was never admitted
    pub fn stake(&mut self, caller: &OracleId, amount: u64) -> Result<u64> {
        let total = self.registry.stake(caller, amount, self.minimum_stake)?;
        let height = self.advance_height();
        self.settlement.lock_stake(caller, amount);
        tracing::info!(oracle = %caller, amount, total, "stake added");
        self.audit.append(
            height,
            AuditEvent::Staked {
                identity: caller.clone(),
                amount,
                total,
            },
        );
        Ok(total)
    }

    /// Remove `amount` from the caller's stake, returning what remains.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidAmount`] if `amount` exceeds the current stake
    pub fn withdraw(&mut self, caller: &OracleId, amount: u64) -> Result<u64> {
        let remaining = self.registry.withdraw(caller, amount)?;
        let height = self.advance_height();
        self.settlement.release_stake(caller, amount);
        tracing::info!(oracle = %caller, amount, remaining, "stake withdrawn");
        self.audit.append(
            height,
            AuditEvent::Withdrawn {
                identity: caller.clone(),
                amount,
                remaining,
            },
        );
        Ok(remaining)
    }

    // ---------------------------------------------------------------------
    // Rounds
    // ---------------------------------------------------------------------

    /// Buffer the caller's `price` for `asset`, returning the buffer length.
    ///
    /// Preconditions are checked in order; the first failure wins.
    ///
    /// # Errors
    ///
    /// - [`OracleError::ContractPaused`] if the engine is paused
    /// - [`OracleError::NotAuthorized`] if `caller` was never admitted
    /// - [`OracleError::InsufficientStake`] if `caller`'s stake is below the minimum
    /// - [`OracleError::AlreadySubmitted`] if `caller` already submitted this round
    /// - [`OracleError::BufferFull`] if the round already holds the maximum
    pub fn submit(&mut self, caller: &OracleId, asset: &AssetId, price: u64) -> Result<usize> {
        self.admin.breaker().check_active()?;
        let stake = self
            .registry
            .stake_of(caller)
            .ok_or_else(|| OracleError::NotAuthorized(caller.clone()))?;
        if stake < self.minimum_stake {
            return Err(OracleError::InsufficientStake {
                stake,
                required: self.minimum_stake,
            });
        }
        let len = self.buffers.append(asset, caller.clone(), price)?;
        let height = self.advance_height();
        tracing::info!(%asset, oracle = %caller, price, buffered = len, "price submitted");
        self.audit.append(
            height,
            AuditEvent::PriceSubmitted {
                asset: asset.clone(),
                reporter: caller.clone(),
                price,
            },
        );
        Ok(len)
    }

    /// Close the round for `asset`: publish the consensus price, reward all
    /// reporters and clear the buffer.
    ///
    /// # Errors
    ///
    /// - [`OracleError::ContractPaused`] if the engine is paused
    /// - [`OracleError::NoData`] if no round is open for `asset`
    /// - [`OracleError::ConsensusNotReached`] if the round has fewer reporters
    ///   than the consensus threshold
    pub fn finalize(&mut self, asset: &AssetId) -> Result<RoundOutcome> {
        self.admin.breaker().check_active()?;
        let buffer = self
            .buffers
            .get(asset)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| OracleError::NoData(asset.clone()))?;

        let have = u32::try_from(buffer.len()).unwrap_or(u32::MAX);
        let need = self.admin.consensus_threshold();
        if have < need {
            return Err(OracleError::ConsensusNotReached { have, need });
        }

        let samples: Vec<Sample> = buffer
            .submissions()
            .iter()
            .map(|s| Sample {
                price: s.price,
                weight: self.registry.reputation(&s.reporter).unwrap_or(0),
            })
            .collect();
        let price = self
            .aggregation
            .aggregate(&samples)?
            .ok_or_else(|| OracleError::NoData(asset.clone()))?;

        // All checks passed; commit.
        let height = self.advance_height();
        self.prices
            .insert(asset.clone(), VerifiedPrice { price, height });

        let reporters: Vec<OracleId> = self
            .buffers
            .take(asset)
            .map(|b| b.reporters().cloned().collect())
            .unwrap_or_default();

        for reporter in &reporters {
            self.reward(height, reporter);
        }

        tracing::info!(%asset, price, reporters = reporters.len(), height, "consensus finalized");
        self.audit.append(
            height,
            AuditEvent::ConsensusRound {
                asset: asset.clone(),
                price,
                reporters: reporters.clone(),
                count: have,
            },
        );
        self.audit.append(
            height,
            AuditEvent::PriceFinalized {
                asset: asset.clone(),
                price,
            },
        );

        Ok(RoundOutcome {
            asset: asset.clone(),
            price,
            reporters,
            height,
        })
    }

    fn reward(&mut self, height: u64, identity: &OracleId) {
        match self.registry.reward(identity) {
            Some(reputation) => {
                self.audit.append(
                    height,
                    AuditEvent::OracleRewarded {
                        identity: identity.clone(),
                        reputation,
                    },
                );
            }
            None => tracing::debug!(oracle = %identity, "reward skipped: not registered"),
        }
    }

    fn slash(&mut self, height: u64, identity: &OracleId) -> SlashOutcome {
        let outcome = self.registry.slash(identity, self.slash_amount);
        tracing::warn!(
            oracle = %identity,
            removed = outcome.removed,
            remaining = outcome.remaining_stake,
            "oracle slashed"
        );
        self.audit.append(
            height,
            AuditEvent::OracleSlashed {
                identity: identity.clone(),
                amount: self.slash_amount,
                remaining_stake: outcome.remaining_stake,
            },
        );
        outcome
    }

    /// Accuse `accused` of reporting `reported_price` for `asset`.
    ///
    /// The accusation is judged only against the current verified price; the
    /// claimed value is not checked against any submission history.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NoData`] if `asset` has no verified price yet
    /// - [`OracleError::WithinTolerance`] if the reported price is inside the band
    pub fn report_outlier(
        &mut self,
        asset: &AssetId,
        accused: &OracleId,
        reported_price: u64,
    ) -> Result<SlashOutcome> {
        let consensus_price = self
            .prices
            .get(asset)
            .map(|v| v.price)
            .ok_or_else(|| OracleError::NoData(asset.clone()))?;
        let deviation = enforcement::judge_outlier(consensus_price, reported_price)?;

        let height = self.advance_height();
        self.audit.append(
            height,
            AuditEvent::OutlierReported {
                asset: asset.clone(),
                accused: accused.clone(),
                reported_price,
                consensus_price,
                deviation,
            },
        );
        Ok(self.slash(height, accused))
    }

    // ---------------------------------------------------------------------
    // Administration
    // ---------------------------------------------------------------------

    /// # Errors
    ///
    /// - [`OracleError::OwnerOnly`] if `caller` is not the administrator
    pub fn set_paused(&mut self, caller: &OracleId, paused: bool) -> Result<()> {
        self.admin.set_paused(caller, paused)?;
        let height = self.advance_height();
        self.audit.append(height, AuditEvent::PauseChanged { paused });
        Ok(())
    }

    /// # Errors
    ///
    /// - [`OracleError::OwnerOnly`] if `caller` is not the administrator
    pub fn update_threshold(&mut self, caller: &OracleId, threshold: u32) -> Result<()> {
        let previous = self.admin.update_threshold(caller, threshold)?;
        let height = self.advance_height();
        self.audit.append(
            height,
            AuditEvent::ThresholdUpdated {
                previous,
                threshold,
            },
        );
        Ok(())
    }

    /// Drop the open round for `asset`, returning how many submissions were
    /// discarded. Resetting an asset with no open round discards nothing.
    ///
    /// # Errors
    ///
    /// - [`OracleError::OwnerOnly`] if `caller` is not the administrator
    pub fn force_reset_asset(&mut self, caller: &OracleId, asset: &AssetId) -> Result<usize> {
        self.admin.ensure_owner(caller)?;
        let height = self.advance_height();
        let discarded = self.buffers.take(asset).map_or(0, |b| b.len());
        tracing::warn!(%asset, discarded, "round force-reset");
        self.audit.append(
            height,
            AuditEvent::AssetReset {
                asset: asset.clone(),
                discarded: u32::try_from(discarded).unwrap_or(u32::MAX),
            },
        );
        Ok(discarded)
    }

    /// Recover `amount` through the settlement layer while paused.
    ///
    /// # Errors
    ///
    /// - [`OracleError::OwnerOnly`] if `caller` is not the administrator
    /// - [`OracleError::ContractPaused`] if the engine is not paused
    pub fn emergency_withdraw(&mut self, caller: &OracleId, amount: u64) -> Result<()> {
        self.admin.check_emergency(caller)?;
        let height = self.advance_height();
        self.settlement.recover_funds(caller, amount);
        tracing::warn!(amount, "emergency withdrawal");
        self.audit
            .append(height, AuditEvent::EmergencyWithdrawal { amount });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn verified(&self, asset: &AssetId) -> Option<&VerifiedPrice> {
        self.prices.get(asset)
    }

    pub fn verified_price(&self, asset: &AssetId) -> Option<u64> {
        self.prices.get(asset).map(|v| v.price)
    }

    pub fn last_consensus_height(&self, asset: &AssetId) -> Option<u64> {
        self.prices.get(asset).map(|v| v.height)
    }

    pub fn oracle(&self, identity: &OracleId) -> Option<&RegistryEntry> {
        self.registry.get(identity)
    }

    pub fn oracle_reputation(&self, identity: &OracleId) -> Option<u64> {
        self.registry.reputation(identity)
    }

    pub fn oracle_stake(&self, identity: &OracleId) -> Option<u64> {
        self.registry.stake_of(identity)
    }

    pub fn is_authorized(&self, identity: &OracleId) -> bool {
        self.registry.is_authorized(identity)
    }

    pub fn pending_submissions(&self, asset: &AssetId) -> Vec<PendingSubmission> {
        self.buffers
            .get(asset)
            .map(|b| b.submissions().to_vec())
            .unwrap_or_default()
    }

    /// Whether `price_check` lies within `tolerance_pct` percent of the
    /// verified price. False when the asset has no verified price.
    pub fn is_price_valid(&self, asset: &AssetId, price_check: u64, tolerance_pct: u64) -> bool {
        self.verified_price(asset)
            .is_some_and(|price| enforcement::within_band(price, price_check, tolerance_pct))
    }

    pub fn estimate_payout(&self, participants: u64) -> u64 {
        enforcement::estimate_payout(self.reward_amount, participants)
    }

    pub fn params(&self) -> SystemParams {
        SystemParams {
            consensus_threshold: self.admin.consensus_threshold(),
            minimum_stake: self.minimum_stake,
            slash_amount: self.slash_amount,
            reward_amount: self.reward_amount,
            paused: self.admin.breaker().is_paused(),
        }
    }

    pub fn admin(&self) -> &OracleId {
        self.admin.owner()
    }

    pub fn current_height(&self) -> u64 {
        self.height
    }

    pub fn audit_records(&self) -> &[AuditRecord] {
        self.audit.records()
    }

    pub fn audit_page(&self, from: u64, limit: usize) -> &[AuditRecord] {
        self.audit.page(from, limit)
    }
}
