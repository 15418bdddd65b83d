//! Thread-safe oracle engine.
//!
//! [`OracleEngine`] wraps an [`OracleState`] in a single reader-writer lock.
//! Every state-changing operation holds the write lock from its first
//! precondition check to its last audit record, so operations never
//! interleave: of two racing finalizations of the same asset exactly one
//! wins and the other observes the cleared buffer and fails with
//! [`OracleError::NoData`]. Reads share the lock and always see a state
//! between operations.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use augury_types::{
    AssetId, AuditRecord, OracleId, PendingSubmission, RegistryEntry, SystemParams,
};

use crate::audit::AuditSink;
use crate::config::EngineConfig;
use crate::registry::SlashOutcome;
use crate::settlement::Settlement;
use crate::state::{OracleState, RoundOutcome};
use crate::{OracleError, Result};

fn rejected<T>(op: &'static str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        tracing::debug!(op, code = e.code(), "rejected: {e}");
    }
    result
}

/// Shared handle to the oracle state.
pub struct OracleEngine {
    state: RwLock<OracleState>,
}

impl OracleEngine {
    /// Create an engine with a no-op settlement layer.
    pub fn new(config: EngineConfig) -> Self {
        tracing::info!(
            admin = %config.admin,
            threshold = config.consensus_threshold,
            aggregation = ?config.aggregation,
            "oracle engine initialised"
        );
        Self::from_state(OracleState::new(config))
    }

    /// Create an engine settling through `settlement`.
    pub fn with_settlement(config: EngineConfig, settlement: Arc<dyn Settlement>) -> Self {
        Self::from_state(OracleState::with_settlement(config, settlement))
    }

    /// Wrap an existing state.
    pub fn from_state(state: OracleState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, OracleState>> {
        self.state.write().map_err(|_| OracleError::LockPoisoned)
    }

    // Mutations validate before writing; a poisoned lock still guards a
    // consistent state.
    fn read(&self) -> RwLockReadGuard<'_, OracleState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Forward audit records appended from now on to `sink`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::LockPoisoned`] if the state lock is poisoned
    pub fn add_audit_sink(&self, sink: Arc<dyn AuditSink>) -> Result<()> {
        self.write()?.add_audit_sink(sink);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// See [`OracleState::add_oracle`].
    pub fn add_oracle(&self, caller: &OracleId, target: &OracleId) -> Result<()> {
        rejected("add_oracle", self.write()?.add_oracle(caller, target))
    }

    /// See [`OracleState::stake`].
    pub fn stake(&self, caller: &OracleId, amount: u64) -> Result<u64> {
        rejected("stake", self.write()?.stake(caller, amount))
    }

    /// See [`OracleState::withdraw`].
    pub fn withdraw(&self, caller: &OracleId, amount: u64) -> Result<u64> {
        rejected("withdraw", self.write()?.withdraw(caller, amount))
    }

    /// See [`OracleState::set_paused`].
    pub fn set_paused(&self, caller: &OracleId, paused: bool) -> Result<()> {
        rejected("set_paused", self.write()?.set_paused(caller, paused))
    }

    /// See [`OracleState::update_threshold`].
    pub fn update_threshold(&self, caller: &OracleId, threshold: u32) -> Result<()> {
        rejected("update_threshold", self.write()?.update_threshold(caller, threshold))
    }

    /// See [`OracleState::submit`].
    pub fn submit(&self, caller: &OracleId, asset: &AssetId, price: u64) -> Result<usize> {
        rejected("submit", self.write()?.submit(caller, asset, price))
    }

    /// Finalize the round for `asset`, returning the consensus price.
    ///
    /// See [`OracleState::finalize`].
    pub fn finalize_consensus(&self, asset: &AssetId) -> Result<u64> {
        self.finalize_round(asset).map(|outcome| outcome.price)
    }

    /// Like [`finalize_consensus`](Self::finalize_consensus) but returns the
    /// full round outcome.
    pub fn finalize_round(&self, asset: &AssetId) -> Result<RoundOutcome> {
        rejected("finalize", self.write()?.finalize(asset))
    }

    /// See [`OracleState::report_outlier`].
    pub fn report_outlier(
        &self,
        asset: &AssetId,
        accused: &OracleId,
        reported_price: u64,
    ) -> Result<SlashOutcome> {
        rejected(
            "report_outlier",
            self.write()?.report_outlier(asset, accused, reported_price),
        )
    }

    /// See [`OracleState::force_reset_asset`].
    pub fn force_reset_asset(&self, caller: &OracleId, asset: &AssetId) -> Result<usize> {
        rejected("force_reset_asset", self.write()?.force_reset_asset(caller, asset))
    }

    /// See [`OracleState::emergency_withdraw`].
    pub fn emergency_withdraw(&self, caller: &OracleId, amount: u64) -> Result<()> {
        rejected("emergency_withdraw", self.write()?.emergency_withdraw(caller, amount))
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn verified_price(&self, asset: &AssetId) -> Option<u64> {
        self.read().verified_price(asset)
    }

    pub fn last_consensus_height(&self, asset: &AssetId) -> Option<u64> {
        self.read().last_consensus_height(asset)
    }

    pub fn oracle_reputation(&self, identity: &OracleId) -> Option<u64> {
        self.read().oracle_reputation(identity)
    }

    pub fn oracle_stake(&self, identity: &OracleId) -> Option<u64> {
        self.read().oracle_stake(identity)
    }

    pub fn oracle(&self, identity: &OracleId) -> Option<RegistryEntry> {
        self.read().oracle(identity).cloned()
    }

    pub fn is_authorized(&self, identity: &OracleId) -> bool {
        self.read().is_authorized(identity)
    }

    pub fn pending_submissions(&self, asset: &AssetId) -> Vec<PendingSubmission> {
        self.read().pending_submissions(asset)
    }

    pub fn is_price_valid(&self, asset: &AssetId, price_check: u64, tolerance_pct: u64) -> bool {
        self.read().is_price_valid(asset, price_check, tolerance_pct)
    }

    pub fn estimate_payout(&self, participants: u64) -> u64 {
        self.read().estimate_payout(participants)
    }

    pub fn params(&self) -> SystemParams {
        self.read().params()
    }

    pub fn current_height(&self) -> u64 {
        self.read().current_height()
    }

    /// Snapshot of the full audit log.
    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.read().audit_records().to_vec()
    }

    /// Copy of at most `limit` audit records with `sequence >= from`.
    pub fn audit_page(&self, from: u64, limit: usize) -> Vec<AuditRecord> {
        self.read().audit_page(from, limit).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use super::*;

    fn id(s: &str) -> OracleId {
        OracleId::new(s)
    }

    fn engine_with_round(reporters: usize) -> (Arc<OracleEngine>, AssetId) {
        let engine = Arc::new(OracleEngine::new(EngineConfig::with_admin("admin")));
        let asset = AssetId::new("X").expect("asset");
        for i in 0..reporters {
            let oracle = id(&format!("o{i}"));
            engine.add_oracle(&id("admin"), &oracle).expect("admit");
            engine.stake(&oracle, 1000).expect("stake");
            engine.submit(&oracle, &asset, 100 + i as u64).expect("submit");
        }
        (engine, asset)
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OracleEngine>();
    }

    #[test]
    fn test_concurrent_finalize_has_one_winner() {
        let (engine, asset) = engine_with_round(5);
        let racers = 8;
        let barrier = Arc::new(Barrier::new(racers));

        let handles: Vec<_> = (0..racers)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let asset = asset.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    engine.finalize_consensus(&asset)
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, OracleError::NoData(_))));

        assert_eq!(engine.verified_price(&asset), Some(102));
        assert_eq!(engine.oracle_reputation(&id("o0")), Some(101));
    }

    #[test]
    fn test_concurrent_submissions_respect_capacity() {
        let engine = Arc::new(OracleEngine::new(EngineConfig::with_admin("admin")));
        let asset = AssetId::new("X").expect("asset");
        let oracles: Vec<OracleId> = (0..16).map(|i| id(&format!("o{i}"))).collect();
        for oracle in &oracles {
            engine.add_oracle(&id("admin"), oracle).expect("admit");
            engine.stake(oracle, 1000).expect("stake");
        }

        let handles: Vec<_> = oracles
            .into_iter()
            .map(|oracle| {
                let engine = Arc::clone(&engine);
                let asset = asset.clone();
                thread::spawn(move || engine.submit(&oracle, &asset, 100))
            })
            .collect();
        let accepted = handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(accepted, augury_types::MAX_SUBMISSIONS);
        assert_eq!(
            engine.pending_submissions(&asset).len(),
            augury_types::MAX_SUBMISSIONS
        );
    }

    #[test]
    fn test_finalize_round_returns_outcome() {
        let (engine, asset) = engine_with_round(3);
        let outcome = engine.finalize_round(&asset).expect("finalize");
        assert_eq!(outcome.price, 101);
        assert_eq!(outcome.reporters.len(), 3);
        assert_eq!(engine.last_consensus_height(&asset), Some(outcome.height));
        assert_eq!(engine.current_height(), outcome.height);
    }

    #[test]
    fn test_audit_snapshot() {
        let (engine, _) = engine_with_round(1);
        let records = engine.audit_records();
        let names: Vec<_> = records.iter().map(|r| r.event.name()).collect();
        assert_eq!(names, vec!["oracle-added", "staked", "price-submitted"]);
        assert_eq!(engine.audit_page(2, 10).len(), 1);
    }
}
