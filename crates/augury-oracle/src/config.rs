//! Engine initialisation parameters.

use augury_types::params::{
    DEFAULT_CONSENSUS_THRESHOLD, DEFAULT_MINIMUM_STAKE, DEFAULT_REWARD_AMOUNT,
    DEFAULT_SLASH_AMOUNT,
};
use augury_types::OracleId;
use serde::{Deserialize, Serialize};

use crate::consensus::Aggregation;

/// Administrator identity used when none is configured.
pub const DEFAULT_ADMIN: &str = "augury-admin";

/// Everything an [`OracleEngine`](crate::OracleEngine) needs at start-up.
///
/// Only `consensus_threshold` and the pause flag can change afterwards, and
/// only through administrative operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Designated administrator identity.
    #[serde(default = "default_admin")]
    pub admin: OracleId,
    /// Minimum reporters for a round to finalize.
    #[serde(default = "default_consensus_threshold")]
    pub consensus_threshold: u32,
    /// Collateral required to submit, and the per-call stake minimum.
    #[serde(default = "default_minimum_stake")]
    pub minimum_stake: u64,
    /// Stake removed by a slash.
    #[serde(default = "default_slash_amount")]
    pub slash_amount: u64,
    /// Reward pool per round.
    #[serde(default = "default_reward_amount")]
    pub reward_amount: u64,
    /// Start with the circuit breaker tripped.
    #[serde(default)]
    pub start_paused: bool,
    /// How buffered prices are combined.
    #[serde(default)]
    pub aggregation: Aggregation,
}

fn default_admin() -> OracleId {
    OracleId::new(DEFAULT_ADMIN)
}

fn default_consensus_threshold() -> u32 {
    DEFAULT_CONSENSUS_THRESHOLD
}

fn default_minimum_stake() -> u64 {
    DEFAULT_MINIMUM_STAKE
}

fn default_slash_amount() -> u64 {
    DEFAULT_SLASH_AMOUNT
}

fn default_reward_amount() -> u64 {
    DEFAULT_REWARD_AMOUNT
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            consensus_threshold: default_consensus_threshold(),
            minimum_stake: default_minimum_stake(),
            slash_amount: default_slash_amount(),
            reward_amount: default_reward_amount(),
            start_paused: false,
            aggregation: Aggregation::default(),
        }
    }
}

impl EngineConfig {
    /// Default parameters with the given administrator.
    pub fn with_admin(admin: impl Into<OracleId>) -> Self {
        Self {
            admin: admin.into(),
            ..Self::default()
        }
    }
}
