//! Process-wide system parameters.

use serde::{Deserialize, Serialize};

/// Default minimum reporter count for a round to finalize.
pub const DEFAULT_CONSENSUS_THRESHOLD: u32 = 3;

/// Default collateral an oracle must hold to submit.
pub const DEFAULT_MINIMUM_STAKE: u64 = 1000;

/// Default stake removed by a slash.
pub const DEFAULT_SLASH_AMOUNT: u64 = 500;

/// Default reward pool per round, used by payout estimates.
pub const DEFAULT_REWARD_AMOUNT: u64 = 100;

/// Snapshot of the engine's parameters.
///
/// `consensus_threshold` and `paused` change through administrative
/// operations; the rest are fixed at initialisation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct SystemParams {
    pub consensus_threshold: u32,
    pub minimum_stake: u64,
    pub slash_amount: u64,
    pub reward_amount: u64,
    pub paused: bool,
}

impl Default for SystemParams {
    fn default() -> Self {
        Self {
            consensus_threshold: DEFAULT_CONSENSUS_THRESHOLD,
            minimum_stake: DEFAULT_MINIMUM_STAKE,
            slash_amount: DEFAULT_SLASH_AMOUNT,
            reward_amount: DEFAULT_REWARD_AMOUNT,
            paused: false,
        }
    }
}
