//! Audit events emitted by the oracle engine.
//!
//! Events are append-only records for external observers; the engine never
//! reads them back.

use serde::{Deserialize, Serialize};

use crate::{AssetId, OracleId};

/// Envelope for every audit event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct AuditRecord {
    /// Position in the audit log, starting at 0.
    pub sequence: u64,
    /// Engine height of the operation that produced the event.
    pub height: u64,
    pub event: AuditEvent,
}

/// All audit event types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[serde(tag = "event", rename_all = "kebab-case")]
#[ts(export)]
pub enum AuditEvent {
    // Registry
    OracleAdded {
        identity: OracleId,
        reputation: u64,
    },
    Staked {
        identity: OracleId,
        amount: u64,
        total: u64,
    },
    Withdrawn {
        identity: OracleId,
        amount: u64,
        remaining: u64,
    },
    OracleRewarded {
        identity: OracleId,
        reputation: u64,
    },
    OracleSlashed {
        identity: OracleId,
        amount: u64,
        remaining_stake: u64,
    },

    // Rounds
    PriceSubmitted {
        asset: AssetId,
        reporter: OracleId,
        price: u64,
    },
    /// Detailed round summary.
    ConsensusRound {
        asset: AssetId,
        price: u64,
        reporters: Vec<OracleId>,
        count: u32,
    },
    /// Terse finality notice.
    PriceFinalized {
        asset: AssetId,
        price: u64,
    },
    OutlierReported {
        asset: AssetId,
        accused: OracleId,
        reported_price: u64,
        consensus_price: u64,
        deviation: u64,
    },

    // Administration
    PauseChanged {
        paused: bool,
    },
    ThresholdUpdated {
        previous: u32,
        threshold: u32,
    },
    AssetReset {
        asset: AssetId,
        discarded: u32,
    },
    EmergencyWithdrawal {
        amount: u64,
    },
}

impl AuditEvent {
    /// Kebab-case event name, matching the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OracleAdded { .. } => "oracle-added",
            Self::Staked { .. } => "staked",
            Self::Withdrawn { .. } => "withdrawn",
            Self::OracleRewarded { .. } => "oracle-rewarded",
            Self::OracleSlashed { .. } => "oracle-slashed",
            Self::PriceSubmitted { .. } => "price-submitted",
            Self::ConsensusRound { .. } => "consensus-round",
            Self::PriceFinalized { .. } => "price-finalized",
            Self::OutlierReported { .. } => "outlier-reported",
            Self::PauseChanged { .. } => "pause-changed",
            Self::ThresholdUpdated { .. } => "threshold-updated",
            Self::AssetReset { .. } => "asset-reset",
            Self::EmergencyWithdrawal { .. } => "emergency-withdrawal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_event_serializes_with_tag() {
        let event = AuditEvent::OracleSlashed {
            identity: OracleId::new("oracle-d"),
            amount: 500,
            remaining_stake: 500,
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["event"], "oracle-slashed");
        assert_eq!(value["identity"], "oracle-d");
        assert_eq!(value["amount"], 500);
        assert_eq!(event.name(), "oracle-slashed");
    }

    #[test]
    fn test_round_event_roundtrip() {
        let record = AuditRecord {
            sequence: 7,
            height: 12,
            event: AuditEvent::ConsensusRound {
                asset: AssetId::new("X").expect("asset"),
                price: 100,
                reporters: vec![OracleId::new("a"), OracleId::new("b")],
                count: 2,
            },
        };
        let json = serde_json::to_string(&record).expect("serialize");
        let parsed: AuditRecord = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, record);
    }
}
