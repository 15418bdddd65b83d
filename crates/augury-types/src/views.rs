//! Read-side views of engine state.

use serde::{Deserialize, Serialize};

use crate::OracleId;

/// Registry row for one admitted oracle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct RegistryEntry {
    pub reputation: u64,
    pub stake: u64,
}

/// Last committed consensus value for an asset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct VerifiedPrice {
    pub price: u64,
    /// Engine height of the operation that committed this price.
    pub height: u64,
}

/// A buffered (reporter, price) pair awaiting consensus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct PendingSubmission {
    pub reporter: OracleId,
    pub price: u64,
}
