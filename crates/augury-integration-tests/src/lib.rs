//! Integration test crate for the Augury oracle engine.
//!
//! This crate has no library code beyond shared fixtures; it only contains
//! integration tests that exercise end-to-end flows across the workspace
//! crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p augury-integration-tests
//! ```

use augury_oracle::{EngineConfig, OracleEngine};
use augury_types::{AssetId, OracleId};

/// Administrator identity used by every fixture.
pub const ADMIN: &str = "SP000ADMIN";

/// Shorthand for an oracle identity.
pub fn oracle(name: &str) -> OracleId {
    OracleId::new(name)
}

/// Shorthand for a valid asset id.
pub fn asset(symbol: &str) -> AssetId {
    AssetId::new(symbol).unwrap_or_else(|e| unreachable!("fixture asset {symbol:?}: {e}"))
}

/// Engine with default parameters and [`ADMIN`] as administrator.
pub fn engine() -> OracleEngine {
    OracleEngine::new(EngineConfig::with_admin(ADMIN))
}

/// Admit `name` and stake exactly the minimum.
pub fn enroll(engine: &OracleEngine, name: &str) -> OracleId {
    let id = oracle(name);
    if let Err(e) = engine.add_oracle(&oracle(ADMIN), &id) {
        unreachable!("fixture admission of {name}: {e}");
    }
    if let Err(e) = engine.stake(&id, engine.params().minimum_stake) {
        unreachable!("fixture stake of {name}: {e}");
    }
    id
}
