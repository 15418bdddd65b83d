//! Submission, finalization and outlier command handlers.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{asset_param, caller, identity_param, u64_param, Result};
use crate::DaemonState;

/// Submit the caller's price for an asset.
pub async fn submit_price(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = caller(params)?;
    let asset = asset_param(params)?;
    let price = u64_param(params, "price")?;
    let buffered = state.engine.submit(&caller, &asset, price)?;
    Ok(json!({"buffered": buffered}))
}

/// Finalize the open round for an asset. Any caller may trigger it.
pub async fn finalize_consensus(state: &Arc<DaemonState>, params: &Value) -> Result {
    let asset = asset_param(params)?;
    let outcome = state.engine.finalize_round(&asset)?;
    Ok(json!({
        "asset": outcome.asset,
        "price": outcome.price,
        "reporters": outcome.reporters,
        "height": outcome.height,
    }))
}

/// Accuse an oracle of reporting an outlier price.
pub async fn report_outlier(state: &Arc<DaemonState>, params: &Value) -> Result {
    let asset = asset_param(params)?;
    let accused = identity_param(params, "accused")?;
    let reported_price = u64_param(params, "reported_price")?;
    let outcome = state
        .engine
        .report_outlier(&asset, &accused, reported_price)?;
    Ok(json!({
        "slashed": true,
        "removed": outcome.removed,
        "remaining_stake": outcome.remaining_stake,
    }))
}
