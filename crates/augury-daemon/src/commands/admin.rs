//! Administrative command handlers. The engine enforces owner gating.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{asset_param, caller, u64_param, Result};
use crate::rpc::RpcError;
use crate::DaemonState;

/// Trip or reset the circuit breaker.
pub async fn set_paused(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = caller(params)?;
    let paused = params
        .get("paused")
        .and_then(Value::as_bool)
        .ok_or_else(|| RpcError::invalid_params("paused required"))?;
    state.engine.set_paused(&caller, paused)?;
    Ok(json!({"paused": paused}))
}

/// Overwrite the consensus threshold.
pub async fn update_threshold(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = caller(params)?;
    let threshold = u32::try_from(u64_param(params, "threshold")?)
        .map_err(|_| RpcError::invalid_params("threshold out of range"))?;
    state.engine.update_threshold(&caller, threshold)?;
    Ok(json!({"consensus_threshold": threshold}))
}

/// Discard the open round for an asset.
pub async fn force_reset_asset(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = caller(params)?;
    let asset = asset_param(params)?;
    let discarded = state.engine.force_reset_asset(&caller, &asset)?;
    Ok(json!({"discarded": discarded}))
}

/// Recover funds while paused.
pub async fn emergency_withdraw(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = caller(params)?;
    let amount = u64_param(params, "amount")?;
    state.engine.emergency_withdraw(&caller, amount)?;
    Ok(json!({"amount": amount}))
}
