//! Registry command handlers.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{caller, identity_param, u64_param, Result};
use crate::DaemonState;

/// Admit or re-admit an oracle (admin only).
pub async fn add_oracle(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = caller(params)?;
    let target = identity_param(params, "target")?;
    state.engine.add_oracle(&caller, &target)?;
    Ok(json!({"authorized": true}))
}

/// Add collateral to the caller's stake.
pub async fn stake(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = caller(params)?;
    let amount = u64_param(params, "amount")?;
    let total = state.engine.stake(&caller, amount)?;
    Ok(json!({"stake": total}))
}

/// Withdraw collateral from the caller's stake.
pub async fn withdraw(state: &Arc<DaemonState>, params: &Value) -> Result {
    let caller = caller(params)?;
    let amount = u64_param(params, "amount")?;
    let remaining = state.engine.withdraw(&caller, amount)?;
    Ok(json!({"stake": remaining}))
}
