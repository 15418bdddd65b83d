//! Read-only command handlers.

use std::sync::Arc;

use serde_json::{json, Value};

use super::{asset_param, identity_param, u64_param, Result};
use crate::rpc::RpcError;
use crate::DaemonState;

/// Maximum audit records returned per call.
const AUDIT_PAGE_LIMIT: usize = 500;

pub async fn get_verified_price(state: &Arc<DaemonState>, params: &Value) -> Result {
    let asset = asset_param(params)?;
    Ok(json!({"price": state.engine.verified_price(&asset)}))
}

pub async fn get_last_consensus_block(state: &Arc<DaemonState>, params: &Value) -> Result {
    let asset = asset_param(params)?;
    Ok(json!({"height": state.engine.last_consensus_height(&asset)}))
}

pub async fn get_oracle_reputation(state: &Arc<DaemonState>, params: &Value) -> Result {
    let identity = identity_param(params, "identity")?;
    Ok(json!({"reputation": state.engine.oracle_reputation(&identity)}))
}

pub async fn get_oracle_stake(state: &Arc<DaemonState>, params: &Value) -> Result {
    let identity = identity_param(params, "identity")?;
    Ok(json!({"stake": state.engine.oracle_stake(&identity)}))
}

pub async fn get_pending_submissions(state: &Arc<DaemonState>, params: &Value) -> Result {
    let asset = asset_param(params)?;
    Ok(json!(state.engine.pending_submissions(&asset)))
}

/// `tolerance` is a percentage of the verified price.
pub async fn is_price_valid(state: &Arc<DaemonState>, params: &Value) -> Result {
    let asset = asset_param(params)?;
    let price_check = u64_param(params, "price")?;
    let tolerance = u64_param(params, "tolerance")?;
    Ok(json!({"valid": state.engine.is_price_valid(&asset, price_check, tolerance)}))
}

pub async fn estimate_payout(state: &Arc<DaemonState>, params: &Value) -> Result {
    let participants = u64_param(params, "participants")?;
    Ok(json!({"payout": state.engine.estimate_payout(participants)}))
}

pub async fn get_params(state: &Arc<DaemonState>) -> Result {
    serde_json::to_value(state.engine.params())
        .map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Page through the audit log from `since` (default 0).
pub async fn get_audit_log(state: &Arc<DaemonState>, params: &Value) -> Result {
    let since = params.get("since").and_then(Value::as_u64).unwrap_or(0);
    let records = state.engine.audit_page(since, AUDIT_PAGE_LIMIT);
    Ok(json!({
        "records": records,
        "height": state.engine.current_height(),
    }))
}

#[cfg(test)]
mod tests {
    use augury_oracle::EngineConfig;
    use augury_types::{AssetId, OracleId};

    use super::*;
    use crate::config::DaemonConfig;

    fn state() -> Arc<DaemonState> {
        let mut config = DaemonConfig::default();
        config.engine = EngineConfig::with_admin("admin");
        config.engine.consensus_threshold = 1;
        Arc::new(DaemonState::new(config))
    }

    #[tokio::test]
    async fn test_reads_before_any_round() {
        let state = state();
        let asset = json!({"asset": "X"});
        assert_eq!(get_verified_price(&state, &asset).await.expect("read"), json!({"price": null}));
        assert_eq!(
            get_last_consensus_block(&state, &asset).await.expect("read"),
            json!({"height": null})
        );
        assert_eq!(
            is_price_valid(&state, &json!({"asset": "X", "price": 1, "tolerance": 100}))
                .await
                .expect("read"),
            json!({"valid": false})
        );
        assert_eq!(
            estimate_payout(&state, &json!({"participants": 4})).await.expect("read"),
            json!({"payout": 25})
        );
    }

    #[tokio::test]
    async fn test_audit_log_paging() {
        let state = state();
        let admin = OracleId::new("admin");
        let a = OracleId::new("a");
        state.engine.add_oracle(&admin, &a).expect("admit");
        state.engine.stake(&a, 1000).expect("stake");
        state
            .engine
            .submit(&a, &AssetId::new("X").expect("asset"), 42)
            .expect("submit");

        let page = get_audit_log(&state, &json!({"since": 1})).await.expect("read");
        let records = page["records"].as_array().expect("records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event"]["event"], "staked");
        assert_eq!(page["height"], 3);

        let pending = get_pending_submissions(&state, &json!({"asset": "X"}))
            .await
            .expect("read");
        assert_eq!(pending, json!([{"reporter": "a", "price": 42}]));
    }

    #[tokio::test]
    async fn test_audit_log_page_is_capped() {
        let state = state();
        let admin = OracleId::new("admin");
        for i in 0..AUDIT_PAGE_LIMIT + 20 {
            state
                .engine
                .add_oracle(&admin, &OracleId::new(format!("o{i}")))
                .expect("admit");
        }

        let page = get_audit_log(&state, &json!({})).await.expect("read");
        let records = page["records"].as_array().expect("records");
        assert_eq!(records.len(), AUDIT_PAGE_LIMIT);
        assert_eq!(records[0]["sequence"], 0);

        let rest = get_audit_log(&state, &json!({"since": AUDIT_PAGE_LIMIT}))
            .await
            .expect("read");
        let records = rest["records"].as_array().expect("records");
        assert_eq!(records.len(), 20);
        assert_eq!(records[0]["sequence"], AUDIT_PAGE_LIMIT);
    }
}
