//! IPC command handlers.
//!
//! Each submodule implements the commands for one IPC category. Every
//! handler receives the raw JSON-RPC params; the caller identity arrives as
//! the `caller` param and is trusted as already authenticated.

pub mod admin;
pub mod queries;
pub mod registry;
pub mod rounds;

use augury_types::{AssetId, OracleId};
use serde_json::Value;

use crate::rpc::RpcError;

type Result = std::result::Result<Value, RpcError>;

fn identity_param(params: &Value, key: &str) -> std::result::Result<OracleId, RpcError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(OracleId::new)
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))
}

fn caller(params: &Value) -> std::result::Result<OracleId, RpcError> {
    identity_param(params, "caller")
}

fn asset_param(params: &Value) -> std::result::Result<AssetId, RpcError> {
    let symbol = params
        .get("asset")
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::invalid_params("asset required"))?;
    AssetId::new(symbol).map_err(|e| RpcError::invalid_params(&e.to_string()))
}

fn u64_param(params: &Value, key: &str) -> std::result::Result<u64, RpcError> {
    params
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))
}
