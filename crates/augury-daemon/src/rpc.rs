//! JSON-RPC server over Unix socket.
//!
//! Listens on a Unix domain socket, accepts connections, and dispatches
//! newline-delimited JSON-RPC 2.0 calls to the command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use augury_oracle::OracleError;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, error, info, warn};

use crate::commands;
use crate::DaemonState;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    /// JSON-RPC version.
    pub jsonrpc: String,
    /// Request ID.
    pub id: serde_json::Value,
    /// Result or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RpcError {
    /// Numeric error code.
    pub code: i32,
    /// Error name.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Create a success response.
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: serde_json::Value, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

impl RpcError {
    // Standard JSON-RPC errors

    /// Parse error (-32700).
    pub fn parse_error() -> Self {
        Self {
            code: -32700,
            message: "PARSE_ERROR".to_string(),
            data: None,
        }
    }

    /// Invalid request (-32600).
    pub fn invalid_request() -> Self {
        Self {
            code: -32600,
            message: "INVALID_REQUEST".to_string(),
            data: None,
        }
    }

    /// Method not found (-32601).
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "METHOD_NOT_FOUND".to_string(),
            data: Some(serde_json::json!({"method": method})),
        }
    }

    /// Invalid params (-32602).
    pub fn invalid_params(detail: &str) -> Self {
        Self {
            code: -32602,
            message: "INVALID_PARAMS".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }

    /// Internal error (-32603).
    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: -32603,
            message: "INTERNAL_ERROR".to_string(),
            data: Some(serde_json::json!({"detail": detail})),
        }
    }
}

impl From<OracleError> for RpcError {
    fn from(err: OracleError) -> Self {
        let code = match &err {
            OracleError::OwnerOnly { .. } => -32100,
            OracleError::NotAuthorized(_) => -32101,
            OracleError::AlreadySubmitted { .. } => -32102,
            OracleError::InsufficientStake { .. } => -32103,
            OracleError::InvalidAmount { .. } => -32104,
            OracleError::ConsensusNotReached { .. } => -32105,
            OracleError::NoData(_) => -32106,
            OracleError::ContractPaused { .. } => -32107,
            OracleError::WithinTolerance { .. } => -32108,
            OracleError::BufferFull { .. } => -32109,
            OracleError::Overflow(_) => -32110,
            OracleError::Types(_) => return Self::invalid_params(&err.to_string()),
            OracleError::LockPoisoned => return Self::internal_error(&err.to_string()),
        };
        Self {
            code,
            message: err.code().replace('-', "_").to_ascii_uppercase(),
            data: Some(serde_json::json!({"detail": err.to_string()})),
        }
    }
}

/// The RPC server.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    /// Create a new RPC server.
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Run the server, accepting connections.
    pub async fn run(&self) -> anyhow::Result<()> {
        // Remove stale socket file
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(state, stream).await {
                            warn!("Connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                }
            }
        }
    }
}

/// Handle a single client connection.
async fn handle_connection(
    state: Arc<DaemonState>,
    stream: tokio::net::UnixStream,
) -> anyhow::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // EOF
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => dispatch_request(&state, request).await,
            Err(_) => RpcResponse::error(serde_json::Value::Null, RpcError::parse_error()),
        };

        let mut response_json = serde_json::to_string(&response)?;
        response_json.push('\n');
        writer.write_all(response_json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Dispatch a JSON-RPC request to the appropriate command handler.
pub async fn dispatch_request(state: &Arc<DaemonState>, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    if request.jsonrpc != "2.0" {
        return RpcResponse::error(id, RpcError::invalid_request());
    }

    let method = request.method.as_str();
    let params = &request.params;
    debug!("Dispatching RPC method: {}", method);

    let result = match method {
        // Registry
        "add_oracle" => commands::registry::add_oracle(state, params).await,
        "stake" => commands::registry::stake(state, params).await,
        "withdraw" => commands::registry::withdraw(state, params).await,

        // Rounds
        "submit_price" => commands::rounds::submit_price(state, params).await,
        "finalize_consensus" => commands::rounds::finalize_consensus(state, params).await,
        "report_outlier" => commands::rounds::report_outlier(state, params).await,

        // Administration
        "set_paused" => commands::admin::set_paused(state, params).await,
        "update_threshold" => commands::admin::update_threshold(state, params).await,
        "force_reset_asset" => commands::admin::force_reset_asset(state, params).await,
        "emergency_withdraw" => commands::admin::emergency_withdraw(state, params).await,

        // Reads
        "get_verified_price" => commands::queries::get_verified_price(state, params).await,
        "get_last_consensus_block" => {
            commands::queries::get_last_consensus_block(state, params).await
        }
        "get_oracle_reputation" => commands::queries::get_oracle_reputation(state, params).await,
        "get_oracle_stake" => commands::queries::get_oracle_stake(state, params).await,
        "get_pending_submissions" => {
            commands::queries::get_pending_submissions(state, params).await
        }
        "is_price_valid" => commands::queries::is_price_valid(state, params).await,
        "estimate_payout" => commands::queries::estimate_payout(state, params).await,
        "get_params" => commands::queries::get_params(state).await,
        "get_audit_log" => commands::queries::get_audit_log(state, params).await,

        _ => Err(RpcError::method_not_found(method)),
    };

    match result {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::error(id, err),
    }
}

#[cfg(test)]
mod tests {
    use augury_oracle::EngineConfig;
    use augury_types::OracleId;
    use serde_json::json;
    use tokio::net::UnixStream;

    use super::*;
    use crate::config::DaemonConfig;

    fn test_state() -> Arc<DaemonState> {
        let mut config = DaemonConfig::default();
        config.engine = EngineConfig::with_admin("admin");
        config.engine.consensus_threshold = 2;
        Arc::new(DaemonState::new(config))
    }

    async fn call(state: &Arc<DaemonState>, method: &str, params: serde_json::Value) -> RpcResponse {
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            id: json!(1),
            method: method.to_string(),
            params,
        };
        dispatch_request(state, request).await
    }

    #[test]
    fn test_rpc_error_codes() {
        let err = RpcError::from(OracleError::OwnerOnly {
            caller: OracleId::new("mallory"),
        });
        assert_eq!(err.code, -32100);
        assert_eq!(err.message, "OWNER_ONLY");

        let err = RpcError::from(OracleError::ContractPaused { paused: true });
        assert_eq!(err.code, -32107);
        assert_eq!(err.message, "CONTRACT_PAUSED");

        let err = RpcError::from(OracleError::LockPoisoned);
        assert_eq!(err.code, -32603);

        let err = RpcError::method_not_found("unknown");
        assert_eq!(err.code, -32601);
    }

    #[test]
    fn test_rpc_response_success() {
        let resp = RpcResponse::success(json!(1), json!({"price": 100}));
        assert!(resp.result.is_some());
        assert!(resp.error.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_full_round() {
        let state = test_state();
        for name in ["a", "b"] {
            let resp = call(&state, "add_oracle", json!({"caller": "admin", "target": name})).await;
            assert!(resp.error.is_none(), "{:?}", resp.error);
            let resp = call(&state, "stake", json!({"caller": name, "amount": 1000})).await;
            assert_eq!(resp.result, Some(json!({"stake": 1000})));
        }
        call(&state, "submit_price", json!({"caller": "a", "asset": "X", "price": 100})).await;
        call(&state, "submit_price", json!({"caller": "b", "asset": "X", "price": 111})).await;

        let resp = call(&state, "finalize_consensus", json!({"caller": "a", "asset": "X"})).await;
        let result = resp.result.expect("finalized");
        assert_eq!(result["price"], 105);
        assert_eq!(result["reporters"], json!(["a", "b"]));

        let resp = call(&state, "get_verified_price", json!({"asset": "X"})).await;
        assert_eq!(resp.result, Some(json!({"price": 105})));

        let resp = call(&state, "get_oracle_reputation", json!({"identity": "a"})).await;
        assert_eq!(resp.result, Some(json!({"reputation": 101})));
    }

    #[tokio::test]
    async fn test_dispatch_maps_engine_errors() {
        let state = test_state();
        let resp = call(&state, "set_paused", json!({"caller": "mallory", "paused": true})).await;
        assert_eq!(resp.error.expect("owner only").code, -32100);

        let resp = call(&state, "finalize_consensus", json!({"caller": "a", "asset": "X"})).await;
        assert_eq!(resp.error.expect("no data").code, -32106);

        let resp = call(&state, "get_verified_price", json!({"asset": ""})).await;
        assert_eq!(resp.error.expect("bad asset").code, -32602);
    }

    #[tokio::test]
    async fn test_dispatch_rejects_bad_requests() {
        let state = test_state();
        let resp = call(&state, "no_such_method", json!({})).await;
        assert_eq!(resp.error.expect("unknown").code, -32601);

        let resp = call(&state, "stake", json!({"amount": 1000})).await;
        assert_eq!(resp.error.expect("missing caller").code, -32602);

        let request = RpcRequest {
            jsonrpc: "1.0".to_string(),
            id: json!(7),
            method: "get_params".to_string(),
            params: json!({}),
        };
        let resp = dispatch_request(&state, request).await;
        assert_eq!(resp.error.expect("wrong version").code, -32600);
    }

    #[tokio::test]
    async fn test_socket_roundtrip() {
        let state = test_state();
        let socket_path = std::env::temp_dir().join(format!("augury-rpc-{}.sock", std::process::id()));
        let server = RpcServer::new(state, socket_path.clone());
        let task = tokio::spawn(async move { server.run().await });

        let mut stream = None;
        for _ in 0..50 {
            if let Ok(s) = UnixStream::connect(&socket_path).await {
                stream = Some(s);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let stream = stream.expect("connect to rpc socket");
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        writer
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"get_params\"}\nnot json\n")
            .await
            .expect("write");

        let mut line = String::new();
        reader.read_line(&mut line).await.expect("read");
        let value: serde_json::Value = serde_json::from_str(&line).expect("json");
        assert_eq!(value["result"]["consensus_threshold"], 2);

        line.clear();
        reader.read_line(&mut line).await.expect("read");
        let value: serde_json::Value = serde_json::from_str(&line).expect("json");
        assert_eq!(value["error"]["code"], -32700);

        task.abort();
        let _ = std::fs::remove_file(&socket_path);
    }

    #[test]
    fn test_state_wires_event_bus() {
        let state = test_state();
        let mut rx = state.event_bus.subscribe();
        state
            .engine
            .add_oracle(&OracleId::new("admin"), &OracleId::new("a"))
            .expect("admit");
        let record = rx.try_recv().expect("record forwarded");
        assert_eq!(record.event.name(), "oracle-added");
    }
}
