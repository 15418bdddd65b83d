//! augury-daemon: hosts one oracle engine behind a JSON-RPC socket.
//!
//! Single OS process running a Tokio async runtime. Clients talk to the
//! daemon via newline-delimited JSON-RPC over a Unix socket; every call
//! carries the already-authenticated caller identity.

mod commands;
mod config;
mod events;
mod rpc;

use std::sync::Arc;

use augury_oracle::{OracleEngine, OracleState};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::DaemonConfig;
use crate::events::EventBus;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// The oracle engine.
    pub engine: OracleEngine,
    /// Configuration.
    pub config: DaemonConfig,
    /// Bus carrying every audit record appended by the engine.
    pub event_bus: EventBus,
}

impl DaemonState {
    /// Build the engine from `config` and wire its audit log to a fresh bus.
    pub fn new(config: DaemonConfig) -> Self {
        let event_bus = EventBus::new(config.events.bus_capacity);
        let mut state = OracleState::new(config.engine.clone());
        state.add_audit_sink(Arc::new(event_bus.clone()));
        Self {
            engine: OracleEngine::from_state(state),
            config,
            event_bus,
        }
    }
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = DaemonConfig::load()?;

    // 2. Initialize tracing
    init_tracing(&config.logging.level)?;
    info!("Augury daemon starting");

    if config.engine.admin.as_str() == augury_oracle::config::DEFAULT_ADMIN {
        warn!("engine.admin not configured, using the default administrator identity");
    }

    let socket_path = config.socket_path();
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_records = config.events.log_records;

    // 3. Build engine and event bus
    let state = Arc::new(DaemonState::new(config));
    if log_records {
        tokio::spawn(events::log_records(state.event_bus.subscribe()));
    }
    info!(
        threshold = state.config.engine.consensus_threshold,
        paused = state.config.engine.start_paused,
        "Oracle engine ready"
    );

    // 4. Start IPC server
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());
    info!("Starting JSON-RPC server on {:?}", socket_path);

    // 5. Run the RPC server until shutdown
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!(
        height = state.engine.current_height(),
        audit_records = state.event_bus.published(),
        "Daemon stopped"
    );
    Ok(())
}
