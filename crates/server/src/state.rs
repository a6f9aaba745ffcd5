use crate::config::ServerConfig;
use crate::error::ServerResult;
use buildapc::Store;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
///
/// Holds nothing mutable: every request gets its own connection from
/// `store`, and the pool is the only thing shared between them.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Database access (service pool + credentialed connections)
    pub store: Store,

    /// Prometheus render handle, when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state. Must run inside a Tokio runtime; the pool
    /// is created lazily and does not touch the network here.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = Store::new(config.database.clone());
        Ok(Self {
            config: Arc::new(config),
            store,
            metrics: None,
        })
    }

    /// Attach a Prometheus handle for `GET /metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Whether `password` is the configured admin fallback secret.
    pub fn is_admin_secret(&self, password: &str) -> bool {
        self.config
            .admin_secret()
            .is_some_and(|secret| secret == password)
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}
