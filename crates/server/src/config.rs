use buildapc::DatabaseConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// The single origin allowed to make credentialed cross-origin calls
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Metrics endpoint enabled
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Password accepted for `admin` when direct database login fails.
    /// Falls back to the database password when unset.
    #[serde(default)]
    pub admin_secret: Option<String>,

    /// Backing database
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            cors_origin: default_cors_origin(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            admin_secret: None,
            database: DatabaseConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `server` config file and
    /// `BUILDAPC_SERVER__*` environment variables, in increasing precedence.
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env is normal outside development.
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            .add_source(config::File::with_name("server").required(false))
            .add_source(config::Environment::with_prefix("BUILDAPC_SERVER").separator("__"));

        let config: ServerConfig = builder.build()?.try_deserialize()?;

        if config.admin_secret.is_none() && config.database.password.is_empty() {
            tracing::warn!("No admin secret or database password configured; admin fallback login is disabled");
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    /// The secret that lets `admin` in when the database refuses the login.
    /// `None` when nothing non-empty is configured.
    pub fn admin_secret(&self) -> Option<&str> {
        self.admin_secret
            .as_deref()
            .or(Some(self.database.password.as_str()))
            .filter(|s| !s.is_empty())
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size_mb, 10);
        assert_eq!(cfg.cors_origin, "http://localhost:3000");
        assert!(cfg.metrics_enabled);
        assert_eq!(cfg.database.name, "final_build_a_pc");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_admin_secret_defaults_to_database_password() {
        let mut cfg = ServerConfig::default();
        assert_eq!(cfg.admin_secret(), None);

        cfg.database.password = "backing".into();
        assert_eq!(cfg.admin_secret(), Some("backing"));

        cfg.admin_secret = Some("override".into());
        assert_eq!(cfg.admin_secret(), Some("override"));
    }

    #[test]
    fn test_empty_override_disables_fallback() {
        let mut cfg = ServerConfig::default();
        cfg.database.password = "backing".into();
        cfg.admin_secret = Some(String::new());
        assert_eq!(cfg.admin_secret(), None);
    }
}
