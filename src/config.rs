//! Database connection settings.
//!
//! The gateway talks to exactly one MySQL schema. Service-level requests use
//! the credentials below; login and admin verification swap in the
//! credentials supplied by the caller (see [`DatabaseConfig::connect_options_as`]).

use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;
use std::fmt;
use std::time::Duration;

/// Connection settings for the backing MySQL schema.
#[derive(Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    /// Service credential. Also the admin fallback secret unless the server
    /// configures one explicitly.
    #[serde(default)]
    pub password: String,

    /// Schema name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Upper bound on pooled service connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            name: default_name(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl DatabaseConfig {
    /// Options for the service-level credentials.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        self.connect_options_as(&self.user, &self.password)
    }

    /// Options for the same host and schema under caller-supplied credentials.
    pub fn connect_options_as(&self, username: &str, password: &str) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(username)
            .password(password)
            .database(&self.name)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_user() -> String {
    "root".to_string()
}

fn default_name() -> String {
    "final_build_a_pc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = DatabaseConfig::default();
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.port, 3306);
        assert_eq!(cfg.user, "root");
        assert_eq!(cfg.name, "final_build_a_pc");
        assert_eq!(cfg.acquire_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_document_fills_defaults() {
        let cfg: DatabaseConfig =
            serde_json::from_str(r#"{"password": "s3cret", "port": 3307}"#).unwrap();
        assert_eq!(cfg.password, "s3cret");
        assert_eq!(cfg.port, 3307);
        assert_eq!(cfg.max_connections, 10);
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = DatabaseConfig {
            password: "hunter2".into(),
            ..DatabaseConfig::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
