//! MySQL access for the gateway.
//!
//! [`Store`] owns a lazily-connecting pool for the service credentials. A
//! request checks out at most one connection and the pool takes it back when
//! the guard drops, whatever path the handler leaves by. Connections opened
//! with caller-supplied credentials (login, admin verification) are not
//! pooled; they are opened for the one request and closed explicitly.
//!
//! Free functions in the submodules take `&mut MySqlConnection` so they run
//! the same on a pooled connection and on a credentialed one.

pub mod accounts;
pub mod builds;
pub mod procedure;
pub mod row;
pub mod tables;
pub mod value;

pub use procedure::{Procedure, ResultSets};
pub use tables::Assignments;
pub use value::SqlValue;

use crate::config::DatabaseConfig;
use crate::error::StoreResult;
use sqlx::Connection;
use sqlx::mysql::{MySql, MySqlConnection, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;

/// Pooled service connection; returned to the pool on drop.
pub type PooledConnection = PoolConnection<MySql>;

#[derive(Clone)]
pub struct Store {
    config: DatabaseConfig,
    pool: MySqlPool,
}

impl Store {
    /// Build the pool without connecting; the first request dials out.
    pub fn new(config: DatabaseConfig) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy_with(config.connect_options());
        Self { config, pool }
    }

    /// Check out a connection under the service credentials.
    pub async fn acquire(&self) -> StoreResult<PooledConnection> {
        Ok(self.pool.acquire().await?)
    }

    /// Open an unpooled connection as `username`. Success is itself the
    /// credential check; the caller must [`Store::release`] it.
    pub async fn connect_as(&self, username: &str, password: &str) -> StoreResult<MySqlConnection> {
        let options = self.config.connect_options_as(username, password);
        Ok(MySqlConnection::connect_with(&options).await?)
    }

    /// Close a credentialed connection. A failed close is logged, not
    /// reported; the socket is gone either way.
    pub async fn release(conn: MySqlConnection) {
        if let Err(err) = conn.close().await {
            tracing::warn!(error = %err, "closing credentialed connection failed");
        }
    }

    /// Round-trip to the server through the pool.
    pub async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to come back.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .finish()
    }
}
