//! Error types produced by the store layer.
//!
//! Database failures keep the driver's error so callers can classify them
//! (error number, message text) before choosing an HTTP status.

use crate::catalog::Table;
use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// MySQL `ER_CANNOT_USER`, raised when `CREATE USER` names an existing account.
pub const ER_CANNOT_USER: u16 = 1396;

/// MySQL `ER_BAD_FIELD_ERROR`.
pub const ER_BAD_FIELD_ERROR: u16 = 1054;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{}", describe(.0))]
    Database(#[from] sqlx::Error),

    #[error("Column '{column}' does not exist in table '{table}'")]
    UnknownColumn { table: Table, column: String },

    #[error("No columns supplied for {0}")]
    EmptyAssignment(Table),
}

impl StoreError {
    /// MySQL error number, when the failure came from the server.
    pub fn error_number(&self) -> Option<u16> {
        match self {
            StoreError::Database(sqlx::Error::Database(db)) => db
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(MySqlDatabaseError::number),
            _ => None,
        }
    }

    /// The server rejected a column reference.
    pub fn is_unknown_column(&self) -> bool {
        matches!(self, StoreError::UnknownColumn { .. })
            || self.error_number() == Some(ER_BAD_FIELD_ERROR)
            || self.to_string().contains("Unknown column")
    }

    /// The account-creation routine refused a name that is already taken.
    pub fn is_duplicate_user(&self) -> bool {
        self.error_number() == Some(ER_CANNOT_USER)
            || self.to_string().to_lowercase().contains("already exists")
    }
}

/// Server-side errors render as `<number> (<sqlstate>): <message>`; anything
/// else (I/O, pool timeout, decode) uses the driver's own message.
fn describe(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.to_string(),
        other => other.to_string(),
    }
}
