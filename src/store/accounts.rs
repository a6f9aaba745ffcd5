//! Database accounts backing application logins.

use super::procedure::{self, Procedure};
use super::value::SqlValue;
use crate::error::StoreResult;
use sqlx::mysql::MySqlConnection;

/// The one account that carries the admin role.
pub const ADMIN_USERNAME: &str = "admin";

/// Create a restricted-privilege database user through `create_normal_user`.
///
/// Runs with whatever privileges `conn` was opened with.
pub async fn create_normal_user(
    conn: &mut MySqlConnection,
    username: &str,
    password: &str,
) -> StoreResult<()> {
    procedure::call(
        conn,
        Procedure::CreateNormalUser,
        &[SqlValue::from(username), SqlValue::from(password)],
    )
    .await?;
    Ok(())
}
