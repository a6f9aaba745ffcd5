//! Statements on the `builds` table that are not routine calls.

use super::row::to_record;
use crate::error::StoreResult;
use crate::models::{BuildCreate, PowerEstimate};
use serde_json::Value;
use sqlx::mysql::MySqlConnection;

/// Insert a build and return its generated `build_id`.
pub async fn insert_build(conn: &mut MySqlConnection, build: &BuildCreate) -> StoreResult<u64> {
    let result = sqlx::query(
        "INSERT INTO builds \
             (build_name, cpu_id, gpu_id, motherboard_id, ram_id, psu_id, case_id, ssd_id, display_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&build.build_name)
    .bind(build.cpu_id)
    .bind(build.gpu_id)
    .bind(build.motherboard_id)
    .bind(build.ram_id)
    .bind(build.psu_id)
    .bind(build.case_id)
    .bind(build.ssd_id)
    .bind(build.display_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.last_insert_id())
}

/// Current power estimate of a build, or `None` if the row is gone.
pub async fn power_estimate(
    conn: &mut MySqlConnection,
    build_id: i64,
) -> StoreResult<Option<PowerEstimate>> {
    let row = sqlx::query(
        "SELECT build_id, build_name, total_power_estimate FROM builds WHERE build_id = ?",
    )
    .bind(build_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut record = to_record(&row)?;
    let mut take = |key: &str| record.remove(key).unwrap_or(Value::Null);
    Ok(Some(PowerEstimate {
        build_id: take("build_id"),
        build_name: take("build_name"),
        total_power_estimate: take("total_power_estimate"),
    }))
}
