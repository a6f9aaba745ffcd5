//! Plain statements against catalog tables: paging, lookup by key, and the
//! admin insert/update/delete paths.
//!
//! Table names come from [`Table`] and column names are checked against the
//! live schema before they are spliced into SQL; all values are bound.

use super::row::to_record;
use super::value::{SqlValue, bind_all, placeholders};
use crate::catalog::{Table, is_identifier};
use crate::error::{StoreError, StoreResult};
use crate::models::{Page, Pagination, Record};
use serde_json::{Map, Value};
use sqlx::Row;
use sqlx::mysql::MySqlConnection;
use std::collections::HashSet;

/// Keys clients send alongside admin payloads that are not columns.
pub const CREDENTIAL_KEYS: [&str; 2] = ["admin_username", "admin_password"];

/// Ordered `(column, value)` pairs for an insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignments(Vec<(String, SqlValue)>);

impl Assignments {
    /// Take a client payload, dropping the admin credential keys.
    pub fn from_payload(mut payload: Map<String, Value>) -> Self {
        for key in CREDENTIAL_KEYS {
            payload.remove(key);
        }
        Self(
            payload
                .iter()
                .map(|(column, value)| (column.clone(), SqlValue::from(value)))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    fn values(&self) -> Vec<SqlValue> {
        self.0.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Reject the set unless every column is a plain identifier present in
    /// `known`.
    pub fn validate(&self, table: Table, known: &HashSet<String>) -> StoreResult<()> {
        if self.is_empty() {
            return Err(StoreError::EmptyAssignment(table));
        }
        match self
            .columns()
            .find(|c| !is_identifier(c) || !known.contains(*c))
        {
            Some(column) => Err(StoreError::UnknownColumn {
                table,
                column: column.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn insert_sql(&self, table: Table) -> String {
        let columns = self.columns().collect::<Vec<_>>().join(", ");
        format!(
            "INSERT INTO {table} ({columns}) VALUES ({})",
            placeholders(self.0.len())
        )
    }

    fn update_sql(&self, table: Table) -> String {
        let set_clause = self
            .columns()
            .map(|c| format!("{c} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {table} SET {set_clause} WHERE {} = ?",
            table.primary_key()
        )
    }
}

/// Column names of `table` in the connection's current schema.
pub async fn table_columns(conn: &mut MySqlConnection, table: Table) -> StoreResult<HashSet<String>> {
    let rows = sqlx::query(
        "SELECT CAST(COLUMN_NAME AS CHAR) AS column_name \
         FROM information_schema.COLUMNS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
    )
    .bind(table.as_str())
    .fetch_all(&mut *conn)
    .await?;

    rows.iter()
        .map(|row| row.try_get::<String, _>("column_name").map_err(StoreError::from))
        .collect()
}

/// One page of `table` plus the total row count.
pub async fn fetch_page(
    conn: &mut MySqlConnection,
    table: Table,
    pagination: Pagination,
) -> StoreResult<Page> {
    let total_count: i64 = sqlx::query(&format!("SELECT COUNT(*) AS total FROM {table}"))
        .fetch_one(&mut *conn)
        .await?
        .try_get("total")?;

    let rows = sqlx::query(&format!("SELECT * FROM {table} LIMIT ? OFFSET ?"))
        .bind(pagination.limit)
        .bind(pagination.offset())
        .fetch_all(&mut *conn)
        .await?;
    let data = rows.iter().map(to_record).collect::<Result<Vec<_>, _>>()?;

    Ok(Page::new(table, pagination, total_count, data))
}

/// Row of `table` whose primary key equals `id`.
pub async fn fetch_one(
    conn: &mut MySqlConnection,
    table: Table,
    id: i64,
) -> StoreResult<Option<Record>> {
    let sql = format!("SELECT * FROM {table} WHERE {} = ?", table.primary_key());
    let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
    Ok(row.as_ref().map(to_record).transpose()?)
}

/// Insert a validated assignment set; returns the generated key.
pub async fn insert_row(
    conn: &mut MySqlConnection,
    table: Table,
    assignments: &Assignments,
) -> StoreResult<u64> {
    let sql = assignments.insert_sql(table);
    let values = assignments.values();
    let result = bind_all(sqlx::query(&sql), &values)
        .execute(&mut *conn)
        .await?;
    Ok(result.last_insert_id())
}

/// Update the row keyed by `id`; returns the number of affected rows.
pub async fn update_row(
    conn: &mut MySqlConnection,
    table: Table,
    id: i64,
    assignments: &Assignments,
) -> StoreResult<u64> {
    let sql = assignments.update_sql(table);
    let mut values = assignments.values();
    values.push(SqlValue::Int(id));
    let result = bind_all(sqlx::query(&sql), &values)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Delete the row keyed by `id`; returns the number of affected rows.
pub async fn delete_row(conn: &mut MySqlConnection, table: Table, id: i64) -> StoreResult<u64> {
    let sql = format!("DELETE FROM {table} WHERE {} = ?", table.primary_key());
    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}
