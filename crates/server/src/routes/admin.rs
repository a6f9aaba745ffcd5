//! Admin row maintenance on part tables.
//!
//! Bodies are free-form `column -> value` maps. Table names come from the
//! part allow-list, column names must exist in the table's live schema, and
//! values are always bound. Any `admin_username`/`admin_password` keys the
//! client sends along are discarded.

use crate::error::{ServerError, ServerResult};
use crate::extract::{Json, Path};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use buildapc::store::PooledConnection;
use buildapc::store::procedure;
use buildapc::store::tables;
use buildapc::{
    Assignments, Procedure, Record, SqlValue, StoreError, StoreResult, Table, is_identifier,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::Arc;

/// Body of a single-attribute update
#[derive(Debug, Default, Deserialize)]
pub struct AttributeUpdate {
    #[serde(default)]
    pub value: Option<Value>,
}

fn not_found(table: Table, id: i64) -> ServerError {
    ServerError::NotFound(format!("Item {id} not found in {table}"))
}

/// Strip credentials from the body; an empty remainder is a client error.
fn assignments_from(table: Table, payload: Map<String, Value>) -> ServerResult<Assignments> {
    let assignments = Assignments::from_payload(payload);
    if assignments.is_empty() {
        return Err(ServerError::rejected(StoreError::EmptyAssignment(table)));
    }
    Ok(assignments)
}

/// Check every assigned column against the table's live schema.
async fn check_columns(
    conn: &mut PooledConnection,
    table: Table,
    assignments: &Assignments,
) -> ServerResult<()> {
    let known = tables::table_columns(conn, table).await;
    columns_accepted(table, assignments, known)
}

/// Outcome of the schema check. A failed lookup counts as a rejected
/// mutation like any other store error on this path.
fn columns_accepted(
    table: Table,
    assignments: &Assignments,
    known: StoreResult<HashSet<String>>,
) -> ServerResult<()> {
    known
        .and_then(|known| assignments.validate(table, &known))
        .map_err(ServerError::rejected)
}

/// Message for a single-attribute update: the routine's own `message`
/// column when it reports one.
fn attribute_message(rows: &[Record], table: Table, id: i64) -> String {
    match rows.first() {
        None => format!("Updated {table} id {id}"),
        Some(row) => row
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| "Updated successfully".to_string(), str::to_string),
    }
}

/// Insert a row built from the body's columns.
pub async fn create_item(
    State(state): State<Arc<ServerState>>,
    Path(table): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> ServerResult<impl IntoResponse> {
    let table = Table::parse_part(&table)?;

    let assignments = assignments_from(table, payload)?;

    let mut conn = state.store.acquire().await?;
    check_columns(&mut conn, table, &assignments).await?;
    let id = tables::insert_row(&mut conn, table, &assignments)
        .await
        .map_err(ServerError::rejected)?;

    tracing::info!(table = %table, id, "admin inserted row");
    Ok(Json(json!({
        "message": format!("Item added to {table} successfully"),
        "id": id,
    })))
}

/// Overwrite the body's columns on row `id`.
pub async fn update_item(
    State(state): State<Arc<ServerState>>,
    Path((table, id)): Path<(String, i64)>,
    Json(payload): Json<Map<String, Value>>,
) -> ServerResult<impl IntoResponse> {
    let table = Table::parse_part(&table)?;

    let assignments = assignments_from(table, payload)?;

    let mut conn = state.store.acquire().await?;
    check_columns(&mut conn, table, &assignments).await?;
    let affected = tables::update_row(&mut conn, table, id, &assignments)
        .await
        .map_err(ServerError::rejected)?;
    if affected == 0 {
        return Err(not_found(table, id));
    }

    tracing::info!(table = %table, id, "admin updated row");
    Ok(Json(json!({
        "message": format!("Item {id} in {table} updated successfully"),
    })))
}

/// Delete row `id`.
pub async fn delete_item(
    State(state): State<Arc<ServerState>>,
    Path((table, id)): Path<(String, i64)>,
) -> ServerResult<impl IntoResponse> {
    let table = Table::parse_part(&table)?;

    let mut conn = state.store.acquire().await?;
    let affected = tables::delete_row(&mut conn, table, id)
        .await
        .map_err(ServerError::rejected)?;
    if affected == 0 {
        return Err(not_found(table, id));
    }

    tracing::info!(table = %table, id, "admin deleted row");
    Ok(Json(json!({
        "message": format!("Item {id} deleted from {table} successfully"),
    })))
}

/// Set one column of one row through `admin_update_attribute`.
pub async fn update_attribute(
    State(state): State<Arc<ServerState>>,
    Path((table, id, column)): Path<(String, i64, String)>,
    Json(body): Json<AttributeUpdate>,
) -> ServerResult<impl IntoResponse> {
    let table = Table::parse_part(&table)?;

    let value = match body.value {
        Some(value) if !value.is_null() => value,
        _ => {
            return Err(ServerError::BadRequest(
                "value is required in request body".to_string(),
            ));
        }
    };

    let unknown_column = || {
        ServerError::BadRequest(format!(
            "Column '{column}' does not exist in table '{table}'"
        ))
    };
    if !is_identifier(&column) {
        return Err(unknown_column());
    }

    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(
        &mut conn,
        Procedure::AdminUpdateAttribute,
        &[
            SqlValue::from(table.as_str()),
            SqlValue::from(column.as_str()),
            SqlValue::from(SqlValue::to_text(&value)),
            SqlValue::from(id),
        ],
    )
    .await
    .map_err(|err| {
        if err.is_unknown_column() {
            unknown_column()
        } else {
            ServerError::rejected(err)
        }
    })?
    .last();

    Ok(Json(json!({
        "success": true,
        "message": attribute_message(&rows, table, id),
    })))
}
