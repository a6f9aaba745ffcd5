use crate::error::{ServerError, ServerResult};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use buildapc::store::tables;
use buildapc::{Pagination, Table};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Query parameters for paginated table reads
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    #[serde(default)]
    pub page: Option<i64>,

    /// Rows per page (default 100)
    #[serde(default)]
    pub limit: Option<i64>,
}

/// One page of any catalog table, builds included.
pub async fn fetch_table(
    State(state): State<Arc<ServerState>>,
    Path(table): Path<String>,
    Query(query): Query<PageQuery>,
) -> ServerResult<impl IntoResponse> {
    let table: Table = table.parse()?;
    let pagination = Pagination::new(query.page, query.limit)?;

    let mut conn = state.store.acquire().await?;
    let page = tables::fetch_page(&mut conn, table, pagination).await?;

    Ok(Json(page))
}

/// A single row by primary key (`build_id` for builds, `id` otherwise).
pub async fn fetch_item(
    State(state): State<Arc<ServerState>>,
    Path((table, id)): Path<(String, i64)>,
) -> ServerResult<impl IntoResponse> {
    let table: Table = table.parse()?;

    let mut conn = state.store.acquire().await?;
    let item = tables::fetch_one(&mut conn, table, id)
        .await?
        .ok_or_else(|| {
            ServerError::NotFound(format!(
                "Item with {}={id} not found in {table}",
                table.primary_key()
            ))
        })?;

    Ok(Json(json!({
        "table": table,
        "item": item,
    })))
}
