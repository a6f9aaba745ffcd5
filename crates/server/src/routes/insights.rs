//! Read-only delegations to the analytical routines.
//!
//! Compatibility, search, comparison and statistics are computed by the
//! database; these handlers validate names, pass arguments through and wrap
//! the rows under a fixed key. Any database failure is a 500.

use crate::error::{ServerError, ServerResult};
use crate::extract::{Json, Path, Query};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use buildapc::store::procedure;
use buildapc::{BuildState, Procedure, SqlValue, Table};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Search filters; all optional
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,

    #[serde(default = "default_min_price")]
    pub min_price: f64,

    #[serde(default = "default_max_price")]
    pub max_price: f64,
}

/// GPU and case to match PSUs against
#[derive(Debug, Deserialize)]
pub struct PsuQuery {
    pub gpu_id: i64,
    pub case_id: i64,
}

fn default_min_price() -> f64 {
    0.0
}

fn default_max_price() -> f64 {
    999_999.0
}

/// Normalize a comma-separated id list (`"3, 7,12"` -> `"3,7,12"`).
pub fn parse_id_list(ids: &str) -> ServerResult<String> {
    let parsed = ids
        .split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| {
            ServerError::BadRequest(format!(
                "ids must be a comma-separated list of integers, got '{ids}'"
            ))
        })?;

    Ok(parsed
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(","))
}

/// Evaluate `check_compatibility_fnn` for two components.
pub async fn check_compatibility(
    State(state): State<Arc<ServerState>>,
    Path((comp1, id1, comp2, id2)): Path<(String, i64, String, i64)>,
) -> ServerResult<impl IntoResponse> {
    Table::parse_component(&comp1)?;
    Table::parse_component(&comp2)?;

    let mut conn = state.store.acquire().await?;
    let compatibility =
        procedure::check_compatibility(&mut conn, &comp1, id1, &comp2, id2).await?;

    Ok(Json(json!({ "compatibility": compatibility })))
}

/// Builds flagged by `get_high_power_builds`.
pub async fn high_power_builds(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(&mut conn, Procedure::GetHighPowerBuilds, &[])
        .await?
        .first();

    Ok(Json(json!({ "high_power_builds": rows })))
}

/// Per-category count and min/max/avg price.
pub async fn part_counts(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(&mut conn, Procedure::GetPartCounts, &[])
        .await?
        .first();

    Ok(Json(json!({ "part_counts": rows })))
}

/// Side-by-side comparison of several parts of one category.
pub async fn compare_parts(
    State(state): State<Arc<ServerState>>,
    Path((category, ids)): Path<(String, String)>,
) -> ServerResult<impl IntoResponse> {
    let table = Table::parse_part(&category)?;
    let ids = parse_id_list(&ids)?;

    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(
        &mut conn,
        Procedure::ComparePartsById,
        &[SqlValue::from(table.as_str()), SqlValue::from(ids)],
    )
    .await?
    .first();

    Ok(Json(json!({ "comparison": rows })))
}

/// Keyword and price-range search within a category.
pub async fn search_parts(
    State(state): State<Arc<ServerState>>,
    Path(category): Path<String>,
    Query(query): Query<SearchQuery>,
) -> ServerResult<impl IntoResponse> {
    let table = Table::parse_part(&category)?;

    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(
        &mut conn,
        Procedure::SearchParts,
        &[
            SqlValue::from(table.as_str()),
            SqlValue::from(query.keyword),
            SqlValue::from(query.min_price),
            SqlValue::from(query.max_price),
        ],
    )
    .await?
    .first();

    Ok(Json(json!({ "search_results": rows })))
}

/// Free-text lookup of a component name across every category.
pub async fn find_component(
    State(state): State<Arc<ServerState>>,
    Path(term): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(
        &mut conn,
        Procedure::FindComponentByName,
        &[SqlValue::from(term)],
    )
    .await?
    .first();

    Ok(Json(json!({ "results": rows })))
}

/// Parts of `category` that fit the selections in the posted build state.
pub async fn compatible_parts(
    State(state): State<Arc<ServerState>>,
    Path(category): Path<String>,
    Json(build): Json<BuildState>,
) -> ServerResult<impl IntoResponse> {
    let table = Table::parse_part(&category)?;

    let args = [
        SqlValue::from(table.as_str()),
        SqlValue::from(build.cpu_id),
        SqlValue::from(build.motherboard_id),
        SqlValue::from(build.ram_id),
        SqlValue::from(build.gpu_id),
        SqlValue::from(build.case_id),
        SqlValue::from(build.psu_id),
    ];

    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(&mut conn, Procedure::GetCompatibleParts, &args)
        .await?
        .last();

    Ok(Json(json!({ "compatible_parts": rows })))
}

/// PSUs that can drive the GPU and fit the case.
pub async fn compatible_psus(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PsuQuery>,
) -> ServerResult<impl IntoResponse> {
    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(
        &mut conn,
        Procedure::GetCompatiblePsus,
        &[SqlValue::from(query.gpu_id), SqlValue::from(query.case_id)],
    )
    .await?
    .last();

    Ok(Json(json!({ "compatible_psus": rows })))
}
