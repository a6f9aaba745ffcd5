use crate::error::{ServerError, ServerResult};
use crate::extract::{Json, Path};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use buildapc::store::{builds, procedure};
use buildapc::{BuildCreate, BuildUpdate, PowerEstimate, Procedure, Record, SqlValue};
use serde_json::{Value, json};
use std::sync::Arc;

/// Column a build routine sets when it refuses the request.
const ERROR_MESSAGE_COLUMN: &str = "error_message";

/// The routine's refusal message, if its first row carries one.
fn refusal(rows: &[Record]) -> Option<String> {
    let message = rows.first()?.get(ERROR_MESSAGE_COLUMN)?;
    Some(match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn estimate_or_not_found(
    build_id: i64,
    estimate: Option<PowerEstimate>,
) -> ServerResult<PowerEstimate> {
    estimate.ok_or_else(|| ServerError::NotFound(format!("Build {build_id} not found")))
}

/// Create a build from a name and up to eight part references.
pub async fn create_build(
    State(state): State<Arc<ServerState>>,
    Json(build): Json<BuildCreate>,
) -> ServerResult<impl IntoResponse> {
    let mut conn = state.store.acquire().await?;
    let build_id = builds::insert_build(&mut conn, &build)
        .await
        .map_err(ServerError::rejected)?;

    tracing::info!(build_id, build_name = %build.build_name, "build created");
    Ok(Json(json!({
        "message": "Build created successfully",
        "build_id": build_id,
    })))
}

/// Partial update through `update_build`; absent fields are sent as NULL.
pub async fn update_build(
    State(state): State<Arc<ServerState>>,
    Path(build_id): Path<i64>,
    Json(update): Json<BuildUpdate>,
) -> ServerResult<impl IntoResponse> {
    let args = [
        SqlValue::from(build_id),
        SqlValue::from(update.build_name),
        SqlValue::from(update.cpu_id),
        SqlValue::from(update.gpu_id),
        SqlValue::from(update.motherboard_id),
        SqlValue::from(update.ram_id),
        SqlValue::from(update.psu_id),
        SqlValue::from(update.case_id),
        SqlValue::from(update.ssd_id),
        SqlValue::from(update.display_id),
    ];

    let mut conn = state.store.acquire().await?;
    let details = procedure::call(&mut conn, Procedure::UpdateBuild, &args)
        .await
        .map_err(ServerError::rejected)?
        .last();

    Ok(Json(json!({
        "message": format!("Build {build_id} updated successfully"),
        "details": details,
    })))
}

/// Delete through `delete_build`. A row carrying `error_message` means the
/// routine refused, which is reported as 404 with its message.
pub async fn delete_build(
    State(state): State<Arc<ServerState>>,
    Path(build_id): Path<i64>,
) -> ServerResult<impl IntoResponse> {
    let mut conn = state.store.acquire().await?;
    let details = procedure::call(&mut conn, Procedure::DeleteBuild, &[SqlValue::from(build_id)])
        .await
        .map_err(ServerError::rejected)?
        .last();

    if let Some(message) = refusal(&details) {
        return Err(ServerError::NotFound(message));
    }

    tracing::info!(build_id, "build deleted");
    Ok(Json(json!({
        "message": format!("Build {build_id} deleted successfully"),
        "details": details,
    })))
}

/// Rows of `get_build_summary` for one build, returned as a bare array.
pub async fn build_summary(
    State(state): State<Arc<ServerState>>,
    Path(build_id): Path<i64>,
) -> ServerResult<impl IntoResponse> {
    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(
        &mut conn,
        Procedure::GetBuildSummary,
        &[SqlValue::from(build_id)],
    )
    .await?
    .last();

    Ok(Json(rows))
}

/// Every build with its parts joined in, from `get_build_details`.
pub async fn all_build_details(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let mut conn = state.store.acquire().await?;
    let rows = procedure::call(&mut conn, Procedure::GetBuildDetails, &[])
        .await?
        .last();

    Ok(Json(json!({ "builds": rows })))
}

/// Recompute and persist the build's power estimate, then read it back.
///
/// The routine's own result sets are discarded; the build row is the answer.
pub async fn estimate_power(
    State(state): State<Arc<ServerState>>,
    Path(build_id): Path<i64>,
) -> ServerResult<impl IntoResponse> {
    let mut conn = state.store.acquire().await?;
    procedure::call(&mut conn, Procedure::EstimatePower, &[SqlValue::from(build_id)]).await?;

    let estimate = estimate_or_not_found(
        build_id,
        builds::power_estimate(&mut conn, build_id).await?,
    )?;

    Ok(Json(json!({
        "build_id": estimate.build_id,
        "build_name": estimate.build_name,
        "total_power_estimate": estimate.total_power_estimate,
        "message": "Power estimate calculated successfully",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn row(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("rows are objects"),
        }
    }

    #[test]
    fn missing_build_refusal_is_not_found() {
        let rows = vec![row(json!({"error_message": "Build 999999 does not exist"}))];
        let message = refusal(&rows).unwrap();
        assert_eq!(message, "Build 999999 does not exist");

        let err = ServerError::NotFound(message);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn non_text_refusal_is_rendered() {
        let rows = vec![row(json!({"error_message": 404}))];
        assert_eq!(refusal(&rows).as_deref(), Some("404"));
    }

    #[test]
    fn ordinary_rows_are_not_refusals() {
        assert_eq!(refusal(&[]), None);
        let rows = vec![row(json!({"message": "Build 3 deleted", "build_id": 3}))];
        assert_eq!(refusal(&rows), None);
    }

    #[test]
    fn power_estimate_for_vanished_build_is_not_found() {
        let err = estimate_or_not_found(42, None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Build 42 not found");

        let estimate = PowerEstimate {
            build_id: json!(42),
            build_name: json!("Quiet"),
            total_power_estimate: json!(0),
        };
        assert_eq!(estimate_or_not_found(42, Some(estimate.clone())).unwrap(), estimate);
    }
}
