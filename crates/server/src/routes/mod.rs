//! API route handlers
//!
//! Every handler follows the same shape: validate the path/query/body,
//! check out one connection, run one statement or routine, and map the
//! outcome to JSON. Routes are organized by surface:
//!
//! - `health`: liveness, readiness and metrics
//! - `auth`: login, self-service signup, admin-created accounts
//! - `fetch`: paginated and single-row reads of catalog tables
//! - `admin`: row create/update/delete and single-attribute updates on part tables
//! - `builds`: build create/update/delete, summaries and power estimates
//! - `insights`: compatibility, search, comparison and statistics routines

pub mod admin;
pub mod auth;
pub mod builds;
pub mod fetch;
pub mod health;
pub mod insights;

use crate::error::{ServerError, ServerResult};
use axum::Json;
use axum::response::IntoResponse;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Build-a-PC Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/auth/login",
            "/auth/signup",
            "/users/create",
            "/fetch/{table}",
            "/fetch/{table}/{id}",
            "/admin/{table}",
            "/admin/{table}/{id}",
            "/admin/{table}/{id}/{column}",
            "/builds",
            "/builds/{id}",
            "/builds/details/all",
            "/builds/analytics/high-power",
            "/power/{id}",
            "/compatibility/{comp1}/{id1}/{comp2}/{id2}",
            "/parts/counts",
            "/parts/compatible/{category}",
            "/compare/{category}/{ids}",
            "/search/{category}",
            "/find/{term}",
            "/psus/compatibility",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound("Not found".to_string())
}
