//! Account endpoints.
//!
//! Accounts are database users. Logging in means opening a database
//! connection with the supplied credentials; creating an account means
//! calling `create_normal_user`, which grants the restricted role.

use crate::error::{ServerError, ServerResult};
use crate::extract::Json;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use buildapc::Store;
use buildapc::store::accounts::{self, ADMIN_USERNAME};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub pwd: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub username: Option<String>,
    pub pwd: Option<String>,
}

fn role_for(username: &str) -> &'static str {
    if username == ADMIN_USERNAME { "admin" } else { "user" }
}

/// `username` must be present and non-empty; `password` only present.
fn required_pair(
    username: Option<String>,
    password: Option<String>,
    message: &str,
) -> ServerResult<(String, String)> {
    match (username, password) {
        (Some(user), Some(pass)) if !user.is_empty() => Ok((user, pass)),
        _ => Err(ServerError::BadRequest(message.to_string())),
    }
}

/// Log in by opening a database connection as the caller.
///
/// If the database refuses, `admin` may still log in with the service's
/// admin secret.
pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<LoginRequest>,
) -> ServerResult<impl IntoResponse> {
    let (username, password) = required_pair(
        request.username,
        request.password,
        "username and password required",
    )?;

    match state.store.connect_as(&username, &password).await {
        Ok(conn) => {
            Store::release(conn).await;
        }
        Err(err) => {
            if username == ADMIN_USERNAME && state.is_admin_secret(&password) {
                tracing::warn!(error = %err, "database login refused; admin accepted via service secret");
            } else {
                tracing::info!(username = %username, error = %err, "login refused");
                return Err(ServerError::Authentication("Invalid credentials".to_string()));
            }
        }
    }

    let role = role_for(&username).to_string();
    Ok(Json(LoginResponse {
        success: true,
        username,
        role,
    }))
}

/// Self-service signup: creates a restricted database user with the
/// service's credentials.
pub async fn signup(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SignupRequest>,
) -> ServerResult<impl IntoResponse> {
    let (username, pwd) = required_pair(request.username, request.pwd, "username and pwd required")?;

    if username.to_lowercase() == ADMIN_USERNAME {
        return Err(ServerError::BadRequest(
            "Cannot create admin user via signup".to_string(),
        ));
    }

    let mut conn = state.store.acquire().await?;
    if let Err(err) = accounts::create_normal_user(&mut conn, &username, &pwd).await {
        if err.is_duplicate_user() {
            tracing::info!(username = %username, "signup for existing username");
            return Err(ServerError::BadRequest("Username already exists".to_string()));
        }
        return Err(ServerError::rejected(err));
    }

    tracing::info!(username = %username, "account created via signup");
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Account created successfully! You can now login.",
    })))
}

/// Admin-only account creation.
///
/// The admin credentials are verified by connecting with them, and the
/// name must literally be `admin`. That same connection then creates the
/// account, so the database applies the admin's own privileges.
pub async fn create_user(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CreateUserRequest>,
) -> ServerResult<impl IntoResponse> {
    let (admin_username, admin_password) = match (request.admin_username, request.admin_password) {
        (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => (user, pass),
        _ => {
            return Err(ServerError::BadRequest(
                "admin_username and admin_password required".to_string(),
            ));
        }
    };
    let (username, pwd) = required_pair(request.username, request.pwd, "username and pwd required")?;

    let forbidden = || ServerError::Forbidden("Admin privileges required".to_string());

    let mut conn = match state.store.connect_as(&admin_username, &admin_password).await {
        Ok(conn) => conn,
        Err(err) => {
            tracing::info!(admin_username = %admin_username, error = %err, "admin verification refused");
            return Err(forbidden());
        }
    };
    if admin_username != ADMIN_USERNAME {
        Store::release(conn).await;
        return Err(forbidden());
    }

    let created = accounts::create_normal_user(&mut conn, &username, &pwd).await;
    Store::release(conn).await;
    created.map_err(ServerError::rejected)?;

    tracing::info!(username = %username, "account created by admin");
    Ok(Json(serde_json::json!({
        "message": format!("User {username} created successfully"),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles() {
        assert_eq!(role_for("admin"), "admin");
        assert_eq!(role_for("Admin"), "user");
        assert_eq!(role_for("alice"), "user");
    }

    #[test]
    fn required_pair_rules() {
        assert!(required_pair(Some("a".into()), Some(String::new()), "m").is_ok());
        assert!(required_pair(Some(String::new()), Some("p".into()), "m").is_err());
        assert!(required_pair(None, Some("p".into()), "m").is_err());
        assert!(required_pair(Some("a".into()), None, "m").is_err());
    }
}
