// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::auth::password::verify_password;
use crate::auth::{create_master_token, is_master_credentials, DatabaseAccess, Identity, TenantRole};
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;

use super::utils::session_response;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Optional initial database selection
    #[serde(default)]
    pub database: Option<String>,
}

/// Authenticate and receive a session token.
///
/// The master pair is checked first, against configuration only; stored
/// users are then looked up and their bcrypt hash verified. Any mismatch
/// returns the same generic invalid-credentials response.
pub async fn login_post(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let security = &config::config().security;

    if is_master_credentials(security, &payload.username, &payload.password) {
        let tenants = state.credentials.list_tenant_databases().await?;

        let current = match payload.database {
            Some(name) => {
                if !tenants.iter().any(|t| t.name == name) {
                    return Err(ApiError::TenantNotFound(name));
                }
                Some(name)
            }
            None => {
                // Prefer the configured default tenant, else the first one
                let default = &config::config().database.default_database;
                tenants
                    .iter()
                    .find(|t| t.name == *default)
                    .or_else(|| tenants.first())
                    .map(|t| t.name.clone())
            }
        };

        let grants: Vec<DatabaseAccess> = tenants
            .into_iter()
            .map(|t| DatabaseAccess::new(t.name, TenantRole::Admin))
            .collect();
        let (token, claims) = create_master_token(&state.tokens, security, grants, current)?;

        info!("Master login");
        return Ok(Json(session_response(token, &claims, state.tokens.validity_secs())));
    }

    let user = state
        .credentials
        .find_by_username(&payload.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let grants = state.credentials.list_database_access(user.id).await?;

    let current = match payload.database {
        Some(name) => {
            if !grants.iter().any(|g| g.db_name == name) {
                return Err(ApiError::forbidden(format!(
                    "Database '{}' is not among your grants",
                    name
                )));
            }
            Some(name)
        }
        None => grants.first().map(|g| g.db_name.clone()),
    };

    state.credentials.record_login(user.id).await?;

    let role = user.base_role();
    let (token, claims) = state.tokens.issue_claims(
        Identity::StoredUser(user.id),
        user.username,
        role,
        grants,
        current,
    )?;

    info!("User login: {}", claims.username);
    Ok(Json(session_response(token, &claims, state.tokens.validity_secs())))
}
