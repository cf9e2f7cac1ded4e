// handlers/elevated/root/database/assign.rs - tenant grant assignment handlers

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::TenantRole;
use crate::error::ApiError;
use crate::services::TenantService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignUserRequest {
    pub user_id: Uuid,
    pub rol: TenantRole,
}

/// PUT /api/root/databases/:name/users - grant a user access to a tenant
pub async fn user_assign(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<AssignUserRequest>,
) -> Result<Json<Value>, ApiError> {
    TenantService::new(state.registry.clone())
        .assign_user(&name, payload.user_id, payload.rol)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": { "database": name, "userId": payload.user_id, "rol": payload.rol }
    })))
}

/// DELETE /api/root/databases/:name/users/:user_id - revoke a user's grant
pub async fn user_revoke(
    State(state): State<AppState>,
    Path((name, user_id)): Path<(String, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    TenantService::new(state.registry.clone()).revoke_user(&name, user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "database": name, "userId": user_id }
    })))
}
