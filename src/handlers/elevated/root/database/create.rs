// handlers/elevated/root/database/create.rs - POST /api/root/databases handler

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::TenantService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDatabaseRequest {
    pub name: String,
}

/// Provision a new tenant database and register it for routing.
pub async fn database_create(
    State(state): State<AppState>,
    Json(payload): Json<CreateDatabaseRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let created = TenantService::new(state.registry.clone())
        .create_database(&payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}
