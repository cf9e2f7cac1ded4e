// handlers/elevated/root/database/list.rs - GET /api/root/databases handler

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::TenantService;
use crate::state::AppState;

pub async fn database_list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let databases = TenantService::new(state.registry.clone()).list_databases().await?;
    Ok(Json(json!({ "success": true, "data": databases })))
}
