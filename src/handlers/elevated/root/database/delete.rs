// handlers/elevated/root/database/delete.rs - DELETE /api/root/databases/:name handler

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::services::TenantService;
use crate::state::AppState;

/// Tear down a tenant: deregister, evict its pool, drop the database.
pub async fn database_delete(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    TenantService::new(state.registry.clone()).delete_database(&name).await?;
    Ok(Json(json!({ "success": true, "data": { "deleted": name } })))
}
